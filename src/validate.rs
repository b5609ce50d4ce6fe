use std::ops::RangeInclusive;

use thiserror::Error;

use crate::{
    assemble::rating_percent,
    models::{MAX_ACTORS, Movie, PersonRef},
};

pub const YEAR_RANGE: RangeInclusive<i32> = 1870..=2100;

#[derive(Clone, Debug, Error, PartialEq)]
pub enum ValidationIssue {
    #[error("primary title is blank")]
    BlankPrimaryTitle,

    #[error("{field} {value} outside 1870..=2100")]
    YearOutOfRange { field: &'static str, value: i32 },

    #[error("negative runtime {0}")]
    NegativeRuntime(i32),

    #[error("average rating {0} outside 0..=10")]
    AverageOutOfRange(f64),

    #[error("rating percent {percent:?} does not match average {average10:?}")]
    PercentMismatch { average10: Option<f64>, percent: Option<f64> },

    #[error("negative vote count {0}")]
    NegativeVotes(i64),

    #[error("{0} actors exceeds the cap")]
    TooManyActors(usize),

    #[error("{list} entry has a blank id or name")]
    BlankPerson { list: &'static str },
}

/// Checks a record against the constraints of the persisted shape. An empty
/// result means the record can be written.
pub fn validate(movie: &Movie) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    if movie.title.primary.trim().is_empty() {
        issues.push(ValidationIssue::BlankPrimaryTitle);
    }

    for (field, value) in [("year.start", movie.year.start), ("year.end", movie.year.end)] {
        if let Some(value) = value.filter(|v| !YEAR_RANGE.contains(v)) {
            issues.push(ValidationIssue::YearOutOfRange { field, value });
        }
    }

    if let Some(runtime) = movie.runtime_minutes.filter(|r| *r < 0) {
        issues.push(ValidationIssue::NegativeRuntime(runtime));
    }

    let rating = &movie.rating;
    if let Some(avg) = rating.average10.filter(|a| !(0.0..=10.0).contains(a)) {
        issues.push(ValidationIssue::AverageOutOfRange(avg));
    }
    if rating.percent != rating.average10.map(rating_percent) {
        issues.push(ValidationIssue::PercentMismatch {
            average10: rating.average10,
            percent: rating.percent,
        });
    }
    if rating.votes < 0 {
        issues.push(ValidationIssue::NegativeVotes(rating.votes));
    }

    if movie.crew.actors.len() > MAX_ACTORS {
        issues.push(ValidationIssue::TooManyActors(movie.crew.actors.len()));
    }

    let blank = |p: &PersonRef| p.id.trim().is_empty() || p.name.trim().is_empty();
    for (list, people) in [
        ("directors", &movie.crew.directors),
        ("writers", &movie.crew.writers),
        ("actors", &movie.crew.actors),
    ] {
        if people.iter().any(blank) {
            issues.push(ValidationIssue::BlankPerson { list });
        }
    }

    issues
}

/// Clears every field that breaks a persisted-record constraint, leaving the
/// rest of the record intact, and returns what was cleared. Out-of-range
/// numbers become absent; an out-of-range average drops the percent with it.
pub fn clear_out_of_range(movie: &mut Movie) -> Vec<ValidationIssue> {
    let mut cleared = Vec::new();

    for (field, slot) in [("year.start", &mut movie.year.start), ("year.end", &mut movie.year.end)] {
        if let Some(value) = slot.filter(|v| !YEAR_RANGE.contains(v)) {
            cleared.push(ValidationIssue::YearOutOfRange { field, value });
            *slot = None;
        }
    }

    if let Some(runtime) = movie.runtime_minutes.filter(|r| *r < 0) {
        cleared.push(ValidationIssue::NegativeRuntime(runtime));
        movie.runtime_minutes = None;
    }

    let rating = &mut movie.rating;
    if let Some(avg) = rating.average10.filter(|a| !(0.0..=10.0).contains(a)) {
        cleared.push(ValidationIssue::AverageOutOfRange(avg));
        rating.average10 = None;
        rating.percent = None;
    }
    if rating.percent != rating.average10.map(rating_percent) {
        cleared.push(ValidationIssue::PercentMismatch {
            average10: rating.average10,
            percent: rating.percent,
        });
        rating.percent = rating.average10.map(rating_percent);
    }
    if rating.votes < 0 {
        cleared.push(ValidationIssue::NegativeVotes(rating.votes));
        rating.votes = 0;
    }

    if movie.crew.actors.len() > MAX_ACTORS {
        cleared.push(ValidationIssue::TooManyActors(movie.crew.actors.len()));
        movie.crew.actors.truncate(MAX_ACTORS);
    }

    let blank = |p: &PersonRef| p.id.trim().is_empty() || p.name.trim().is_empty();
    for (list, people) in [
        ("directors", &mut movie.crew.directors),
        ("writers", &mut movie.crew.writers),
        ("actors", &mut movie.crew.actors),
    ] {
        if people.iter().any(blank) {
            cleared.push(ValidationIssue::BlankPerson { list });
            people.retain(|p| !blank(p));
        }
    }

    cleared
}

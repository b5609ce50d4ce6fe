use std::collections::{HashMap, HashSet};

use crate::{
    entities::{name_basics, title_basics, title_crew, title_principals, title_ratings},
    models::{MAX_ACTORS, PersonRef},
    normalize::{parse_id_list, parse_optional_decimal, parse_optional_int, parse_optional_text},
};

pub const CAST_CATEGORIES: [&str; 2] = ["actor", "actress"];

pub fn is_cast_category(category: Option<&str>) -> bool {
    category.is_some_and(|c| CAST_CATEGORIES.contains(&c.trim()))
}

/// Read-only lookup tables for one chunk of titles.
#[derive(Clone, Debug, Default)]
pub struct SourceBatch {
    pub titles: Vec<title_basics::Model>,
    pub ratings: HashMap<String, title_ratings::Model>,
    pub crew: HashMap<String, title_crew::Model>,
    /// Principal rows per title, in principal order.
    pub principals: HashMap<String, Vec<title_principals::Model>>,
    pub people: HashMap<String, name_basics::Model>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RatingValues {
    pub average10: Option<f64>,
    pub votes: i64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct JoinedTitle<'a> {
    pub title: &'a title_basics::Model,
    pub rating: RatingValues,
    pub directors: Vec<PersonRef>,
    pub writers: Vec<PersonRef>,
    pub actors: Vec<PersonRef>,
}

impl SourceBatch {
    pub fn join_all(&self) -> impl Iterator<Item = JoinedTitle<'_>> {
        self.titles.iter().map(|title| self.join(title))
    }

    pub fn join<'a>(&'a self, title: &'a title_basics::Model) -> JoinedTitle<'a> {
        let rating = self
            .ratings
            .get(&title.tconst)
            .map(|row| RatingValues {
                average10: parse_optional_decimal(row.average_rating.as_deref()),
                votes: parse_optional_int(row.num_votes.as_deref()).unwrap_or(0).max(0),
            })
            .unwrap_or_default();

        let (director_ids, writer_ids) = match self.crew.get(&title.tconst) {
            Some(row) => {
                (parse_id_list(row.directors.as_deref()), parse_id_list(row.writers.as_deref()))
            },
            None => (Vec::new(), Vec::new()),
        };

        let directors = self.resolve(director_ids.iter().map(String::as_str), usize::MAX);
        let writers = self.resolve(writer_ids.iter().map(String::as_str), usize::MAX);

        let cast_ids = self
            .principals
            .get(&title.tconst)
            .into_iter()
            .flatten()
            .filter(|p| is_cast_category(p.category.as_deref()))
            .map(|p| p.nconst.as_str());
        let actors = self.resolve(cast_ids, MAX_ACTORS);

        JoinedTitle { title, rating, directors, writers, actors }
    }

    /// Looks up person ids in order, dropping unknown or unnamed people and
    /// repeats, and stops after `cap` resolved entries.
    fn resolve<'i>(&self, ids: impl Iterator<Item = &'i str>, cap: usize) -> Vec<PersonRef> {
        let mut seen = HashSet::new();
        ids.filter(|id| seen.insert(*id))
            .filter_map(|id| {
                let person = self.people.get(id)?;
                let name = parse_optional_text(person.primary_name.as_deref())?;
                Some(PersonRef { id: id.to_string(), name })
            })
            .take(cap)
            .collect()
    }
}

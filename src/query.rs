//! Turns the sparse `/movies` query string into a filter, a sort order and a
//! page window. Building never fails: blank or unparsable values leave their
//! filter out.

use serde::Deserialize;

use crate::normalize::{parse_optional_decimal, parse_optional_int};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QueryConfig {
    pub page_size: u64,
}

/// Raw `/movies` parameters, all kept as text so decoding can't reject a request.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieQuery {
    pub q: Option<String>,
    pub title: Option<String>,
    pub year: Option<String>,
    pub year_from: Option<String>,
    pub year_to: Option<String>,
    pub genre: Option<String>,
    #[serde(rename = "type")]
    pub title_type: Option<String>,
    pub min_rating: Option<String>,
    pub max_rating: Option<String>,
    pub director: Option<String>,
    pub actor: Option<String>,
    pub sort: Option<String>,
    pub page: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Clause {
    /// Case-insensitive literal substring of the primary title.
    TitleContains(String),
    YearIs(i32),
    YearBetween { from: Option<i32>, to: Option<i32> },
    TypeIs(String),
    GenreAnyOf(Vec<String>),
    RatingPercentBetween { min: Option<f64>, max: Option<f64> },
    DirectorNameContains(String),
    ActorNameContains(String),
}

/// Conjunction of clauses; an empty filter matches everything.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MovieFilter {
    clauses: Vec<Clause>,
}

impl MovieFilter {
    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn and(&mut self, clause: Clause) {
        self.clauses.push(clause);
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortField {
    RatingPercent,
    YearStart,
    TitlePrimary,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SortKey {
    pub field: SortField,
    pub direction: Direction,
}

impl SortKey {
    pub const fn new(field: SortField, direction: Direction) -> Self {
        Self { field, direction }
    }
}

pub const DEFAULT_SORT: [SortKey; 2] = [
    SortKey::new(SortField::RatingPercent, Direction::Desc),
    SortKey::new(SortField::YearStart, Direction::Desc),
];

pub fn sort_for(key: Option<&str>) -> Vec<SortKey> {
    use Direction::*;
    use SortField::*;

    let single = match key.map(str::trim) {
        Some("rating_desc") => SortKey::new(RatingPercent, Desc),
        Some("rating_asc") => SortKey::new(RatingPercent, Asc),
        Some("year_desc") => SortKey::new(YearStart, Desc),
        Some("year_asc") => SortKey::new(YearStart, Asc),
        Some("title_asc") => SortKey::new(TitlePrimary, Asc),
        Some("title_desc") => SortKey::new(TitlePrimary, Desc),
        _ => return DEFAULT_SORT.to_vec(),
    };
    vec![single]
}

#[derive(Clone, Debug, PartialEq)]
pub struct BuiltQuery {
    pub filter: MovieFilter,
    pub sort: Vec<SortKey>,
    pub page: u64,
    pub offset: u64,
    pub limit: u64,
}

fn text(raw: &Option<String>) -> Option<&str> {
    raw.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn int(raw: &Option<String>) -> Option<i32> {
    parse_optional_int(raw.as_deref()).and_then(|v| i32::try_from(v).ok())
}

pub fn build(query: &MovieQuery, config: &QueryConfig) -> BuiltQuery {
    let mut filter = MovieFilter::default();

    if let Some(needle) = text(&query.q).or_else(|| text(&query.title)) {
        filter.and(Clause::TitleContains(needle.to_string()));
    }

    if let Some(year) = int(&query.year) {
        filter.and(Clause::YearIs(year));
    } else {
        let (from, to) = (int(&query.year_from), int(&query.year_to));
        if from.is_some() || to.is_some() {
            filter.and(Clause::YearBetween { from, to });
        }
    }

    if let Some(title_type) = text(&query.title_type) {
        filter.and(Clause::TypeIs(title_type.to_string()));
    }

    if let Some(genre) = text(&query.genre) {
        let mut genres: Vec<String> = Vec::new();
        for g in genre.split(',').map(str::trim).filter(|g| !g.is_empty()) {
            if !genres.iter().any(|seen| seen == g) {
                genres.push(g.to_string());
            }
        }
        if !genres.is_empty() {
            filter.and(Clause::GenreAnyOf(genres));
        }
    }

    let min = parse_optional_decimal(query.min_rating.as_deref());
    let max = parse_optional_decimal(query.max_rating.as_deref());
    if min.is_some() || max.is_some() {
        filter.and(Clause::RatingPercentBetween { min, max });
    }

    if let Some(name) = text(&query.director) {
        filter.and(Clause::DirectorNameContains(name.to_string()));
    }
    if let Some(name) = text(&query.actor) {
        filter.and(Clause::ActorNameContains(name.to_string()));
    }

    let page = int(&query.page).unwrap_or(1).max(1) as u64;
    let limit = config.page_size.max(1);

    BuiltQuery {
        filter,
        sort: sort_for(query.sort.as_deref()),
        page,
        offset: (page - 1).saturating_mul(limit),
        limit,
    }
}

pub fn total_pages(total_items: u64, page_size: u64) -> u64 {
    total_items.div_ceil(page_size.max(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: QueryConfig = QueryConfig { page_size: 24 };

    fn query(pairs: &[(&str, &str)]) -> MovieQuery {
        let value = serde_json::Value::Object(
            pairs.iter().map(|(k, v)| (k.to_string(), serde_json::Value::from(*v))).collect(),
        );
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn empty_query_uses_defaults() {
        let built = build(&MovieQuery::default(), &CONFIG);
        assert!(built.filter.is_empty());
        assert_eq!(built.sort, DEFAULT_SORT.to_vec());
        assert_eq!((built.page, built.offset, built.limit), (1, 0, 24));
    }

    #[test]
    fn rating_range_and_year_sort() {
        let built =
            build(&query(&[("minRating", "70"), ("maxRating", "90"), ("sort", "year_asc")]), &CONFIG);
        assert_eq!(built.filter.clauses(), [Clause::RatingPercentBetween {
            min: Some(70.0),
            max: Some(90.0)
        }]);
        assert_eq!(built.sort, vec![SortKey::new(SortField::YearStart, Direction::Asc)]);
    }

    #[test]
    fn unknown_sort_falls_back_to_rating_then_year() {
        let built = build(&query(&[("sort", "popularity")]), &CONFIG);
        assert_eq!(built.sort, vec![
            SortKey::new(SortField::RatingPercent, Direction::Desc),
            SortKey::new(SortField::YearStart, Direction::Desc),
        ]);
    }

    #[test]
    fn every_sort_key_maps() {
        for (key, field, direction) in [
            ("rating_desc", SortField::RatingPercent, Direction::Desc),
            ("rating_asc", SortField::RatingPercent, Direction::Asc),
            ("year_desc", SortField::YearStart, Direction::Desc),
            ("year_asc", SortField::YearStart, Direction::Asc),
            ("title_asc", SortField::TitlePrimary, Direction::Asc),
            ("title_desc", SortField::TitlePrimary, Direction::Desc),
        ] {
            assert_eq!(sort_for(Some(key)), vec![SortKey::new(field, direction)], "{key}");
        }
    }

    #[test]
    fn pages_clamp_to_one() {
        assert_eq!(build(&query(&[("page", "3")]), &CONFIG).offset, 48);
        for page in ["0", "-2", "abc", ""] {
            let built = build(&query(&[("page", page)]), &CONFIG);
            assert_eq!((built.page, built.offset), (1, 0), "page={page}");
        }
    }

    #[test]
    fn q_wins_over_title() {
        let built = build(&query(&[("q", "matrix"), ("title", "heat")]), &CONFIG);
        assert_eq!(built.filter.clauses(), [Clause::TitleContains("matrix".into())]);

        let built = build(&query(&[("q", "  "), ("title", "heat")]), &CONFIG);
        assert_eq!(built.filter.clauses(), [Clause::TitleContains("heat".into())]);
    }

    #[test]
    fn exact_year_beats_range() {
        let built = build(&query(&[("year", "1999"), ("yearFrom", "1990")]), &CONFIG);
        assert_eq!(built.filter.clauses(), [Clause::YearIs(1999)]);

        let built = build(&query(&[("year", "nineteen"), ("yearTo", "2000")]), &CONFIG);
        assert_eq!(built.filter.clauses(), [Clause::YearBetween { from: None, to: Some(2000) }]);
    }

    #[test]
    fn genres_split_and_trim() {
        let built = build(&query(&[("genre", "Action, Sci-Fi,,Action")]), &CONFIG);
        assert_eq!(built.filter.clauses(), [Clause::GenreAnyOf(vec![
            "Action".into(),
            "Sci-Fi".into()
        ])]);

        assert!(build(&query(&[("genre", " , ")]), &CONFIG).filter.is_empty());
    }

    #[test]
    fn malformed_numbers_are_ignored() {
        let built = build(
            &query(&[("minRating", "high"), ("maxRating", "80"), ("yearFrom", "x"), ("yearTo", "y")]),
            &CONFIG,
        );
        assert_eq!(built.filter.clauses(), [Clause::RatingPercentBetween {
            min: None,
            max: Some(80.0)
        }]);
    }

    #[test]
    fn all_filters_are_anded() {
        let built = build(
            &query(&[
                ("title", "Se7en (1995)"),
                ("type", "movie"),
                ("director", "Fincher"),
                ("actor", "Pitt"),
            ]),
            &CONFIG,
        );
        assert_eq!(built.filter.clauses(), [
            Clause::TitleContains("Se7en (1995)".into()),
            Clause::TypeIs("movie".into()),
            Clause::DirectorNameContains("Fincher".into()),
            Clause::ActorNameContains("Pitt".into()),
        ]);
    }

    #[test]
    fn total_pages_rounds_up() {
        assert_eq!(total_pages(0, 24), 0);
        assert_eq!(total_pages(24, 24), 1);
        assert_eq!(total_pages(25, 24), 2);
    }
}

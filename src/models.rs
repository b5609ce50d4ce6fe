use serde::{Deserialize, Serialize};

pub const MAX_ACTORS: usize = 30;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TitleType {
    Movie,
    Short,
    TvMovie,
    TvSeries,
}

impl TitleType {
    pub const ALL: [TitleType; 4] =
        [TitleType::Movie, TitleType::Short, TitleType::TvMovie, TitleType::TvSeries];

    pub fn as_str(self) -> &'static str {
        match self {
            TitleType::Movie => "movie",
            TitleType::Short => "short",
            TitleType::TvMovie => "tvMovie",
            TitleType::TvSeries => "tvSeries",
        }
    }

    pub fn from_source(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == raw.trim())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MovieTitle {
    pub primary: String,
    pub original: Option<String>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearSpan {
    pub start: Option<i32>,
    pub end: Option<i32>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    pub average10: Option<f64>,
    pub percent: Option<f64>,
    pub votes: i64,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PersonRef {
    pub id: String,
    pub name: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Crew {
    pub directors: Vec<PersonRef>,
    pub writers: Vec<PersonRef>,
    pub actors: Vec<PersonRef>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Links {
    pub imdb: String,
}

/// The denormalized, self-contained record for one title.
///
/// `tconst` is the storage key; it is never part of the serialized record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Movie {
    #[serde(default, skip_serializing)]
    pub tconst: String,
    pub title: MovieTitle,
    #[serde(rename = "type")]
    pub title_type: TitleType,
    #[serde(default)]
    pub is_adult: bool,
    pub year: YearSpan,
    pub runtime_minutes: Option<i32>,
    #[serde(default)]
    pub genres: Vec<String>,
    pub rating: Rating,
    pub crew: Crew,
    pub links: Links,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoviePage {
    pub page: u64,
    pub page_size: u64,
    pub total_pages: u64,
    pub total_items: u64,
    pub items: Vec<Movie>,
}

use crate::{
    joins::JoinedTitle,
    models::{Crew, Links, Movie, MovieTitle, Rating, TitleType, YearSpan},
    normalize::{parse_bool_flag, parse_id_list, parse_optional_int, parse_optional_text},
};

const IMDB_TITLE_URL: &str = "https://www.imdb.com/title/";

pub fn imdb_link(tconst: &str) -> String {
    format!("{IMDB_TITLE_URL}{tconst}/")
}

/// `average10 × 10` rounded to one decimal place.
pub fn rating_percent(average10: f64) -> f64 {
    (average10 * 100.0).round() / 10.0
}

/// Builds the final record, or `None` when the row lacks an id, an in-scope
/// title type, or a primary title.
pub fn assemble(joined: JoinedTitle<'_>) -> Option<Movie> {
    let row = joined.title;

    let tconst = parse_optional_text(Some(row.tconst.as_str()))?;
    let title_type = row.title_type.as_deref().and_then(TitleType::from_source)?;
    let primary = parse_optional_text(row.primary_title.as_deref())?;

    let int_of = |raw: Option<&str>| parse_optional_int(raw).and_then(|v| i32::try_from(v).ok());

    let average10 = joined.rating.average10;

    Some(Movie {
        links: Links { imdb: imdb_link(&tconst) },
        tconst,
        title: MovieTitle { primary, original: parse_optional_text(row.original_title.as_deref()) },
        title_type,
        is_adult: parse_bool_flag(row.is_adult.as_deref()),
        year: YearSpan {
            start: int_of(row.start_year.as_deref()),
            end: int_of(row.end_year.as_deref()),
        },
        runtime_minutes: int_of(row.runtime_minutes.as_deref()),
        genres: parse_id_list(row.genres.as_deref()),
        rating: Rating {
            average10,
            percent: average10.map(rating_percent),
            votes: joined.rating.votes,
        },
        crew: Crew { directors: joined.directors, writers: joined.writers, actors: joined.actors },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        entities::title_ratings,
        joins::{SourceBatch, fixtures::*},
        models::PersonRef,
    };

    #[test]
    fn percent_is_rounded_to_one_decimal() {
        assert_eq!(rating_percent(7.3), 73.0);
        assert_eq!(rating_percent(8.65), 86.5);
        assert_eq!(rating_percent(10.0), 100.0);
        assert_eq!(rating_percent(0.0), 0.0);
    }

    #[test]
    fn carmencita_without_rating_or_crew() {
        let mut batch = batch_with_people(&[("nm1588970", "Carmencita")]);
        let mut row = title("tt0000001", "Carmencita");
        row.title_type = Some("short".into());
        row.start_year = Some("1894".into());
        row.runtime_minutes = Some("1".into());
        row.genres = Some("Documentary,Short".into());
        batch.titles.push(row);
        batch
            .principals
            .insert("tt0000001".into(), vec![principal("tt0000001", 1, "nm1588970", "actor")]);

        let movie = assemble(batch.join(&batch.titles[0])).unwrap();
        assert_eq!(movie.tconst, "tt0000001");
        assert_eq!(movie.title_type, TitleType::Short);
        assert_eq!(movie.year, YearSpan { start: Some(1894), end: None });
        assert_eq!(movie.rating, Rating { average10: None, percent: None, votes: 0 });
        assert!(movie.crew.directors.is_empty());
        assert!(movie.crew.writers.is_empty());
        assert_eq!(
            movie.crew.actors,
            vec![PersonRef { id: "nm1588970".into(), name: "Carmencita".into() }]
        );
        assert_eq!(movie.links.imdb, "https://www.imdb.com/title/tt0000001/");
    }

    #[test]
    fn percent_tracks_average() {
        let mut batch = SourceBatch::default();
        batch.titles.push(title("tt1", "Rated"));
        batch.ratings.insert(
            "tt1".into(),
            title_ratings::Model {
                tconst: "tt1".into(),
                average_rating: Some("7.3".into()),
                num_votes: Some("1200".into()),
            },
        );

        let movie = assemble(batch.join(&batch.titles[0])).unwrap();
        assert_eq!(movie.rating, Rating { average10: Some(7.3), percent: Some(73.0), votes: 1200 });
    }

    #[test]
    fn sentinel_genres_become_empty() {
        let mut batch = SourceBatch::default();
        for (id, genres) in [("tt1", Some("\\N")), ("tt2", Some("")), ("tt3", None)] {
            let mut row = title(id, "Untagged");
            row.genres = genres.map(str::to_string);
            batch.titles.push(row);
        }

        for joined in batch.join_all() {
            let movie = assemble(joined).unwrap();
            assert!(movie.genres.is_empty(), "{} kept genres", movie.tconst);
        }
    }

    #[test]
    fn rows_missing_required_fields_are_filtered() {
        let mut batch = SourceBatch::default();
        let mut episode = title("tt1", "Pilot");
        episode.title_type = Some("tvEpisode".into());
        let mut untitled = title("tt2", "x");
        untitled.primary_title = Some("\\N".into());
        let mut no_type = title("tt3", "y");
        no_type.title_type = None;
        batch.titles.extend([episode, untitled, no_type, title("tt4", "Kept")]);

        let kept: Vec<_> = batch.join_all().filter_map(assemble).map(|m| m.tconst).collect();
        assert_eq!(kept, ["tt4"]);
    }

    #[test]
    fn adult_flag_and_original_title() {
        let mut batch = SourceBatch::default();
        let mut row = title("tt1", "Primary");
        row.is_adult = Some("1".into());
        row.original_title = Some("\\N".into());
        batch.titles.push(row);

        let movie = assemble(batch.join(&batch.titles[0])).unwrap();
        assert!(movie.is_adult);
        assert_eq!(movie.title.original, None);
    }
}

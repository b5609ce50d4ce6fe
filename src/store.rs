use async_trait::async_trait;
use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, EntityTrait, Order, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Select, Set, TransactionTrait,
    sea_query::{Expr, LikeExpr, OnConflict, Query, SimpleExpr},
};

use crate::{
    db,
    entities::{movie_credits, movie_genres, movies},
    error::AppResult,
    models::{Movie, PersonRef},
    query::{Clause, Direction, MovieFilter, SortField, SortKey},
};

const DIRECTOR: &str = "director";
const WRITER: &str = "writer";
const ACTOR: &str = "actor";

#[async_trait]
pub trait MovieWriter: Send + Sync {
    /// Inserts the record or replaces the stored one with the same id. The
    /// record is written atomically.
    async fn upsert_movie(&self, movie: &Movie) -> AppResult<()>;

    /// Creates the query index set if missing. Safe to call repeatedly.
    async fn ensure_indexes(&self) -> AppResult<()>;
}

#[async_trait]
pub trait MovieReader: Send + Sync {
    async fn count(&self, filter: &MovieFilter) -> AppResult<u64>;

    async fn fetch(
        &self,
        filter: &MovieFilter,
        sort: &[SortKey],
        offset: u64,
        limit: u64,
    ) -> AppResult<Vec<Movie>>;

    async fn find_by_id(&self, tconst: &str) -> AppResult<Option<Movie>>;
}

#[derive(Clone)]
pub struct MovieStore {
    db: DatabaseConnection,
}

impl MovieStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn select(&self, filter: &MovieFilter) -> Select<movies::Entity> {
        movies::Entity::find().filter(condition_for(filter))
    }
}

#[async_trait]
impl MovieWriter for MovieStore {
    async fn upsert_movie(&self, movie: &Movie) -> AppResult<()> {
        let document = serde_json::to_string(movie)?;
        let model = movies::ActiveModel {
            tconst: Set(movie.tconst.clone()),
            title_primary: Set(movie.title.primary.clone()),
            title_primary_lower: Set(movie.title.primary.to_lowercase()),
            title_type: Set(movie.title_type.as_str().to_string()),
            year_start: Set(movie.year.start),
            rating_percent: Set(movie.rating.percent),
            document: Set(document),
        };

        let genres: Vec<movie_genres::ActiveModel> = movie
            .genres
            .iter()
            .enumerate()
            .map(|(position, genre)| movie_genres::ActiveModel {
                tconst: Set(movie.tconst.clone()),
                position: Set(position as i32),
                genre: Set(genre.clone()),
            })
            .collect();

        let credits: Vec<movie_credits::ActiveModel> = [
            (DIRECTOR, &movie.crew.directors),
            (WRITER, &movie.crew.writers),
            (ACTOR, &movie.crew.actors),
        ]
        .into_iter()
        .flat_map(|(role, people)| {
            people.iter().enumerate().map(move |(position, person)| credit(movie, role, position, person))
        })
        .collect();

        let txn = self.db.begin().await?;

        movies::Entity::insert(model)
            .on_conflict(
                OnConflict::column(movies::Column::Tconst)
                    .update_columns([
                        movies::Column::TitlePrimary,
                        movies::Column::TitlePrimaryLower,
                        movies::Column::TitleType,
                        movies::Column::YearStart,
                        movies::Column::RatingPercent,
                        movies::Column::Document,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(&txn)
            .await?;

        movie_genres::Entity::delete_many()
            .filter(movie_genres::Column::Tconst.eq(movie.tconst.as_str()))
            .exec(&txn)
            .await?;
        if !genres.is_empty() {
            movie_genres::Entity::insert_many(genres).exec_without_returning(&txn).await?;
        }

        movie_credits::Entity::delete_many()
            .filter(movie_credits::Column::Tconst.eq(movie.tconst.as_str()))
            .exec(&txn)
            .await?;
        if !credits.is_empty() {
            movie_credits::Entity::insert_many(credits).exec_without_returning(&txn).await?;
        }

        txn.commit().await?;

        Ok(())
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        db::run_sql(&self.db, db::MOVIE_INDEXES).await
    }
}

#[async_trait]
impl MovieReader for MovieStore {
    async fn count(&self, filter: &MovieFilter) -> AppResult<u64> {
        Ok(self.select(filter).count(&self.db).await?)
    }

    async fn fetch(
        &self,
        filter: &MovieFilter,
        sort: &[SortKey],
        offset: u64,
        limit: u64,
    ) -> AppResult<Vec<Movie>> {
        let mut select = self.select(filter);
        for key in sort {
            select = select.order_by(sort_column(key.field), sort_order(key.direction));
        }
        // ties keep a fixed order across pages
        let rows = select
            .order_by_asc(movies::Column::Tconst)
            .offset(offset)
            .limit(limit)
            .all(&self.db)
            .await?;

        rows.into_iter().map(decode).collect()
    }

    async fn find_by_id(&self, tconst: &str) -> AppResult<Option<Movie>> {
        let row = movies::Entity::find_by_id(tconst.to_string()).one(&self.db).await?;
        row.map(decode).transpose()
    }
}

fn credit(movie: &Movie, role: &str, position: usize, person: &PersonRef) -> movie_credits::ActiveModel {
    movie_credits::ActiveModel {
        tconst: Set(movie.tconst.clone()),
        role: Set(role.to_string()),
        position: Set(position as i32),
        nconst: Set(person.id.clone()),
        name: Set(person.name.clone()),
        name_lower: Set(person.name.to_lowercase()),
    }
}

fn decode(row: movies::Model) -> AppResult<Movie> {
    let mut movie: Movie = serde_json::from_str(&row.document)?;
    movie.tconst = row.tconst;
    Ok(movie)
}

fn sort_column(field: SortField) -> movies::Column {
    match field {
        SortField::RatingPercent => movies::Column::RatingPercent,
        SortField::YearStart => movies::Column::YearStart,
        SortField::TitlePrimary => movies::Column::TitlePrimary,
    }
}

fn sort_order(direction: Direction) -> Order {
    match direction {
        Direction::Asc => Order::Asc,
        Direction::Desc => Order::Desc,
    }
}

/// Escapes LIKE wildcards so `text` only ever matches itself.
pub fn escape_like(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Substring pattern for the `_lower` projections.
fn contains(text: &str) -> LikeExpr {
    LikeExpr::new(format!("%{}%", escape_like(&text.to_lowercase()))).escape('\\')
}

fn bounded<V: Into<sea_orm::Value>>(column: movies::Column, min: Option<V>, max: Option<V>) -> Condition {
    let mut cond = Condition::all();
    if let Some(min) = min {
        cond = cond.add(column.gte(min));
    }
    if let Some(max) = max {
        cond = cond.add(column.lte(max));
    }
    cond
}

fn credit_name_contains(role: &str, text: &str) -> SimpleExpr {
    Expr::exists(
        Query::select()
            .expr(Expr::val(1))
            .from(movie_credits::Entity)
            .and_where(
                Expr::col((movie_credits::Entity, movie_credits::Column::Tconst))
                    .equals((movies::Entity, movies::Column::Tconst)),
            )
            .and_where(Expr::col((movie_credits::Entity, movie_credits::Column::Role)).eq(role))
            .and_where(Expr::col((movie_credits::Entity, movie_credits::Column::NameLower)).like(contains(text)))
            .to_owned(),
    )
}

fn genre_any_of(genres: &[String]) -> SimpleExpr {
    Expr::exists(
        Query::select()
            .expr(Expr::val(1))
            .from(movie_genres::Entity)
            .and_where(
                Expr::col((movie_genres::Entity, movie_genres::Column::Tconst))
                    .equals((movies::Entity, movies::Column::Tconst)),
            )
            .and_where(
                Expr::col((movie_genres::Entity, movie_genres::Column::Genre)).is_in(genres.iter().cloned()),
            )
            .to_owned(),
    )
}

fn condition_for(filter: &MovieFilter) -> Condition {
    filter.clauses().iter().fold(Condition::all(), |cond, clause| {
        match clause {
            Clause::TitleContains(text) => cond.add(
                Expr::col((movies::Entity, movies::Column::TitlePrimaryLower)).like(contains(text)),
            ),
            Clause::YearIs(year) => cond.add(movies::Column::YearStart.eq(*year)),
            Clause::YearBetween { from, to } => cond.add(bounded(movies::Column::YearStart, *from, *to)),
            Clause::TypeIs(title_type) => cond.add(movies::Column::TitleType.eq(title_type.as_str())),
            Clause::GenreAnyOf(genres) => cond.add(genre_any_of(genres)),
            Clause::RatingPercentBetween { min, max } => {
                cond.add(bounded(movies::Column::RatingPercent, *min, *max))
            },
            Clause::DirectorNameContains(name) => cond.add(credit_name_contains(DIRECTOR, name)),
            Clause::ActorNameContains(name) => cond.add(credit_name_contains(ACTOR, name)),
        }
    })
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::{
        assemble::{imdb_link, rating_percent},
        models::{Crew, Links, Movie, MovieTitle, PersonRef, Rating, TitleType, YearSpan},
    };

    pub fn movie(tconst: &str, primary: &str, year: Option<i32>, average10: Option<f64>) -> Movie {
        Movie {
            tconst: tconst.into(),
            title: MovieTitle { primary: primary.into(), original: Some(primary.into()) },
            title_type: TitleType::Movie,
            is_adult: false,
            year: YearSpan { start: year, end: None },
            runtime_minutes: Some(120),
            genres: vec!["Drama".into()],
            rating: Rating {
                average10,
                percent: average10.map(rating_percent),
                votes: if average10.is_some() { 1000 } else { 0 },
            },
            crew: Crew::default(),
            links: Links { imdb: imdb_link(tconst) },
        }
    }

    pub fn person(id: &str, name: &str) -> PersonRef {
        PersonRef { id: id.into(), name: name.into() }
    }
}

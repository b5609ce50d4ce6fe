use std::collections::{HashMap, HashSet};

use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect};
use tracing::debug;

use crate::{
    entities::{name_basics, title_basics, title_crew, title_principals, title_ratings},
    error::AppResult,
    joins::{SourceBatch, is_cast_category},
    models::TitleType,
    normalize::parse_id_list,
};

const PEOPLE_CHUNK: usize = 500;

/// Reads the loaded source relations one keyset page of titles at a time.
#[derive(Clone)]
pub struct SourceCatalog {
    db: DatabaseConnection,
}

impl SourceCatalog {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Loads up to `limit` in-scope titles with ids after `after`, together
    /// with every rating, crew, principal and person row they reference.
    /// Returns `None` once the titles are exhausted.
    pub async fn next_batch(&self, after: Option<&str>, limit: u64) -> AppResult<Option<SourceBatch>> {
        let mut select = title_basics::Entity::find()
            .filter(title_basics::Column::TitleType.is_in(TitleType::ALL.map(TitleType::as_str)));
        if let Some(after) = after {
            select = select.filter(title_basics::Column::Tconst.gt(after));
        }
        let titles = select.order_by_asc(title_basics::Column::Tconst).limit(limit).all(&self.db).await?;

        if titles.is_empty() {
            return Ok(None);
        }

        let ids: Vec<&str> = titles.iter().map(|t| t.tconst.as_str()).collect();

        let ratings: HashMap<String, title_ratings::Model> = title_ratings::Entity::find()
            .filter(title_ratings::Column::Tconst.is_in(ids.iter().copied()))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|row| (row.tconst.clone(), row))
            .collect();

        let crew: HashMap<String, title_crew::Model> = title_crew::Entity::find()
            .filter(title_crew::Column::Tconst.is_in(ids.iter().copied()))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|row| (row.tconst.clone(), row))
            .collect();

        let mut principals: HashMap<String, Vec<title_principals::Model>> = HashMap::new();
        for row in title_principals::Entity::find()
            .filter(title_principals::Column::Tconst.is_in(ids.iter().copied()))
            .order_by_asc(title_principals::Column::Tconst)
            .order_by_asc(title_principals::Column::Ordering)
            .all(&self.db)
            .await?
        {
            principals.entry(row.tconst.clone()).or_default().push(row);
        }

        let mut person_ids: HashSet<String> = HashSet::new();
        for row in crew.values() {
            person_ids.extend(parse_id_list(row.directors.as_deref()));
            person_ids.extend(parse_id_list(row.writers.as_deref()));
        }
        person_ids.extend(
            principals
                .values()
                .flatten()
                .filter(|p| is_cast_category(p.category.as_deref()))
                .map(|p| p.nconst.clone()),
        );

        let person_ids: Vec<String> = person_ids.into_iter().collect();
        let mut people = HashMap::with_capacity(person_ids.len());
        for chunk in person_ids.chunks(PEOPLE_CHUNK) {
            let rows = name_basics::Entity::find()
                .filter(name_basics::Column::Nconst.is_in(chunk.iter().cloned()))
                .all(&self.db)
                .await?;
            people.extend(rows.into_iter().map(|row| (row.nconst.clone(), row)));
        }

        debug!(
            titles = titles.len(),
            ratings = ratings.len(),
            crew = crew.len(),
            people = people.len(),
            first = %titles[0].tconst,
            "loaded source batch"
        );

        Ok(Some(SourceBatch { titles, ratings, crew, principals, people }))
    }
}

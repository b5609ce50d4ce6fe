use sea_orm::entity::prelude::*;

/// Flattened crew entry; `role` is one of `director`, `writer`, `actor`.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "movie_credits")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub tconst: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub role: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub position: i32,
    pub nconst: String,
    pub name: String,
    pub name_lower: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

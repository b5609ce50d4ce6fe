use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "title_basics")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub tconst: String,
    pub title_type: Option<String>,
    pub primary_title: Option<String>,
    pub original_title: Option<String>,
    pub is_adult: Option<String>,
    pub start_year: Option<String>,
    pub end_year: Option<String>,
    pub runtime_minutes: Option<String>,
    pub genres: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "title_crew")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub tconst: String,
    pub directors: Option<String>,
    pub writers: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

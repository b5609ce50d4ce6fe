use sea_orm::entity::prelude::*;

/// One denormalized movie. `document` holds the serialized record; the other
/// columns are projections used for filtering and sorting. The `_lower`
/// projection is folded with Unicode lowercasing since SQLite `LIKE` only
/// folds ASCII.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "movies")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub tconst: String,
    pub title_primary: String,
    pub title_primary_lower: String,
    pub title_type: String,
    pub year_start: Option<i32>,
    pub rating_percent: Option<f64>,
    pub document: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

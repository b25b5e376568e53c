use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "kaizen_suggestions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    #[sea_orm(unique)]
    pub job_id: String,
    #[sea_orm(column_type = "Text")]
    pub transcript: String,
    #[sea_orm(column_type = "Text")]
    pub summary: String,
    pub lean_category: String,
    pub suggestion_level: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub reasoning: Option<String>,
    pub location: Option<String>,
    pub shift: Option<String>,
    pub associate_name: Option<String>,
    pub timestamp: DateTimeUtc,
    pub status: String,
    pub last_updated: Option<DateTimeUtc>,
    pub audio_key: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

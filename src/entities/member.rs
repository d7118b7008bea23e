use sea_orm::entity::prelude::*;

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "members")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    pub instrument: String,

    #[sea_orm(has_many)]
    pub personal_logs: HasMany<super::personal_log::Entity>,
}

impl ActiveModelBehavior for ActiveModel {}

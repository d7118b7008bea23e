use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table("song_suggestions")
                    .if_not_exists()
                    .col(pk_auto("id"))
                    .col(string_len("title", 200).not_null())
                    .col(string_len("artist", 200).not_null())
                    .col(string_len("link", 500).not_null())
                    .col(integer("thumbs_up").not_null().default(0))
                    .col(integer("thumbs_down").not_null().default(0))
                    .col(timestamp("created_at").not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table("song_suggestions").to_owned())
            .await
    }
}

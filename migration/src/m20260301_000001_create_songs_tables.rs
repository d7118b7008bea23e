use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table("songs")
                    .if_not_exists()
                    .col(
                        ColumnDef::new("id")
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new("title").string_len(100).not_null())
                    .col(ColumnDef::new("artist").string_len(100).not_null())
                    .col(
                        ColumnDef::new("status")
                            .string_len(20)
                            .not_null()
                            .default("Practice"),
                    )
                    .col(ColumnDef::new("lyrics").text())
                    .col(ColumnDef::new("chords").text())
                    .col(ColumnDef::new("link").string_len(200))
                    .col(ColumnDef::new("memo").text())
                    .col(ColumnDef::new("genre").string_len(50))
                    .col(ColumnDef::new("difficulty").integer().not_null().default(3))
                    .col(ColumnDef::new("sheet_music").string_len(200))
                    .col(ColumnDef::new("created_at").timestamp().not_null())
                    .col(ColumnDef::new("updated_at").timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        // Uploaded files attached to a song
        manager
            .create_table(
                Table::create()
                    .table("media")
                    .if_not_exists()
                    .col(
                        ColumnDef::new("id")
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new("song_id").integer().not_null())
                    .col(ColumnDef::new("filename").string_len(255).not_null())
                    .col(ColumnDef::new("original_filename").string_len(255).not_null())
                    .col(ColumnDef::new("file_type").string_len(20).not_null())
                    .col(ColumnDef::new("file_size").big_integer().not_null())
                    .col(ColumnDef::new("created_at").timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_media_song_id")
                            .from("media", "song_id")
                            .to("songs", "id")
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table("practice_logs")
                    .if_not_exists()
                    .col(
                        ColumnDef::new("id")
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new("song_id").integer().not_null())
                    .col(ColumnDef::new("date").timestamp().not_null())
                    .col(ColumnDef::new("content").text())
                    .col(ColumnDef::new("feedback").text())
                    .col(ColumnDef::new("recording").string_len(255))
                    .col(ColumnDef::new("created_at").timestamp().not_null())
                    .col(ColumnDef::new("updated_at").timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_practice_logs_song_id")
                            .from("practice_logs", "song_id")
                            .to("songs", "id")
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_practice_logs_song_id_date")
                    .table("practice_logs")
                    .col("song_id")
                    .col("date")
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop tables in reverse order
        manager
            .drop_table(Table::drop().table("practice_logs").to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table("media").to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table("songs").to_owned())
            .await?;

        Ok(())
    }
}

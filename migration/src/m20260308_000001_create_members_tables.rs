use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table("members")
                    .if_not_exists()
                    .col(
                        ColumnDef::new("id")
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new("name").string_len(100).not_null())
                    .col(ColumnDef::new("instrument").string_len(100).not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table("personal_logs")
                    .if_not_exists()
                    .col(
                        ColumnDef::new("id")
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new("member_id").integer().not_null())
                    .col(ColumnDef::new("title").string_len(200).not_null())
                    .col(ColumnDef::new("filename").string_len(255).not_null())
                    .col(ColumnDef::new("original_filename").string_len(255).not_null())
                    .col(ColumnDef::new("file_type").string_len(20).not_null())
                    .col(ColumnDef::new("created_at").timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_personal_logs_member_id")
                            .from("personal_logs", "member_id")
                            .to("members", "id")
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table("personal_logs").to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table("members").to_owned())
            .await?;

        Ok(())
    }
}

pub use sea_orm_migration::prelude::*;

mod m20260301_000001_create_songs_tables;
mod m20260308_000001_create_members_tables;
mod m20260315_000001_create_song_suggestions_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260301_000001_create_songs_tables::Migration),
            Box::new(m20260308_000001_create_members_tables::Migration),
            Box::new(m20260315_000001_create_song_suggestions_table::Migration),
        ]
    }
}

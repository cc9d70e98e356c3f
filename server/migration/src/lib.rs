pub use sea_orm_migration::prelude::*;

mod m20241020_101500_create_tables;
mod m20241027_184210_round_number_index;
mod m20241103_120000_player_result_team;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20241020_101500_create_tables::Migration),
            Box::new(m20241027_184210_round_number_index::Migration),
            Box::new(m20241103_120000_player_result_team::Migration),
        ]
    }
}

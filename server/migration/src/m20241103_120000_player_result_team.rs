use mtt_db::{player_results, prelude::*};
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

const INDEX_NAME: &str = "idx-player_results-team_id";

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, m: &SchemaManager) -> Result<(), DbErr> {
        // Databases created after the column was added already have it.
        if m.has_column("player_results", "team_id").await? {
            return Ok(());
        }
        m.alter_table(
            Table::alter()
                .table(PlayerResults)
                .add_column(
                    ColumnDef::new(player_results::Column::TeamId)
                        .big_integer()
                        .not_null()
                        .default(0),
                )
                .to_owned(),
        )
        .await?;
        // Older results only know the players' current teams.
        m.get_connection()
            .execute_unprepared(
                "UPDATE player_results SET team_id = \
                 (SELECT team_id FROM players WHERE players.id = player_results.player_id) \
                 WHERE EXISTS \
                 (SELECT 1 FROM players WHERE players.id = player_results.player_id \
                 AND players.team_id IS NOT NULL)",
            )
            .await?;
        m.create_index(
            Index::create()
                .name(INDEX_NAME)
                .if_not_exists()
                .table(PlayerResults)
                .col(player_results::Column::TeamId)
                .to_owned(),
        )
        .await
    }

    async fn down(&self, m: &SchemaManager) -> Result<(), DbErr> {
        m.drop_index(Index::drop().name(INDEX_NAME).table(PlayerResults).to_owned())
            .await?;
        m.alter_table(
            Table::alter()
                .table(PlayerResults)
                .drop_column(player_results::Column::TeamId)
                .to_owned(),
        )
        .await
    }
}

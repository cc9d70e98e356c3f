use mtt_db::{prelude::*, rounds};
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, m: &SchemaManager) -> Result<(), DbErr> {
        let mut round_number_index = Index::create();
        round_number_index
            .name("tournament-id-round-number-index")
            .if_not_exists()
            .unique()
            .table(Rounds)
            .col(rounds::Column::TournamentId)
            .col(rounds::Column::Number);
        m.create_index(round_number_index).await?;
        Ok(())
    }

    async fn down(&self, m: &SchemaManager) -> Result<(), DbErr> {
        m.drop_index(
            Index::drop()
                .name("tournament-id-round-number-index")
                .table(Rounds)
                .to_owned(),
        )
        .await
    }
}

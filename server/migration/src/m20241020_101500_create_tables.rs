use mtt_db::{common, players, prelude::*, tables, teams, tournaments};
use sea_orm::entity::prelude::TimeDateTimeWithTimeZone;
use sea_orm::{EntityTrait, Set};
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

fn idx<E: EntityTrait>(s: &sea_orm::Schema, e: E) -> Vec<IndexCreateStatement> {
    s.create_index_from_entity(e)
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, m: &SchemaManager) -> Result<(), DbErr> {
        let s = sea_orm::Schema::new(m.get_database_backend());
        m.create_table(s.create_table_from_entity(Tournaments)).await?;
        m.create_table(s.create_table_from_entity(Teams)).await?;
        m.create_table(s.create_table_from_entity(Players)).await?;
        m.create_table(s.create_table_from_entity(Tables)).await?;
        m.create_table(s.create_table_from_entity(Rounds)).await?;
        m.create_table(s.create_table_from_entity(Matches)).await?;
        m.create_table(s.create_table_from_entity(TeamResults)).await?;
        m.create_table(s.create_table_from_entity(PlayerResults))
            .await?;
        let s = &s;
        let all_idx = [
            idx(s, Tournaments),
            idx(s, Teams),
            idx(s, Players),
            idx(s, Tables),
            idx(s, Rounds),
            idx(s, Matches),
            idx(s, TeamResults),
            idx(s, PlayerResults),
        ]
        .into_iter()
        .flatten();
        for i in all_idx {
            m.create_index(i).await?;
        }
        if std::env::var("MTT_POPULATE_DATABASE").is_ok() {
            populate_database(m).await?;
        }
        Ok(())
    }

    async fn down(&self, m: &SchemaManager) -> Result<(), DbErr> {
        m.drop_table(Table::drop().table(PlayerResults).if_exists().to_owned())
            .await
            .inspect_err(log_err("drop player_results"))?;
        m.drop_table(Table::drop().table(TeamResults).if_exists().to_owned())
            .await
            .inspect_err(log_err("drop team_results"))?;
        m.drop_table(Table::drop().table(Matches).if_exists().to_owned())
            .await
            .inspect_err(log_err("drop matches"))?;
        m.drop_table(Table::drop().table(Rounds).if_exists().to_owned())
            .await
            .inspect_err(log_err("drop rounds"))?;
        m.drop_table(Table::drop().table(Tables).if_exists().to_owned())
            .await
            .inspect_err(log_err("drop tables"))?;
        m.drop_table(Table::drop().table(Players).if_exists().to_owned())
            .await
            .inspect_err(log_err("drop players"))?;
        m.drop_table(Table::drop().table(Teams).if_exists().to_owned())
            .await
            .inspect_err(log_err("drop teams"))?;
        m.drop_table(Table::drop().table(Tournaments).if_exists().to_owned())
            .await
            .inspect_err(log_err("drop tournaments"))?;
        Ok(())
    }
}

fn log_err<'a>(ctx: &'a str) -> impl FnOnce(&DbErr) + 'a {
    move |e| {
        eprintln!("{ctx}: {e}");
    }
}

const DEMO_TEAMS: [&str; 6] = ["Rooks", "Knights", "Bishops", "Queens", "Kings", "Pawns"];

// A demo tournament with six teams of two players and three tables.
async fn populate_database<'a>(m: &'a SchemaManager<'a>) -> Result<(), DbErr> {
    let db = m.get_connection();
    let tournament = tournaments::ActiveModel {
        name: Set("Demo tournament".to_owned()),
        creation_time: Set(TimeDateTimeWithTimeZone::now_utc()),
        bye_score: Set(3.0),
        default_round_visibility: Set(common::Visibility::Show),
        shown_players: Set(None),
        ..Default::default()
    };
    Tournaments::insert(tournament).exec(db).await?;
    for name in DEMO_TEAMS {
        let team = teams::ActiveModel {
            name: Set(name.to_owned()),
            active: Set(true),
            ..Default::default()
        };
        let team_id = Teams::insert(team)
            .exec(db)
            .await
            .map_err(|e| DbErr::Custom(format!("Failed to insert team {name}: {e}")))?
            .last_insert_id;
        for i in 0..2 {
            let player = players::ActiveModel {
                name: Set(format!("{name} player {}", i + 1)),
                team_id: Set(Some(team_id)),
                is_captain: Set(i == 0),
                ..Default::default()
            };
            Players::insert(player).exec(db).await?;
        }
    }
    for (i, priority) in [80, tables::DEFAULT_PRIORITY, 20].into_iter().enumerate() {
        let table = tables::ActiveModel {
            name: Set(format!("Table {}", i + 1)),
            description: Set(None),
            priority: Set(priority),
            ..Default::default()
        };
        Tables::insert(table).exec(db).await?;
    }
    Ok(())
}

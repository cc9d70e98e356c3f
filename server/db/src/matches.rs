use sea_orm::entity::prelude::*;

use crate::common::MatchType;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "matches")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(indexed)]
    pub round_id: i64,
    pub match_type: MatchType,
    // Byes never have a table.
    #[sea_orm(indexed)]
    pub table_id: Option<i64>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::rounds::Entity",
        from = "Column::RoundId",
        to = "super::rounds::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Rounds,
    #[sea_orm(
        belongs_to = "super::tables::Entity",
        from = "Column::TableId",
        to = "super::tables::Column::Id",
        on_update = "Cascade",
        on_delete = "SetNull"
    )]
    Tables,
    #[sea_orm(has_many = "super::team_results::Entity")]
    TeamResults,
    #[sea_orm(has_many = "super::player_results::Entity")]
    PlayerResults,
}

impl Related<super::rounds::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Rounds.def()
    }
}

impl Related<super::tables::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Tables.def()
    }
}

impl Related<super::team_results::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TeamResults.def()
    }
}

impl Related<super::player_results::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PlayerResults.def()
    }
}

impl Related<super::teams::Entity> for Entity {
    fn to() -> RelationDef {
        super::team_results::Relation::Teams.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::team_results::Relation::Matches.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}

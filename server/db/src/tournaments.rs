use sea_orm::entity::prelude::*;

use crate::common::Visibility;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "tournaments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    #[sea_orm(indexed)]
    pub creation_time: TimeDateTimeWithTimeZone,
    // Points credited for a bye, one decimal place.
    pub bye_score: f64,
    pub default_round_visibility: Visibility,
    // None shows all players, 0 hides the player scoreboard.
    pub shown_players: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::rounds::Entity")]
    Rounds,
}

impl Related<super::rounds::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Rounds.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

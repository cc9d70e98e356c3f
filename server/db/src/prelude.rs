pub use super::matches::Entity as Matches;
pub use super::player_results::Entity as PlayerResults;
pub use super::players::Entity as Players;
pub use super::rounds::Entity as Rounds;
pub use super::tables::Entity as Tables;
pub use super::team_results::Entity as TeamResults;
pub use super::teams::Entity as Teams;
pub use super::tournaments::Entity as Tournaments;

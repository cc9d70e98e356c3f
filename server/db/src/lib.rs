pub mod prelude;

pub mod common;
pub mod matches;
pub mod player_results;
pub mod players;
pub mod rounds;
pub mod tables;
pub mod team_results;
pub mod teams;
pub mod tournaments;

mod prelude;

pub mod get_scoreboard;
pub mod post_create_round;

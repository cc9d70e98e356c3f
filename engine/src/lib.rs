//! Round scheduling for multi-team, multi-table tournaments.
//!
//! Everything in this crate is pure: callers read a [`model::Snapshot`] from
//! their store, call [`plan::plan_round`] and persist the returned plan.

pub mod error;
pub mod matching;
pub mod model;
pub mod pairing;
pub mod plan;
pub mod score;
pub mod scoreboard;
pub mod tables;

pub use error::{Error, Result};

use std::cmp::Ordering;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::model::MatchType;
use crate::{Error, Result};

/// Standing of a team or a player. The default value is the additive identity.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Score {
    // Win fraction: 1 per win, 0.5 per draw.
    pub primary: Decimal,
    // Raw points.
    pub secondary: Decimal,
    pub num_matches: u32,
    pub match_type: MatchType,
}

const PRIMARY_FACTOR: i64 = 1000;
const SECONDARY_FACTOR: i64 = 10;

impl Score {
    pub fn single(primary: Decimal, secondary: Decimal, match_type: MatchType) -> Self {
        Score {
            primary,
            secondary,
            num_matches: 1,
            match_type,
        }
    }

    pub fn bye(bye_score: Decimal) -> Self {
        Self::single(Decimal::ONE, bye_score, MatchType::Bye)
    }

    /// Component-wise sum. The match type survives only when both sides agree;
    /// an empty side does not vote.
    pub fn accumulate(&self, other: &Score) -> Score {
        let match_type = if self.num_matches == 0 {
            other.match_type
        } else if other.num_matches == 0 || self.match_type == other.match_type {
            self.match_type
        } else {
            MatchType::Normal
        };
        Score {
            primary: self.primary + other.primary,
            secondary: self.secondary + other.secondary,
            num_matches: self.num_matches + other.num_matches,
            match_type,
        }
    }

    /// Single integer used for matching weights only; primary always dominates.
    pub fn to_int(&self) -> Result<i64> {
        let overflow = || Error::Computation(format!("Score {self:?} does not fit into an integer"));
        let primary = self
            .primary
            .checked_mul(Decimal::from(PRIMARY_FACTOR))
            .ok_or_else(overflow)?;
        let secondary = self
            .secondary
            .checked_mul(Decimal::from(SECONDARY_FACTOR))
            .ok_or_else(overflow)?;
        primary
            .checked_add(secondary)
            .ok_or_else(overflow)?
            .trunc()
            .to_i64()
            .ok_or_else(overflow)
    }
}

/// Ascending order: primary, then secondary, then fewer matches ranks higher.
pub fn compare(a: &Score, b: &Score) -> Ordering {
    compare_points(a, b).then_with(|| b.num_matches.cmp(&a.num_matches))
}

/// Like [`compare`] but ignores the number of matches played.
pub fn compare_points(a: &Score, b: &Score) -> Ordering {
    a.primary
        .cmp(&b.primary)
        .then_with(|| a.secondary.cmp(&b.secondary))
}

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;
use sea_orm::{DatabaseConnection, TransactionError, TransactionTrait};
use tokio::sync::{Mutex, OwnedMutexGuard};

use mtt_engine::model::Snapshot;
use mtt_engine::plan::{plan_round, RoundPlan};

use crate::config::RoundConfig;
use crate::error::RoundError;
use crate::store::{self, CreatedRound};

/// Serializes round creation per tournament within this process.
#[derive(Default)]
pub struct RoundLocks {
    locks: Mutex<HashMap<i64, Arc<Mutex<()>>>>,
}

impl RoundLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn lock(&self, tournament_id: i64) -> OwnedMutexGuard<()> {
        let lock = self
            .locks
            .lock()
            .await
            .entry(tournament_id)
            .or_default()
            .clone();
        lock.lock_owned().await
    }
}

/// Random source for the first round shuffle.
pub fn rng(config: &RoundConfig) -> StdRng {
    match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

async fn plan(
    snapshot: Snapshot,
    mut rng: StdRng,
    timeout: Option<Duration>,
) -> Result<RoundPlan, RoundError> {
    let Some(timeout) = timeout else {
        return Ok(plan_round(&snapshot, &mut rng)?);
    };
    let task = tokio::task::spawn_blocking(move || plan_round(&snapshot, &mut rng));
    match tokio::time::timeout(timeout, task).await {
        Err(_) => Err(RoundError::Timeout(timeout)),
        Ok(Err(join_error)) => Err(RoundError::Engine(mtt_engine::Error::Computation(
            format!("Round planning task failed: {join_error}"),
        ))),
        Ok(Ok(plan)) => Ok(plan?),
    }
}

/// Appends the next round to a tournament: reads the current state, computes
/// pairings and tables, and writes the round in one transaction. Not all
/// teams being placed is reported through `success`, not as an error.
pub async fn create_round(
    db: &DatabaseConnection,
    locks: &RoundLocks,
    tournament_id: i64,
    config: &RoundConfig,
    rng: StdRng,
) -> Result<CreatedRound, RoundError> {
    let _guard = locks.lock(tournament_id).await;
    let timeout = config.pairing_timeout;
    let created = db
        .transaction(|txn| {
            Box::pin(async move {
                let snapshot = store::load_snapshot(txn, tournament_id).await?;
                let plan = plan(snapshot.clone(), rng, timeout).await?;
                store::verify_references(txn, tournament_id, &plan).await?;
                store::persist_plan(txn, &snapshot, &plan).await
            })
        })
        .await
        .map_err(|e| match e {
            TransactionError::Connection(db_error) => RoundError::Db {
                context: format!("Round creation transaction for tournament {tournament_id} failed"),
                db_error,
            },
            TransactionError::Transaction(e) => e,
        })
        .inspect_err(|e| {
            log::error!("Failed to create a round for tournament {tournament_id}: {e}");
        })?;
    log::info!(
        "Created round {} of tournament {tournament_id} with {} matches, success={}",
        created.number,
        created.matches.len(),
        created.success
    );
    if !created.success {
        log::warn!(
            "Round {} of tournament {tournament_id} leaves teams {:?} unpaired",
            created.number,
            created.unpaired
        );
    }
    Ok(created)
}

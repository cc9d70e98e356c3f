use derive_more::Display;
use sea_orm::DbErr;

/// Failure of round creation or of the store reads it is built on.
/// Any of these rolls back the whole transaction.
#[derive(Debug, Display)]
pub enum RoundError {
    #[display(fmt = "Tournament {_0} not found")]
    TournamentNotFound(i64),

    #[display(fmt = "{_0}")]
    Engine(mtt_engine::Error),

    #[display(fmt = "Round planning did not finish within {_0:?}")]
    Timeout(std::time::Duration),

    #[display(fmt = "Data changed during round creation: {_0}")]
    StaleSnapshot(String),

    #[display(fmt = "{context}: {db_error}")]
    Db { context: String, db_error: DbErr },
}

impl std::error::Error for RoundError {}

impl From<mtt_engine::Error> for RoundError {
    fn from(e: mtt_engine::Error) -> Self {
        RoundError::Engine(e)
    }
}

pub(crate) fn db_error(context: impl Into<String>) -> impl FnOnce(DbErr) -> RoundError {
    let context = context.into();
    move |db_error| RoundError::Db { context, db_error }
}

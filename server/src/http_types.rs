use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use derive_more::Display;
use serde::Serialize;

use crate::error::RoundError;

pub type HttpResult = Result<HttpResponse, AppHttpError>;

#[derive(Debug, Display)]
pub enum AppHttpError {
    #[display(fmt = "Internal error.")]
    Internal,

    #[display(fmt = "Internal error: {_0}")]
    DetailedInternal(String),

    #[display(fmt = "Bad request: {_0}")]
    BadRequest(String),

    #[display(fmt = "Not found.")]
    NotFound,

    #[display(fmt = "Temporarily unavailable, retry: {_0}")]
    Unavailable(String),
}

impl std::error::Error for AppHttpError {}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl actix_web::error::ResponseError for AppHttpError {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorBody {
            error: self.to_string(),
        })
    }

    fn status_code(&self) -> StatusCode {
        match *self {
            AppHttpError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            AppHttpError::DetailedInternal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppHttpError::NotFound => StatusCode::NOT_FOUND,
            AppHttpError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppHttpError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl From<RoundError> for AppHttpError {
    fn from(e: RoundError) -> Self {
        match e {
            RoundError::TournamentNotFound(_) => AppHttpError::NotFound,
            RoundError::Engine(mtt_engine::Error::Validation(msg)) => AppHttpError::BadRequest(msg),
            RoundError::Engine(e @ mtt_engine::Error::Computation(_)) => {
                log::error!("{e}");
                AppHttpError::DetailedInternal(e.to_string())
            }
            e @ (RoundError::Timeout(_) | RoundError::StaleSnapshot(_)) => {
                AppHttpError::Unavailable(e.to_string())
            }
            e @ RoundError::Db { .. } => {
                log::error!("{e}");
                AppHttpError::Internal
            }
        }
    }
}

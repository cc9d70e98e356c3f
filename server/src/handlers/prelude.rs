pub use actix_web::{get, post, web, HttpRequest, HttpResponse};
pub use serde::{Deserialize, Serialize};

pub use crate::http_types::*;
pub use crate::server_state::*;

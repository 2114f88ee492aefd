use actix_web::{error, HttpResponse};
use actix_web::http::StatusCode;
use derive_more::{Display, Error};
use log::{error, warn};
use serde::Serialize;
use crate::server::database::store::StoreError;
use crate::server::kot::KotError;

#[derive(Debug, Display, Error)]
pub(crate) enum CustomError {
    #[display("server is busy")]
    ServerIsBusy,
    #[display("store is unavailable")]
    StoreUnavailable,
    #[display("invalid request: {reason}")]
    BadRequest { reason: String },
    #[display("{what} not found")]
    NotFound { what: String },
    #[display("invalid credentials")]
    Unauthorized,
    #[display("concurrent submissions conflicted, please retry")]
    Conflict,
    #[display("database error")]
    DbError,
    #[display("timeout occurred")]
    Timeout,
}

#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    message: String,
}

impl CustomError {
    pub fn bad_request(reason: impl ToString) -> Self {
        CustomError::BadRequest { reason: reason.to_string() }
    }
}

impl From<StoreError> for CustomError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Busy => {
                warn!("request rejected, no store connection available");
                CustomError::ServerIsBusy
            }
            StoreError::Unavailable { reason } => {
                error!("store unavailable, {}", reason);
                CustomError::StoreUnavailable
            }
            StoreError::Conflict { reason } => {
                warn!("conflict survived every retry, {}", reason);
                CustomError::Conflict
            }
            StoreError::Timeout => CustomError::Timeout,
            StoreError::Query { reason } => {
                error!("store query failed, {}", reason);
                CustomError::DbError
            }
        }
    }
}

impl From<KotError> for CustomError {
    fn from(e: KotError) -> Self {
        match e {
            KotError::Validation { reason } => CustomError::BadRequest { reason },
            KotError::NotFound { what } => CustomError::NotFound { what },
            KotError::Store { source } => source.into(),
        }
    }
}

impl error::ResponseError for CustomError {
    fn status_code(&self) -> StatusCode {
        match *self {
            CustomError::ServerIsBusy | CustomError::StoreUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            CustomError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            CustomError::NotFound { .. } => StatusCode::NOT_FOUND,
            CustomError::Unauthorized => StatusCode::UNAUTHORIZED,
            CustomError::Conflict => StatusCode::CONFLICT,
            CustomError::DbError => StatusCode::INTERNAL_SERVER_ERROR,
            CustomError::Timeout => StatusCode::GATEWAY_TIMEOUT,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorBody {
            success: false,
            message: self.to_string(),
        })
    }
}

use actix_web::{web, Responder};
use crate::server::controller::error::CustomError;
use crate::server::database::store::KotStore;
use crate::server::model::identity::{AuthOutcome, LoginRequest, LoginResponse};
use crate::server::state::AppState;

/// POST /v1/login
pub(crate) async fn post_login<S: KotStore>(
    body: web::Json<LoginRequest>,
    data: web::Data<AppState<S>>,
) -> Result<impl Responder, CustomError> {
    let LoginRequest { username, password } = body.into_inner();
    match data
        .auth()
        .authenticate(username.as_deref(), password.as_deref())
        .await?
    {
        AuthOutcome::Accepted(identity) => Ok(web::Json(LoginResponse::from(identity))),
        AuthOutcome::Rejected => Err(CustomError::Unauthorized),
    }
}

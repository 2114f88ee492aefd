use actix_web::{web, HttpResponse, Responder};
use log::info;
use crate::server::controller::error::CustomError;
use crate::server::database::store::KotStore;
use crate::server::model::kot::{
    CancelLineRequest, CancelLineResponse, KotDetailResponse, KotListParams, KotListResponse,
    PrintByUserRequest, PrintKotResponse, SubmitKotRequest, SubmitKotResponse,
};
use crate::server::model::TicketNumber;
use crate::server::state::AppState;

/// POST /v1/kots, submit an order as a new ticket
pub(crate) async fn post_kots<S: KotStore>(
    body: web::Json<SubmitKotRequest>,
    data: web::Data<AppState<S>>,
) -> Result<impl Responder, CustomError> {
    let kot_no = data.coordinator().submit(body.into_inner()).await?;
    Ok(web::Json(SubmitKotResponse {
        success: true,
        kot_no,
        message: format!("Saved with KOT_No {kot_no}"),
    }))
}

/// PUT /v1/kot/cancel
pub(crate) async fn put_cancel<S: KotStore>(
    body: web::Json<CancelLineRequest>,
    data: web::Data<AppState<S>>,
) -> Result<impl Responder, CustomError> {
    data.cancellations().cancel(body.id).await?;
    Ok(web::Json(CancelLineResponse { success: true }))
}

/// GET /v1/kots?fromDate=..&toDate=..
pub(crate) async fn get_kots<S: KotStore>(
    params: web::Query<KotListParams>,
    data: web::Data<AppState<S>>,
) -> Result<impl Responder, CustomError> {
    let KotListParams { from_date, to_date } = params.into_inner();
    let tickets = data.retrieval().list_tickets(from_date, to_date).await?;
    Ok(web::Json(KotListResponse {
        success: true,
        data: tickets,
    }))
}

/// GET /v1/kot/{kot_no}, every line including cancelled ones
pub(crate) async fn get_kot<S: KotStore>(
    kot_no: web::Path<TicketNumber>,
    data: web::Data<AppState<S>>,
) -> Result<impl Responder, CustomError> {
    let lines = data.retrieval().ticket_detail(kot_no.into_inner()).await?;
    Ok(web::Json(KotDetailResponse {
        success: true,
        data: lines,
    }))
}

/// POST /v1/kot/print, latest ticket of a user
pub(crate) async fn post_print<S: KotStore>(
    body: web::Json<PrintByUserRequest>,
    data: web::Data<AppState<S>>,
) -> Result<impl Responder, CustomError> {
    let view = data.retrieval().print_for_user(body.user_id).await?;
    info!("printing kot={} for user_id={:?}", view.kot_no, body.user_id);
    Ok(web::Json(PrintKotResponse::from(view)))
}

/// GET /v1/kot/{kot_no}/print
pub(crate) async fn get_print<S: KotStore>(
    kot_no: web::Path<TicketNumber>,
    data: web::Data<AppState<S>>,
) -> Result<HttpResponse, CustomError> {
    let view = data.retrieval().print_for_ticket(kot_no.into_inner()).await?;
    info!("printing kot={}", view.kot_no);
    Ok(HttpResponse::Ok().json(PrintKotResponse::from(view)))
}

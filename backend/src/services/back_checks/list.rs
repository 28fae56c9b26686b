//! # Back Check Listing Service
//!
//! Backs `GET /api/back_checks`: every stored record, in insertion order, as
//! `BackCheckListItem`s. Photos are left out of the listing; `has_photo` tells the
//! client whether to fetch the full record.

use crate::context::RequestContext;
use crate::db::back_checks;
use crate::error::BackCheckError;
use crate::state::AppState;
use actix_web::{web, HttpResponse, Responder, ResponseError};
use common::requests::BackCheckListItem;

/// Actix web handler for the `GET /api/back_checks` endpoint.
///
/// # Returns
/// - `200 OK` with a JSON array of `BackCheckListItem`.
/// - `500 Internal Server Error` if the store cannot be read.
pub async fn process(_ctx: RequestContext, state: web::Data<AppState>) -> impl Responder {
    match list_back_checks(&state) {
        Ok(items) => HttpResponse::Ok().json(items),
        Err(e) => {
            e.log("Listing back checks");
            e.error_response()
        }
    }
}

fn list_back_checks(state: &AppState) -> Result<Vec<BackCheckListItem>, BackCheckError> {
    let conn = state.db.connect()?;
    let records = back_checks::list(&conn)?;
    Ok(records.into_iter().map(BackCheckListItem::from).collect())
}

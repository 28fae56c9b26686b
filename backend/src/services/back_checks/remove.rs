//! # Back Check Deletion Service
//!
//! Backs the `DELETE /api/back_checks/{id}` endpoint. The row is removed with a
//! single `DELETE`; there is no soft delete and nothing else references it.

use crate::context::RequestContext;
use crate::db::back_checks;
use crate::state::AppState;
use actix_web::{web, HttpResponse, Responder, ResponseError};
use log::info;

/// Actix web handler for the `DELETE /api/back_checks/{id}` endpoint.
///
/// # Arguments
/// * `id` - The record id, extracted from the URL path.
///
/// # Returns
/// - `204 No Content` once the row is gone.
/// - `404 Not Found` when nothing had this id.
pub async fn process(
    _ctx: RequestContext,
    state: web::Data<AppState>,
    id: web::Path<i64>,
) -> impl Responder {
    let id = id.into_inner();
    let result = state
        .db
        .connect()
        .and_then(|conn| back_checks::delete(&conn, id));

    match result {
        Ok(true) => {
            info!("Deleted back check {}", id);
            HttpResponse::NoContent().finish()
        }
        Ok(false) => HttpResponse::NotFound().body(format!("Back check {} not found", id)),
        Err(e) => {
            e.log("Deleting back check");
            e.error_response()
        }
    }
}

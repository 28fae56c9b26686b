//! # Back Check Retrieval Service
//!
//! Backs the `GET /api/back_checks/{id}` endpoint: loads one stored back check,
//! photo included, so a client can show the full record.
//!
//! ## Workflow
//!
//! 1.  **HTTP Request**: `process` receives the record id from the URL path after the
//!     `RequestContext` extractor has checked the access password.
//!
//! 2.  **Database Query**: a connection is opened on the configured store and the row is read
//!     through `db::back_checks::get`, which tolerates legacy rows with missing columns.
//!
//! 3.  **HTTP Response**: the `BackCheckRecord` is returned as JSON.
//!

use crate::context::RequestContext;
use crate::db::back_checks;
use crate::state::AppState;
use actix_web::{web, HttpResponse, Responder, ResponseError};

/// Actix web handler for the `GET /api/back_checks/{id}` endpoint.
///
/// # Arguments
/// * `id` - The record id, extracted from the URL path.
///
/// # Returns
/// - `200 OK` with the `BackCheckRecord` (photo included) as JSON.
/// - `404 Not Found` when no record has this id.
/// - `500 Internal Server Error` if the store cannot be read.
pub async fn process(
    _ctx: RequestContext,
    state: web::Data<AppState>,
    id: web::Path<i64>,
) -> impl Responder {
    let id = id.into_inner();
    let result = state
        .db
        .connect()
        .and_then(|conn| back_checks::get(&conn, id));

    match result {
        Ok(Some(record)) => HttpResponse::Ok().json(record),
        Ok(None) => HttpResponse::NotFound().body(format!("Back check {} not found", id)),
        Err(e) => {
            e.log("Loading back check");
            e.error_response()
        }
    }
}

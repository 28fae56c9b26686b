//! # Back Check Preview Service
//!
//! Backs `POST /api/back_checks/preview`. Clients call it while the form is being
//! filled in to show per-species totals and the automatic remark. Nothing is stored.

use crate::context::RequestContext;
use crate::services::back_checks::assemble::preview;
use actix_web::{web, HttpResponse, Responder, ResponseError};
use common::requests::PreviewRequest;

/// Actix web handler for the `POST /api/back_checks/preview` endpoint.
///
/// # Arguments
/// * `payload` - The readings entered so far, in any order.
///
/// # Returns
/// - `200 OK` with a `PreviewResponse`: totals in species order and the remark.
/// - `400 Bad Request` for a duplicate species or an invalid length.
pub async fn process(_ctx: RequestContext, payload: web::Json<PreviewRequest>) -> impl Responder {
    match preview(&payload.readings) {
        Ok(result) => HttpResponse::Ok().json(result),
        Err(e) => e.error_response(),
    }
}

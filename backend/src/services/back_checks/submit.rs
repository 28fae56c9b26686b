//! # Back Check Submission Service
//!
//! Backs `POST /api/back_checks`, the endpoint the registration form posts to.
//!
//! ## Workflow
//!
//! 1.  **HTTP Request**: `process` receives a `multipart/form-data` body with a `json` part
//!     (a `SubmitBackCheckRequest`) and an optional `photo` part.
//!
//! 2.  **Reading Parts**: `read_submission` streams both parts, rejecting either one as soon as
//!     it crosses its configured size limit.
//!
//! 3.  **Assembly**: under the state's submission lock, the request is validated against the
//!     form schema, totals and the automatic remark are recomputed, and the photo is checked
//!     and base64-encoded.
//!
//! 4.  **Persistence**: the assembled record is inserted as a single row.
//!
//! 5.  **HTTP Response**: `201 Created` with the new id, totals and remark. Any failure
//!     before the insert leaves the store untouched.

use crate::context::RequestContext;
use crate::db::back_checks;
use crate::error::BackCheckError;
use crate::services::back_checks::assemble::{assemble, PhotoUpload};
use crate::state::AppState;
use actix_multipart::Multipart;
use actix_web::{web, HttpResponse, Responder, ResponseError};
use common::model::form::FormSchema;
use common::requests::{SpeciesTotal, SubmitBackCheckRequest, SubmitBackCheckResponse};
use futures_util::StreamExt;
use log::info;
use serde_json::from_slice;

/// Actix web handler for the `POST /api/back_checks` endpoint.
///
/// # Arguments
/// * `payload` - The multipart body carrying the `json` and `photo` parts.
///
/// # Returns
/// - `201 Created` with a [`SubmitBackCheckResponse`] on success.
/// - `400 Bad Request` for missing required fields, bad readings or an oversized `json` part.
/// - `422 Unprocessable Entity` for a photo that is unreadable or too large.
/// - `401 Unauthorized` without the access password.
pub async fn process(
    ctx: RequestContext,
    state: web::Data<AppState>,
    payload: Multipart,
) -> impl Responder {
    match submit_back_check(&ctx, &state, payload).await {
        Ok(response) => HttpResponse::Created().json(response),
        Err(e) => {
            e.log("Back check submission");
            e.error_response()
        }
    }
}

struct Submission {
    request: SubmitBackCheckRequest,
    photo: Option<Vec<u8>>,
}

struct PartLimits {
    form_bytes: usize,
    photo_bytes: usize,
}

/// Reads the `json` and `photo` parts. Other parts are ignored.
///
/// Neither part is buffered past its limit; the upload is rejected as soon as
/// it crosses it.
async fn read_submission(
    mut payload: Multipart,
    limits: PartLimits,
) -> Result<Submission, BackCheckError> {
    let mut request: Option<SubmitBackCheckRequest> = None;
    let mut photo: Option<Vec<u8>> = None;

    while let Some(item) = payload.next().await {
        let mut field = item.map_err(|e| BackCheckError::BadRequest(e.to_string()))?;
        let part_name = field
            .content_disposition()
            .and_then(|cd| cd.get_name().map(|n| n.to_string()));

        match part_name.as_deref() {
            Some("json") => {
                let mut bytes = Vec::new();
                while let Some(chunk) = field.next().await {
                    let chunk = chunk.map_err(|e| BackCheckError::BadRequest(e.to_string()))?;
                    if bytes.len() + chunk.len() > limits.form_bytes {
                        return Err(BackCheckError::BadRequest(format!(
                            "json part exceeds the limit of {} bytes",
                            limits.form_bytes
                        )));
                    }
                    bytes.extend_from_slice(&chunk);
                }
                let parsed: SubmitBackCheckRequest = from_slice(&bytes)
                    .map_err(|e| BackCheckError::BadRequest(format!("json part: {}", e)))?;
                request = Some(parsed);
            }

            Some("photo") => {
                let mut bytes = Vec::new();
                while let Some(chunk) = field.next().await {
                    let chunk = chunk.map_err(|e| BackCheckError::BadRequest(e.to_string()))?;
                    if bytes.len() + chunk.len() > limits.photo_bytes {
                        return Err(BackCheckError::Encoding(format!(
                            "photo exceeds the limit of {} bytes",
                            limits.photo_bytes
                        )));
                    }
                    bytes.extend_from_slice(&chunk);
                }
                photo = Some(bytes);
            }

            _ => {}
        }
    }

    let request = request.ok_or_else(|| BackCheckError::BadRequest("missing json part".into()))?;
    Ok(Submission { request, photo })
}

/// Assembles the submission and stores it.
///
/// Submissions hold the state's submission lock from assembly to insertion,
/// so each one completes before the next begins.
pub async fn submit_back_check(
    ctx: &RequestContext,
    state: &AppState,
    payload: Multipart,
) -> Result<SubmitBackCheckResponse, BackCheckError> {
    let max_photo_bytes = state.config.max_photo_bytes;
    let limits = PartLimits {
        form_bytes: state.config.max_form_bytes,
        photo_bytes: max_photo_bytes,
    };
    let Submission { request, photo } = read_submission(payload, limits).await?;

    let _guard = state.submissions.lock().await;

    let upload = photo.as_deref().map(|bytes| PhotoUpload {
        bytes,
        max_bytes: max_photo_bytes,
    });
    let record = assemble(ctx, &FormSchema::back_check(), request, upload)?;

    let conn = state.db.connect()?;
    let id = back_checks::insert(&conn, &record)?;
    info!(
        "Saved back check {} for woreda '{}' (remark: '{}')",
        id, record.metadata.woreda, record.auto_remark
    );

    Ok(SubmitBackCheckResponse {
        id,
        totals: record
            .species
            .iter()
            .map(|r| SpeciesTotal {
                species: r.species,
                total_sockets: r.total_sockets,
            })
            .collect(),
        auto_remark: record.auto_remark,
    })
}

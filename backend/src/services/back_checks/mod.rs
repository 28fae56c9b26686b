//! Back-check records: submission, live preview, listing, lookup and deletion.
//!
//! Routes under `/api/back_checks`:
//! - `POST /`: multipart submission. A `json` part carries the
//!   [`common::requests::SubmitBackCheckRequest`]; an optional `photo` part
//!   carries the raw image bytes. Answers `201 Created` with the new id,
//!   the aggregate remark and the per-species totals.
//! - `POST /preview`: JSON readings in, totals and remark fragments out.
//!   Nothing is stored.
//! - `GET /`: every record, oldest first, without photo payloads.
//! - `GET /{id}`: one record including its photo.
//! - `DELETE /{id}`: removes a record.

use actix_web::web::{delete, get, post, scope};
use actix_web::Scope;

pub mod assemble;
mod get;
mod list;
mod preview;
mod remove;
mod submit;

const API_PATH: &str = "/api/back_checks";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("", post().to(submit::process))
        .route("", get().to(list::process))
        .route("/preview", post().to(preview::process))
        .route("/{id}", get().to(get::process))
        .route("/{id}", delete().to(remove::process))
}

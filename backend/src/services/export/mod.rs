//! Tabular export of every stored back check.
//!
//! - `GET /api/export/csv`: `OAF_Nursery.csv`, columns in the fixed order of
//!   [`columns::EXPORT_COLUMNS`] with title-cased headers.
//! - `GET /api/export/photos`: `OAF_Nursery_Photos.zip`, one image per record
//!   that has a photo. Built on the blocking thread pool.

pub mod columns;
pub mod table;
pub mod photos;

use crate::context::RequestContext;
use crate::db::back_checks;
use crate::error::BackCheckError;
use crate::state::AppState;
use actix_web::web::{get, scope};
use actix_web::{web, HttpResponse, Responder, ResponseError, Scope};
use log::info;
use std::io::Cursor;

const API_PATH: &str = "/api/export";
const CSV_FILE_NAME: &str = "OAF_Nursery.csv";
const PHOTOS_FILE_NAME: &str = "OAF_Nursery_Photos.zip";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("/csv", get().to(export_csv))
        .route("/photos", get().to(export_photos))
}

fn attachment(file_name: &str) -> (&'static str, String) {
    (
        "Content-Disposition",
        format!("attachment; filename=\"{}\"", file_name),
    )
}

fn build_csv(state: &AppState) -> Result<Vec<u8>, BackCheckError> {
    let conn = state.db.connect()?;
    let records = back_checks::list(&conn)?;
    let mut out = Vec::new();
    table::write_csv(&records, &mut out)?;
    info!("Exported {} back check(s) to CSV", records.len());
    Ok(out)
}

async fn export_csv(_ctx: RequestContext, state: web::Data<AppState>) -> impl Responder {
    match build_csv(&state) {
        Ok(body) => HttpResponse::Ok()
            .content_type("text/csv; charset=utf-8")
            .insert_header(attachment(CSV_FILE_NAME))
            .body(body),
        Err(e) => {
            e.log("CSV export");
            e.error_response()
        }
    }
}

fn build_photo_bundle(state: &AppState) -> Result<Vec<u8>, BackCheckError> {
    let conn = state.db.connect()?;
    let records = back_checks::list(&conn)?;
    let mut out = Cursor::new(Vec::new());
    let count = photos::write_photo_bundle(&records, &mut out)?;
    info!("Bundled {} photo(s)", count);
    Ok(out.into_inner())
}

async fn export_photos(_ctx: RequestContext, state: web::Data<AppState>) -> impl Responder {
    let state = state.into_inner();
    let result = match tokio::task::spawn_blocking(move || build_photo_bundle(&state)).await {
        Ok(result) => result,
        Err(join_err) => Err(BackCheckError::Io(std::io::Error::other(format!(
            "photo bundle task failed: {}",
            join_err
        )))),
    };

    match result {
        Ok(body) => HttpResponse::Ok()
            .content_type("application/zip")
            .insert_header(attachment(PHOTOS_FILE_NAME))
            .body(body),
        Err(e) => {
            e.log("Photo export");
            e.error_response()
        }
    }
}

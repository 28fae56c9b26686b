//! `GET /api/form` returns the back-check form description so clients can
//! render it. An optional `locale` query parameter (`en`, `am`) selects the
//! field labels.

use crate::context::RequestContext;
use actix_web::web::{get, scope, Query};
use actix_web::{HttpResponse, Responder, Scope};
use common::model::form::{FormSchema, Locale};
use serde::Deserialize;

const API_PATH: &str = "/api/form";

#[derive(Deserialize)]
pub struct FormQuery {
    pub locale: Option<String>,
}

pub fn configure_routes() -> Scope {
    scope(API_PATH).route("", get().to(process))
}

pub async fn process(_ctx: RequestContext, query: Query<FormQuery>) -> impl Responder {
    let locale = match query.locale.as_deref() {
        None => Locale::default(),
        Some(code) => match Locale::from_code(code) {
            Some(locale) => locale,
            None => {
                return HttpResponse::BadRequest().body(format!("Error: unknown locale '{}'", code))
            }
        },
    };
    HttpResponse::Ok().json(FormSchema::back_check().localized(locale))
}

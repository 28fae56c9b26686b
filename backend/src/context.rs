//! Request-scoped context.
//!
//! Every API handler takes a [`RequestContext`] argument. Extracting it checks
//! the shared access password and stamps the time the request was received,
//! which becomes the creation timestamp of any record assembled for it.

use crate::error::BackCheckError;
use crate::state::AppState;
use actix_web::dev::Payload;
use actix_web::{web, FromRequest, HttpRequest};
use chrono::{DateTime, Utc};
use log::warn;
use std::future::{ready, Ready};

pub const PASSWORD_HEADER: &str = "X-Access-Password";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    pub received_at: DateTime<Utc>,
}

impl RequestContext {
    pub fn at(received_at: DateTime<Utc>) -> Self {
        RequestContext { received_at }
    }
}

impl FromRequest for RequestContext {
    type Error = BackCheckError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authorize(req).map(|_| RequestContext::at(Utc::now())))
    }
}

fn authorize(req: &HttpRequest) -> Result<(), BackCheckError> {
    let state = req
        .app_data::<web::Data<AppState>>()
        .ok_or(BackCheckError::Unauthorized)?;

    let Some(expected) = state.config.access_password.as_deref() else {
        return Ok(());
    };

    let supplied = req
        .headers()
        .get(PASSWORD_HEADER)
        .and_then(|v| v.to_str().ok());

    if supplied == Some(expected) {
        Ok(())
    } else {
        warn!("Rejected {} {}: bad access password", req.method(), req.path());
        Err(BackCheckError::Unauthorized)
    }
}

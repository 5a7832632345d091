use actix_web::dev::Payload;
use actix_web::{web, FromRequest, HttpRequest};
use futures_util::future::{ready, Ready};
use log::warn;

use crate::errors::AppError;
use crate::AppState;

pub const API_KEY_NAME: &str = "apiKey";

/// Finds the documentation key in the query string, a header or a cookie, in that
/// order, and returns the first one equal to `expected`.
pub fn find_api_key(req: &HttpRequest, expected: &str) -> Option<String> {
    let from_query = web::Query::<Vec<(String, String)>>::from_query(req.query_string())
        .ok()
        .and_then(|query| {
            query
                .into_inner()
                .into_iter()
                .find(|(name, _)| name == API_KEY_NAME)
                .map(|(_, value)| value)
        });

    let from_header = req
        .headers()
        .get(API_KEY_NAME)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);

    let from_cookie = req.cookie(API_KEY_NAME).map(|cookie| cookie.value().to_string());

    [from_query, from_header, from_cookie]
        .into_iter()
        .flatten()
        .find(|candidate| candidate == expected)
}

/// Extractor guarding the documentation endpoints. Holds the accepted key.
#[derive(Debug)]
pub struct DocsApiKey(pub String);

impl FromRequest for DocsApiKey {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let result = match req.app_data::<web::Data<AppState>>() {
            Some(state) => find_api_key(req, &state.settings.swagger_api_key)
                .map(DocsApiKey)
                .ok_or_else(|| {
                    warn!("rejected documentation request to {}", req.path());
                    AppError::Unauthorized
                }),
            None => Err(AppError::Internal),
        };
        ready(result)
    }
}

use actix_web::cookie::{time::Duration, Cookie};
use actix_web::http::header;
use actix_web::{web, HttpResponse};
use utoipa::OpenApi;

use crate::handlers::employee;
use crate::handlers::schemas::{EmployeeEntry, EmployeePayload, EmployeePutRequest, EmployeeResponse};
use crate::utils::api_key::{DocsApiKey, API_KEY_NAME};

const DOCS_COOKIE_MAX_AGE_SECS: i64 = 1800;

#[derive(OpenApi)]
#[openapi(
    info(title = "Employee-Manager-API", version = "1.0"),
    paths(
        employee::get_employees,
        employee::get_employee,
        employee::create_employee,
        employee::update_employee,
        employee::delete_employee
    ),
    components(schemas(EmployeePayload, EmployeePutRequest, EmployeeEntry, EmployeeResponse))
)]
pub struct ApiDoc;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/openapi.json", web::get().to(get_open_api_endpoint))
        .route("/docs", web::get().to(get_documentation))
        .route("/logout", web::get().to(logout));
}

pub async fn get_open_api_endpoint(_api_key: DocsApiKey) -> HttpResponse {
    HttpResponse::Ok().json(ApiDoc::openapi())
}

/// Serves Swagger UI and stores the accepted key in a cookie so the page can load
/// `/openapi.json`.
pub async fn get_documentation(api_key: DocsApiKey) -> HttpResponse {
    let cookie = Cookie::build(API_KEY_NAME, api_key.0)
        .path("/")
        .http_only(true)
        .max_age(Duration::seconds(DOCS_COOKIE_MAX_AGE_SECS))
        .finish();

    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .cookie(cookie)
        .body(swagger_ui_html("/openapi.json", "docs"))
}

pub async fn logout() -> HttpResponse {
    let mut cookie = Cookie::build(API_KEY_NAME, "").path("/").finish();
    cookie.make_removal();

    HttpResponse::Found()
        .insert_header((header::LOCATION, "/"))
        .cookie(cookie)
        .finish()
}

fn swagger_ui_html(openapi_url: &str, title: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<link type="text/css" rel="stylesheet" href="https://cdn.jsdelivr.net/npm/swagger-ui-dist@5/swagger-ui.css">
<title>{title}</title>
</head>
<body>
<div id="swagger-ui"></div>
<script src="https://cdn.jsdelivr.net/npm/swagger-ui-dist@5/swagger-ui-bundle.js"></script>
<script>
const ui = SwaggerUIBundle({{
    url: '{openapi_url}',
    dom_id: '#swagger-ui',
    layout: 'BaseLayout',
    deepLinking: true,
    presets: [SwaggerUIBundle.presets.apis, SwaggerUIBundle.SwaggerUIStandalonePreset],
}})
</script>
</body>
</html>"#
    )
}

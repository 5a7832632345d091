use actix_web::{web, HttpResponse};
use log::{error, warn};

use crate::db::DbSession;
use crate::errors::AppError;
use crate::handlers::schemas::{
    EmployeePayload, EmployeePostRequest, EmployeePutRequest, EmployeeResponse, ListParams, DEFAULT_LIMIT,
    DEFAULT_OFFSET,
};
use crate::models::employee::{EmployeeChanges, EmployeeKey};
use crate::repository::{ListQuery, RepoError};
use crate::utils::validation::validate_payload;
use crate::AppState;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/employees")
            .route(web::get().to(get_employees))
            .route(web::post().to(create_employee))
            .route(web::put().to(update_employee)),
    )
    .service(
        web::resource("/employees/{employee_id}")
            .route(web::get().to(get_employee))
            .route(web::delete().to(delete_employee)),
    );
}

#[utoipa::path(
    get,
    path = "/api/v1/employees",
    params(ListParams),
    responses(
        (status = 200, description = "Employees in the requested window", body = EmployeeResponse),
        (status = 400, description = "Invalid offset or limit", body = EmployeeResponse),
        (status = 500, description = "Internal error", body = EmployeeResponse)
    )
)]
pub async fn get_employees(
    state: web::Data<AppState>,
    mut session: DbSession,
    query: web::Query<ListParams>,
) -> Result<HttpResponse, AppError> {
    validate_payload(&*query)?;

    let offset = query.offset.unwrap_or(DEFAULT_OFFSET);
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT);

    let employees = state
        .employees
        .get_all(session.conn(), &ListQuery::new().offset(offset).limit(limit))
        .await
        .map_err(|err| {
            error!("error at get_employees (offset={}, limit={}): {}", offset, limit, err);
            AppError::Internal
        })?;

    Ok(HttpResponse::Ok().json(EmployeeResponse::entries(employees)))
}

#[utoipa::path(
    get,
    path = "/api/v1/employees/{employee_id}",
    params(("employee_id" = String, Path, description = "Numeric id, or identification code when not all digits")),
    responses(
        (status = 200, description = "The employee", body = EmployeeResponse),
        (status = 400, description = "Entry not exist", body = EmployeeResponse),
        (status = 500, description = "Internal error", body = EmployeeResponse)
    )
)]
pub async fn get_employee(
    state: web::Data<AppState>,
    mut session: DbSession,
    employee_id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let key = EmployeeKey::parse(&employee_id.into_inner());

    let employee = state.employees.find(session.conn(), &key).await.map_err(|err| {
        error!("error at get_employee ({}): {}", key, err);
        AppError::Internal
    })?;

    match employee {
        Some(employee) => Ok(HttpResponse::Ok().json(EmployeeResponse::entry(employee))),
        None => Err(AppError::NotFound),
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/employees",
    request_body = EmployeePayload,
    responses(
        (status = 200, description = "The created employee", body = EmployeeResponse),
        (status = 400, description = "Validation error or entry already exists", body = EmployeeResponse),
        (status = 500, description = "Internal error", body = EmployeeResponse)
    )
)]
pub async fn create_employee(
    state: web::Data<AppState>,
    mut session: DbSession,
    new_employee: web::Json<EmployeePostRequest>,
) -> Result<HttpResponse, AppError> {
    validate_payload(&*new_employee)?;

    let changes = EmployeeChanges::from(&*new_employee);
    match state.employees.create(session.conn(), &changes).await {
        Ok(employee) => Ok(HttpResponse::Ok().json(EmployeeResponse::entry(employee))),
        Err(RepoError::UniqueViolation(_)) => {
            warn!(
                "error at create_employee, employee with identification_code={} already exists",
                new_employee.identification_code
            );
            Err(AppError::Conflict)
        }
        Err(err) => {
            // The repository has already rolled the insert back at this point.
            error!(
                "error at create_employee (identification_code={}), unit of work rolled back: {}",
                new_employee.identification_code, err
            );
            Err(AppError::Internal)
        }
    }
}

#[utoipa::path(
    put,
    path = "/api/v1/employees",
    request_body = EmployeePutRequest,
    responses(
        (status = 200, description = "The updated employee", body = EmployeeResponse),
        (status = 400, description = "Validation error, entry not exist or entry already exists", body = EmployeeResponse),
        (status = 500, description = "Internal error", body = EmployeeResponse)
    )
)]
pub async fn update_employee(
    state: web::Data<AppState>,
    mut session: DbSession,
    updates: web::Json<EmployeePutRequest>,
) -> Result<HttpResponse, AppError> {
    validate_payload(&*updates)?;

    let key = match updates.id {
        Some(id) => EmployeeKey::Id(id),
        None => EmployeeKey::Code(updates.employee.identification_code.clone()),
    };

    let existing = state
        .employees
        .find(session.conn(), &key)
        .await
        .map_err(|err| {
            error!("error at update_employee ({}): {}", key, err);
            AppError::Internal
        })?
        .ok_or(AppError::NotFound)?;

    let changes = EmployeeChanges::from(&updates.employee);
    match state.employees.update(session.conn(), &existing, &changes).await {
        Ok(employee) => Ok(HttpResponse::Ok().json(EmployeeResponse::entry(employee))),
        Err(RepoError::UniqueViolation(_)) => {
            warn!(
                "error at update_employee ({}), identification_code={} is taken",
                key, changes.identification_code
            );
            Err(AppError::Conflict)
        }
        Err(err) => {
            error!("error at update_employee ({}): {}", key, err);
            Err(AppError::Internal)
        }
    }
}

#[utoipa::path(
    delete,
    path = "/api/v1/employees/{employee_id}",
    params(("employee_id" = String, Path, description = "Numeric id, or identification code when not all digits")),
    responses(
        (status = 200, description = "The deleted employee", body = EmployeeResponse),
        (status = 400, description = "Entry not exist", body = EmployeeResponse),
        (status = 500, description = "Internal error", body = EmployeeResponse)
    )
)]
pub async fn delete_employee(
    state: web::Data<AppState>,
    mut session: DbSession,
    employee_id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let key = EmployeeKey::parse(&employee_id.into_inner());

    let employee = state
        .employees
        .find(session.conn(), &key)
        .await
        .map_err(|err| {
            error!("error at delete_employee ({}): {}", key, err);
            AppError::Internal
        })?
        .ok_or(AppError::NotFound)?;

    state.employees.delete(session.conn(), &employee).await.map_err(|err| {
        error!("error at delete_employee ({}): {}", key, err);
        AppError::Internal
    })?;

    Ok(HttpResponse::Ok().json(EmployeeResponse::entry(employee)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::schemas::EmployeeEntry;
    use crate::models::employee::Employee;
    use crate::test_support::{test_state, TEST_API_KEY};
    use actix_web::http::StatusCode;
    use actix_web::{test, App};
    use chrono::NaiveDate;
    use serde_json::{json, Value};
    use uuid::Uuid;

    fn employee_json() -> Value {
        json!({
            "identificationCode": Uuid::new_v4().to_string(),
            "birthDate": "1988-11-23",
            "firstName": "Yael",
            "lastName": "Mizrahi",
            "email": "yael.mizrahi@example.com",
            "city": "Jerusalem",
            "country": "Israel",
            "street": "Jaffa",
            "buildingNumber": "101"
        })
    }

    async fn insert(state: &web::Data<AppState>, body: &Value) -> Employee {
        let payload: EmployeePostRequest = serde_json::from_value(body.clone()).unwrap();
        let mut session = DbSession::acquire(&state.db).await.unwrap();
        state
            .employees
            .create(session.conn(), &EmployeeChanges::from(&payload))
            .await
            .unwrap()
    }

    async fn execute(state: &web::Data<AppState>, sql: &str) {
        let mut session = DbSession::acquire(&state.db).await.unwrap();
        sqlx::query(sql).execute(session.conn()).await.unwrap();
    }

    fn assert_entry_matches(entry: &EmployeeEntry, body: &Value) {
        assert_eq!(entry.identification_code, body["identificationCode"].as_str().unwrap());
        assert_eq!(
            entry.birth_date,
            Some(NaiveDate::parse_from_str(body["birthDate"].as_str().unwrap(), "%Y-%m-%d").unwrap())
        );
        assert_eq!(entry.first_name.as_deref(), body["firstName"].as_str());
        assert_eq!(entry.last_name.as_deref(), body["lastName"].as_str());
        assert_eq!(entry.email.as_deref(), body["email"].as_str());
        assert_eq!(entry.city.as_deref(), body["city"].as_str());
        assert_eq!(entry.country.as_deref(), body["country"].as_str());
        assert_eq!(entry.street.as_deref(), body["street"].as_str());
        assert_eq!(entry.building_number.as_deref(), body["buildingNumber"].as_str());
    }

    #[actix_web::test]
    async fn test_get_employee_not_exist() {
        let state = test_state(TEST_API_KEY).await;
        let app = test::init_service(App::new().configure(crate::configure_app(state.clone()))).await;

        let req = test::TestRequest::get().uri("/api/v1/employees/1").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: EmployeeResponse = test::read_body_json(resp).await;
        assert_eq!(body.error_message.as_deref(), Some("entry not exist"));
        assert!(body.entry.is_none());
    }

    #[actix_web::test]
    async fn test_get_employee_by_id_and_by_code() {
        let state = test_state(TEST_API_KEY).await;
        let data = employee_json();
        let employee = insert(&state, &data).await;
        let app = test::init_service(App::new().configure(crate::configure_app(state.clone()))).await;

        let req = test::TestRequest::get()
            .uri(&format!("/api/v1/employees/{}", employee.id))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: EmployeeResponse = test::read_body_json(resp).await;
        assert!(body.error_message.is_none());
        let entry = body.entry.unwrap();
        assert_eq!(entry.id, employee.id);
        assert_entry_matches(&entry, &data);

        let req = test::TestRequest::get()
            .uri(&format!("/api/v1/employees/{}", employee.identification_code))
            .to_request();
        let body: EmployeeResponse = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body.entry.map(|e| e.id), Some(employee.id));
    }

    #[actix_web::test]
    async fn test_get_employee_session_unavailable() {
        let state = test_state(TEST_API_KEY).await;
        let app = test::init_service(App::new().configure(crate::configure_app(state.clone()))).await;
        state.db.pool().close().await;

        let req = test::TestRequest::get().uri("/api/v1/employees/1").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: EmployeeResponse = test::read_body_json(resp).await;
        assert_eq!(body.error_message.as_deref(), Some("internal error"));
    }

    #[actix_web::test]
    async fn test_get_employee_raises_error() {
        let state = test_state(TEST_API_KEY).await;
        execute(&state, "DROP TABLE employees").await;
        let app = test::init_service(App::new().configure(crate::configure_app(state.clone()))).await;

        for uri in ["/api/v1/employees/1", "/api/v1/employees/not-a-number"] {
            let req = test::TestRequest::get().uri(uri).to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
            let body: EmployeeResponse = test::read_body_json(resp).await;
            assert_eq!(body.error_message.as_deref(), Some("internal error"));
        }
    }

    #[actix_web::test]
    async fn test_get_employees_empty_list() {
        let state = test_state(TEST_API_KEY).await;
        let app = test::init_service(App::new().configure(crate::configure_app(state.clone()))).await;

        let req = test::TestRequest::get().uri("/api/v1/employees").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body, json!({ "entries": [] }));
    }

    #[actix_web::test]
    async fn test_get_employees_with_window() {
        let state = test_state(TEST_API_KEY).await;
        for _ in 0..7 {
            insert(&state, &employee_json()).await;
        }
        let app = test::init_service(App::new().configure(crate::configure_app(state.clone()))).await;

        let req = test::TestRequest::get().uri("/api/v1/employees").to_request();
        let body: EmployeeResponse = test::call_and_read_body_json(&app, req).await;
        assert!(body.error_message.is_none());
        assert_eq!(body.entries.map(|e| e.len()), Some(7));

        let req = test::TestRequest::get()
            .uri("/api/v1/employees?offset=5&limit=10")
            .to_request();
        let body: EmployeeResponse = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body.entries.map(|e| e.len()), Some(2));
    }

    #[actix_web::test]
    async fn test_get_employees_rejects_negative_window() {
        let state = test_state(TEST_API_KEY).await;
        let app = test::init_service(App::new().configure(crate::configure_app(state.clone()))).await;

        let req = test::TestRequest::get().uri("/api/v1/employees?limit=-1").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::get().uri("/api/v1/employees?offset=abc").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: EmployeeResponse = test::read_body_json(resp).await;
        assert!(body.error_message.is_some());
    }

    #[actix_web::test]
    async fn test_get_employees_raises_error() {
        let state = test_state(TEST_API_KEY).await;
        execute(&state, "DROP TABLE employees").await;
        let app = test::init_service(App::new().configure(crate::configure_app(state.clone()))).await;

        let req = test::TestRequest::get().uri("/api/v1/employees").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: EmployeeResponse = test::read_body_json(resp).await;
        assert_eq!(body.error_message.as_deref(), Some("internal error"));
    }

    #[actix_web::test]
    async fn test_post_employee_valid_response() {
        let state = test_state(TEST_API_KEY).await;
        let app = test::init_service(App::new().configure(crate::configure_app(state.clone()))).await;
        let data = employee_json();

        let req = test::TestRequest::post()
            .uri("/api/v1/employees")
            .set_json(&data)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: EmployeeResponse = test::read_body_json(resp).await;
        assert!(body.error_message.is_none());
        let entry = body.entry.unwrap();
        assert_entry_matches(&entry, &data);

        let mut session = DbSession::acquire(&state.db).await.unwrap();
        let stored = state.employees.get_by_id(session.conn(), entry.id).await.unwrap();
        assert_eq!(stored.map(EmployeeEntry::from), Some(entry));
    }

    #[actix_web::test]
    async fn test_post_employee_already_exists() {
        let state = test_state(TEST_API_KEY).await;
        let data = employee_json();
        let original = insert(&state, &data).await;
        let app = test::init_service(App::new().configure(crate::configure_app(state.clone()))).await;

        let mut duplicate = employee_json();
        duplicate["identificationCode"] = data["identificationCode"].clone();
        let req = test::TestRequest::post()
            .uri("/api/v1/employees")
            .set_json(&duplicate)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: EmployeeResponse = test::read_body_json(resp).await;
        assert_eq!(body.error_message.as_deref(), Some("entry already exists"));
        assert!(body.entry.is_none());

        let mut session = DbSession::acquire(&state.db).await.unwrap();
        let stored = state.employees.get_by_id(session.conn(), original.id).await.unwrap();
        assert_eq!(stored, Some(original));
    }

    #[actix_web::test]
    async fn test_post_employee_internal_error() {
        let state = test_state(TEST_API_KEY).await;
        execute(&state, "DROP TABLE employees").await;
        let app = test::init_service(App::new().configure(crate::configure_app(state.clone()))).await;

        let req = test::TestRequest::post()
            .uri("/api/v1/employees")
            .set_json(employee_json())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: EmployeeResponse = test::read_body_json(resp).await;
        assert_eq!(body.error_message.as_deref(), Some("internal error"));
    }

    #[actix_web::test]
    async fn test_post_employee_validation_errors() {
        let state = test_state(TEST_API_KEY).await;
        let app = test::init_service(App::new().configure(crate::configure_app(state.clone()))).await;

        let mut bad_email = employee_json();
        bad_email["email"] = json!("nobody");
        let mut missing_field = employee_json();
        missing_field.as_object_mut().unwrap().remove("lastName");
        let mut bad_date = employee_json();
        bad_date["birthDate"] = json!("yesterday");

        for payload in [bad_email, missing_field, bad_date] {
            let req = test::TestRequest::post()
                .uri("/api/v1/employees")
                .set_json(&payload)
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
            let body: EmployeeResponse = test::read_body_json(resp).await;
            assert!(body.error_message.is_some());
            assert!(body.entry.is_none());
        }

        let mut session = DbSession::acquire(&state.db).await.unwrap();
        let all = state.employees.get_all(session.conn(), &ListQuery::new()).await.unwrap();
        assert!(all.is_empty());
    }

    #[actix_web::test]
    async fn test_put_employee_by_identification_code() {
        let state = test_state(TEST_API_KEY).await;
        let original = insert(&state, &employee_json()).await;
        let app = test::init_service(App::new().configure(crate::configure_app(state.clone()))).await;

        let mut data = employee_json();
        data["identificationCode"] = json!(original.identification_code);
        data["city"] = json!("Beersheba");
        let req = test::TestRequest::put()
            .uri("/api/v1/employees")
            .set_json(&data)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: EmployeeResponse = test::read_body_json(resp).await;
        assert!(body.error_message.is_none());
        let entry = body.entry.unwrap();
        assert_eq!(entry.id, original.id);
        assert_entry_matches(&entry, &data);
    }

    #[actix_web::test]
    async fn test_put_employee_by_id_replaces_code() {
        let state = test_state(TEST_API_KEY).await;
        let original = insert(&state, &employee_json()).await;
        let app = test::init_service(App::new().configure(crate::configure_app(state.clone()))).await;

        let mut data = employee_json();
        data["id"] = json!(original.id);
        let req = test::TestRequest::put()
            .uri("/api/v1/employees")
            .set_json(&data)
            .to_request();
        let body: EmployeeResponse = test::call_and_read_body_json(&app, req).await;
        let entry = body.entry.unwrap();
        assert_eq!(entry.id, original.id);
        assert_ne!(entry.identification_code, original.identification_code);

        let mut session = DbSession::acquire(&state.db).await.unwrap();
        let refetched = state
            .employees
            .get_by_id(session.conn(), original.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(refetched.identification_code, data["identificationCode"].as_str().unwrap());
        assert_eq!(refetched.create_time, original.create_time);
    }

    #[actix_web::test]
    async fn test_put_employee_not_exist() {
        let state = test_state(TEST_API_KEY).await;
        let untouched = insert(&state, &employee_json()).await;
        let app = test::init_service(App::new().configure(crate::configure_app(state.clone()))).await;

        let mut data = employee_json();
        data["id"] = json!(untouched.id + 1000);
        let req = test::TestRequest::put()
            .uri("/api/v1/employees")
            .set_json(&data)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: EmployeeResponse = test::read_body_json(resp).await;
        assert_eq!(body.error_message.as_deref(), Some("entry not exist"));
        assert!(body.entry.is_none());

        let mut session = DbSession::acquire(&state.db).await.unwrap();
        let all = state.employees.get_all(session.conn(), &ListQuery::new()).await.unwrap();
        assert_eq!(all, vec![untouched]);
    }

    #[actix_web::test]
    async fn test_put_employee_conflicting_code() {
        let state = test_state(TEST_API_KEY).await;
        let first = insert(&state, &employee_json()).await;
        let second = insert(&state, &employee_json()).await;
        let app = test::init_service(App::new().configure(crate::configure_app(state.clone()))).await;

        let mut data = employee_json();
        data["id"] = json!(second.id);
        data["identificationCode"] = json!(first.identification_code);
        let req = test::TestRequest::put()
            .uri("/api/v1/employees")
            .set_json(&data)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: EmployeeResponse = test::read_body_json(resp).await;
        assert_eq!(body.error_message.as_deref(), Some("entry already exists"));
    }

    #[actix_web::test]
    async fn test_delete_not_exist_employee() {
        let state = test_state(TEST_API_KEY).await;
        let app = test::init_service(App::new().configure(crate::configure_app(state.clone()))).await;

        for uri in ["/api/v1/employees/1", "/api/v1/employees/no-such-code"] {
            let req = test::TestRequest::delete().uri(uri).to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
            let body: EmployeeResponse = test::read_body_json(resp).await;
            assert_eq!(body.error_message.as_deref(), Some("entry not exist"));
        }
    }

    #[actix_web::test]
    async fn test_delete_existing_employee() {
        let state = test_state(TEST_API_KEY).await;
        let data = employee_json();
        let employee = insert(&state, &data).await;
        let app = test::init_service(App::new().configure(crate::configure_app(state.clone()))).await;

        let req = test::TestRequest::delete()
            .uri(&format!("/api/v1/employees/{}", employee.id))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: EmployeeResponse = test::read_body_json(resp).await;
        assert!(body.error_message.is_none());
        let entry = body.entry.unwrap();
        assert_eq!(entry.id, employee.id);
        assert_entry_matches(&entry, &data);

        let req = test::TestRequest::get()
            .uri(&format!("/api/v1/employees/{}", employee.id))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_delete_by_identification_code() {
        let state = test_state(TEST_API_KEY).await;
        let employee = insert(&state, &employee_json()).await;
        let app = test::init_service(App::new().configure(crate::configure_app(state.clone()))).await;

        let req = test::TestRequest::delete()
            .uri(&format!("/api/v1/employees/{}", employee.identification_code))
            .to_request();
        let body: EmployeeResponse = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body.entry.map(|e| e.id), Some(employee.id));

        let mut session = DbSession::acquire(&state.db).await.unwrap();
        assert!(state
            .employees
            .get_by_identification_code(session.conn(), &employee.identification_code)
            .await
            .unwrap()
            .is_none());
    }

    #[actix_web::test]
    async fn test_put_employee_lookup_raises_error() {
        let state = test_state(TEST_API_KEY).await;
        execute(&state, "DROP TABLE employees").await;
        let app = test::init_service(App::new().configure(crate::configure_app(state.clone()))).await;

        let mut with_id = employee_json();
        with_id["id"] = json!(1);
        for payload in [employee_json(), with_id] {
            let req = test::TestRequest::put()
                .uri("/api/v1/employees")
                .set_json(&payload)
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
            let body: EmployeeResponse = test::read_body_json(resp).await;
            assert_eq!(body.error_message.as_deref(), Some("internal error"));
        }
    }

    #[actix_web::test]
    async fn test_put_employee_write_raises_error() {
        let state = test_state(TEST_API_KEY).await;
        let original = insert(&state, &employee_json()).await;
        execute(
            &state,
            "CREATE TRIGGER employees_frozen BEFORE UPDATE ON employees \
             BEGIN SELECT RAISE(ABORT, 'employees are frozen'); END",
        )
        .await;
        let app = test::init_service(App::new().configure(crate::configure_app(state.clone()))).await;

        let mut data = employee_json();
        data["id"] = json!(original.id);
        let req = test::TestRequest::put()
            .uri("/api/v1/employees")
            .set_json(&data)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: EmployeeResponse = test::read_body_json(resp).await;
        assert_eq!(body.error_message.as_deref(), Some("internal error"));
        assert!(body.entry.is_none());

        let mut session = DbSession::acquire(&state.db).await.unwrap();
        let stored = state.employees.get_by_id(session.conn(), original.id).await.unwrap();
        assert_eq!(stored, Some(original));
    }

    #[actix_web::test]
    async fn test_delete_employee_lookup_raises_error() {
        let state = test_state(TEST_API_KEY).await;
        execute(&state, "DROP TABLE employees").await;
        let app = test::init_service(App::new().configure(crate::configure_app(state.clone()))).await;

        let req = test::TestRequest::delete().uri("/api/v1/employees/1").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: EmployeeResponse = test::read_body_json(resp).await;
        assert_eq!(body.error_message.as_deref(), Some("internal error"));
    }

    #[actix_web::test]
    async fn test_delete_employee_write_raises_error() {
        let state = test_state(TEST_API_KEY).await;
        let original = insert(&state, &employee_json()).await;
        execute(
            &state,
            "CREATE TRIGGER employees_undeletable BEFORE DELETE ON employees \
             BEGIN SELECT RAISE(ABORT, 'employees are undeletable'); END",
        )
        .await;
        let app = test::init_service(App::new().configure(crate::configure_app(state.clone()))).await;

        let req = test::TestRequest::delete()
            .uri(&format!("/api/v1/employees/{}", original.id))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: EmployeeResponse = test::read_body_json(resp).await;
        assert_eq!(body.error_message.as_deref(), Some("internal error"));

        let mut session = DbSession::acquire(&state.db).await.unwrap();
        let stored = state.employees.get_by_id(session.conn(), original.id).await.unwrap();
        assert_eq!(stored, Some(original));
    }
}

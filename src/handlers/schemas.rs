use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::models::employee::{Employee, EmployeeChanges};

pub const DEFAULT_OFFSET: i64 = 0;
pub const DEFAULT_LIMIT: i64 = 500;

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmployeePayload {
    #[validate(length(min = 1))]
    #[schema(example = "123456789")]
    pub identification_code: String,
    #[schema(example = "1991-07-04")]
    pub birth_date: NaiveDate,
    pub first_name: String,
    pub last_name: String,
    #[validate(email)]
    #[schema(example = "noa.cohen@example.com")]
    pub email: String,
    pub city: String,
    pub country: String,
    pub street: String,
    pub building_number: String,
}

pub type EmployeePostRequest = EmployeePayload;

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct EmployeePutRequest {
    /// Target row; when absent the row is looked up by `identificationCode`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(flatten)]
    #[validate]
    pub employee: EmployeePayload,
}

impl From<&EmployeePayload> for EmployeeChanges {
    fn from(payload: &EmployeePayload) -> Self {
        EmployeeChanges {
            identification_code: payload.identification_code.clone(),
            birth_date: Some(payload.birth_date),
            first_name: Some(payload.first_name.clone()),
            last_name: Some(payload.last_name.clone()),
            email: Some(payload.email.clone()),
            city: Some(payload.city.clone()),
            country: Some(payload.country.clone()),
            street: Some(payload.street.clone()),
            building_number: Some(payload.building_number.clone()),
        }
    }
}

#[derive(Debug, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListParams {
    /// Rows to skip, 0 when absent.
    #[validate(range(min = 0))]
    pub offset: Option<i64>,
    /// Maximum rows returned, 500 when absent.
    #[validate(range(min = 0))]
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeEntry {
    pub id: i64,
    pub identification_code: String,
    pub birth_date: Option<NaiveDate>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub street: Option<String>,
    pub building_number: Option<String>,
}

impl From<Employee> for EmployeeEntry {
    fn from(employee: Employee) -> Self {
        EmployeeEntry {
            id: employee.id,
            identification_code: employee.identification_code,
            birth_date: employee.birth_date,
            first_name: employee.first_name,
            last_name: employee.last_name,
            email: employee.email,
            city: employee.city,
            country: employee.country,
            street: employee.street,
            building_number: employee.building_number,
        }
    }
}

/// Envelope shared by every employee endpoint: one of `entry`/`entries` on success,
/// `errorMessage` on failure.
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry: Option<EmployeeEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entries: Option<Vec<EmployeeEntry>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl EmployeeResponse {
    pub fn entry(employee: Employee) -> Self {
        EmployeeResponse {
            entry: Some(employee.into()),
            ..Default::default()
        }
    }

    pub fn entries(employees: Vec<Employee>) -> Self {
        EmployeeResponse {
            entries: Some(employees.into_iter().map(EmployeeEntry::from).collect()),
            ..Default::default()
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        EmployeeResponse {
            error_message: Some(message.into()),
            ..Default::default()
        }
    }
}

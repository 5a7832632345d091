use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use sqlx::any::AnyRow;
use sqlx::{FromRow, Row};

use crate::repository::{Changeset, Record, SqlValue};

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Employee {
    pub id: i64,
    pub identification_code: String,
    pub create_time: DateTime<Utc>,
    pub birth_date: Option<NaiveDate>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub street: Option<String>,
    pub building_number: Option<String>,
}

// Dates travel as text through the `Any` driver and are parsed back here.
impl<'r> FromRow<'r, AnyRow> for Employee {
    fn from_row(row: &'r AnyRow) -> Result<Self, sqlx::Error> {
        let create_time: String = row.try_get("create_time")?;
        let birth_date: Option<String> = row.try_get("birth_date")?;

        Ok(Employee {
            id: row.try_get("id")?,
            identification_code: row.try_get("identification_code")?,
            create_time: DateTime::parse_from_rfc3339(&create_time)
                .map(|ts| ts.with_timezone(&Utc))
                .map_err(|err| decode_error("create_time", err))?,
            birth_date: birth_date
                .map(|date| NaiveDate::parse_from_str(&date, "%Y-%m-%d"))
                .transpose()
                .map_err(|err| decode_error("birth_date", err))?,
            first_name: row.try_get("first_name")?,
            last_name: row.try_get("last_name")?,
            email: row.try_get("email")?,
            city: row.try_get("city")?,
            country: row.try_get("country")?,
            street: row.try_get("street")?,
            building_number: row.try_get("building_number")?,
        })
    }
}

fn decode_error(column: &str, err: chrono::ParseError) -> sqlx::Error {
    sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(err),
    }
}

impl Record for Employee {
    const TABLE: &'static str = "employees";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "identification_code",
        "create_time",
        "birth_date",
        "first_name",
        "last_name",
        "email",
        "city",
        "country",
        "street",
        "building_number",
    ];
    const CREATED_AT_COLUMN: &'static str = "create_time";

    type Changes = EmployeeChanges;

    fn id(&self) -> i64 {
        self.id
    }
}

/// Every mutable employee column. Updates replace all of them at once.
#[derive(Debug, Clone, PartialEq)]
pub struct EmployeeChanges {
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

impl Changeset for EmployeeChanges {
    fn values(&self) -> Vec<(&'static str, SqlValue)> {
        vec![
            ("identification_code", self.identification_code.clone().into()),
            (
                "birth_date",
                SqlValue::Text(self.birth_date.map(|d| d.format("%Y-%m-%d").to_string())),
            ),
            ("first_name", self.first_name.clone().into()),
            ("last_name", self.last_name.clone().into()),
            ("email", self.email.clone().into()),
            ("city", self.city.clone().into()),
            ("country", self.country.clone().into()),
            ("street", self.street.clone().into()),
            ("building_number", self.building_number.clone().into()),
        ]
    }
}

/// How a request names an employee: primary key or identification code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmployeeKey {
    Id(i64),
    Code(String),
}

impl EmployeeKey {
    /// Digits-only input that fits an `i64` is an id, anything else is a code.
    pub fn parse(raw: &str) -> Self {
        if !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(id) = raw.parse() {
                return EmployeeKey::Id(id);
            }
        }
        EmployeeKey::Code(raw.to_string())
    }
}

impl fmt::Display for EmployeeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmployeeKey::Id(id) => write!(f, "id={}", id),
            EmployeeKey::Code(code) => write!(f, "identification_code={}", code),
        }
    }
}

use std::ops::Deref;

use sqlx::AnyConnection;

use crate::models::employee::{Employee, EmployeeKey};
use crate::repository::{RepoResult, Repository, SqlValue};

/// Employee access: the generic repository plus lookups by identification code.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmployeeRepository {
    base: Repository<Employee>,
}

impl EmployeeRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get_by_identification_code(
        &self,
        conn: &mut AnyConnection,
        code: &str,
    ) -> RepoResult<Option<Employee>> {
        self.base
            .find_first_by(conn, "identification_code", SqlValue::from(code))
            .await
    }

    pub async fn find(&self, conn: &mut AnyConnection, key: &EmployeeKey) -> RepoResult<Option<Employee>> {
        match key {
            EmployeeKey::Id(id) => self.base.get_by_id(conn, *id).await,
            EmployeeKey::Code(code) => self.get_by_identification_code(conn, code).await,
        }
    }
}

impl Deref for EmployeeRepository {
    type Target = Repository<Employee>;

    fn deref(&self) -> &Self::Target {
        &self.base
    }
}

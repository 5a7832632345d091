use actix_web::dev::Payload;
use actix_web::{web, FromRequest, HttpRequest};
use futures_util::future::LocalBoxFuture;
use log::error;
use sqlx::AnyConnection;
use sqlx::pool::PoolConnection;
use sqlx::Any;

use crate::db::Database;
use crate::errors::AppError;
use crate::AppState;

/// A pooled connection held for the lifetime of one request.
pub struct DbSession {
    conn: PoolConnection<Any>,
}

impl DbSession {
    pub async fn acquire(db: &Database) -> Result<Self, sqlx::Error> {
        let conn = db.pool().acquire().await?;
        Ok(DbSession { conn })
    }

    pub fn conn(&mut self) -> &mut AnyConnection {
        &mut self.conn
    }
}

impl FromRequest for DbSession {
    type Error = AppError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let state = req.app_data::<web::Data<AppState>>().cloned();

        Box::pin(async move {
            let state = state.ok_or_else(|| {
                error!("application state is not registered");
                AppError::Internal
            })?;

            DbSession::acquire(&state.db).await.map_err(|err| {
                error!("failed to open database session: {}", err);
                AppError::Internal
            })
        })
    }
}

use crate::domain::{models::closure::ScheduleClosure, ports::ClosureRepository};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{PgPool, Row};

pub struct PostgresClosureRepo {
    pool: PgPool,
}

impl PostgresClosureRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ClosureRepository for PostgresClosureRepo {
    async fn exists_for(&self, date: NaiveDate, reason: &str) -> Result<bool, AppError> {
        let row = sqlx::query(
            "SELECT COUNT(*) as count FROM schedule_closures WHERE date = $1 AND reason = $2"
        )
            .bind(date).bind(reason)
            .fetch_one(&self.pool).await.map_err(AppError::Database)?;
        Ok(row.get::<i64, _>("count") > 0)
    }

    async fn insert(&self, closure: &ScheduleClosure) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO schedule_closures (id, date, start_time, end_time, reason, created_at)
             VALUES ($1, $2, $3, $4, $5, $6)"
        )
            .bind(&closure.id).bind(closure.date).bind(closure.start_time)
            .bind(closure.end_time).bind(&closure.reason).bind(closure.created_at)
            .execute(&self.pool).await.map_err(AppError::Database)?;
        Ok(())
    }
}

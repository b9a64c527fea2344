use crate::domain::{
    models::payment::{CardDetails, Payment, RefundDetails},
    ports::{InsertOutcome, PaymentRepository},
};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

pub struct PostgresPaymentRepo {
    pool: PgPool,
}

impl PostgresPaymentRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PaymentRepository for PostgresPaymentRepo {
    async fn insert(&self, payment: &Payment) -> Result<InsertOutcome<Payment>, AppError> {
        let result = sqlx::query_as::<_, Payment>(
            "INSERT INTO payments (id, booking_id, intent_id, charge_id, status, failure_reason, card_brand, card_last4, card_exp_month, card_exp_year, receipt_url, refund_id, refund_amount, refund_reason, completed_at, failed_at, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
             RETURNING *"
        )
            .bind(&payment.id).bind(&payment.booking_id).bind(&payment.intent_id)
            .bind(&payment.charge_id).bind(&payment.status).bind(&payment.failure_reason)
            .bind(&payment.card_brand).bind(&payment.card_last4).bind(payment.card_exp_month)
            .bind(payment.card_exp_year).bind(&payment.receipt_url).bind(&payment.refund_id)
            .bind(payment.refund_amount).bind(&payment.refund_reason).bind(payment.completed_at)
            .bind(payment.failed_at).bind(payment.created_at)
            .fetch_one(&self.pool).await;

        match result {
            Ok(created) => Ok(InsertOutcome::Created(created)),
            Err(e) => {
                let err = AppError::Database(e);
                if err.is_unique_violation() {
                    Ok(InsertOutcome::Duplicate)
                } else {
                    Err(err)
                }
            }
        }
    }

    async fn find_by_intent(&self, intent_id: &str) -> Result<Option<Payment>, AppError> {
        sqlx::query_as::<_, Payment>("SELECT * FROM payments WHERE intent_id = $1")
            .bind(intent_id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn find_by_charge(&self, charge_id: &str) -> Result<Option<Payment>, AppError> {
        sqlx::query_as::<_, Payment>("SELECT * FROM payments WHERE charge_id = $1")
            .bind(charge_id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn mark_succeeded(
        &self,
        intent_id: &str,
        charge_id: Option<&str>,
        card: &CardDetails,
        at: DateTime<Utc>,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE payments SET status = 'SUCCEEDED', charge_id = $1, card_brand = $2, card_last4 = $3, card_exp_month = $4, card_exp_year = $5, receipt_url = $6, completed_at = $7
             WHERE intent_id = $8 AND status != 'REFUNDED'"
        )
            .bind(charge_id).bind(&card.brand).bind(&card.last4).bind(card.exp_month)
            .bind(card.exp_year).bind(&card.receipt_url).bind(at).bind(intent_id)
            .execute(&self.pool).await.map_err(AppError::Database)?;
        Ok(result.rows_affected() > 0)
    }

    async fn mark_failed(
        &self,
        intent_id: &str,
        reason: &str,
        at: DateTime<Utc>,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE payments SET status = 'FAILED', failure_reason = $1, failed_at = $2
             WHERE intent_id = $3 AND status NOT IN ('SUCCEEDED', 'REFUNDED')"
        )
            .bind(reason).bind(at).bind(intent_id)
            .execute(&self.pool).await.map_err(AppError::Database)?;
        Ok(result.rows_affected() > 0)
    }

    async fn set_status(&self, intent_id: &str, status: &str) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE payments SET status = $1
             WHERE intent_id = $2 AND status IN ('REQUIRES_ACTION', 'PROCESSING')"
        )
            .bind(status).bind(intent_id)
            .execute(&self.pool).await.map_err(AppError::Database)?;
        Ok(result.rows_affected() > 0)
    }

    async fn mark_refunded(&self, charge_id: &str, refund: &RefundDetails) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE payments SET status = 'REFUNDED', refund_id = $1, refund_amount = $2, refund_reason = $3
             WHERE charge_id = $4 AND status != 'REFUNDED'"
        )
            .bind(&refund.refund_id).bind(refund.amount).bind(&refund.reason)
            .bind(charge_id)
            .execute(&self.pool).await.map_err(AppError::Database)?;
        Ok(result.rows_affected() > 0)
    }
}

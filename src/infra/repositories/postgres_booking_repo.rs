use crate::domain::{models::booking::Booking, ports::{BookingRepository, InsertOutcome}};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

pub struct PostgresBookingRepo {
    pool: PgPool,
}

impl PostgresBookingRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookingRepository for PostgresBookingRepo {
    async fn insert(&self, booking: &Booking) -> Result<InsertOutcome<Booking>, AppError> {
        let result = sqlx::query_as::<_, Booking>(
            "INSERT INTO bookings (id, space_type, date, start_time, end_time, number_of_people, reservation_type, total_price, additional_services, user_id, contact_name, contact_email, contact_phone, company_name, message, invoice_requested, invoice_details, confirmation_number, status, payment_status, attendance_status, payment_intent_id, setup_intent_id, customer_id, capture_method, deposit_amount, requires_payment, is_partial, cancellation_reason, created_at, confirmed_at, cancelled_at, completed_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19, $20, $21, $22, $23, $24, $25, $26, $27, $28, $29, $30, $31, $32, $33)
             RETURNING *"
        )
            .bind(&booking.id).bind(&booking.space_type).bind(booking.date).bind(booking.start_time)
            .bind(booking.end_time).bind(booking.number_of_people).bind(&booking.reservation_type)
            .bind(booking.total_price).bind(&booking.additional_services).bind(&booking.user_id)
            .bind(&booking.contact_name).bind(&booking.contact_email).bind(&booking.contact_phone)
            .bind(&booking.company_name).bind(&booking.message).bind(booking.invoice_requested)
            .bind(&booking.invoice_details).bind(&booking.confirmation_number).bind(&booking.status)
            .bind(&booking.payment_status).bind(&booking.attendance_status)
            .bind(&booking.payment_intent_id).bind(&booking.setup_intent_id).bind(&booking.customer_id)
            .bind(&booking.capture_method).bind(booking.deposit_amount).bind(booking.requires_payment)
            .bind(booking.is_partial).bind(&booking.cancellation_reason).bind(booking.created_at)
            .bind(booking.confirmed_at).bind(booking.cancelled_at).bind(booking.completed_at)
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

    async fn find_by_id(&self, id: &str) -> Result<Option<Booking>, AppError> {
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = $1")
            .bind(id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn find_by_correlation_id(&self, correlation_id: &str) -> Result<Option<Booking>, AppError> {
        sqlx::query_as::<_, Booking>(
            "SELECT * FROM bookings WHERE payment_intent_id = $1 OR setup_intent_id = $1"
        )
            .bind(correlation_id)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn set_payment_status(&self, id: &str, payment_status: &str) -> Result<(), AppError> {
        sqlx::query("UPDATE bookings SET payment_status = $1 WHERE id = $2")
            .bind(payment_status).bind(id)
            .execute(&self.pool).await.map_err(AppError::Database)?;
        Ok(())
    }

    async fn mark_paid_and_confirmed(&self, id: &str, at: DateTime<Utc>) -> Result<(), AppError> {
        sqlx::query(
            "UPDATE bookings SET payment_status = 'PAID', status = 'CONFIRMED', confirmed_at = $1
             WHERE id = $2 AND status != 'CANCELLED'"
        )
            .bind(at).bind(id)
            .execute(&self.pool).await.map_err(AppError::Database)?;
        Ok(())
    }

    async fn mark_confirmed(&self, id: &str, at: DateTime<Utc>) -> Result<Booking, AppError> {
        sqlx::query_as::<_, Booking>(
            "UPDATE bookings SET status = 'CONFIRMED', confirmed_at = $1
             WHERE id = $2 AND status != 'CANCELLED'
             RETURNING *"
        )
            .bind(at).bind(id)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)?
            .ok_or(AppError::Conflict("Booking can no longer be confirmed".into()))
    }

    async fn mark_cancelled(
        &self,
        id: &str,
        reason: Option<&str>,
        at: DateTime<Utc>,
    ) -> Result<Booking, AppError> {
        sqlx::query_as::<_, Booking>(
            "UPDATE bookings SET status = 'CANCELLED', cancellation_reason = $1, cancelled_at = $2
             WHERE id = $3
             RETURNING *"
        )
            .bind(reason).bind(at).bind(id)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)?
            .ok_or(AppError::NotFound("Booking not found".into()))
    }

    async fn set_attendance(&self, id: &str, attendance_status: &str) -> Result<Booking, AppError> {
        sqlx::query_as::<_, Booking>(
            "UPDATE bookings SET attendance_status = $1 WHERE id = $2 RETURNING *"
        )
            .bind(attendance_status).bind(id)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)?
            .ok_or(AppError::NotFound("Booking not found".into()))
    }
}

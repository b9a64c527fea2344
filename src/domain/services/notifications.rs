use crate::domain::models::booking::Booking;
use crate::domain::ports::{AdminNotifier, EmailService};
use crate::domain::services::cancellation::format_amount;
use std::sync::Arc;
use tera::Tera;
use tracing::warn;

/// Booking-lifecycle notifications are a message-passing boundary: the state
/// transition must succeed, the notification may fail silently. Every send
/// here runs in a detached task and only logs its outcome, so notification
/// latency or failure can never bleed into the webhook response or roll back
/// booking state.
fn spawn_email(
    email: Arc<dyn EmailService>,
    templates: Arc<Tera>,
    template: &'static str,
    subject: String,
    recipient: String,
    context: tera::Context,
) {
    if recipient.is_empty() {
        warn!("Skipping '{}' notification: booking has no contact email", template);
        return;
    }

    tokio::spawn(async move {
        let html = match templates.render(template, &context) {
            Ok(html) => html,
            Err(e) => {
                warn!("Failed to render template {}: {:?}", template, e);
                return;
            }
        };

        if let Err(e) = email.send(&recipient, &subject, &html).await {
            warn!("Failed to send '{}' email to {}: {:?}", template, recipient, e);
        }
    });
}

pub fn spawn_admin_alert(
    notifier: Arc<dyn AdminNotifier>,
    booking_id: String,
    title: &'static str,
    body: String,
) {
    tokio::spawn(async move {
        if let Err(e) = notifier.push(&booking_id, title, &body).await {
            warn!("Failed to push admin alert for booking {}: {:?}", booking_id, e);
        }
    });
}

fn booking_context(booking: &Booking) -> tera::Context {
    let mut context = tera::Context::new();
    context.insert("contact_name", &booking.contact_name);
    context.insert("confirmation_number", &booking.confirmation_number);
    context.insert("space_type", &booking.space_type);
    context.insert("date", &booking.date.to_string());
    context.insert(
        "time_range",
        &match (booking.start_time, booking.end_time) {
            (Some(start), Some(end)) => {
                format!("{} - {}", start.format("%H:%M"), end.format("%H:%M"))
            }
            (Some(start), None) => format!("from {}", start.format("%H:%M")),
            _ => "full day".to_string(),
        },
    );
    context.insert("number_of_people", &booking.number_of_people);
    context.insert("total_price", &format_amount(booking.total_price));
    context.insert("deposit_amount", &format_amount(booking.deposit_amount));
    context
}

pub fn booking_received(email: Arc<dyn EmailService>, templates: Arc<Tera>, booking: &Booking) {
    spawn_email(
        email,
        templates,
        "booking_received.html",
        format!("Booking request received - {}", booking.confirmation_number),
        booking.contact_email.clone(),
        booking_context(booking),
    );
}

pub fn booking_confirmed(email: Arc<dyn EmailService>, templates: Arc<Tera>, booking: &Booking) {
    spawn_email(
        email,
        templates,
        "booking_confirmed.html",
        format!("Booking confirmed - {}", booking.confirmation_number),
        booking.contact_email.clone(),
        booking_context(booking),
    );
}

/// Rejection of a still-pending booking. The reason reaches the customer;
/// this template is distinct from the confirmed-cancellation one.
pub fn booking_rejected(
    email: Arc<dyn EmailService>,
    templates: Arc<Tera>,
    booking: &Booking,
    reason: Option<&str>,
) {
    let mut context = booking_context(booking);
    context.insert("reason", &reason.unwrap_or("No reason provided"));

    spawn_email(
        email,
        templates,
        "booking_rejected.html",
        format!("Booking request declined - {}", booking.confirmation_number),
        booking.contact_email.clone(),
        context,
    );
}

/// Cancellation of a previously-confirmed booking. No reason field.
pub fn booking_cancelled(email: Arc<dyn EmailService>, templates: Arc<Tera>, booking: &Booking) {
    spawn_email(
        email,
        templates,
        "booking_cancelled.html",
        format!("Booking cancelled - {}", booking.confirmation_number),
        booking.contact_email.clone(),
        booking_context(booking),
    );
}

/// Deposit outcome after attendance is recorded. Uses the deposit figure
/// already held on the booking, never a recomputation.
pub fn deposit_notice(
    email: Arc<dyn EmailService>,
    templates: Arc<Tera>,
    booking: &Booking,
    captured: bool,
) {
    let (template, subject) = if captured {
        (
            "deposit_captured.html",
            format!("Deposit charged - {}", booking.confirmation_number),
        )
    } else {
        (
            "deposit_released.html",
            format!("Deposit released - {}", booking.confirmation_number),
        )
    };

    spawn_email(
        email,
        templates,
        template,
        subject,
        booking.contact_email.clone(),
        booking_context(booking),
    );
}

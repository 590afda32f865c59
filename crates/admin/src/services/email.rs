//! Order status notifications.
//!
//! Uses SMTP via lettre for delivery with Askama templates.

use askama::Template;
use chrono::{Datelike, Utc};
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{MultiPart, SinglePart, header::ContentType},
    transport::smtp::{Error as SmtpError, authentication::Credentials},
};
use secrecy::ExposeSecret;
use thiserror::Error;
use tracing::instrument;

use i1fashion_core::Order;

use crate::config::EmailConfig;

#[derive(Template)]
#[template(path = "email/order_status.html")]
struct OrderStatusEmailHtml<'a> {
    customer_name: &'a str,
    order_number: &'a str,
    status: &'a str,
    message: &'a str,
    tracking: Option<&'a str>,
    year: i32,
}

#[derive(Template)]
#[template(path = "email/order_status.txt")]
struct OrderStatusEmailText<'a> {
    customer_name: &'a str,
    order_number: &'a str,
    status: &'a str,
    message: &'a str,
    tracking: Option<&'a str>,
}

/// Errors that can occur when sending email.
#[derive(Debug, Error)]
pub enum EmailError {
    /// SMTP transport error.
    #[error("SMTP error: {0}")]
    Smtp(#[from] SmtpError),

    /// Failed to build email message.
    #[error("Failed to build message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    /// Invalid email address.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    /// Template rendering error.
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),
}

/// Email service for order notifications.
#[derive(Clone)]
pub struct EmailService {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
}

impl EmailService {
    /// Create a new email service from configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the SMTP relay cannot be configured.
    pub fn new(config: &EmailConfig) -> Result<Self, SmtpError> {
        let credentials = Credentials::new(
            config.smtp_username.clone(),
            config.smtp_password.expose_secret().to_string(),
        );

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port)
            .credentials(credentials)
            .build();

        Ok(Self {
            mailer,
            from_address: config.from_address.clone(),
        })
    }

    /// Tell the customer their order moved to its current status.
    ///
    /// # Errors
    ///
    /// Returns error if email fails to send or template fails to render.
    #[instrument(skip(self, order), fields(order_number = %order.order_number, status = %order.status))]
    pub async fn send_status_update(&self, order: &Order) -> Result<(), EmailError> {
        let (html, text) = render_status_update(order)?;
        let subject = format!("Order Update - {} | i1Fashion", order.order_number);

        self.send_multipart_email(order.customer_email.as_str(), &subject, &text, &html)
            .await
    }

    /// Send a multipart email with both plain text and HTML versions.
    async fn send_multipart_email(
        &self,
        to: &str,
        subject: &str,
        text_body: &str,
        html_body: &str,
    ) -> Result<(), EmailError> {
        let email = Message::builder()
            .from(
                self.from_address
                    .parse()
                    .map_err(|_| EmailError::InvalidAddress(self.from_address.clone()))?,
            )
            .to(to
                .parse()
                .map_err(|_| EmailError::InvalidAddress(to.to_string()))?)
            .subject(subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(text_body.to_string()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(html_body.to_string()),
                    ),
            )?;

        self.mailer.send(email).await?;

        tracing::info!(to = %to, subject = %subject, "Email sent successfully");
        Ok(())
    }
}

/// Carrier and tracking number as one line, when there is a tracking number.
fn tracking_line(order: &Order) -> Option<String> {
    let number = order.tracking_number.as_deref()?;
    Some(match order.carrier.as_deref() {
        Some(carrier) => format!("{carrier} {number}"),
        None => number.to_string(),
    })
}

/// Render the HTML and plain text bodies.
fn render_status_update(order: &Order) -> Result<(String, String), askama::Error> {
    let order_number = order.order_number.to_string();
    let tracking = tracking_line(order);

    let html = OrderStatusEmailHtml {
        customer_name: &order.customer_name,
        order_number: &order_number,
        status: order.status.label(),
        message: order.status.customer_message(),
        tracking: tracking.as_deref(),
        year: Utc::now().year(),
    }
    .render()?;
    let text = OrderStatusEmailText {
        customer_name: &order.customer_name,
        order_number: &order_number,
        status: order.status.label(),
        message: order.status.customer_message(),
        tracking: tracking.as_deref(),
    }
    .render()?;

    Ok((html, text))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use i1fashion_core::{
        Email, OrderId, OrderNumber, OrderStatus, PaymentMethod, PaymentStatus, UserId,
    };
    use rust_decimal::Decimal;

    use super::*;

    fn shipped_order() -> Order {
        let now = Utc::now();
        Order {
            id: OrderId::generate(),
            user_id: UserId::generate(),
            order_number: OrderNumber::parse("ORD-20260315-0427").unwrap(),
            status: OrderStatus::Shipped,
            subtotal: Decimal::new(1299, 0),
            tax_amount: Decimal::ZERO,
            shipping_amount: Decimal::ZERO,
            discount_amount: Decimal::ZERO,
            total_amount: Decimal::new(1299, 0),
            payment_method: PaymentMethod::CashOnDelivery,
            payment_status: PaymentStatus::Pending,
            customer_name: "Arjun <Rao>".to_string(),
            customer_email: Email::parse("arjun@example.in").unwrap(),
            customer_phone: "9876543210".to_string(),
            shipping_address: "4 Park Street".to_string(),
            shipping_city: "Kolkata".to_string(),
            shipping_state: "West Bengal".to_string(),
            shipping_postal_code: "700016".to_string(),
            shipping_country: "India".to_string(),
            tracking_number: Some("DL123456789IN".to_string()),
            carrier: Some("Delhivery".to_string()),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_status_update_text() {
        let (_, text) = render_status_update(&shipped_order()).unwrap();

        assert!(text.contains("Order #ORD-20260315-0427: Shipped"));
        assert!(text.contains("has been shipped and is on its way"));
        assert!(text.contains("Tracking: Delhivery DL123456789IN"));
    }

    #[test]
    fn test_status_update_html_escapes_name() {
        let (html, _) = render_status_update(&shipped_order()).unwrap();

        assert!(!html.contains("<Rao>"));
        assert!(html.contains("&lt;Rao&gt;"));
    }

    #[test]
    fn test_tracking_line() {
        let mut order = shipped_order();
        assert_eq!(
            tracking_line(&order).as_deref(),
            Some("Delhivery DL123456789IN")
        );

        order.carrier = None;
        assert_eq!(tracking_line(&order).as_deref(), Some("DL123456789IN"));

        order.tracking_number = None;
        assert_eq!(tracking_line(&order), None);
    }
}

//! Transactional email for customers.
//!
//! Uses SMTP via lettre for delivery with Askama templates. Every message is
//! sent as `multipart/alternative` with a plain text and an HTML part.

use askama::Template;
use chrono::{Datelike, Utc};
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{MultiPart, SinglePart, header::ContentType},
    transport::smtp::{Error as SmtpError, authentication::Credentials},
};
use rand::Rng;
use secrecy::ExposeSecret;
use thiserror::Error;
use tracing::instrument;

use i1fashion_core::{OrderWithItems, Price};

use crate::config::EmailConfig;

/// Subject line of the verification code email.
pub const OTP_SUBJECT: &str = "Verify Your Email - i1Fashion";

/// Prefix added to ad-hoc message subjects.
pub const MESSAGE_SUBJECT_PREFIX: &str = "[i1Fashion] ";

#[derive(Template)]
#[template(path = "email/otp.html")]
struct OtpEmailHtml<'a> {
    code: &'a str,
    expires_minutes: i64,
}

#[derive(Template)]
#[template(path = "email/otp.txt")]
struct OtpEmailText<'a> {
    code: &'a str,
    expires_minutes: i64,
}

#[derive(Template)]
#[template(path = "email/order_confirmation.html")]
struct OrderConfirmationHtml<'a> {
    order: &'a OrderEmailView,
}

#[derive(Template)]
#[template(path = "email/order_confirmation.txt")]
struct OrderConfirmationText<'a> {
    order: &'a OrderEmailView,
}

#[derive(Template)]
#[template(path = "email/message.html")]
struct MessageEmailHtml<'a> {
    subject: &'a str,
    message: &'a str,
    year: i32,
}

#[derive(Template)]
#[template(path = "email/message.txt")]
struct MessageEmailText<'a> {
    message: &'a str,
}

/// Display-ready order fields shared by both confirmation templates.
struct OrderEmailView {
    customer_name: String,
    customer_phone: String,
    order_number: String,
    order_date: String,
    payment_method: &'static str,
    status: &'static str,
    shipping_address: String,
    shipping_city: String,
    shipping_state: String,
    shipping_postal_code: String,
    lines: Vec<OrderEmailLine>,
    total_amount: String,
}

struct OrderEmailLine {
    product_name: String,
    color: String,
    size: String,
    quantity: i32,
    unit_price: String,
    total_price: String,
}

impl From<&OrderWithItems> for OrderEmailView {
    fn from(placed: &OrderWithItems) -> Self {
        let order = &placed.order;
        Self {
            customer_name: order.customer_name.clone(),
            customer_phone: order.customer_phone.clone(),
            order_number: order.order_number.to_string(),
            order_date: order.created_at.format("%d %b %Y").to_string(),
            payment_method: order.payment_method.label(),
            status: order.status.label(),
            shipping_address: order.shipping_address.clone(),
            shipping_city: order.shipping_city.clone(),
            shipping_state: order.shipping_state.clone(),
            shipping_postal_code: order.shipping_postal_code.clone(),
            lines: placed
                .order_items
                .iter()
                .map(|item| OrderEmailLine {
                    product_name: item.product_name.clone(),
                    color: item.variant_color.clone(),
                    size: item.variant_size.clone(),
                    quantity: item.quantity,
                    unit_price: Price::inr(item.unit_price).to_string(),
                    total_price: Price::inr(item.total_price).to_string(),
                })
                .collect(),
            total_amount: Price::inr(order.total_amount).to_string(),
        }
    }
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

/// Email service for customer-facing messages.
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

    /// Send a one-time verification code.
    ///
    /// # Errors
    ///
    /// Returns error if email fails to send or template fails to render.
    #[instrument(skip(self, code))]
    pub async fn send_otp(
        &self,
        to: &str,
        code: &str,
        expires_minutes: i64,
    ) -> Result<(), EmailError> {
        let html = OtpEmailHtml {
            code,
            expires_minutes,
        }
        .render()?;
        let text = OtpEmailText {
            code,
            expires_minutes,
        }
        .render()?;

        self.send_multipart_email(to, OTP_SUBJECT, &text, &html)
            .await
    }

    /// Send the order confirmation to the address on the order.
    ///
    /// # Errors
    ///
    /// Returns error if email fails to send or template fails to render.
    #[instrument(skip(self, placed), fields(order_number = %placed.order.order_number))]
    pub async fn send_order_confirmation(&self, placed: &OrderWithItems) -> Result<(), EmailError> {
        let view = OrderEmailView::from(placed);
        let html = OrderConfirmationHtml { order: &view }.render()?;
        let text = OrderConfirmationText { order: &view }.render()?;
        let subject = format!(
            "Order Confirmation - {} | i1Fashion",
            placed.order.order_number
        );

        self.send_multipart_email(placed.order.customer_email.as_str(), &subject, &text, &html)
            .await
    }

    /// Send a free-form message wrapped in the store layout.
    ///
    /// # Errors
    ///
    /// Returns error if email fails to send or template fails to render.
    #[instrument(skip(self, message))]
    pub async fn send_message(
        &self,
        to: &str,
        subject: &str,
        message: &str,
    ) -> Result<(), EmailError> {
        let html = MessageEmailHtml {
            subject,
            message,
            year: Utc::now().year(),
        }
        .render()?;
        let text = MessageEmailText { message }.render()?;

        self.send_multipart_email(to, &format!("{MESSAGE_SUBJECT_PREFIX}{subject}"), &text, &html)
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

/// Generate a 6-digit verification code.
#[must_use]
pub fn generate_verification_code() -> String {
    let code: u32 = rand::rng().random_range(100_000..1_000_000);
    code.to_string()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use i1fashion_core::{
        Email, Order, OrderId, OrderItem, OrderItemId, OrderNumber, OrderStatus, PaymentMethod,
        PaymentStatus, UserId,
    };
    use rust_decimal::Decimal;

    use super::*;

    fn placed_order() -> OrderWithItems {
        let now = Utc::now();
        let order_id = OrderId::generate();
        OrderWithItems {
            order: Order {
                id: order_id,
                user_id: UserId::generate(),
                order_number: OrderNumber::parse("ORD-20260315-0427").unwrap(),
                status: OrderStatus::Pending,
                subtotal: Decimal::new(2598, 0),
                tax_amount: Decimal::ZERO,
                shipping_amount: Decimal::ZERO,
                discount_amount: Decimal::ZERO,
                total_amount: Decimal::new(2598, 0),
                payment_method: PaymentMethod::CashOnDelivery,
                payment_status: PaymentStatus::Pending,
                customer_name: "Priya <Sharma>".to_string(),
                customer_email: Email::parse("priya@example.in").unwrap(),
                customer_phone: "9876543210".to_string(),
                shipping_address: "12 MG Road, Indiranagar".to_string(),
                shipping_city: "Bengaluru".to_string(),
                shipping_state: "Karnataka".to_string(),
                shipping_postal_code: "560038".to_string(),
                shipping_country: "India".to_string(),
                tracking_number: None,
                carrier: None,
                created_at: now,
                updated_at: now,
            },
            order_items: vec![OrderItem {
                id: OrderItemId::generate(),
                order_id,
                product_id: None,
                variant_id: None,
                product_name: "Linen Shirt".to_string(),
                variant_name: "White - M".to_string(),
                variant_color: "White".to_string(),
                variant_size: "M".to_string(),
                quantity: 2,
                unit_price: Decimal::new(1299, 0),
                total_price: Decimal::new(2598, 0),
                image_url: None,
                created_at: now,
            }],
        }
    }

    #[test]
    fn test_generate_verification_code_format() {
        let code = generate_verification_code();
        assert_eq!(code.len(), 6);
        assert!(code.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_generate_verification_code_range() {
        for _ in 0..100 {
            let code: u32 = generate_verification_code().parse().unwrap();
            assert!((100_000..1_000_000).contains(&code));
        }
    }

    #[test]
    fn test_otp_templates_include_code_and_expiry() {
        let text = OtpEmailText {
            code: "482913",
            expires_minutes: 10,
        }
        .render()
        .unwrap();
        assert!(text.contains("482913"));
        assert!(text.contains("10 minutes"));
    }

    #[test]
    fn test_order_confirmation_renders_lines() {
        let placed = placed_order();
        let view = OrderEmailView::from(&placed);
        let text = OrderConfirmationText { order: &view }.render().unwrap();

        assert!(text.contains("ORD-20260315-0427"));
        assert!(text.contains("Linen Shirt (White, M) x 2"));
        assert!(text.contains("Cash on Delivery"));
    }

    #[test]
    fn test_order_confirmation_html_escapes_customer_input() {
        let placed = placed_order();
        let view = OrderEmailView::from(&placed);
        let html = OrderConfirmationHtml { order: &view }.render().unwrap();

        assert!(!html.contains("<Sharma>"));
        assert!(html.contains("&lt;Sharma&gt;"));
    }
}

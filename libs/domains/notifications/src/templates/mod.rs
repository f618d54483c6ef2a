//! Email template rendering engine.
//!
//! Bodies are plain text rendered with Handlebars (HTML escaping off,
//! strict mode on); subjects are formatted directly.

use crate::error::{NotificationError, NotificationResult};
use crate::models::{ConfirmToken, User};
use handlebars::Handlebars;
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use tracing::debug;

/// Rendered subject and plain-text body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedEmail {
    pub subject: String,
    pub body: String,
}

const TEST_EMAIL: &str = "test_email";
const PASSWORD_RESET: &str = "password_reset";
const WELCOME: &str = "welcome";
const ORDER_STATUS_BUYER: &str = "order_status_buyer";
const ORDER_STATUS_SHOP_OWNER: &str = "order_status_shop_owner";

const TEST_EMAIL_TEMPLATE: &str = "{{message}}";

const PASSWORD_RESET_TEMPLATE: &str = "{{key}}";

const WELCOME_TEMPLATE: &str = concat!(
    "Here's data about you:\n\n",
    "User ID: {{user.id}}\n",
    "Username: {{user.username}}\n",
    "Email: {{user.email}}\n",
    "Company: {{user.company}}\n",
    "Position: {{user.position}}\n",
    "Name: {{user.first_name}} {{user.last_name}}\n",
    "Confirmation token: {{key}}\n",
);

const ORDER_STATUS_BUYER_TEMPLATE: &str = concat!(
    "Order #{{order_id}} has been updated.\n Details:\n\n",
    "{{order}}\n\n",
    "Current Status: {{status}}\n\n",
);

const ORDER_STATUS_SHOP_OWNER_TEMPLATE: &str = concat!(
    "A new order #{{order_id}} has been received for your shop.\n\n",
    "Order Details:\n\n",
    "{{order}}\n\n",
    "Current Status: {{status}}\n\n",
);

/// Template engine holding every notification body.
#[derive(Clone)]
pub struct TemplateEngine {
    handlebars: Arc<Handlebars<'static>>,
}

impl TemplateEngine {
    pub fn new() -> NotificationResult<Self> {
        let mut handlebars = Handlebars::new();
        handlebars.register_escape_fn(handlebars::no_escape);
        handlebars.set_strict_mode(true);

        for (name, template) in [
            (TEST_EMAIL, TEST_EMAIL_TEMPLATE),
            (PASSWORD_RESET, PASSWORD_RESET_TEMPLATE),
            (WELCOME, WELCOME_TEMPLATE),
            (ORDER_STATUS_BUYER, ORDER_STATUS_BUYER_TEMPLATE),
            (ORDER_STATUS_SHOP_OWNER, ORDER_STATUS_SHOP_OWNER_TEMPLATE),
        ] {
            handlebars
                .register_template_string(name, template)
                .map_err(|e| {
                    NotificationError::Template(format!("Failed to register {}: {}", name, e))
                })?;
        }

        Ok(Self {
            handlebars: Arc::new(handlebars),
        })
    }

    fn render<T: Serialize>(&self, template_name: &str, data: &T) -> NotificationResult<String> {
        Ok(self.handlebars.render(template_name, data)?)
    }

    pub fn render_test_email(&self, address: &str, message: &str) -> NotificationResult<RenderedEmail> {
        Ok(RenderedEmail {
            subject: format!("Test message for {}", address),
            body: self.render(TEST_EMAIL, &json!({ "message": message }))?,
        })
    }

    pub fn render_password_reset(&self, user: &User, key: &str) -> NotificationResult<RenderedEmail> {
        debug!(user_id = user.id, "Rendering password reset email");

        Ok(RenderedEmail {
            subject: format!("Password Reset Token for {}", user.display_name()),
            body: self.render(PASSWORD_RESET, &json!({ "key": key }))?,
        })
    }

    pub fn render_welcome(&self, user: &User, token: &ConfirmToken) -> NotificationResult<RenderedEmail> {
        debug!(user_id = user.id, "Rendering welcome email");

        Ok(RenderedEmail {
            subject: format!("Thank you for the registration {}", user.email),
            body: self.render(WELCOME, &json!({ "user": user, "key": token.key }))?,
        })
    }

    /// Buyer copy; `order_json` is the pretty-printed snapshot.
    pub fn render_order_status_buyer(
        &self,
        order_id: i64,
        order_json: &str,
        status: &str,
    ) -> NotificationResult<RenderedEmail> {
        Ok(RenderedEmail {
            subject: format!("Order #{} Status Update", order_id),
            body: self.render(
                ORDER_STATUS_BUYER,
                &json!({ "order_id": order_id, "order": order_json, "status": status }),
            )?,
        })
    }

    pub fn render_order_status_shop_owner(
        &self,
        order_id: i64,
        order_json: &str,
        status: &str,
    ) -> NotificationResult<RenderedEmail> {
        Ok(RenderedEmail {
            subject: format!("New Order #{} Received", order_id),
            body: self.render(
                ORDER_STATUS_SHOP_OWNER,
                &json!({ "order_id": order_id, "order": order_json, "status": status }),
            )?,
        })
    }
}

//! Composes and sends the email for each notification task.

use crate::config::NotificationConfig;
use crate::error::{NotificationError, NotificationResult};
use crate::models::User;
use crate::providers::{EmailContent, EmailProvider};
use crate::repository::NotificationRepository;
use crate::tasks::NotificationTask;
use crate::templates::{RenderedEmail, TemplateEngine};
use crate::token_file::write_token_file;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct NotificationDispatcher<R, P> {
    repository: Arc<R>,
    provider: Arc<P>,
    templates: TemplateEngine,
    config: NotificationConfig,
}

impl<R, P> NotificationDispatcher<R, P>
where
    R: NotificationRepository,
    P: EmailProvider,
{
    pub fn new(
        repository: Arc<R>,
        provider: Arc<P>,
        templates: TemplateEngine,
        config: NotificationConfig,
    ) -> Self {
        Self {
            repository,
            provider,
            templates,
            config,
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Run one task to completion.
    pub async fn dispatch(&self, task: &NotificationTask) -> NotificationResult<()> {
        match task {
            NotificationTask::SendTestEmail { email, message } => {
                self.send_test_email(email, message).await
            }
            NotificationTask::PasswordResetTokenCreated { user_id, token } => {
                self.send_password_reset(*user_id, token).await
            }
            NotificationTask::NewUserRegistered { user_id } => self.send_welcome(*user_id).await,
            NotificationTask::OrderStatusChanged {
                user_id,
                order_id,
                status,
            } => self.send_order_status(*user_id, *order_id, status).await,
        }
    }

    pub async fn send_test_email(&self, address: &str, message: &str) -> NotificationResult<()> {
        let rendered = self.templates.render_test_email(address, message)?;
        self.deliver(address, rendered).await
    }

    pub async fn send_password_reset(&self, user_id: i64, token_key: &str) -> NotificationResult<()> {
        let user = self.load_user(user_id).await?;
        let rendered = self.templates.render_password_reset(&user, token_key)?;
        self.deliver(&user.email, rendered).await
    }

    /// Welcome email with the account's confirmation key.
    ///
    /// The key is reused across repeated registrations of the same user.
    pub async fn send_welcome(&self, user_id: i64) -> NotificationResult<()> {
        let user = self.load_user(user_id).await?;
        let (token, created) = self.repository.get_or_create_confirm_token(user_id).await?;
        debug!(user_id, created, "Confirmation token ready");

        let rendered = self.templates.render_welcome(&user, &token)?;

        if self.config.is_test_recipient(&user.email) {
            match &self.config.token_file {
                Some(path) => write_token_file(path, &token.key).await?,
                None => warn!(
                    user_id,
                    "Test recipient registered but no token file is configured, skipping dump"
                ),
            }
        }

        self.deliver(&user.email, rendered).await
    }

    /// Status update to the buyer, then a copy to the owner of the shop
    /// behind the first ordered item, if there is one.
    pub async fn send_order_status(
        &self,
        user_id: i64,
        order_id: i64,
        order_status: &str,
    ) -> NotificationResult<()> {
        let buyer = self.load_user(user_id).await?;
        let order = self
            .repository
            .get_order_snapshot(order_id)
            .await?
            .ok_or(NotificationError::OrderNotFound(order_id))?;
        let order_json = order.to_pretty_json()?;

        let rendered = self
            .templates
            .render_order_status_buyer(order_id, &order_json, order_status)?;
        self.deliver(&buyer.email, rendered).await?;

        let Some(owner) = self.repository.find_shop_owner(order_id).await? else {
            debug!(order_id, "No shop owner to notify");
            return Ok(());
        };

        let rendered = self
            .templates
            .render_order_status_shop_owner(order_id, &order_json, order_status)?;
        self.deliver(&owner.email, rendered).await
    }

    async fn load_user(&self, user_id: i64) -> NotificationResult<User> {
        self.repository
            .get_user(user_id)
            .await?
            .ok_or(NotificationError::UserNotFound(user_id))
    }

    async fn deliver(&self, to: &str, rendered: RenderedEmail) -> NotificationResult<()> {
        let email = EmailContent::new(to, rendered.subject, rendered.body);
        let sent = self.provider.send(&email).await?;

        info!(
            to = %email.to_email,
            subject = %email.subject,
            provider = self.provider.name(),
            message_id = ?sent.message_id,
            "Notification sent"
        );
        Ok(())
    }
}

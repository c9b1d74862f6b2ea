//! HTTP webhook escalation sink.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use reqwest::Client;
use tracing::{info, warn};

use super::{EscalationNotice, EscalationSink};
use crate::{AppError, Result};

/// Posts each notice as a JSON body to a fixed URL.
#[derive(Debug, Clone)]
pub struct WebhookSink {
    client: Client,
    url: String,
}

impl WebhookSink {
    /// Create a sink posting to `url` with a per-request `timeout`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Dispatch` if the HTTP client cannot be built.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| AppError::Dispatch(format!("failed to build http client: {err}")))?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    /// Target URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl EscalationSink for WebhookSink {
    fn deliver<'a>(
        &'a self,
        notice: &'a EscalationNotice,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
        Box::pin(async move {
            let response = self
                .client
                .post(&self.url)
                .json(notice)
                .send()
                .await
                .map_err(|err| {
                    warn!(url = %self.url, %err, "escalation webhook unreachable");
                    AppError::Dispatch(format!("webhook request failed: {err}"))
                })?;

            let status = response.status();
            if !status.is_success() {
                warn!(url = %self.url, %status, "escalation webhook refused notice");
                return Err(AppError::Dispatch(format!(
                    "webhook answered {status}"
                )));
            }

            info!(
                conversation_id = %notice.conversation_id,
                rule_id = %notice.rule_id,
                "escalation notice delivered"
            );
            Ok(())
        })
    }
}

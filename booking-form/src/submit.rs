//! Sending a finished reservation to the notifier.

use std::future::Future;

use shared::{NotificationResult, ReservationPayload};
use tracing::info;

use crate::FormError;

/// Default notifier route when running against a local deployment.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:9000/api/enviar-whatsapp";

/// Transport for one reservation submission.
///
/// An `Err` means the exchange itself failed; an `Ok` carries the notifier's
/// own verdict, successful or not.
pub trait Submitter: Send + Sync {
    fn submit(
        &self,
        payload: &ReservationPayload,
    ) -> impl Future<Output = Result<NotificationResult, FormError>> + Send;
}

/// Which alert the user sees after submitting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The notifier relayed the message.
    Sent { sid: Option<String> },
    /// The notifier answered but could not relay the message.
    Rejected { error: Option<String> },
    /// The request could not be completed.
    ConnectionFailed,
}

impl SubmitOutcome {
    pub fn alert(&self) -> &'static str {
        match self {
            SubmitOutcome::Sent { .. } => "✅ Reserva enviada con éxito!",
            SubmitOutcome::Rejected { .. } => "❌ Error al enviar la reserva.",
            SubmitOutcome::ConnectionFailed => "❌ Error de conexión.",
        }
    }
}

/// Posts the payload as JSON to the notifier endpoint.
#[derive(Debug, Clone)]
pub struct HttpSubmitter {
    http: reqwest::Client,
    endpoint: String,
}

impl HttpSubmitter {
    pub fn new(http: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            http,
            endpoint: endpoint.into(),
        }
    }

    /// Endpoint from `RESERVAS_ENDPOINT`, falling back to the local default.
    pub fn from_env(http: reqwest::Client) -> Self {
        let endpoint = std::env::var("RESERVAS_ENDPOINT").unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string());
        Self::new(http, endpoint)
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl Submitter for HttpSubmitter {
    async fn submit(&self, payload: &ReservationPayload) -> Result<NotificationResult, FormError> {
        let response = self
            .http
            .post(&self.endpoint)
            .json(payload)
            .send()
            .await
            .map_err(|e| FormError::Connection(e.to_string()))?;

        let status = response.status();
        // The notifier answers JSON on failures too, so the status alone decides nothing.
        let result: NotificationResult = response
            .json()
            .await
            .map_err(|e| FormError::Connection(e.to_string()))?;

        info!(status = status.as_u16(), success = result.success, "Notifier responded");
        Ok(result)
    }
}

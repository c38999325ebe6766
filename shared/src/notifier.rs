//! Reservation Notifier - relays one submitted reservation as a WhatsApp message.
//!
//! Flow per invocation:
//! 1. Reject anything but POST with 405
//! 2. Load transport configuration (500 when a key is missing)
//! 3. Parse the submission payload (400 when malformed)
//! 4. Render the message and relay it exactly once
//! 5. Return `{success, sid}` or `{success: false, error}`

use lambda_http::{Body, Error, Request, Response};
use serde_json::json;
use tracing::{error, info, warn};

use crate::http::{error_response, json_response, NotificationResult};
use crate::message::render_reservation;
use crate::models::ReservationPayload;
use crate::twilio::{MessageRelay, OutboundMessage};
use crate::Config;

/// Body returned for any method other than POST.
pub const METHOD_NOT_ALLOWED: &str = "Método no permitido";

/// Stateless notifier; configuration is re-read on every invocation.
pub struct ReservationNotifier<R, L> {
    relay: R,
    load_config: L,
}

impl<R, L> ReservationNotifier<R, L>
where
    R: MessageRelay,
    L: Fn() -> crate::Result<Config> + Send + Sync,
{
    pub fn new(relay: R, load_config: L) -> Self {
        Self { relay, load_config }
    }

    /// Handle one HTTP invocation.
    pub async fn handle(&self, event: Request) -> Result<Response<Body>, Error> {
        let method = event.method().as_str();
        info!("Reservation request: {} {}", method, event.uri().path());

        if method != "POST" {
            warn!(method, "Rejected reservation request");
            return json_response(405, &json!({ "error": METHOD_NOT_ALLOWED }));
        }

        let config = match (self.load_config)() {
            Ok(config) => config,
            Err(e) => {
                error!(error = %e, "Notifier is not configured");
                return error_response(e.status_code(), e.to_string());
            }
        };

        let payload: ReservationPayload = crate::parse_body!(event.body());

        let message = OutboundMessage {
            from: config.sender.clone(),
            to: config.recipient.clone(),
            body: render_reservation(&config.business_name, &payload),
        };

        match self.relay.send(&config, &message).await {
            Ok(sid) => {
                info!(sid = %sid, dates = payload.dates.len(), "Reservation relayed");
                json_response(200, &NotificationResult::delivered(sid))
            }
            Err(e) => {
                error!(error = %e, "Error al enviar mensaje");
                error_response(e.status_code(), e.to_string())
            }
        }
    }
}

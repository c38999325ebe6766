//! Enviar WhatsApp Lambda - Handles POST /api/enviar-whatsapp.
//!
//! Relays a submitted reservation to the business owner over WhatsApp.

use std::sync::Arc;
use std::time::Duration;

use lambda_http::{run, service_fn, Error};
use shared::{Config, ReservationNotifier, TwilioClient};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(10))
        .build()?;

    let notifier = Arc::new(ReservationNotifier::new(
        TwilioClient::new(http),
        Config::from_env,
    ));

    run(service_fn(move |event| {
        let notifier = Arc::clone(&notifier);
        async move { notifier.handle(event).await }
    }))
    .await
}

//! Shared library for the reservation functions.
//!
//! This crate provides the wire models, configuration, message template and
//! messaging client used by the notifier Lambda and the booking form.

pub mod config;
pub mod error;
pub mod http;
pub mod message;
pub mod models;
pub mod notifier;
pub mod twilio;

pub use config::{whatsapp_address, Config};
pub use error::{Error, Result};
pub use http::NotificationResult;
pub use message::render_reservation;
pub use models::{District, EventType, ReservationPayload, ServiceType};
pub use notifier::{ReservationNotifier, METHOD_NOT_ALLOWED};
pub use twilio::{MessageRelay, OutboundMessage, TwilioClient};

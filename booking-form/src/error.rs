//! Error types for the booking form.

use chrono::NaiveDate;
use thiserror::Error;

/// Errors raised while editing or submitting a reservation.
#[derive(Error, Debug)]
pub enum FormError {
    /// Required fields are missing or inconsistent
    #[error("Formulario incompleto: {0}")]
    Invalid(#[from] validator::ValidationErrors),

    /// A selected date is already booked
    #[error("La fecha {0} ya está reservada")]
    ReservedDate(NaiveDate),

    /// A submission is already in flight
    #[error("La reserva ya se está enviando")]
    InFlight,

    /// The notifier could not be reached or answered garbage
    #[error("Connection error: {0}")]
    Connection(String),

    /// Draft or calendar file could not be read
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Draft or calendar file is not valid JSON
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

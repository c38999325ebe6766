//! Booking form for the reservation page.
//!
//! Calendar bookkeeping, form state and submission to the WhatsApp notifier.

pub mod calendar;
pub mod error;
pub mod form;
pub mod submit;

pub use calendar::{CalendarDay, CalendarRules, DayStatus, WEEKDAY_HEADERS};
pub use error::FormError;
pub use form::{Action, Notice, Phase, ReservationForm};
pub use submit::{HttpSubmitter, SubmitOutcome, Submitter};

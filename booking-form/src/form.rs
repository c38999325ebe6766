//! Reservation form state.
//!
//! All UI state lives in one serializable [`ReservationForm`] that only changes
//! through [`ReservationForm::apply`]. Submission builds an immutable
//! [`ReservationPayload`] and hands it to a [`Submitter`].

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use shared::{District, EventType, ReservationPayload, ServiceType};
use tracing::{debug, info, warn};
use validator::{Validate, ValidationError};

use crate::calendar::{first_of_month, month_grid, shift_month, CalendarDay, CalendarRules};
use crate::submit::{SubmitOutcome, Submitter};
use crate::FormError;

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M";

/// Whether the form can be edited or is waiting on the notifier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Editing,
    Submitting,
}

/// User-facing warnings raised while editing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    /// A holiday was newly selected; it carries an extra cost.
    HolidaySurcharge(NaiveDate),
}

impl Notice {
    pub fn message(&self) -> &'static str {
        match self {
            Notice::HolidaySurcharge(_) => "❗ Atención: es un día feriado y tendrá costo extra",
        }
    }
}

/// Every way the user can change the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    NavigateMonth(i32),
    ToggleDate(NaiveDate),
    SetRequester(String),
    SetGuestCount(Option<u32>),
    SetTime(String),
    SetEventType(Option<EventType>),
    SetOtherEvent(String),
    SetServiceType(Option<ServiceType>),
    SetServiceCount(Option<u32>),
    SetDistrict(Option<District>),
    SetObservations(String),
}

/// Complete state of the booking page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[validate(schema(function = "check_dependent_fields"))]
pub struct ReservationForm {
    /// Any day of the displayed month
    pub month: NaiveDate,
    /// Selected dates in the order they were picked
    #[serde(default)]
    pub selected: Vec<NaiveDate>,
    #[serde(default)]
    #[validate(length(min = 1))]
    pub requester: String,
    #[serde(default)]
    #[validate(required, range(min = 1))]
    pub guest_count: Option<u32>,
    /// "HH:MM"
    #[serde(default)]
    #[validate(length(min = 1))]
    pub time: String,
    #[serde(default)]
    #[validate(required)]
    pub event_type: Option<EventType>,
    /// Free-text event when `event_type` is "Otro"
    #[serde(default)]
    pub other_event: String,
    #[serde(default)]
    #[validate(required)]
    pub service_type: Option<ServiceType>,
    #[serde(default)]
    pub service_count: Option<u32>,
    #[serde(default)]
    #[validate(required)]
    pub district: Option<District>,
    #[serde(default)]
    pub observations: String,
    #[serde(default)]
    pub phase: Phase,
}

fn check_dependent_fields(form: &ReservationForm) -> Result<(), ValidationError> {
    if form.selected.is_empty() {
        return Err(ValidationError::new("no_dates_selected"));
    }
    if NaiveTime::parse_from_str(&form.time, TIME_FORMAT).is_err() {
        return Err(ValidationError::new("invalid_time"));
    }
    if form.event_type == Some(EventType::Other) && form.other_event.trim().is_empty() {
        return Err(ValidationError::new("other_event_required"));
    }
    if form.service_type.is_some_and(ServiceType::requires_headcount)
        && !form.service_count.is_some_and(|n| n > 0)
    {
        return Err(ValidationError::new("service_count_required"));
    }
    Ok(())
}

impl ReservationForm {
    /// Empty form displaying the month of `today`.
    pub fn new(today: NaiveDate) -> Self {
        Self {
            month: first_of_month(today),
            selected: Vec::new(),
            requester: String::new(),
            guest_count: None,
            time: String::new(),
            event_type: None,
            other_event: String::new(),
            service_type: None,
            service_count: None,
            district: None,
            observations: String::new(),
            phase: Phase::Editing,
        }
    }

    /// Apply one user action, returning a warning to show if there is one.
    pub fn apply(&mut self, action: Action, rules: &CalendarRules) -> Option<Notice> {
        match action {
            Action::NavigateMonth(delta) => {
                self.month = shift_month(self.month, delta);
                debug!(month = %self.month, "Navigated calendar");
                None
            }
            Action::ToggleDate(date) => self.toggle_date(date, rules),
            Action::SetRequester(value) => {
                self.requester = value;
                None
            }
            Action::SetGuestCount(value) => {
                self.guest_count = value;
                None
            }
            Action::SetTime(value) => {
                self.time = value;
                None
            }
            Action::SetEventType(value) => {
                self.event_type = value;
                None
            }
            Action::SetOtherEvent(value) => {
                self.other_event = value;
                None
            }
            Action::SetServiceType(value) => {
                self.service_type = value;
                None
            }
            Action::SetServiceCount(value) => {
                self.service_count = value;
                None
            }
            Action::SetDistrict(value) => {
                self.district = value;
                None
            }
            Action::SetObservations(value) => {
                self.observations = value;
                None
            }
        }
    }

    fn toggle_date(&mut self, date: NaiveDate, rules: &CalendarRules) -> Option<Notice> {
        if rules.is_reserved(date) {
            debug!(%date, "Ignored reserved date");
            return None;
        }

        if let Some(pos) = self.selected.iter().position(|d| *d == date) {
            self.selected.remove(pos);
            return None;
        }

        self.selected.push(date);
        if rules.is_holiday(date) {
            warn!(%date, "Holiday selected");
            Some(Notice::HolidaySurcharge(date))
        } else {
            None
        }
    }

    /// Grid for the displayed month.
    pub fn calendar(&self, rules: &CalendarRules) -> Vec<CalendarDay> {
        month_grid(self.month, rules, &self.selected)
    }

    /// Rebuild a saved form by replaying its picks through `rules`.
    ///
    /// Reserved dates are dropped, repeated dates are kept once and every
    /// holiday raises its notice. The restored form is always editable.
    pub fn restore(mut draft: ReservationForm, rules: &CalendarRules) -> (Self, Vec<Notice>) {
        let picks = std::mem::take(&mut draft.selected);
        let mut form = ReservationForm {
            phase: Phase::Editing,
            ..draft
        };

        let mut notices = Vec::new();
        for date in picks {
            if form.selected.contains(&date) {
                continue;
            }
            notices.extend(form.apply(Action::ToggleDate(date), rules));
        }
        (form, notices)
    }

    fn check(&self, rules: &CalendarRules) -> Result<(), FormError> {
        self.validate()?;
        match self.selected.iter().find(|d| rules.is_reserved(**d)) {
            Some(date) => Err(FormError::ReservedDate(*date)),
            None => Ok(()),
        }
    }

    /// Whether the submit control should be enabled.
    pub fn is_valid(&self, rules: &CalendarRules) -> bool {
        self.check(rules).is_ok()
    }

    /// Build the submission payload, failing if the form is incomplete or
    /// picks a reserved date.
    pub fn payload(&self, rules: &CalendarRules) -> Result<ReservationPayload, FormError> {
        self.check(rules)?;

        let event_type = match self.event_type {
            Some(EventType::Other) => self.other_event.trim().to_string(),
            Some(event) => event.label().to_string(),
            None => String::new(),
        };

        let service = self.service_type.map(ServiceType::label).unwrap_or_default();
        let service_count = self
            .service_type
            .filter(|s| s.requires_headcount())
            .and(self.service_count);

        let observations = Some(self.observations.trim())
            .filter(|text| !text.is_empty())
            .map(str::to_string);

        Ok(ReservationPayload {
            requester: self.requester.clone(),
            guest_count: self.guest_count.unwrap_or_default(),
            time: self.time.clone(),
            service: service.to_string(),
            event_type,
            service_count,
            district: self.district.map(District::label).unwrap_or_default().to_string(),
            observations,
            dates: self
                .selected
                .iter()
                .map(|d| d.format(DATE_FORMAT).to_string())
                .collect(),
        })
    }

    /// Send the reservation once and report which alert to show.
    pub async fn submit<S: Submitter>(
        &mut self,
        submitter: &S,
        rules: &CalendarRules,
    ) -> Result<SubmitOutcome, FormError> {
        if self.phase == Phase::Submitting {
            return Err(FormError::InFlight);
        }

        let payload = self.payload(rules)?;
        let _in_flight = InFlight::enter(&mut self.phase);
        info!(dates = payload.dates.len(), "Submitting reservation");

        let outcome = match submitter.submit(&payload).await {
            Ok(result) if result.success => SubmitOutcome::Sent { sid: result.sid },
            Ok(result) => SubmitOutcome::Rejected { error: result.error },
            Err(e) => {
                warn!(error = %e, "Reservation could not be delivered");
                SubmitOutcome::ConnectionFailed
            }
        };

        Ok(outcome)
    }
}

/// Holds the form in `Submitting` until dropped, even if the submit future is.
struct InFlight<'a>(&'a mut Phase);

impl<'a> InFlight<'a> {
    fn enter(phase: &'a mut Phase) -> Self {
        *phase = Phase::Submitting;
        Self(phase)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        *self.0 = Phase::Editing;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use shared::NotificationResult;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn filled_form() -> ReservationForm {
        let rules = CalendarRules::peru_2025();
        let mut form = ReservationForm::new(date(2025, 4, 1));
        for action in [
            Action::SetRequester("Ana".to_string()),
            Action::SetGuestCount(Some(50)),
            Action::SetTime("18:00".to_string()),
            Action::SetEventType(Some(EventType::Wedding)),
            Action::SetServiceType(Some(ServiceType::Waiter)),
            Action::SetServiceCount(Some(5)),
            Action::SetDistrict(Some(District::Miraflores)),
            Action::ToggleDate(date(2025, 4, 20)),
        ] {
            form.apply(action, &rules);
        }
        form
    }

    enum Reply {
        Result(NotificationResult),
        Unreachable,
        Hang,
    }

    struct FakeSubmitter {
        reply: Reply,
        received: Mutex<Vec<ReservationPayload>>,
    }

    impl FakeSubmitter {
        fn new(reply: Reply) -> Self {
            Self {
                reply,
                received: Mutex::new(Vec::new()),
            }
        }
    }

    impl Submitter for FakeSubmitter {
        async fn submit(&self, payload: &ReservationPayload) -> Result<NotificationResult, FormError> {
            self.received.lock().unwrap().push(payload.clone());
            match &self.reply {
                Reply::Result(result) => Ok(result.clone()),
                Reply::Unreachable => Err(FormError::Connection("connection refused".to_string())),
                Reply::Hang => std::future::pending().await,
            }
        }
    }

    #[test]
    fn test_reserved_dates_never_change_selection() {
        let rules = CalendarRules::peru_2025();
        let mut form = filled_form();
        let before = form.selected.clone();

        for reserved in rules.reserved.clone() {
            assert_eq!(form.apply(Action::ToggleDate(reserved), &rules), None);
            assert_eq!(form.selected, before);
        }
    }

    #[test]
    fn test_holiday_warns_once_on_select_only() {
        let rules = CalendarRules::peru_2025();
        let mut form = ReservationForm::new(date(2025, 4, 1));

        for holiday in rules.holidays.clone() {
            let notice = form.apply(Action::ToggleDate(holiday), &rules);
            assert_eq!(notice, Some(Notice::HolidaySurcharge(holiday)));
            assert!(form.selected.contains(&holiday));

            let notice = form.apply(Action::ToggleDate(holiday), &rules);
            assert_eq!(notice, None);
            assert!(!form.selected.contains(&holiday));
        }
    }

    #[test]
    fn test_toggle_preserves_insertion_order() {
        let rules = CalendarRules::peru_2025();
        let mut form = ReservationForm::new(date(2025, 4, 1));

        form.apply(Action::ToggleDate(date(2025, 4, 22)), &rules);
        form.apply(Action::ToggleDate(date(2025, 4, 20)), &rules);
        form.apply(Action::ToggleDate(date(2025, 4, 21)), &rules);
        form.apply(Action::ToggleDate(date(2025, 4, 20)), &rules);

        assert_eq!(form.selected, vec![date(2025, 4, 22), date(2025, 4, 21)]);
    }

    #[test]
    fn test_navigate_month() {
        let rules = CalendarRules::peru_2025();
        let mut form = ReservationForm::new(date(2025, 4, 16));

        form.apply(Action::NavigateMonth(-4), &rules);
        assert_eq!(form.month, date(2024, 12, 1));
        form.apply(Action::NavigateMonth(13), &rules);
        assert_eq!(form.month, date(2026, 1, 1));
        assert_eq!(form.calendar(&rules)[0].date, date(2025, 12, 28));
    }

    #[test]
    fn test_filled_form_is_valid() {
        assert!(filled_form().is_valid(&CalendarRules::peru_2025()));
    }

    #[test]
    fn test_invalid_without_dates() {
        let rules = CalendarRules::peru_2025();
        let mut form = filled_form();
        form.apply(Action::ToggleDate(date(2025, 4, 20)), &rules);

        assert!(form.selected.is_empty());
        assert!(!form.is_valid(&rules));
    }

    #[test]
    fn test_other_event_requires_description() {
        let rules = CalendarRules::peru_2025();
        let mut form = filled_form();
        form.apply(Action::SetEventType(Some(EventType::Other)), &rules);
        assert!(!form.is_valid(&rules));

        form.apply(Action::SetOtherEvent("Bautizo".to_string()), &rules);
        assert!(form.is_valid(&rules));
        assert_eq!(form.payload(&rules).unwrap().event_type, "Bautizo");
    }

    #[test]
    fn test_waiter_and_security_require_headcount() {
        let rules = CalendarRules::peru_2025();
        let mut form = filled_form();

        form.apply(Action::SetServiceCount(None), &rules);
        assert!(!form.is_valid(&rules));
        form.apply(Action::SetServiceType(Some(ServiceType::Security)), &rules);
        assert!(!form.is_valid(&rules));
        form.apply(Action::SetServiceCount(Some(0)), &rules);
        assert!(!form.is_valid(&rules));

        form.apply(Action::SetServiceType(Some(ServiceType::Coordinator)), &rules);
        assert!(form.is_valid(&rules));
    }

    #[test]
    fn test_required_fields() {
        let rules = CalendarRules::peru_2025();

        let mut form = filled_form();
        form.apply(Action::SetRequester(String::new()), &rules);
        assert!(!form.is_valid(&rules));

        let mut form = filled_form();
        form.apply(Action::SetGuestCount(Some(0)), &rules);
        assert!(!form.is_valid(&rules));

        let mut form = filled_form();
        form.apply(Action::SetDistrict(None), &rules);
        assert!(!form.is_valid(&rules));

        let mut form = filled_form();
        form.apply(Action::SetTime("6pm".to_string()), &rules);
        assert!(!form.is_valid(&rules));
    }

    #[test]
    fn test_payload_fields() {
        let rules = CalendarRules::peru_2025();
        let mut form = filled_form();
        form.apply(Action::ToggleDate(date(2025, 4, 21)), &rules);

        let payload = form.payload(&rules).unwrap();
        assert_eq!(payload.requester, "Ana");
        assert_eq!(payload.guest_count, 50);
        assert_eq!(payload.event_type, "Boda");
        assert_eq!(payload.service, "Mozo");
        assert_eq!(payload.service_count, Some(5));
        assert_eq!(payload.district, "Miraflores");
        assert_eq!(payload.observations, None);
        assert_eq!(payload.dates, vec!["2025-04-20", "2025-04-21"]);
    }

    #[test]
    fn test_headcount_dropped_for_coordinator() {
        let rules = CalendarRules::peru_2025();
        let mut form = filled_form();
        form.apply(Action::SetServiceType(Some(ServiceType::Coordinator)), &rules);

        assert_eq!(form.payload(&rules).unwrap().service_count, None);
    }

    #[test]
    fn test_state_round_trips_through_json() {
        let form = filled_form();
        let json = serde_json::to_string(&form).unwrap();
        let restored: ReservationForm = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, form);
    }

    #[tokio::test]
    async fn test_submit_success() {
        let rules = CalendarRules::peru_2025();
        let submitter = FakeSubmitter::new(Reply::Result(NotificationResult::delivered("SM1")));
        let mut form = filled_form();

        let outcome = form.submit(&submitter, &rules).await.unwrap();

        assert_eq!(outcome, SubmitOutcome::Sent { sid: Some("SM1".to_string()) });
        assert_eq!(outcome.alert(), "✅ Reserva enviada con éxito!");
        assert_eq!(form.phase, Phase::Editing);
        assert_eq!(submitter.received.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_submit_application_failure() {
        let rules = CalendarRules::peru_2025();
        let submitter = FakeSubmitter::new(Reply::Result(NotificationResult::failed("TWILIO_AUTH_TOKEN not set")));
        let mut form = filled_form();

        let outcome = form.submit(&submitter, &rules).await.unwrap();

        assert_eq!(outcome.alert(), "❌ Error al enviar la reserva.");
        assert_eq!(form.phase, Phase::Editing);
    }

    #[tokio::test]
    async fn test_submit_transport_failure() {
        let rules = CalendarRules::peru_2025();
        let submitter = FakeSubmitter::new(Reply::Unreachable);
        let mut form = filled_form();

        let outcome = form.submit(&submitter, &rules).await.unwrap();

        assert_eq!(outcome, SubmitOutcome::ConnectionFailed);
        assert_eq!(outcome.alert(), "❌ Error de conexión.");
    }

    #[tokio::test]
    async fn test_invalid_form_is_never_sent() {
        let rules = CalendarRules::peru_2025();
        let submitter = FakeSubmitter::new(Reply::Result(NotificationResult::delivered("SM1")));
        let mut form = ReservationForm::new(date(2025, 4, 1));

        let err = form.submit(&submitter, &rules).await.unwrap_err();

        assert!(matches!(err, FormError::Invalid(_)));
        assert!(submitter.received.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_submit_refused_while_in_flight() {
        let rules = CalendarRules::peru_2025();
        let submitter = FakeSubmitter::new(Reply::Result(NotificationResult::delivered("SM1")));
        let mut form = filled_form();
        form.phase = Phase::Submitting;

        let err = form.submit(&submitter, &rules).await.unwrap_err();

        assert!(matches!(err, FormError::InFlight));
        assert!(submitter.received.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_abandoned_submit_returns_to_editing() {
        let rules = CalendarRules::peru_2025();
        let submitter = FakeSubmitter::new(Reply::Hang);
        let mut form = filled_form();

        let result = tokio::time::timeout(
            std::time::Duration::from_millis(20),
            form.submit(&submitter, &rules),
        )
        .await;

        assert!(result.is_err());
        assert_eq!(submitter.received.lock().unwrap().len(), 1);
        assert_eq!(form.phase, Phase::Editing);
    }

    #[test]
    fn test_reserved_date_in_saved_state_is_invalid() {
        let rules = CalendarRules::peru_2025();
        let mut json = serde_json::to_value(filled_form()).unwrap();
        json["selected"] = serde_json::json!(["2025-04-16"]);
        let form: ReservationForm = serde_json::from_value(json).unwrap();

        assert!(!form.is_valid(&rules));
        let err = form.payload(&rules).unwrap_err();
        assert!(matches!(err, FormError::ReservedDate(d) if d == date(2025, 4, 16)));
    }

    #[tokio::test]
    async fn test_reserved_date_is_never_sent() {
        let rules = CalendarRules::peru_2025();
        let submitter = FakeSubmitter::new(Reply::Result(NotificationResult::delivered("SM1")));
        let mut form = filled_form();
        form.selected.push(date(2025, 4, 18));

        let err = form.submit(&submitter, &rules).await.unwrap_err();

        assert!(matches!(err, FormError::ReservedDate(_)));
        assert!(submitter.received.lock().unwrap().is_empty());
        assert_eq!(form.phase, Phase::Editing);
    }

    #[test]
    fn test_restore_keeps_repeated_date_once() {
        let rules = CalendarRules::peru_2025();
        let mut draft = filled_form();
        draft.selected = vec![date(2025, 4, 20), date(2025, 4, 21), date(2025, 4, 20)];

        let (form, notices) = ReservationForm::restore(draft, &rules);

        assert_eq!(form.selected, vec![date(2025, 4, 20), date(2025, 4, 21)]);
        assert!(notices.is_empty());
        assert!(form.is_valid(&rules));
    }

    #[test]
    fn test_restore_drops_reserved_and_warns_once_per_holiday() {
        let rules = CalendarRules::peru_2025();
        let holiday = *rules.holidays.iter().next().unwrap();
        let mut draft = filled_form();
        draft.selected = vec![date(2025, 4, 16), holiday, holiday];

        let (form, notices) = ReservationForm::restore(draft, &rules);

        assert_eq!(form.selected, vec![holiday]);
        assert_eq!(notices, vec![Notice::HolidaySurcharge(holiday)]);
    }

    #[test]
    fn test_restore_of_in_flight_state_is_editable() {
        let rules = CalendarRules::peru_2025();
        let mut draft = filled_form();
        draft.phase = Phase::Submitting;

        let (form, _) = ReservationForm::restore(draft, &rules);

        assert_eq!(form.phase, Phase::Editing);
    }
}

//! Reservar - terminal front end for the booking form.
//!
//! Usage: `reservar <draft.json> [--send]`
//!
//! Replays the draft's date picks through the calendar rules (so reserved
//! dates are dropped, repeats collapse and holidays warn), prints the month grid and the form
//! status, and with `--send` submits it to `RESERVAS_ENDPOINT`.

use std::time::Duration;

use anyhow::{bail, Context};
use booking_form::calendar::month_title;
use booking_form::{
    CalendarDay, CalendarRules, DayStatus, HttpSubmitter, Notice, ReservationForm, WEEKDAY_HEADERS,
};
use chrono::Datelike;
use shared::{District, EventType, ServiceType};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn load_rules() -> anyhow::Result<CalendarRules> {
    match std::env::var("RESERVAS_CALENDARIO") {
        Ok(path) => CalendarRules::from_file(&path)
            .with_context(|| format!("Failed to read calendar rules from {}", path)),
        Err(_) => Ok(CalendarRules::default()),
    }
}

fn load_draft(path: &str, rules: &CalendarRules) -> anyhow::Result<ReservationForm> {
    let raw = std::fs::read_to_string(path).with_context(|| format!("Failed to read draft {}", path))?;
    let draft: ReservationForm = serde_json::from_str(&raw).context("Invalid draft")?;

    let (form, notices) = ReservationForm::restore(draft, rules);
    for notice in notices {
        let Notice::HolidaySurcharge(date) = notice;
        println!("{}  ({})", notice.message(), date);
    }

    Ok(form)
}

fn cell(day: &CalendarDay) -> String {
    let marker = match day.status() {
        DayStatus::OutsideMonth => '.',
        DayStatus::Reserved => 'x',
        DayStatus::SelectedHoliday => '$',
        DayStatus::Selected => '*',
        DayStatus::Holiday => '!',
        DayStatus::Available => ' ',
    };
    format!("{:>2}{}", day.date.day(), marker)
}

fn print_calendar(form: &ReservationForm, rules: &CalendarRules) {
    println!("{}", month_title(form.month));
    println!("{}", WEEKDAY_HEADERS.map(|d| format!("{:<4}", d)).concat());
    for week in form.calendar(rules).chunks(7) {
        let row: Vec<String> = week.iter().map(|day| format!("{:<4}", cell(day))).collect();
        println!("{}", row.concat());
    }
    println!("x reservado  ! feriado  * seleccionado  $ feriado seleccionado");
}

fn labels<T: Copy>(options: &[T], label: fn(T) -> &'static str) -> String {
    options.iter().map(|o| label(*o)).collect::<Vec<_>>().join(" | ")
}

fn print_hints(form: &ReservationForm) {
    println!("  tipo de evento: {}", labels(&EventType::ALL, EventType::label));
    println!("  servicio: {}", labels(&ServiceType::ALL, ServiceType::label));
    println!("  distrito: {}", labels(&District::ALL, District::label));
    if let Some(service) = form.service_type.filter(|s| s.requires_headcount()) {
        if form.service_count.unwrap_or(0) == 0 {
            println!("  falta: {}", service.headcount_prompt());
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(draft_path) = args.first() else {
        bail!("usage: reservar <draft.json> [--send]");
    };
    let send = args.iter().any(|a| a == "--send");

    let rules = load_rules()?;
    let mut form = load_draft(draft_path, &rules)?;

    print_calendar(&form, &rules);

    if let Err(e) = form.payload(&rules) {
        println!("Formulario incompleto, no se puede enviar: {}", e);
        print_hints(&form);
        return Ok(());
    }
    println!("Formulario completo: {} fecha(s)", form.selected.len());

    if !send {
        return Ok(());
    }

    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(15))
        .build()?;
    let submitter = HttpSubmitter::from_env(http);
    info!(endpoint = submitter.endpoint(), "Sending reservation");

    let outcome = form.submit(&submitter, &rules).await?;
    println!("{}", outcome.alert());

    Ok(())
}

//! WhatsApp message template for new reservations.

use crate::models::ReservationPayload;

/// Separator between dates when several are booked.
pub const DATE_SEPARATOR: &str = ", ";

const NO_OBSERVATIONS: &str = "Ninguna";
const NO_HEADCOUNT: &str = "No aplica";

/// Render the notification body for a reservation.
pub fn render_reservation(business_name: &str, payload: &ReservationPayload) -> String {
    let observations = payload
        .observations
        .as_deref()
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .unwrap_or(NO_OBSERVATIONS);

    let headcount = payload
        .service_count
        .map(|n| n.to_string())
        .unwrap_or_else(|| NO_HEADCOUNT.to_string());

    format!(
        "🔔 *Nueva reserva desde {business}* 🔔\n\
         \n\
         👤 Nombre: {requester}\n\
         📍 Distrito: {district}\n\
         📅 Fecha(s): {dates}\n\
         ⏰ Horario: {time}\n\
         👥 Invitados: {guests}\n\
         🧑‍🍳 Mozos: {headcount}\n\
         🎉 Tipo de evento: {event}\n\
         🧰 Servicio solicitado: {service}\n\
         📝 Observaciones: {observations}",
        business = business_name,
        requester = payload.requester,
        district = payload.district,
        dates = payload.dates.join(DATE_SEPARATOR),
        time = payload.time,
        guests = payload.guest_count,
        headcount = headcount,
        event = payload.event_type,
        service = payload.service,
        observations = observations,
    )
}

//! Shared data models.
//!
//! The wire names are the Spanish camelCase keys the booking page has always
//! posted, so older clients keep working against the notifier.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

/// Kind of event being booked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    #[serde(rename = "Boda")]
    Wedding,
    #[serde(rename = "Cumpleaños")]
    Birthday,
    #[serde(rename = "Fiesta de promoción")]
    GraduationParty,
    #[serde(rename = "15 años")]
    Quinceanera,
    #[serde(rename = "Otro")]
    Other,
}

impl EventType {
    pub const ALL: [EventType; 5] = [
        EventType::Wedding,
        EventType::Birthday,
        EventType::GraduationParty,
        EventType::Quinceanera,
        EventType::Other,
    ];

    pub fn label(self) -> &'static str {
        match self {
            EventType::Wedding => "Boda",
            EventType::Birthday => "Cumpleaños",
            EventType::GraduationParty => "Fiesta de promoción",
            EventType::Quinceanera => "15 años",
            EventType::Other => "Otro",
        }
    }
}

/// Staff service requested for the event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ServiceType {
    #[serde(rename = "Mozo")]
    Waiter,
    #[serde(rename = "Seguridad")]
    Security,
    #[serde(rename = "Coordinador")]
    Coordinator,
    #[serde(rename = "Otro")]
    Other,
}

impl ServiceType {
    pub const ALL: [ServiceType; 4] = [
        ServiceType::Waiter,
        ServiceType::Security,
        ServiceType::Coordinator,
        ServiceType::Other,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ServiceType::Waiter => "Mozo",
            ServiceType::Security => "Seguridad",
            ServiceType::Coordinator => "Coordinador",
            ServiceType::Other => "Otro",
        }
    }

    /// Waiters and security staff are booked per person.
    pub fn requires_headcount(self) -> bool {
        matches!(self, ServiceType::Waiter | ServiceType::Security)
    }

    /// Prompt shown next to the headcount input, e.g. "Cantidad de mozos".
    pub fn headcount_prompt(self) -> String {
        format!("Cantidad de {}s", self.label().to_lowercase())
    }
}

/// Districts served by the business.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum District {
    #[serde(rename = "Lurín")]
    Lurin,
    #[serde(rename = "José Gálvez")]
    JoseGalvez,
    #[serde(rename = "Villa El Salvador")]
    VillaElSalvador,
    #[serde(rename = "Villa María del Triunfo")]
    VillaMariaDelTriunfo,
    #[serde(rename = "San Juan de Miraflores")]
    SanJuanDeMiraflores,
    #[serde(rename = "Chorrillos")]
    Chorrillos,
    #[serde(rename = "San Isidro")]
    SanIsidro,
    #[serde(rename = "Miraflores")]
    Miraflores,
    #[serde(rename = "Surco")]
    Surco,
    #[serde(rename = "Surquillo")]
    Surquillo,
}

impl District {
    pub const ALL: [District; 10] = [
        District::Lurin,
        District::JoseGalvez,
        District::VillaElSalvador,
        District::VillaMariaDelTriunfo,
        District::SanJuanDeMiraflores,
        District::Chorrillos,
        District::SanIsidro,
        District::Miraflores,
        District::Surco,
        District::Surquillo,
    ];

    pub fn label(self) -> &'static str {
        match self {
            District::Lurin => "Lurín",
            District::JoseGalvez => "José Gálvez",
            District::VillaElSalvador => "Villa El Salvador",
            District::VillaMariaDelTriunfo => "Villa María del Triunfo",
            District::SanJuanDeMiraflores => "San Juan de Miraflores",
            District::Chorrillos => "Chorrillos",
            District::SanIsidro => "San Isidro",
            District::Miraflores => "Miraflores",
            District::Surco => "Surco",
            District::Surquillo => "Surquillo",
        }
    }
}

/// Submission payload posted by the booking form to the notifier.
///
/// Event type and service are carried as display text: the form substitutes
/// the free-text description when the event type is "Otro".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationPayload {
    #[serde(rename = "datosSolicitante")]
    pub requester: String,
    #[serde(rename = "cantidadInvitados")]
    pub guest_count: u32,
    #[serde(rename = "horario")]
    pub time: String,
    #[serde(rename = "servicio", alias = "tipoServicio")]
    pub service: String,
    #[serde(rename = "tipoEvento")]
    pub event_type: String,
    #[serde(
        rename = "cantidadMozos",
        alias = "numeroServicio",
        default,
        deserialize_with = "optional_count",
        skip_serializing_if = "Option::is_none"
    )]
    pub service_count: Option<u32>,
    #[serde(rename = "distrito")]
    pub district: String,
    #[serde(rename = "observaciones", default, skip_serializing_if = "Option::is_none")]
    pub observations: Option<String>,
    #[serde(rename = "fechas", deserialize_with = "one_or_many")]
    pub dates: Vec<String>,
}

/// Accepts a number, a numeric string, `""` or `null`.
fn optional_count<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u32),
        Text(String),
    }

    match Option::<Raw>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Raw::Number(n)) => Ok(Some(n)),
        Some(Raw::Text(text)) if text.trim().is_empty() => Ok(None),
        Some(Raw::Text(text)) => text
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| de::Error::custom(format!("invalid headcount: {}", text))),
    }
}

/// Accepts either a single date string or an ordered list of them.
fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        One(String),
        Many(Vec<String>),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::One(date) => vec![date],
        Raw::Many(dates) => dates,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_payload() {
        let json = r#"{
            "datosSolicitante": "Ana",
            "cantidadInvitados": 50,
            "horario": "18:00",
            "servicio": "Mozo",
            "tipoEvento": "Boda",
            "cantidadMozos": 5,
            "distrito": "Miraflores",
            "observaciones": "",
            "fechas": ["2025-04-20", "2025-04-21"]
        }"#;

        let payload: ReservationPayload = serde_json::from_str(json).unwrap();
        assert_eq!(payload.requester, "Ana");
        assert_eq!(payload.service_count, Some(5));
        assert_eq!(payload.dates, vec!["2025-04-20", "2025-04-21"]);
    }

    #[test]
    fn test_parse_single_date_and_form_aliases() {
        let json = r#"{
            "datosSolicitante": "Luis",
            "cantidadInvitados": 80,
            "horario": "20:30",
            "tipoServicio": "Seguridad",
            "tipoEvento": "15 años",
            "numeroServicio": "3",
            "distrito": "Surco",
            "fechas": "2025-05-10"
        }"#;

        let payload: ReservationPayload = serde_json::from_str(json).unwrap();
        assert_eq!(payload.service, "Seguridad");
        assert_eq!(payload.service_count, Some(3));
        assert_eq!(payload.observations, None);
        assert_eq!(payload.dates, vec!["2025-05-10"]);
    }

    #[test]
    fn test_empty_headcount_is_none() {
        let json = r#"{
            "datosSolicitante": "Rosa",
            "cantidadInvitados": 30,
            "horario": "12:00",
            "servicio": "Coordinador",
            "tipoEvento": "Cumpleaños",
            "cantidadMozos": "",
            "distrito": "Lurín",
            "fechas": ["2025-06-01"]
        }"#;

        let payload: ReservationPayload = serde_json::from_str(json).unwrap();
        assert_eq!(payload.service_count, None);
    }

    #[test]
    fn test_labels_match_wire_names() {
        for event in EventType::ALL {
            let json = serde_json::to_value(event).unwrap();
            assert_eq!(json, serde_json::Value::String(event.label().to_string()));
        }
        for district in District::ALL {
            let json = serde_json::to_value(district).unwrap();
            assert_eq!(json, serde_json::Value::String(district.label().to_string()));
        }
    }

    #[test]
    fn test_headcount_rules() {
        assert!(ServiceType::Waiter.requires_headcount());
        assert!(ServiceType::Security.requires_headcount());
        assert!(!ServiceType::Coordinator.requires_headcount());
        assert_eq!(ServiceType::Waiter.headcount_prompt(), "Cantidad de mozos");
    }
}

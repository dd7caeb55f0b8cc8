use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

// The server validates the accented forms; the original web form
// submitted unaccented variants, so those are accepted as aliases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CareKind {
    #[default]
    #[serde(rename = "Vacunación", alias = "Vacunacion")]
    Vaccination,
    #[serde(rename = "Desparasitación", alias = "Desparasitacion")]
    Deworming,
    #[serde(rename = "Consulta Veterinaria")]
    VetConsultation,
    #[serde(rename = "Baño", alias = "Bano")]
    Bath,
}

impl CareKind {
    pub const ALL: [CareKind; 4] = [
        CareKind::Vaccination,
        CareKind::Deworming,
        CareKind::VetConsultation,
        CareKind::Bath,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            CareKind::Vaccination => "Vacunación",
            CareKind::Deworming => "Desparasitación",
            CareKind::VetConsultation => "Consulta Veterinaria",
            CareKind::Bath => "Baño",
        }
    }
}

impl std::fmt::Display for CareKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CareEvent {
    #[serde(default)]
    pub id: i64,
    #[serde(rename = "tipo_cuidado")]
    pub kind: CareKind,
    #[serde(rename = "descripcion")]
    pub description: String,
    // RFC 3339 instant on the wire; interpreted as local time for display.
    #[serde(rename = "fecha_cuidado")]
    pub scheduled_at: String,
    #[serde(rename = "mascota_id", default)]
    pub pet_id: i64,
}

impl CareEvent {
    /// Schedule rendered for the care list (`YYYY-MM-DD`, with the
    /// 12-hour time appended unless it is local midnight).
    pub fn schedule_display(&self) -> String {
        crate::rules::format_for_display(&self.scheduled_at)
    }
}

/// POST body for creating a care event: `CareEvent` minus id and pet id
/// (the pet comes from the URL).
#[derive(Debug, Clone, Serialize)]
pub struct NewCare {
    #[serde(rename = "tipo_cuidado")]
    pub kind: CareKind,
    #[serde(rename = "descripcion")]
    pub description: String,
    #[serde(rename = "fecha_cuidado")]
    pub scheduled_at: String,
}

impl NewCare {
    pub fn new(kind: CareKind, description: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            kind,
            description: description.into(),
            // Millisecond precision with a Z suffix, like the original
            // client's toISOString()
            scheduled_at: at.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_care_from_wire() {
        let json = r#"{"id":3,"tipo_cuidado":"Consulta Veterinaria","descripcion":"Control anual","fecha_cuidado":"2025-06-16T13:00:00Z","mascota_id":7}"#;
        let care: CareEvent = serde_json::from_str(json).expect("Failed to parse care JSON");
        assert_eq!(care.id, 3);
        assert_eq!(care.kind, CareKind::VetConsultation);
        assert_eq!(care.pet_id, 7);
    }

    #[test]
    fn test_parse_care_kind_unaccented_alias() {
        let kind: CareKind = serde_json::from_str(r#""Vacunacion""#)
            .expect("Failed to parse unaccented care kind");
        assert_eq!(kind, CareKind::Vaccination);
        // Canonical accented value is what we send back
        assert_eq!(
            serde_json::to_string(&kind).expect("Failed to serialize care kind"),
            r#""Vacunación""#
        );
    }

    #[test]
    fn test_new_care_wire_timestamp() {
        let at = Utc.with_ymd_and_hms(2025, 6, 16, 13, 0, 0).unwrap();
        let care = NewCare::new(CareKind::Bath, "Baño mensual", at);
        assert_eq!(care.scheduled_at, "2025-06-16T13:00:00.000Z");
    }
}

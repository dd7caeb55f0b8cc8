//! Client-side form validation.
//!
//! Drafts hold raw user input as strings; validation runs before any
//! network call and blocks submission with user-facing messages. The
//! messages are the original frontend's, verbatim.

use crate::models::{CareKind, NewPet, Sex, Species};
use crate::rules;

pub const MSG_DATE_REQUIRED: &str = "Seleccione la fecha del cuidado.";
pub const MSG_TIME_REQUIRED: &str = "Seleccione la hora del cuidado.";
pub const MSG_PAST_OR_TODAY: &str = "Solo puede programar cuidados a partir del dia siguiente.";
pub const MSG_SUNDAY: &str =
    "No es posible registrar cuidados los dias domingo. Seleccione entre lunes y sabado.";
pub const MSG_MIN_CHARS: &str = "Minimo 2 caracteres";
pub const MSG_MAX_CHARS: &str = "Maximo 100 caracteres";
pub const MSG_DATE_FORMAT: &str = "Formato YYYY-MM-DD";
pub const MSG_FUTURE_DATE: &str = "No puede ser una fecha futura";

/// User input for the add-care form.
#[derive(Debug, Clone, Default)]
pub struct CareDraft {
    pub kind: CareKind,
    pub description: String,
    pub date: String,
    pub time: String,
}

impl CareDraft {
    /// First failed submission rule, or `None` when the draft may be
    /// submitted. `today` is the local date in `YYYY-MM-DD` form.
    pub fn validate(&self, today: &str) -> Option<&'static str> {
        if self.date.is_empty() {
            return Some(MSG_DATE_REQUIRED);
        }
        if self.time.is_empty() {
            return Some(MSG_TIME_REQUIRED);
        }
        if self.description.trim().chars().count() < 2 {
            return Some(MSG_MIN_CHARS);
        }
        if rules::is_past_or_today(&self.date, today) {
            return Some(MSG_PAST_OR_TODAY);
        }
        if rules::is_sunday(&self.date) {
            return Some(MSG_SUNDAY);
        }
        None
    }

    pub fn is_submittable(&self, today: &str) -> bool {
        self.validate(today).is_none()
    }
}

/// One failed field of the pet form; `field` is the wire name the
/// label renders next to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: &'static str,
}

/// User input for the new-pet form.
#[derive(Debug, Clone, Default)]
pub struct PetDraft {
    pub name: String,
    pub species: Species,
    pub breed: String,
    pub birth_date: String,
    pub sex: Sex,
}

impl PetDraft {
    /// All failed fields; empty means the draft may be submitted.
    pub fn validate(&self, today: &str) -> Vec<FieldError> {
        let mut errors = Vec::new();

        if let Some(message) = validate_name(&self.name) {
            errors.push(FieldError { field: "nombre", message });
        }
        if let Some(message) = validate_name(&self.breed) {
            errors.push(FieldError { field: "raza", message });
        }
        if !is_iso_date(&self.birth_date) {
            errors.push(FieldError { field: "fecha_nacimiento", message: MSG_DATE_FORMAT });
        } else if self.birth_date.as_str() > today {
            errors.push(FieldError { field: "fecha_nacimiento", message: MSG_FUTURE_DATE });
        }

        errors
    }

    pub fn to_new_pet(&self) -> NewPet {
        NewPet {
            name: self.name.trim().to_string(),
            species: self.species,
            breed: self.breed.trim().to_string(),
            birth_date: self.birth_date.clone(),
            sex: self.sex,
        }
    }
}

fn validate_name(value: &str) -> Option<&'static str> {
    let len = value.trim().chars().count();
    if len < 2 {
        Some(MSG_MIN_CHARS)
    } else if len > 100 {
        Some(MSG_MAX_CHARS)
    } else {
        None
    }
}

/// Strict `YYYY-MM-DD`: ten chars, digits with dashes at 4 and 7.
fn is_iso_date(s: &str) -> bool {
    s.len() == 10
        && s.chars()
            .enumerate()
            .all(|(i, c)| if i == 4 || i == 7 { c == '-' } else { c.is_ascii_digit() })
}

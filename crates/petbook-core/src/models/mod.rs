//! Data models for the pet-care API.
//!
//! Field names carry serde renames because the wire format is the
//! Spanish REST API (`nombre`, `tipo_cuidado`, ...); Rust code uses
//! English names throughout.

pub mod care;
pub mod pet;

pub use care::{CareEvent, CareKind, NewCare};
pub use pet::{NewPet, Pet, Sex, Species};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Species {
    #[default]
    #[serde(rename = "Perro")]
    Dog,
    #[serde(rename = "Gato")]
    Cat,
    #[serde(rename = "Conejo")]
    Rabbit,
}

impl Species {
    /// All variants, in the order the original form lists them.
    pub const ALL: [Species; 3] = [Species::Dog, Species::Cat, Species::Rabbit];

    /// The wire/display label (the API speaks Spanish).
    pub fn label(&self) -> &'static str {
        match self {
            Species::Dog => "Perro",
            Species::Cat => "Gato",
            Species::Rabbit => "Conejo",
        }
    }
}

impl std::fmt::Display for Species {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Sex {
    #[default]
    #[serde(rename = "Macho")]
    Male,
    #[serde(rename = "Hembra")]
    Female,
}

impl Sex {
    pub const ALL: [Sex; 2] = [Sex::Male, Sex::Female];

    pub fn label(&self) -> &'static str {
        match self {
            Sex::Male => "Macho",
            Sex::Female => "Hembra",
        }
    }
}

impl std::fmt::Display for Sex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pet {
    #[serde(default)]
    pub id: i64,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "especie")]
    pub species: Species,
    #[serde(rename = "raza")]
    pub breed: String,
    // The server may echo this back with a time component; keep the raw
    // string and strip it at display time.
    #[serde(rename = "fecha_nacimiento")]
    pub birth_date: String,
    #[serde(rename = "sexo")]
    pub sex: Sex,
}

impl Pet {
    /// Calendar-date part of the birth date (`YYYY-MM-DD`).
    pub fn birth_date_display(&self) -> &str {
        match self.birth_date.find('T') {
            Some(idx) if idx > 0 => &self.birth_date[..idx],
            _ => &self.birth_date,
        }
    }
}

/// POST body for creating a pet: `Pet` minus the server-assigned id.
#[derive(Debug, Clone, Serialize)]
pub struct NewPet {
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "especie")]
    pub species: Species,
    #[serde(rename = "raza")]
    pub breed: String,
    #[serde(rename = "fecha_nacimiento")]
    pub birth_date: String,
    #[serde(rename = "sexo")]
    pub sex: Sex,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pet_from_wire() {
        let json = r#"{"id":7,"nombre":"Luna","especie":"Gato","raza":"Siames","fecha_nacimiento":"2021-03-14T00:00:00Z","sexo":"Hembra"}"#;
        let pet: Pet = serde_json::from_str(json).expect("Failed to parse pet JSON");
        assert_eq!(pet.id, 7);
        assert_eq!(pet.name, "Luna");
        assert_eq!(pet.species, Species::Cat);
        assert_eq!(pet.sex, Sex::Female);
        assert_eq!(pet.birth_date_display(), "2021-03-14");
    }

    #[test]
    fn test_birth_date_display_date_only() {
        let pet = Pet {
            id: 1,
            name: "Rex".to_string(),
            species: Species::Dog,
            breed: "Labrador".to_string(),
            birth_date: "2020-01-01".to_string(),
            sex: Sex::Male,
        };
        assert_eq!(pet.birth_date_display(), "2020-01-01");
    }

    #[test]
    fn test_new_pet_serializes_spanish_fields() {
        let pet = NewPet {
            name: "Coco".to_string(),
            species: Species::Rabbit,
            breed: "Enano".to_string(),
            birth_date: "2023-05-01".to_string(),
            sex: Sex::Male,
        };
        let value = serde_json::to_value(&pet).expect("Failed to serialize new pet");
        assert_eq!(value["nombre"], "Coco");
        assert_eq!(value["especie"], "Conejo");
        assert_eq!(value["sexo"], "Macho");
        assert!(value.get("id").is_none());
    }
}

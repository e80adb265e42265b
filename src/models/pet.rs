//! Pet records used by the appointment pet picker.

use serde::{Deserialize, Serialize};

/// Pet owned by the logged-in user's company.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pet {
    pub pet_id: i64,
    pub name: String,
    #[serde(default)]
    pub species: Option<String>,
}

impl Pet {
    /// Label shown in the pet picker.
    pub fn label(&self) -> String {
        match &self.species {
            Some(species) if !species.is_empty() => format!("{} ({})", self.name, species),
            _ => self.name.clone(),
        }
    }
}

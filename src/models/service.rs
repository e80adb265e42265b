//! Service catalog DTOs.

use serde::{Deserialize, Serialize};

/// Catalog entry that can be associated with an appointment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub service_id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: f64,
    /// Duration in minutes.
    #[serde(default)]
    pub duration: Option<u32>,
}

/// Paged envelope returned by list endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub data: Vec<T>,
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self { data: Vec::new() }
    }
}

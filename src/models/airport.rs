use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Airport {
    pub id: i64,
    pub code: String,
    pub city: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

impl Airport {
    pub fn new(id: i64, code: &str, city: &str, name: &str) -> Self {
        Airport {
            id,
            code: code.to_string(),
            city: city.to_string(),
            name: name.to_string(),
            country: None,
        }
    }

    // Selector option text, e.g. "Kyiv (KBP) - Boryspil"
    pub fn option_label(&self) -> String {
        format!("{} ({}) - {}", self.city, self.code, self.name)
    }
}

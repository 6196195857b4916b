//! # Pest and Control Catalog
//!
//! Reference data describing each pest and the IPM (Integrated Pest
//! Management) actions recommended against it. Nothing here is computed by
//! the engine; these records are joined to diagnoses by pest name.
//!
//! ## IPM Categories
//!
//! | Category | Example |
//! |----------|---------|
//! | `cultural` | resistant varieties, synchronous planting |
//! | `mechanical` | light traps, removing affected tillers |
//! | `biological` | conserving predators, releasing parasitoids |
//! | `chemical` | insecticide applications |
//!
//! [`ControlCategory::IPM_ORDER`] is the order in which reports present them:
//! least invasive first.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Descriptive record for one pest. `name` is the join key.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Pest {
    pub name: String,
    pub scientific_name: String,
    pub description: String,
    pub damage_type: String,
    pub favorable_conditions: String,
    pub affected_stage: String,
}

/// Closed set of IPM control categories.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlCategory {
    Cultural,
    Mechanical,
    Biological,
    Chemical,
}

impl ControlCategory {
    /// Presentation order used by reports and the web UI.
    pub const IPM_ORDER: [ControlCategory; 4] = [
        ControlCategory::Cultural,
        ControlCategory::Mechanical,
        ControlCategory::Biological,
        ControlCategory::Chemical,
    ];

    pub fn symbol(&self) -> &'static str {
        match self {
            ControlCategory::Cultural => "cultural",
            ControlCategory::Mechanical => "mechanical",
            ControlCategory::Biological => "biological",
            ControlCategory::Chemical => "chemical",
        }
    }

    pub fn from_symbol(symbol: &str) -> Option<Self> {
        Self::IPM_ORDER
            .into_iter()
            .find(|c| c.symbol() == symbol)
    }
}

impl fmt::Display for ControlCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// One catalog entry: "for pest P, in category C, do X (priority N)".
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ControlRecommendation {
    pub pest_name: String,
    pub category: ControlCategory,
    pub recommendation: String,
    /// 1 is the highest priority.
    pub priority: u32,
}

//! Canonical RRA record: the JSON document handed to delivery sinks.
//!
//! The shape is the same for every template version; fields a given
//! template does not carry are simply absent (`Option::None` and skipped on
//! serialization), which consumers must read as "unknown".

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::normalize::UNKNOWN;

/// One parsed Risk Rating Assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RraRecord {
    /// Opaque document identifier from the document source.
    pub source: String,
    /// `"RRA for <service>"`.
    pub summary: String,
    /// RFC 3339, UTC, time of extraction.
    pub timestamp: String,
    /// RFC 3339, UTC, last modification of the source document.
    pub lastmodified: String,
    pub details: Details,
}

impl RraRecord {
    /// Fresh, empty record for one document.
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            summary: String::new(),
            timestamp: String::new(),
            lastmodified: String::new(),
            details: Details::default(),
        }
    }

    pub fn service(&self) -> &str {
        &self.details.metadata.service
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Details {
    pub metadata: Metadata,
    pub data: DataDictionary,
    pub risk: RiskMatrix,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendations: Option<BTreeMap<String, Vec<String>>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    pub service: String,
    pub scope: String,
    pub owner: String,
    pub developer: String,
    pub operator: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analyst: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contacts: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_provided: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_record: Option<String>,
    /// Template version the record was parsed with. Set by the dispatcher only.
    #[serde(rename = "RRA_version", default, skip_serializing_if = "Option::is_none")]
    pub rra_version: Option<String>,
}

/// Data classification dictionary: the service default plus data types per level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataDictionary {
    pub default: String,
    #[serde(flatten)]
    pub levels: BTreeMap<String, Vec<String>>,
}

impl Default for DataDictionary {
    fn default() -> Self {
        Self {
            default: UNKNOWN.to_string(),
            levels: BTreeMap::new(),
        }
    }
}

impl DataDictionary {
    /// Append a data type under `level`. Existing entries are kept.
    pub fn push(&mut self, level: &str, data_type: impl Into<String>) {
        self.levels
            .entry(level.to_string())
            .or_default()
            .push(data_type.into());
    }

    pub fn types(&self, level: &str) -> &[String] {
        self.levels.get(level).map(Vec::as_slice).unwrap_or_default()
    }
}

/// Security property a risk is assessed against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dimension {
    Confidentiality,
    Integrity,
    Availability,
}

/// Business area a risk impacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Area {
    Reputation,
    Finances,
    Productivity,
}

impl Dimension {
    pub const ALL: [Dimension; 3] = [Self::Confidentiality, Self::Integrity, Self::Availability];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Confidentiality => "confidentiality",
            Self::Integrity => "integrity",
            Self::Availability => "availability",
        }
    }
}

impl Area {
    pub const ALL: [Area; 3] = [Self::Reputation, Self::Finances, Self::Productivity];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Reputation => "reputation",
            Self::Finances => "finances",
            Self::Productivity => "productivity",
        }
    }
}

/// The 3x3 confidentiality/integrity/availability by
/// reputation/finances/productivity matrix.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RiskMatrix {
    pub confidentiality: RiskCategory,
    pub integrity: RiskCategory,
    pub availability: RiskCategory,
}

impl RiskMatrix {
    pub fn get(&self, dim: Dimension, area: Area) -> &RiskEntry {
        let cat = match dim {
            Dimension::Confidentiality => &self.confidentiality,
            Dimension::Integrity => &self.integrity,
            Dimension::Availability => &self.availability,
        };
        cat.get(area)
    }

    pub fn get_mut(&mut self, dim: Dimension, area: Area) -> &mut RiskEntry {
        let cat = match dim {
            Dimension::Confidentiality => &mut self.confidentiality,
            Dimension::Integrity => &mut self.integrity,
            Dimension::Availability => &mut self.availability,
        };
        cat.get_mut(area)
    }

    /// All nine cells in confidentiality, integrity, availability order.
    pub fn entries(&self) -> impl Iterator<Item = (Dimension, Area, &RiskEntry)> {
        Dimension::ALL.into_iter().flat_map(move |dim| {
            Area::ALL
                .into_iter()
                .map(move |area| (dim, area, self.get(dim, area)))
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RiskCategory {
    pub reputation: RiskEntry,
    pub finances: RiskEntry,
    pub productivity: RiskEntry,
}

impl RiskCategory {
    pub fn get(&self, area: Area) -> &RiskEntry {
        match area {
            Area::Reputation => &self.reputation,
            Area::Finances => &self.finances,
            Area::Productivity => &self.productivity,
        }
    }

    pub fn get_mut(&mut self, area: Area) -> &mut RiskEntry {
        match area {
            Area::Reputation => &mut self.reputation,
            Area::Finances => &mut self.finances,
            Area::Productivity => &mut self.productivity,
        }
    }
}

/// One cell of the risk matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskEntry {
    /// Validated risk level or `"Unknown"`.
    pub impact: String,
    /// Validated risk level or `"Unknown"`. Only 2.4+ templates carry it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub probability: Option<String>,
    /// Free text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rationale: Option<String>,
}

impl Default for RiskEntry {
    fn default() -> Self {
        Self {
            impact: UNKNOWN.to_string(),
            probability: None,
            rationale: None,
        }
    }
}

use crate::metrics::{self, BedMetrics};
use crate::model::species::Species;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Whether the audited nursery is fenced.
///
/// Parsing accepts English and Amharic answers in any case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum Fenced {
    Yes,
    No,
}

impl Fenced {
    pub fn as_str(self) -> &'static str {
        match self {
            Fenced::Yes => "Yes",
            Fenced::No => "No",
        }
    }
}

impl fmt::Display for Fenced {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Fenced {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            v if v.eq_ignore_ascii_case("yes") || v == "አዎ" => Ok(Fenced::Yes),
            v if v.eq_ignore_ascii_case("no") || v == "አይ" || v == "አይደለም" => Ok(Fenced::No),
            other => Err(format!("invalid fenced value '{}'", other)),
        }
    }
}

impl TryFrom<String> for Fenced {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Location and personnel fields of a back check.
///
/// Every field defaults to empty so that a partially filled form still
/// deserializes; required fields are enforced when the record is assembled.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackCheckMetadata {
    pub woreda: String,
    pub kebele: String,
    pub accounting_code: Option<String>,
    pub checker_fa_name: String,
    pub checker_cbe_name: String,
    pub checker_phone: String,
    /// `None` when the question was not answered.
    #[serde(deserialize_with = "blank_as_unanswered")]
    pub fenced: Option<Fenced>,
}

fn blank_as_unanswered<'de, D>(deserializer: D) -> Result<Option<Fenced>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(raw) if !raw.trim().is_empty() => raw.parse().map(Some).map_err(serde::de::Error::custom),
        _ => Ok(None),
    }
}

impl BackCheckMetadata {
    /// Value of a metadata field by its form key.
    pub fn field(&self, key: &str) -> Option<&str> {
        match key {
            "woreda" => Some(&self.woreda),
            "kebele" => Some(&self.kebele),
            "accounting_code" => Some(self.accounting_code.as_deref().unwrap_or("")),
            "checker_fa_name" => Some(&self.checker_fa_name),
            "checker_cbe_name" => Some(&self.checker_cbe_name),
            "checker_phone" => Some(&self.checker_phone),
            "fenced" => Some(self.fenced.map(Fenced::as_str).unwrap_or("")),
            _ => None,
        }
    }
}

/// Raw counts entered for one species.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpeciesReading {
    pub species: Species,
    #[serde(default)]
    pub bed_count: u32,
    #[serde(default)]
    pub bed_length_meters: f64,
    #[serde(default)]
    pub sockets_across_width: u32,
}

impl SpeciesReading {
    /// A species that was not measured.
    pub fn unmeasured(species: Species) -> Self {
        SpeciesReading {
            species,
            bed_count: 0,
            bed_length_meters: 0.0,
            sockets_across_width: 0,
        }
    }

    pub fn metrics(&self) -> BedMetrics {
        metrics::compute(
            self.bed_count,
            self.sockets_across_width,
            self.species.expected_width(),
            self.species.label(),
        )
    }
}

/// A reading together with its derived socket total.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpeciesResult {
    pub species: Species,
    pub bed_count: u32,
    pub bed_length_meters: f64,
    pub sockets_across_width: u32,
    pub total_sockets: u64,
}

impl SpeciesResult {
    /// Derives the total from the reading; totals are never taken from callers.
    pub fn from_reading(reading: &SpeciesReading) -> Self {
        SpeciesResult {
            species: reading.species,
            bed_count: reading.bed_count,
            bed_length_meters: reading.bed_length_meters,
            sockets_across_width: reading.sockets_across_width,
            total_sockets: reading.metrics().total_sockets,
        }
    }
}

/// An assembled back check that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewBackCheck {
    pub metadata: BackCheckMetadata,
    /// One entry per species, in [`Species::ALL`] order.
    pub species: [SpeciesResult; 4],
    pub auto_remark: String,
    pub general_remark: String,
    /// Base64 (standard alphabet) encoded image.
    pub photo: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A stored back check.
///
/// Columns introduced after the first schema revision may be NULL on rows
/// written by older revisions, hence the optional remark and photo fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackCheckRecord {
    pub id: i64,
    pub metadata: BackCheckMetadata,
    pub species: [SpeciesResult; 4],
    pub auto_remark: Option<String>,
    pub general_remark: Option<String>,
    pub photo: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl BackCheckRecord {
    pub fn result(&self, species: Species) -> &SpeciesResult {
        &self.species[species.index()]
    }

    pub fn has_photo(&self) -> bool {
        self.photo.as_deref().is_some_and(|p| !p.is_empty())
    }
}

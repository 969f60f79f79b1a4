use foundation::iso::IsoCode;
use serde::{Deserialize, Serialize};

use crate::names::canonical_country_name;

/// One bilateral corridor observation: migrant stock from `origin_iso`
/// living in `destination_iso` in `year`.
///
/// Field names on the wire follow the cleaned bilateral dataset columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorridorRecord {
    pub year: i32,
    #[serde(rename = "origin_iso3")]
    pub origin_iso: IsoCode,
    #[serde(rename = "destination_iso3")]
    pub destination_iso: IsoCode,
    #[serde(rename = "origin_country_name")]
    pub origin_name: String,
    #[serde(rename = "destination_country_name")]
    pub destination_name: String,
    #[serde(default)]
    pub origin_subregion: String,
    #[serde(default)]
    pub destination_subregion: String,
    pub migrants_millions: f64,
}

impl CorridorRecord {
    /// Applies load-time normalization and checks the magnitude.
    pub(crate) fn normalized(mut self) -> Result<Self, String> {
        if !self.migrants_millions.is_finite() || self.migrants_millions < 0.0 {
            return Err(format!(
                "migrants_millions must be a non-negative number, got {}",
                self.migrants_millions
            ));
        }
        self.origin_name = canonical_country_name(&self.origin_name);
        self.destination_name = canonical_country_name(&self.destination_name);
        self.origin_subregion = self.origin_subregion.trim().to_string();
        self.destination_subregion = self.destination_subregion.trim().to_string();
        Ok(self)
    }
}

/// Which column of a corridor the queried country must match.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Role {
    Origin,
    Destination,
}

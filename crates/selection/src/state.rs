use std::fmt;

use foundation::iso::IsoCode;
use serde::{Deserialize, Serialize};

/// How many corridors per direction the flow map renders.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowLimit {
    Top10,
    All,
}

impl FlowLimit {
    pub fn parse(raw: &str) -> Result<Self, InvalidSelectionRequest> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "top10" => Ok(FlowLimit::Top10),
            "all" => Ok(FlowLimit::All),
            _ => Err(InvalidSelectionRequest::UnknownFlowLimit(raw.to_string())),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FlowLimit::Top10 => "top10",
            FlowLimit::All => "all",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            FlowLimit::Top10 => FlowLimit::All,
            FlowLimit::All => FlowLimit::Top10,
        }
    }

    /// Truncates an already-sorted list to the first `top_n` entries for
    /// `Top10`; `All` keeps everything.
    pub fn truncate<T>(self, mut items: Vec<T>, top_n: usize) -> Vec<T> {
        if self == FlowLimit::Top10 {
            items.truncate(top_n);
        }
        items
    }

    /// Label of the toggle button: it offers the other mode.
    pub fn button_label(self) -> &'static str {
        match self {
            FlowLimit::Top10 => "Show All",
            FlowLimit::All => "Show Top 10",
        }
    }
}

/// The quantity the choropleth view colours by.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    Immigration,
    Emigration,
    Net,
}

impl Metric {
    pub const ALL: [Metric; 3] = [Metric::Immigration, Metric::Emigration, Metric::Net];

    pub fn parse(raw: &str) -> Result<Self, InvalidSelectionRequest> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "immigration" => Ok(Metric::Immigration),
            "emigration" => Ok(Metric::Emigration),
            "net" => Ok(Metric::Net),
            _ => Err(InvalidSelectionRequest::UnknownMetric(raw.to_string())),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Metric::Immigration => "immigration",
            Metric::Emigration => "emigration",
            Metric::Net => "net",
        }
    }

    /// Next metric in autoplay order, wrapping.
    pub fn next(self) -> Self {
        match self {
            Metric::Immigration => Metric::Emigration,
            Metric::Emigration => Metric::Net,
            Metric::Net => Metric::Immigration,
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidSelectionRequest {
    #[error("unknown flow limit {0:?} (expected \"top10\" or \"all\")")]
    UnknownFlowLimit(String),
    #[error("unknown metric {0:?} (expected \"immigration\", \"emigration\" or \"net\")")]
    UnknownMetric(String),
    #[error("invalid country code {0:?}")]
    InvalidCountryCode(String),
}

/// Snapshot of the shared selection.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionState {
    pub focus_country: Option<IsoCode>,
    pub focus_year: i32,
    pub flow_limit: FlowLimit,
    pub metric: Metric,
}

impl SelectionState {
    pub fn new(focus_country: Option<IsoCode>, focus_year: i32) -> Self {
        Self {
            focus_country,
            focus_year,
            flow_limit: FlowLimit::Top10,
            metric: Metric::Immigration,
        }
    }

    pub fn merged(mut self, patch: &SelectionPatch) -> Self {
        if let Some(country) = patch.country {
            self.focus_country = country;
        }
        if let Some(year) = patch.year {
            self.focus_year = year;
        }
        if let Some(limit) = patch.flow_limit {
            self.flow_limit = limit;
        }
        if let Some(metric) = patch.metric {
            self.metric = metric;
        }
        self
    }
}

/// A partial update: `None` fields are left untouched.
///
/// `country` is doubly optional so a patch can clear the focus country.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct SelectionPatch {
    pub country: Option<Option<IsoCode>>,
    pub year: Option<i32>,
    pub flow_limit: Option<FlowLimit>,
    pub metric: Option<Metric>,
}

impl SelectionPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn country(mut self, iso: IsoCode) -> Self {
        self.country = Some(Some(iso));
        self
    }

    pub fn clear_country(mut self) -> Self {
        self.country = Some(None);
        self
    }

    pub fn year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    pub fn flow_limit(mut self, limit: FlowLimit) -> Self {
        self.flow_limit = Some(limit);
        self
    }

    pub fn metric(mut self, metric: Metric) -> Self {
        self.metric = Some(metric);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.country.is_none()
            && self.year.is_none()
            && self.flow_limit.is_none()
            && self.metric.is_none()
    }
}

/// Untyped update as it arrives from UI controls.
///
/// An empty `country` string clears the focus country.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SelectionRequest {
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub flow_limit: Option<String>,
    #[serde(default)]
    pub metric: Option<String>,
}

impl TryFrom<&SelectionRequest> for SelectionPatch {
    type Error = InvalidSelectionRequest;

    fn try_from(req: &SelectionRequest) -> Result<Self, Self::Error> {
        let country = match req.country.as_deref().map(str::trim) {
            None => None,
            Some("") => Some(None),
            Some(raw) => Some(Some(IsoCode::parse(raw).map_err(|_| {
                InvalidSelectionRequest::InvalidCountryCode(raw.to_string())
            })?)),
        };
        let flow_limit = req.flow_limit.as_deref().map(FlowLimit::parse).transpose()?;
        let metric = req.metric.as_deref().map(Metric::parse).transpose()?;
        Ok(SelectionPatch {
            country,
            year: req.year,
            flow_limit,
            metric,
        })
    }
}

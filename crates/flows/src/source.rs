use std::path::PathBuf;

use futures::future::{self, FutureExt, LocalBoxFuture};

use crate::error::DataLoadError;
use crate::record::CorridorRecord;
use crate::table_text::parse_corridor_csv;

/// Raw dataset as delivered by a source.
#[derive(Debug, Clone, PartialEq)]
pub enum FlowPayload {
    /// Cleaned bilateral CSV export.
    Csv(String),
    /// JSON array of rows using the same column names.
    Json(String),
}

impl FlowPayload {
    pub fn decode(&self) -> Result<Vec<CorridorRecord>, DataLoadError> {
        match self {
            FlowPayload::Csv(text) => parse_corridor_csv(text),
            FlowPayload::Json(text) => {
                let rows: Vec<CorridorRecord> =
                    serde_json::from_str(text).map_err(|e| DataLoadError::Json(e.to_string()))?;
                rows.into_iter()
                    .enumerate()
                    .map(|(i, r)| {
                        r.normalized()
                            .map_err(|reason| DataLoadError::Malformed { row: i + 1, reason })
                    })
                    .collect()
            }
        }
    }
}

/// Where the corridor dataset comes from (network, disk, memory).
///
/// The returned future is the only place a load suspends.
pub trait FlowSource {
    fn fetch(&self) -> LocalBoxFuture<'static, Result<FlowPayload, DataLoadError>>;
}

/// A payload that is already in memory.
#[derive(Debug, Clone)]
pub struct StaticSource {
    payload: FlowPayload,
}

impl StaticSource {
    pub fn new(payload: FlowPayload) -> Self {
        Self { payload }
    }

    pub fn from_records(records: &[CorridorRecord]) -> Result<Self, DataLoadError> {
        let json = serde_json::to_string(records).map_err(|e| DataLoadError::Json(e.to_string()))?;
        Ok(Self::new(FlowPayload::Json(json)))
    }
}

impl FlowSource for StaticSource {
    fn fetch(&self) -> LocalBoxFuture<'static, Result<FlowPayload, DataLoadError>> {
        future::ready(Ok(self.payload.clone())).boxed_local()
    }
}

/// Reads a `.csv` or `.json` export from disk.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl FlowSource for FileSource {
    fn fetch(&self) -> LocalBoxFuture<'static, Result<FlowPayload, DataLoadError>> {
        let path = self.path.clone();
        async move {
            let text = std::fs::read_to_string(&path)
                .map_err(|e| DataLoadError::Fetch(format!("{}: {e}", path.display())))?;
            let is_json = path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
            Ok(if is_json {
                FlowPayload::Json(text)
            } else {
                FlowPayload::Csv(text)
            })
        }
        .boxed_local()
    }
}

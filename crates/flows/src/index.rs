use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap};
use std::ops::RangeInclusive;
use std::rc::Rc;

use foundation::iso::IsoCode;
use foundation::years::YearDomain;
use futures::future::{FutureExt, LocalBoxFuture, Shared};
use tracing::{info, warn};

use crate::error::DataLoadError;
use crate::record::{CorridorRecord, Role};
use crate::source::{FlowPayload, FlowSource};

#[derive(Debug, Default)]
struct YearBucket {
    by_origin: HashMap<IsoCode, Vec<usize>>,
    by_destination: HashMap<IsoCode, Vec<usize>>,
}

/// The loaded corridor collection and its lookup structures.
///
/// Immutable after construction; any number of readers may share it.
#[derive(Debug)]
pub struct FlowTable {
    records: Vec<CorridorRecord>,
    years: YearDomain,
    by_year: BTreeMap<i32, YearBucket>,
    by_pair: HashMap<(IsoCode, IsoCode), Vec<usize>>,
    names: BTreeMap<IsoCode, String>,
}

impl FlowTable {
    pub fn from_payload(payload: &FlowPayload) -> Result<Self, DataLoadError> {
        Self::from_records(payload.decode()?)
    }

    pub fn from_records(records: Vec<CorridorRecord>) -> Result<Self, DataLoadError> {
        let years = YearDomain::from_years(records.iter().map(|r| r.year))
            .ok_or(DataLoadError::Empty)?;

        let mut by_year: BTreeMap<i32, YearBucket> = BTreeMap::new();
        let mut by_pair: HashMap<(IsoCode, IsoCode), Vec<usize>> = HashMap::new();
        let mut names = BTreeMap::new();

        for (idx, r) in records.iter().enumerate() {
            let bucket = by_year.entry(r.year).or_default();
            bucket.by_origin.entry(r.origin_iso).or_default().push(idx);
            bucket
                .by_destination
                .entry(r.destination_iso)
                .or_default()
                .push(idx);
            by_pair
                .entry((r.origin_iso, r.destination_iso))
                .or_default()
                .push(idx);
            names
                .entry(r.origin_iso)
                .or_insert_with(|| r.origin_name.clone());
            names
                .entry(r.destination_iso)
                .or_insert_with(|| r.destination_name.clone());
        }

        for series in by_pair.values_mut() {
            series.sort_by_key(|&i| records[i].year);
        }

        Ok(Self {
            records,
            years,
            by_year,
            by_pair,
            names,
        })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[CorridorRecord] {
        &self.records
    }

    /// Distinct years present, ascending.
    pub fn years_available(&self) -> &YearDomain {
        &self.years
    }

    /// Records for `year` whose `role` column is `iso`, largest first.
    ///
    /// Equal magnitudes keep their load order.
    pub fn query(&self, year: i32, iso: IsoCode, role: Role) -> Vec<&CorridorRecord> {
        let Some(bucket) = self.by_year.get(&year) else {
            return Vec::new();
        };
        let column = match role {
            Role::Origin => &bucket.by_origin,
            Role::Destination => &bucket.by_destination,
        };
        let mut out: Vec<&CorridorRecord> = column
            .get(&iso)
            .map(|ids| ids.iter().map(|&i| &self.records[i]).collect())
            .unwrap_or_default();
        out.sort_by(|a, b| b.migrants_millions.total_cmp(&a.migrants_millions));
        out
    }

    /// Like [`query`](Self::query) across a span of years, grouped by year
    /// ascending.
    pub fn query_years(
        &self,
        years: RangeInclusive<i32>,
        iso: IsoCode,
        role: Role,
    ) -> Vec<&CorridorRecord> {
        self.by_year
            .range(years)
            .flat_map(|(&year, _)| self.query(year, iso, role))
            .collect()
    }

    /// One corridor over time, ordered by year.
    pub fn pair_series(&self, origin: IsoCode, destination: IsoCode) -> Vec<&CorridorRecord> {
        self.by_pair
            .get(&(origin, destination))
            .map(|ids| ids.iter().map(|&i| &self.records[i]).collect())
            .unwrap_or_default()
    }

    /// Canonical display name, as first seen in the data.
    pub fn display_name(&self, iso: IsoCode) -> Option<&str> {
        self.names.get(&iso).map(String::as_str)
    }

    /// Every country appearing on either side of a corridor, by ISO code.
    pub fn countries(&self) -> impl Iterator<Item = (IsoCode, &str)> + '_ {
        self.names.iter().map(|(iso, name)| (*iso, name.as_str()))
    }
}

type PendingLoad = Shared<LocalBoxFuture<'static, Result<Rc<FlowTable>, DataLoadError>>>;

enum LoadState {
    Unloaded,
    /// A fetch is in flight. `attempt` identifies it so that waiters of an
    /// earlier, already failed attempt cannot disturb a retry.
    Loading { attempt: u64, pending: PendingLoad },
    Loaded(Rc<FlowTable>),
}

/// Load-once owner of the corridor dataset.
///
/// Concurrent `load` calls share a single fetch. A failed load returns the
/// index to the unloaded state so a later call may retry.
pub struct FlowDataIndex {
    state: RefCell<LoadState>,
    attempts: Cell<u64>,
}

impl Default for FlowDataIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl FlowDataIndex {
    pub fn new() -> Self {
        Self {
            state: RefCell::new(LoadState::Unloaded),
            attempts: Cell::new(0),
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(*self.state.borrow(), LoadState::Loaded(_))
    }

    /// The table, if a load has completed.
    pub fn table(&self) -> Option<Rc<FlowTable>> {
        match &*self.state.borrow() {
            LoadState::Loaded(table) => Some(Rc::clone(table)),
            _ => None,
        }
    }

    pub async fn load(&self, source: &dyn FlowSource) -> Result<Rc<FlowTable>, DataLoadError> {
        let (attempt, pending) = {
            let mut state = self.state.borrow_mut();
            let in_flight = match &*state {
                LoadState::Loaded(table) => return Ok(Rc::clone(table)),
                LoadState::Loading { attempt, pending } => Some((*attempt, pending.clone())),
                LoadState::Unloaded => None,
            };
            match in_flight {
                Some(joined) => joined,
                None => {
                    let attempt = self.attempts.get() + 1;
                    self.attempts.set(attempt);
                    let pending = fetch_and_index(source.fetch()).boxed_local().shared();
                    *state = LoadState::Loading {
                        attempt,
                        pending: pending.clone(),
                    };
                    (attempt, pending)
                }
            }
        };

        let result = pending.await;

        let mut state = self.state.borrow_mut();
        // Only the attempt that is still current may settle the state.
        if !matches!(*state, LoadState::Loading { attempt: current, .. } if current == attempt) {
            return result;
        }
        match &result {
            Ok(table) => {
                let years = table.years_available();
                info!(
                    rows = table.len(),
                    first_year = years.earliest(),
                    last_year = years.latest(),
                    "corridor dataset loaded"
                );
                *state = LoadState::Loaded(Rc::clone(table));
            }
            Err(err) => {
                warn!(error = %err, "corridor dataset load failed");
                *state = LoadState::Unloaded;
            }
        }
        result
    }
}

async fn fetch_and_index(
    fetch: LocalBoxFuture<'static, Result<FlowPayload, DataLoadError>>,
) -> Result<Rc<FlowTable>, DataLoadError> {
    let payload = fetch.await?;
    FlowTable::from_payload(&payload).map(Rc::new)
}

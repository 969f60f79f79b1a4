use std::rc::Rc;

use flows::{CorridorRecord, DataLoadError, FlowDataIndex, FlowSource, Role};
use foundation::YearDomain;
use selection::SelectionState;

/// Identifies one dispatched reload.
///
/// `generation` increases by one per dispatch; only the ticket carrying the
/// coordinator's current generation may render.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ReloadTicket {
    pub generation: u64,
    pub selection: SelectionState,
}

/// Rows fetched for a ticket, before the flow limit is applied.
#[derive(Debug, Clone, PartialEq)]
pub struct ReloadData {
    pub ticket: ReloadTicket,
    /// Focus year after snapping to the dataset's years.
    pub year: i32,
    pub years: YearDomain,
    pub focus_name: Option<String>,
    /// Focus country as origin, largest first.
    pub outbound: Vec<CorridorRecord>,
    /// Focus country as destination, largest first.
    pub inbound: Vec<CorridorRecord>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    Rendered,
    /// The load failed and the "no data" state is shown.
    Failed,
    /// A newer reload was dispatched meanwhile; nothing changed.
    Stale,
}

/// Loads the dataset (once) and queries both directions for `ticket`.
///
/// This is the only step of a reload that suspends.
pub async fn fetch_reload(
    index: Rc<FlowDataIndex>,
    source: Rc<dyn FlowSource>,
    ticket: ReloadTicket,
) -> Result<ReloadData, DataLoadError> {
    let table = index.load(source.as_ref()).await?;
    let years = table.years_available().clone();
    let requested = ticket.selection.focus_year;
    let year = if years.contains(requested) {
        requested
    } else {
        years.latest()
    };

    let (focus_name, outbound, inbound) = match ticket.selection.focus_country {
        Some(iso) => {
            let collect = |role| {
                table
                    .query(year, iso, role)
                    .into_iter()
                    .cloned()
                    .collect::<Vec<_>>()
            };
            (
                table.display_name(iso).map(str::to_string),
                collect(Role::Origin),
                collect(Role::Destination),
            )
        }
        None => (None, Vec::new(), Vec::new()),
    };

    Ok(ReloadData {
        ticket,
        year,
        years,
        focus_name,
        outbound,
        inbound,
    })
}

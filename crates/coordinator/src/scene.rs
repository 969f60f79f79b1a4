use std::collections::HashMap;

use flows::CorridorRecord;
use foundation::IsoCode;
use layers::{
    ArcGeometryEngine, ArcStyle, Color, Corridor, FlowDirection, LegendEntry, PartnerRole,
    RegionTable, StrokeScale, flow_legend,
};
use selection::{FlowLimit, SelectionState};
use tracing::debug;

use crate::narrative::{Narrative, narrative_for};
use crate::reload::ReloadData;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum SceneStatus {
    /// Nothing has rendered yet.
    Loading,
    /// At least one corridor is drawn.
    Ready,
    /// The selection is valid but has no corridors.
    Empty,
    /// The dataset failed to load.
    Unavailable,
}

/// Everything the flow map draws for one selection.
///
/// Rebuilt in full on every reload; outbound corridors come first.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowScene {
    pub status: SceneStatus,
    /// The selection this scene shows, with the year already snapped.
    pub selection: Option<SelectionState>,
    pub focus_name: String,
    pub corridors: Vec<Corridor>,
    pub narrative: Narrative,
    pub legend: Vec<LegendEntry>,
    partners: HashMap<IsoCode, PartnerRole>,
}

/// Region tooltip: totals between the focus country and one partner.
#[derive(Debug, Clone, PartialEq)]
pub struct HoverSummary {
    pub name: String,
    pub emigrants_to: f64,
    pub immigrants_from: f64,
}

impl HoverSummary {
    pub fn lines(&self, focus_name: &str) -> [String; 3] {
        [
            self.name.clone(),
            format!("emigrants from {focus_name}: {:.2}M", self.emigrants_to),
            format!("immigrants to {focus_name}: {:.2}M", self.immigrants_from),
        ]
    }
}

/// Arc tooltip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorridorTooltip {
    pub heading: &'static str,
    pub route: String,
    pub amount: String,
}

impl FlowScene {
    pub fn loading() -> Self {
        Self::without_corridors(SceneStatus::Loading, Narrative::loading())
    }

    pub fn unavailable() -> Self {
        Self::without_corridors(SceneStatus::Unavailable, Narrative::unavailable())
    }

    fn without_corridors(status: SceneStatus, narrative: Narrative) -> Self {
        Self {
            status,
            selection: None,
            focus_name: String::new(),
            corridors: Vec::new(),
            narrative,
            legend: flow_legend(),
            partners: HashMap::new(),
        }
    }

    pub fn outbound(&self) -> impl Iterator<Item = &Corridor> {
        self.corridors
            .iter()
            .filter(|c| c.direction == FlowDirection::Outbound)
    }

    pub fn inbound(&self) -> impl Iterator<Item = &Corridor> {
        self.corridors
            .iter()
            .filter(|c| c.direction == FlowDirection::Inbound)
    }

    pub fn partner_role(&self, iso: IsoCode) -> PartnerRole {
        self.partners
            .get(&iso)
            .copied()
            .unwrap_or(PartnerRole::Unrelated)
    }

    pub fn region_fill(&self, iso: IsoCode) -> Color {
        self.partner_role(iso).fill()
    }

    pub fn hover_summary(&self, iso: IsoCode, name: &str) -> HoverSummary {
        let mut summary = HoverSummary {
            name: name.to_string(),
            emigrants_to: 0.0,
            immigrants_from: 0.0,
        };
        for c in self.corridors.iter().filter(|c| c.partner_iso() == iso) {
            match c.direction {
                FlowDirection::Outbound => summary.emigrants_to += c.record.migrants_millions,
                FlowDirection::Inbound => summary.immigrants_from += c.record.migrants_millions,
            }
        }
        summary
    }

    /// Stroke for arc `index` given the arc under the pointer, if any.
    pub fn arc_style(&self, index: usize, hovered: Option<usize>) -> Option<ArcStyle> {
        let c = self.corridors.get(index)?;
        Some(ArcStyle::for_arc(
            c.direction,
            c.stroke_weight,
            hovered.map(|h| h == index),
        ))
    }

    pub fn corridor_tooltip(&self, index: usize) -> Option<CorridorTooltip> {
        let c = self.corridors.get(index)?;
        Some(CorridorTooltip {
            heading: match c.direction {
                FlowDirection::Outbound => "Emigration",
                FlowDirection::Inbound => "Immigration",
            },
            route: format!("{} → {}", c.record.origin_name, c.record.destination_name),
            amount: format!("{:.2}M", c.record.migrants_millions),
        })
    }
}

/// Scene construction parameters.
#[derive(Debug, Copy, Clone)]
pub struct SceneBuilder<'a> {
    pub regions: &'a RegionTable,
    pub engine: &'a ArcGeometryEngine,
    pub stroke_range: [f64; 2],
    pub top_n: usize,
}

impl SceneBuilder<'_> {
    /// Turns fetched rows into the rendered scene.
    ///
    /// Rows whose endpoints have no centroid are dropped first, then the
    /// flow limit is applied to each direction separately.
    pub fn build(&self, data: ReloadData) -> FlowScene {
        let selection = SelectionState {
            focus_year: data.year,
            ..data.ticket.selection
        };
        let Some(focus) = selection.focus_country else {
            let mut scene =
                FlowScene::without_corridors(SceneStatus::Empty, Narrative::no_focus(data.year));
            scene.selection = Some(selection);
            return scene;
        };

        let focus_name = data
            .focus_name
            .or_else(|| self.regions.get(focus).map(|r| r.name.clone()))
            .unwrap_or_else(|| focus.to_string());

        let outbound = self.limit(self.drawable(data.outbound), selection.flow_limit);
        let inbound = self.limit(self.drawable(data.inbound), selection.flow_limit);
        let narrative = narrative_for(&focus_name, data.year, &outbound, &inbound);

        let max = outbound
            .iter()
            .chain(&inbound)
            .map(|r| r.migrants_millions)
            .fold(0.0, f64::max);
        let stroke = StrokeScale::new(max, self.stroke_range);

        let corridors: Vec<Corridor> = outbound
            .into_iter()
            .map(|r| (r, FlowDirection::Outbound))
            .chain(inbound.into_iter().map(|r| (r, FlowDirection::Inbound)))
            .filter_map(|(record, direction)| {
                let origin = self.regions.centroid(record.origin_iso)?;
                let destination = self.regions.centroid(record.destination_iso)?;
                let weight = stroke.width(record.migrants_millions);
                Some(
                    self.engine
                        .build_corridor(record, direction, origin, destination, weight),
                )
            })
            .collect();

        // Destination outranks origin, and the focus outranks both.
        let mut partners = HashMap::new();
        for c in corridors.iter().rev() {
            let role = match c.direction {
                FlowDirection::Outbound => PartnerRole::Destination,
                FlowDirection::Inbound => PartnerRole::Origin,
            };
            partners.insert(c.partner_iso(), role);
        }
        partners.insert(focus, PartnerRole::Focus);

        FlowScene {
            status: if corridors.is_empty() {
                SceneStatus::Empty
            } else {
                SceneStatus::Ready
            },
            selection: Some(selection),
            focus_name,
            corridors,
            narrative,
            legend: flow_legend(),
            partners,
        }
    }

    fn drawable(&self, rows: Vec<CorridorRecord>) -> Vec<CorridorRecord> {
        let before = rows.len();
        let kept: Vec<CorridorRecord> = rows
            .into_iter()
            .filter(|r| {
                self.regions.centroid(r.origin_iso).is_some()
                    && self.regions.centroid(r.destination_iso).is_some()
            })
            .collect();
        if kept.len() != before {
            debug!(dropped = before - kept.len(), "corridors without centroids skipped");
        }
        kept
    }

    fn limit(&self, rows: Vec<CorridorRecord>, limit: FlowLimit) -> Vec<CorridorRecord> {
        limit.truncate(rows, self.top_n)
    }
}

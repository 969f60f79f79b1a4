use foundation::math::SqrtScale;

use crate::arcs::FlowDirection;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn to_hex(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

pub const EMIGRATION_COLOR: Color = Color::rgb(0xD9, 0x4F, 0x70);
pub const IMMIGRATION_COLOR: Color = Color::rgb(0x3A, 0x71, 0xC4);

pub const FOCUS_FILL: Color = Color::rgb(0x99, 0x99, 0x99);
pub const DESTINATION_FILL: Color = Color::rgb(0xFF, 0xD6, 0xE3);
pub const ORIGIN_FILL: Color = Color::rgb(0xDC, 0xE8, 0xFF);
pub const LAND_FILL: Color = Color::rgb(0xF2, 0xF2, 0xF2);

pub const ARC_OPACITY: f64 = 0.60;
pub const ARC_DIMMED_OPACITY: f64 = 0.12;
/// Added to the stroke width of the hovered arc.
pub const ARC_HOVER_WIDTH_BONUS: f64 = 1.2;

pub const PARTICLE_RADIUS: f64 = 2.3;

pub fn direction_color(direction: FlowDirection) -> Color {
    match direction {
        FlowDirection::Outbound => EMIGRATION_COLOR,
        FlowDirection::Inbound => IMMIGRATION_COLOR,
    }
}

/// Stroke for one arc; while any arc is hovered the others dim.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ArcStyle {
    pub color: Color,
    pub width: f64,
    pub opacity: f64,
}

impl ArcStyle {
    /// `hovered` is `None` when no arc is under the pointer.
    pub fn for_arc(direction: FlowDirection, stroke_weight: f64, hovered: Option<bool>) -> Self {
        let (width, opacity) = match hovered {
            None => (stroke_weight, ARC_OPACITY),
            Some(true) => (stroke_weight + ARC_HOVER_WIDTH_BONUS, 1.0),
            Some(false) => (stroke_weight, ARC_DIMMED_OPACITY),
        };
        Self {
            color: direction_color(direction),
            width,
            opacity,
        }
    }
}

/// Particles brighten as they travel toward the destination.
pub fn particle_opacity(t: f64) -> f64 {
    0.35 + t.clamp(0.0, 1.0) * 0.4
}

/// Thinnest drawn corridor, in pixels.
pub const MIN_STROKE_WEIGHT: f64 = 1.3;

/// Stroke widths for one corridor set: sqrt of magnitude over `[0, max]`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct StrokeScale {
    scale: SqrtScale,
}

impl StrokeScale {
    pub fn new(max_migrants: f64, range: [f64; 2]) -> Self {
        Self {
            scale: SqrtScale::new([0.0, max_migrants.max(0.0)], range),
        }
    }

    pub fn width(&self, migrants_millions: f64) -> f64 {
        self.scale.apply(migrants_millions)
    }
}

/// How a region is filled relative to the focus country's corridors.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum PartnerRole {
    Focus,
    Destination,
    Origin,
    Unrelated,
}

impl PartnerRole {
    pub fn fill(self) -> Color {
        match self {
            PartnerRole::Focus => FOCUS_FILL,
            PartnerRole::Destination => DESTINATION_FILL,
            PartnerRole::Origin => ORIGIN_FILL,
            PartnerRole::Unrelated => LAND_FILL,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Swatch {
    Dot(Color),
    Fill(Color),
    None,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegendEntry {
    pub swatch: Swatch,
    pub label: &'static str,
}

pub fn flow_legend() -> Vec<LegendEntry> {
    vec![
        LegendEntry {
            swatch: Swatch::Dot(EMIGRATION_COLOR),
            label: "emigration (outflows)",
        },
        LegendEntry {
            swatch: Swatch::Dot(IMMIGRATION_COLOR),
            label: "immigration (inflows)",
        },
        LegendEntry {
            swatch: Swatch::Fill(DESTINATION_FILL),
            label: "top destinations",
        },
        LegendEntry {
            swatch: Swatch::Fill(ORIGIN_FILL),
            label: "top origins",
        },
        LegendEntry {
            swatch: Swatch::None,
            label: "particles show flow direction",
        },
    ]
}

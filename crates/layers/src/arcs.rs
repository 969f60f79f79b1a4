use flows::CorridorRecord;
use foundation::IsoCode;
use foundation::math::{LinearScale, LonLat, Mercator, Vec2, great_circle_distance};

/// Which side of the focus country a corridor sits on.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum FlowDirection {
    /// Focus country is the origin (emigration).
    Outbound,
    /// Focus country is the destination (immigration).
    Inbound,
}

impl FlowDirection {
    /// Sign applied to the control-point offset in screen space (y grows down).
    fn offset_sign(self) -> f64 {
        match self {
            FlowDirection::Outbound => -1.0,
            FlowDirection::Inbound => 1.0,
        }
    }
}

/// Quadratic Bézier in projected pixels.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct QuadraticArc {
    pub start: Vec2,
    pub control: Vec2,
    pub end: Vec2,
}

impl QuadraticArc {
    pub fn point_at(&self, t: f64) -> Vec2 {
        let t = t.clamp(0.0, 1.0);
        let u = 1.0 - t;
        self.start.scale(u * u) + self.control.scale(2.0 * u * t) + self.end.scale(t * t)
    }

    /// SVG path data: `M sx,sy Q cx,cy ex,ey`.
    pub fn to_svg_path(&self) -> String {
        format!(
            "M {},{} Q {},{} {},{}",
            self.start.x, self.start.y, self.control.x, self.control.y, self.end.x, self.end.y
        )
    }
}

/// A corridor ready to draw: record, endpoints and geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct Corridor {
    pub record: CorridorRecord,
    pub direction: FlowDirection,
    pub origin: LonLat,
    pub destination: LonLat,
    pub path: QuadraticArc,
    pub curvature: f64,
    pub stroke_weight: f64,
}

impl Corridor {
    /// The country on the far side of the focus country.
    pub fn partner_iso(&self) -> IsoCode {
        match self.direction {
            FlowDirection::Outbound => self.record.destination_iso,
            FlowDirection::Inbound => self.record.origin_iso,
        }
    }
}

/// Computes projected corridor paths.
///
/// Curvature grows with great-circle distance so short hops stay nearly flat,
/// and the control point is pushed up for outbound corridors and down for
/// inbound ones so the two directions between the same pair never overlap.
/// Endpoints outside the viewport are projected like any other.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ArcGeometryEngine {
    projection: Mercator,
    curvature: LinearScale,
}

impl ArcGeometryEngine {
    pub const CURVATURE_DOMAIN_RAD: [f64; 2] = [0.2, 1.5];
    pub const CURVATURE_RANGE_PX: [f64; 2] = [40.0, 120.0];

    pub fn new(
        projection: Mercator,
        curvature_domain: [f64; 2],
        curvature_range: [f64; 2],
    ) -> Self {
        Self {
            projection,
            curvature: LinearScale::new(curvature_domain, curvature_range).clamped(),
        }
    }

    pub fn for_viewport(width: f64, height: f64) -> Self {
        Self::new(
            Mercator::fit_viewport(width, height),
            Self::CURVATURE_DOMAIN_RAD,
            Self::CURVATURE_RANGE_PX,
        )
    }

    pub fn projection(&self) -> &Mercator {
        &self.projection
    }

    pub fn project(&self, p: LonLat) -> Vec2 {
        self.projection.project(p)
    }

    pub fn curvature_for(&self, origin: LonLat, destination: LonLat) -> f64 {
        self.curvature.apply(great_circle_distance(origin, destination))
    }

    pub fn path_for(
        &self,
        origin: LonLat,
        destination: LonLat,
        direction: FlowDirection,
    ) -> QuadraticArc {
        let curvature = self.curvature_for(origin, destination);
        self.arc_with_curvature(origin, destination, direction, curvature)
    }

    pub fn build_corridor(
        &self,
        record: CorridorRecord,
        direction: FlowDirection,
        origin: LonLat,
        destination: LonLat,
        stroke_weight: f64,
    ) -> Corridor {
        let curvature = self.curvature_for(origin, destination);
        let path = self.arc_with_curvature(origin, destination, direction, curvature);
        Corridor {
            record,
            direction,
            origin,
            destination,
            path,
            curvature,
            stroke_weight,
        }
    }

    fn arc_with_curvature(
        &self,
        origin: LonLat,
        destination: LonLat,
        direction: FlowDirection,
        curvature: f64,
    ) -> QuadraticArc {
        let start = self.project(origin);
        let end = self.project(destination);
        let mid = start.midpoint(end);
        QuadraticArc {
            start,
            control: Vec2::new(mid.x, mid.y + direction.offset_sign() * curvature),
            end,
        }
    }
}

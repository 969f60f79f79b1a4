use super::{LonLat, Vec2};

/// Latitude where the square Web-Mercator world ends.
pub const MERCATOR_MAX_LAT_DEG: f64 = 85.051_128_779_806_6;

/// Spherical Mercator projection to screen pixels (y grows downward).
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Mercator {
    pub scale: f64,
    pub translate: Vec2,
}

impl Mercator {
    pub const fn new(scale: f64, translate: Vec2) -> Self {
        Self { scale, translate }
    }

    /// World-map framing for a `width` x `height` viewport.
    pub fn fit_viewport(width: f64, height: f64) -> Self {
        Self::new(width / 7.0, Vec2::new(width / 2.0, height / 1.5))
    }

    pub fn project(&self, p: LonLat) -> Vec2 {
        let lambda = p.lon_deg.to_radians();
        let phi = p
            .lat_deg
            .clamp(-MERCATOR_MAX_LAT_DEG, MERCATOR_MAX_LAT_DEG)
            .to_radians();
        let y = (std::f64::consts::FRAC_PI_4 + phi * 0.5).tan().ln();
        Vec2::new(
            self.translate.x + self.scale * lambda,
            self.translate.y - self.scale * y,
        )
    }
}

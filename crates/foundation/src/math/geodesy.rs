use super::Vec3;

/// Geographic position in degrees (GeoJSON axis order: longitude first).
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LonLat {
    pub lon_deg: f64,
    pub lat_deg: f64,
}

impl LonLat {
    pub const fn new(lon_deg: f64, lat_deg: f64) -> Self {
        Self { lon_deg, lat_deg }
    }

    /// Direction on the unit sphere.
    pub fn to_unit(self) -> Vec3 {
        let lat = self.lat_deg.to_radians();
        let lon = self.lon_deg.to_radians();
        let cos_lat = lat.cos();
        Vec3::new(cos_lat * lon.cos(), cos_lat * lon.sin(), lat.sin())
    }

    /// Inverse of [`LonLat::to_unit`]; `v` need not be normalized.
    pub fn from_direction(v: Vec3) -> Option<Self> {
        let n = v.normalized()?;
        Some(Self::new(
            n.y.atan2(n.x).to_degrees(),
            n.z.clamp(-1.0, 1.0).asin().to_degrees(),
        ))
    }
}

/// Great-circle angular distance in radians (haversine form).
pub fn great_circle_distance(a: LonLat, b: LonLat) -> f64 {
    let phi_a = a.lat_deg.to_radians();
    let phi_b = b.lat_deg.to_radians();
    let d_phi = phi_b - phi_a;
    let d_lambda = (b.lon_deg - a.lon_deg).to_radians();

    let h = (d_phi * 0.5).sin().powi(2)
        + phi_a.cos() * phi_b.cos() * (d_lambda * 0.5).sin().powi(2);
    2.0 * h.sqrt().min(1.0).asin()
}

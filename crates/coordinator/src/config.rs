use foundation::IsoCode;
use foundation::math::Mercator;
use layers::{ArcGeometryEngine, MIN_STROKE_WEIGHT, ParticleAnimator};
use selection::{FlowLimit, Metric, SelectionState};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("config json: {0}")]
    Json(String),
    #[error("viewport must have a positive size, got {width}x{height}")]
    Viewport { width: f64, height: f64 },
    #[error("{name} range must be finite and ascending, got {range:?}")]
    Range { name: &'static str, range: [f64; 2] },
    #[error("stroke widths must start at {min} px or more, got {range:?}")]
    StrokeFloor { min: f64, range: [f64; 2] },
    #[error("particle speeds must satisfy 0 < min <= max, got {min}..{max}")]
    ParticleSpeed { min: f64, max: f64 },
    #[error("top_n must be at least 1")]
    TopN,
    #[error("autoplay intervals must be non-zero")]
    AutoplayInterval,
}

/// Flow map settings; every field has a default, so `{}` is a valid config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowMapConfig {
    pub default_country: Option<IsoCode>,
    /// Used until the dataset's years are known.
    pub default_year: i32,
    pub default_flow_limit: FlowLimit,
    pub default_metric: Metric,
    /// Corridors kept per direction under [`FlowLimit::Top10`].
    pub top_n: usize,
    pub viewport: ViewportConfig,
    pub curvature: CurvatureConfig,
    pub stroke: StrokeConfig,
    pub particles: ParticleConfig,
    pub autoplay: AutoplayConfig,
}

impl Default for FlowMapConfig {
    fn default() -> Self {
        Self {
            default_country: IsoCode::parse("MEX").ok(),
            default_year: 2024,
            default_flow_limit: FlowLimit::Top10,
            default_metric: Metric::Immigration,
            top_n: 10,
            viewport: ViewportConfig::default(),
            curvature: CurvatureConfig::default(),
            stroke: StrokeConfig::default(),
            particles: ParticleConfig::default(),
            autoplay: AutoplayConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    pub width: f64,
    pub height: f64,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            width: 960.0,
            height: 520.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurvatureConfig {
    /// Great-circle distance in radians.
    pub domain: [f64; 2],
    /// Control-point offset in projected pixels.
    pub range: [f64; 2],
}

impl Default for CurvatureConfig {
    fn default() -> Self {
        Self {
            domain: ArcGeometryEngine::CURVATURE_DOMAIN_RAD,
            range: ArcGeometryEngine::CURVATURE_RANGE_PX,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrokeConfig {
    pub range: [f64; 2],
}

impl Default for StrokeConfig {
    fn default() -> Self {
        Self {
            range: [MIN_STROKE_WEIGHT, 5.0],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticleConfig {
    pub min_speed: f64,
    pub max_speed: f64,
    /// Fixed seed for reproducible particle phases.
    pub seed: Option<u64>,
}

impl Default for ParticleConfig {
    fn default() -> Self {
        let [min_speed, max_speed] = ParticleAnimator::DEFAULT_SPEED_RANGE;
        Self {
            min_speed,
            max_speed,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoplayConfig {
    pub year_interval_ms: u64,
    pub metric_interval_ms: u64,
}

impl Default for AutoplayConfig {
    fn default() -> Self {
        Self {
            year_interval_ms: 900,
            metric_interval_ms: 1200,
        }
    }
}

impl FlowMapConfig {
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(text).map_err(|e| ConfigError::Json(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let ViewportConfig { width, height } = self.viewport;
        if !(width > 0.0 && height > 0.0 && width.is_finite() && height.is_finite()) {
            return Err(ConfigError::Viewport { width, height });
        }
        check_range("curvature.domain", self.curvature.domain)?;
        check_range("curvature.range", self.curvature.range)?;
        check_range("stroke.range", self.stroke.range)?;
        if self.stroke.range[0] < MIN_STROKE_WEIGHT {
            return Err(ConfigError::StrokeFloor {
                min: MIN_STROKE_WEIGHT,
                range: self.stroke.range,
            });
        }
        let ParticleConfig { min_speed, max_speed, .. } = self.particles;
        if !(min_speed > 0.0 && min_speed <= max_speed && max_speed.is_finite()) {
            return Err(ConfigError::ParticleSpeed {
                min: min_speed,
                max: max_speed,
            });
        }
        if self.top_n == 0 {
            return Err(ConfigError::TopN);
        }
        if self.autoplay.year_interval_ms == 0 || self.autoplay.metric_interval_ms == 0 {
            return Err(ConfigError::AutoplayInterval);
        }
        Ok(())
    }

    pub fn initial_selection(&self) -> SelectionState {
        SelectionState {
            focus_country: self.default_country,
            focus_year: self.default_year,
            flow_limit: self.default_flow_limit,
            metric: self.default_metric,
        }
    }

    pub fn arc_engine(&self) -> ArcGeometryEngine {
        ArcGeometryEngine::new(
            Mercator::fit_viewport(self.viewport.width, self.viewport.height),
            self.curvature.domain,
            self.curvature.range,
        )
    }

    pub fn particle_animator(&self) -> ParticleAnimator {
        ParticleAnimator::new(
            [self.particles.min_speed, self.particles.max_speed],
            self.particles.seed,
        )
    }
}

fn check_range(name: &'static str, range: [f64; 2]) -> Result<(), ConfigError> {
    let [lo, hi] = range;
    if lo.is_finite() && hi.is_finite() && lo < hi {
        Ok(())
    } else {
        Err(ConfigError::Range { name, range })
    }
}

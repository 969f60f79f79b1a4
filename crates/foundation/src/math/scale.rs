/// Linear mapping from `domain` to `range`, optionally clamped.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LinearScale {
    pub domain: [f64; 2],
    pub range: [f64; 2],
    pub clamp: bool,
}

impl LinearScale {
    pub const fn new(domain: [f64; 2], range: [f64; 2]) -> Self {
        Self {
            domain,
            range,
            clamp: false,
        }
    }

    pub const fn clamped(mut self) -> Self {
        self.clamp = true;
        self
    }

    pub fn apply(&self, x: f64) -> f64 {
        let [d0, d1] = self.domain;
        let [r0, r1] = self.range;
        let span = d1 - d0;
        if span == 0.0 || !span.is_finite() {
            return r0;
        }
        let mut t = (x - d0) / span;
        if self.clamp {
            t = t.clamp(0.0, 1.0);
        }
        r0 + (r1 - r0) * t
    }
}

/// Square-root scale: linear in `sqrt(x)`, as used for stroke widths.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SqrtScale {
    linear: LinearScale,
}

impl SqrtScale {
    pub fn new(domain: [f64; 2], range: [f64; 2]) -> Self {
        Self {
            linear: LinearScale::new([domain[0].sqrt(), domain[1].sqrt()], range),
        }
    }

    pub fn apply(&self, x: f64) -> f64 {
        self.linear.apply(x.max(0.0).sqrt())
    }
}

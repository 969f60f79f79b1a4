use foundation::math::Vec2;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use runtime::{EventBus, EventKind, Frame, FrameScheduler};

use crate::arcs::Corridor;
use crate::symbology::{Color, PARTICLE_RADIUS, direction_color, particle_opacity};

/// One moving dot; `corridor` indexes the corridor set it was seeded from.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Particle {
    pub corridor: usize,
    pub t: f64,
    pub speed: f64,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum AnimatorState {
    Idle,
    Running,
}

/// Drawable particle for the current frame.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ParticleSprite {
    pub position: Vec2,
    pub radius: f64,
    pub opacity: f64,
    pub color: Color,
}

/// Advances one particle per corridor along its arc.
///
/// Ticks come from the host frame scheduler: every tick moves each particle
/// by its speed, emits a single repaint and asks for the next frame. The
/// particle set is never reconciled; a new corridor set goes through
/// [`ParticleAnimator::restart`].
#[derive(Debug)]
pub struct ParticleAnimator {
    state: AnimatorState,
    particles: Vec<Particle>,
    speed_range: [f64; 2],
    rng: SmallRng,
}

impl ParticleAnimator {
    pub const DEFAULT_SPEED_RANGE: [f64; 2] = [0.002, 0.006];

    /// `seed` makes particle phases reproducible; `None` seeds from the OS.
    pub fn new(speed_range: [f64; 2], seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_os_rng(),
        };
        let [lo, hi] = speed_range;
        Self {
            state: AnimatorState::Idle,
            particles: Vec::new(),
            speed_range: [lo.min(hi), lo.max(hi)],
            rng,
        }
    }

    pub fn state(&self) -> AnimatorState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == AnimatorState::Running
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Seeds one particle per corridor and requests the first frame.
    ///
    /// An empty corridor set leaves the animator idle.
    pub fn start(&mut self, corridors: &[Corridor], scheduler: &mut FrameScheduler) {
        if self.is_running() || corridors.is_empty() {
            return;
        }
        let [lo, hi] = self.speed_range;
        self.particles = (0..corridors.len())
            .map(|corridor| Particle {
                corridor,
                t: self.rng.random::<f64>(),
                speed: lo + self.rng.random::<f64>() * (hi - lo),
            })
            .collect();
        self.state = AnimatorState::Running;
        scheduler.request_frame();
    }

    pub fn stop(&mut self, scheduler: &mut FrameScheduler) {
        if self.state == AnimatorState::Running {
            scheduler.cancel();
        }
        self.particles.clear();
        self.state = AnimatorState::Idle;
    }

    pub fn restart(&mut self, corridors: &[Corridor], scheduler: &mut FrameScheduler) {
        self.stop(scheduler);
        self.start(corridors, scheduler);
    }

    /// Advances every particle; returns `false` when idle.
    pub fn tick(
        &mut self,
        frame: Frame,
        bus: &mut EventBus,
        scheduler: &mut FrameScheduler,
    ) -> bool {
        if self.state != AnimatorState::Running {
            return false;
        }
        for p in &mut self.particles {
            p.t += p.speed;
            if p.t > 1.0 {
                p.t = 0.0;
            }
        }
        bus.emit_in(frame, EventKind::Repaint, "particles");
        scheduler.request_frame();
        true
    }

    /// Sprites for the corridor set the particles were seeded from.
    pub fn sprites(&self, corridors: &[Corridor]) -> Vec<ParticleSprite> {
        self.particles
            .iter()
            .filter_map(|p| {
                let corridor = corridors.get(p.corridor)?;
                Some(ParticleSprite {
                    position: corridor.path.point_at(p.t),
                    radius: PARTICLE_RADIUS,
                    opacity: particle_opacity(p.t),
                    color: direction_color(corridor.direction),
                })
            })
            .collect()
    }
}

impl Default for ParticleAnimator {
    fn default() -> Self {
        Self::new(Self::DEFAULT_SPEED_RANGE, None)
    }
}

#[cfg(test)]
mod tests {
    use super::{AnimatorState, ParticleAnimator};
    use crate::arcs::{ArcGeometryEngine, Corridor, FlowDirection};
    use crate::symbology::{EMIGRATION_COLOR, IMMIGRATION_COLOR};
    use flows::CorridorRecord;
    use foundation::IsoCode;
    use foundation::math::LonLat;
    use foundation::time::Time;
    use runtime::{EventBus, EventKind, FrameScheduler};

    fn corridor(direction: FlowDirection) -> Corridor {
        let iso = |s: &str| IsoCode::parse(s).expect("iso");
        let record = CorridorRecord {
            year: 2020,
            origin_iso: iso("MEX"),
            destination_iso: iso("USA"),
            origin_name: "Mexico".into(),
            destination_name: "United States".into(),
            origin_subregion: String::new(),
            destination_subregion: String::new(),
            migrants_millions: 5.0,
        };
        ArcGeometryEngine::for_viewport(960.0, 520.0).build_corridor(
            record,
            direction,
            LonLat::new(-102.0, 23.0),
            LonLat::new(-98.0, 39.0),
            5.0,
        )
    }

    #[test]
    fn start_seeds_one_particle_per_corridor() {
        let mut sched = FrameScheduler::new();
        let mut a = ParticleAnimator::new([0.002, 0.006], Some(7));
        let set = vec![corridor(FlowDirection::Outbound), corridor(FlowDirection::Inbound)];
        a.start(&set, &mut sched);
        assert_eq!(a.state(), AnimatorState::Running);
        assert_eq!(a.particles().len(), 2);
        assert!(sched.is_pending());
        for p in a.particles() {
            assert!((0.0..1.0).contains(&p.t));
            assert!((0.002..0.006).contains(&p.speed));
        }
    }

    #[test]
    fn empty_set_stays_idle() {
        let mut sched = FrameScheduler::new();
        let mut a = ParticleAnimator::new([0.002, 0.006], Some(1));
        a.start(&[], &mut sched);
        assert_eq!(a.state(), AnimatorState::Idle);
        assert!(!sched.is_pending());
    }

    #[test]
    fn each_tick_advances_and_repaints_once() {
        let mut sched = FrameScheduler::new();
        let mut bus = EventBus::new();
        let mut a = ParticleAnimator::new([0.002, 0.006], Some(3));
        let set = vec![corridor(FlowDirection::Outbound)];
        a.start(&set, &mut sched);
        let before = a.particles()[0];

        let frame = sched.on_host_frame(Time(0.0)).expect("first frame");
        assert!(a.tick(frame, &mut bus, &mut sched));
        let after = a.particles()[0];
        if before.t + before.speed <= 1.0 {
            assert!((after.t - (before.t + before.speed)).abs() < 1e-12);
        } else {
            assert_eq!(after.t, 0.0);
        }
        assert_eq!(bus.count(EventKind::Repaint), 1);
        assert!(sched.is_pending());
    }

    #[test]
    fn particles_wrap_back_to_zero() {
        let mut sched = FrameScheduler::new();
        let mut bus = EventBus::new();
        let mut a = ParticleAnimator::new([0.006, 0.006], Some(11));
        let set = vec![corridor(FlowDirection::Inbound)];
        a.start(&set, &mut sched);
        let mut wrapped = false;
        for i in 0..400 {
            let frame = sched.on_host_frame(Time(i as f64 / 60.0)).expect("frame requested");
            let prev = a.particles()[0].t;
            a.tick(frame, &mut bus, &mut sched);
            let t = a.particles()[0].t;
            assert!((0.0..=1.0).contains(&t));
            if t < prev {
                assert_eq!(t, 0.0);
                wrapped = true;
            }
        }
        assert!(wrapped);
        assert_eq!(bus.count(EventKind::Repaint), 400);
    }

    #[test]
    fn stop_releases_particles_and_frames() {
        let mut sched = FrameScheduler::new();
        let mut bus = EventBus::new();
        let mut a = ParticleAnimator::new([0.002, 0.006], Some(5));
        a.start(&[corridor(FlowDirection::Outbound)], &mut sched);
        a.stop(&mut sched);
        assert_eq!(a.state(), AnimatorState::Idle);
        assert!(a.particles().is_empty());
        assert!(sched.on_host_frame(Time(0.0)).is_none());
        let frame = runtime::Frame::first(Time(0.0));
        assert!(!a.tick(frame, &mut bus, &mut sched));
        assert_eq!(bus.count(EventKind::Repaint), 0);
    }

    #[test]
    fn restart_reseeds_for_new_set() {
        let mut sched = FrameScheduler::new();
        let mut a = ParticleAnimator::new([0.002, 0.006], Some(9));
        a.start(&[corridor(FlowDirection::Outbound)], &mut sched);
        let set = vec![
            corridor(FlowDirection::Outbound),
            corridor(FlowDirection::Inbound),
            corridor(FlowDirection::Inbound),
        ];
        a.restart(&set, &mut sched);
        assert_eq!(a.particles().len(), 3);
        assert!(a.is_running());
    }

    #[test]
    fn sprites_follow_direction_colors() {
        let mut sched = FrameScheduler::new();
        let mut a = ParticleAnimator::new([0.002, 0.006], Some(2));
        let set = vec![corridor(FlowDirection::Outbound), corridor(FlowDirection::Inbound)];
        a.start(&set, &mut sched);
        let sprites = a.sprites(&set);
        assert_eq!(sprites.len(), 2);
        assert_eq!(sprites[0].color, EMIGRATION_COLOR);
        assert_eq!(sprites[1].color, IMMIGRATION_COLOR);
        assert_eq!(sprites[0].radius, 2.3);
        assert!(sprites.iter().all(|s| s.opacity >= 0.35 && s.opacity <= 0.75));
    }
}

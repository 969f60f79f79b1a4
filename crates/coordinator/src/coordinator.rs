use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use flows::{CountryDirectory, DataLoadError, FlowDataIndex, FlowSource};
use foundation::IsoCode;
use foundation::time::Time;
use futures::future::{FutureExt, LocalBoxFuture};
use layers::{ArcGeometryEngine, ParticleAnimator, ParticleSprite, RegionTable};
use runtime::{Event, EventBus, EventKind, FrameScheduler};
use selection::{SelectionPatch, SelectionState, SelectionStore, SetOutcome, Subscription};
use tracing::debug;

use crate::autoplay::{Autoplay, AutoplayError, AutoplayKind};
use crate::config::{ConfigError, FlowMapConfig};
use crate::controls::Controls;
use crate::reload::{ApplyOutcome, ReloadData, ReloadTicket, fetch_reload};
use crate::scene::{FlowScene, SceneBuilder};

/// Keeps the flow map in step with the shared selection.
///
/// Store notifications are only queued by the subscriber; the host drains
/// them with [`poll_selection`](Self::poll_selection), which coalesces
/// everything pending into one reload for the newest state. Every dispatch
/// bumps the reload generation and only a result carrying the current
/// generation is rendered, so a slow load can never overwrite a newer one.
pub struct FlowMapCoordinator {
    config: FlowMapConfig,
    store: SelectionStore,
    index: Rc<FlowDataIndex>,
    source: Rc<dyn FlowSource>,
    regions: RegionTable,
    engine: ArcGeometryEngine,
    animator: ParticleAnimator,
    scheduler: FrameScheduler,
    bus: EventBus,
    autoplay: Autoplay,
    controls: Controls,
    inbox: Rc<RefCell<VecDeque<SelectionState>>>,
    _subscription: Subscription,
    generation: u64,
    last_dispatched: Option<SelectionState>,
    directory_installed: bool,
    scene: FlowScene,
}

impl FlowMapCoordinator {
    /// Builds the coordinator around a fresh store seeded with the
    /// configured startup selection.
    pub fn from_config(
        config: FlowMapConfig,
        index: Rc<FlowDataIndex>,
        source: Rc<dyn FlowSource>,
        regions: RegionTable,
    ) -> Result<Self, ConfigError> {
        let store = SelectionStore::new(config.initial_selection());
        Self::new(config, store, index, source, regions)
    }

    pub fn new(
        config: FlowMapConfig,
        store: SelectionStore,
        index: Rc<FlowDataIndex>,
        source: Rc<dyn FlowSource>,
        regions: RegionTable,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let inbox = Rc::new(RefCell::new(VecDeque::new()));
        let queued = Rc::clone(&inbox);
        let subscription = store.subscribe(move |state: &SelectionState| {
            queued.borrow_mut().push_back(*state);
        });

        Ok(Self {
            engine: config.arc_engine(),
            animator: config.particle_animator(),
            autoplay: Autoplay::new(
                config.autoplay.year_interval_ms,
                config.autoplay.metric_interval_ms,
            ),
            controls: Controls::attach(&store),
            config,
            store,
            index,
            source,
            regions,
            scheduler: FrameScheduler::new(),
            bus: EventBus::new(),
            inbox,
            _subscription: subscription,
            generation: 0,
            last_dispatched: None,
            directory_installed: false,
            scene: FlowScene::loading(),
        })
    }

    pub fn store(&self) -> &SelectionStore {
        &self.store
    }

    pub fn scene(&self) -> &FlowScene {
        &self.scene
    }

    pub fn controls(&self) -> &Controls {
        &self.controls
    }

    pub fn config(&self) -> &FlowMapConfig {
        &self.config
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn animator(&self) -> &ParticleAnimator {
        &self.animator
    }

    pub fn events(&self) -> &[Event] {
        self.bus.events()
    }

    pub fn drain_events(&mut self) -> Vec<Event> {
        self.bus.drain()
    }

    /// Text for the descriptive panel.
    pub fn narrative_text(&self) -> String {
        self.scene.narrative.text()
    }

    /// A map click on `iso`.
    pub fn select_country(&self, iso: IsoCode) -> SetOutcome {
        self.store.set(SelectionPatch::new().country(iso))
    }

    /// Dispatches a reload for the store's current state, whatever was
    /// rendered before. Used for the first render.
    pub fn reload_current(&mut self) -> ReloadTicket {
        self.inbox.borrow_mut().clear();
        let state = self.store.get();
        self.dispatch(state)
    }

    /// Coalesces queued notifications into at most one reload.
    ///
    /// A state equal to the last dispatched selection (after year snapping)
    /// is the echo of the coordinator's own write-back, or a repeat, and is
    /// not reloaded.
    pub fn poll_selection(&mut self) -> Option<ReloadTicket> {
        let newest = {
            let mut inbox = self.inbox.borrow_mut();
            let newest = inbox.pop_back();
            inbox.clear();
            newest
        }?;
        if self.last_dispatched == Some(newest) {
            debug!(?newest, "redundant reload suppressed");
            return None;
        }
        Some(self.dispatch(newest))
    }

    fn dispatch(&mut self, selection: SelectionState) -> ReloadTicket {
        self.generation += 1;
        self.last_dispatched = Some(selection);
        self.bus.emit(
            self.scheduler.frame_index(),
            EventKind::ReloadDispatched,
            format!("generation {}", self.generation),
        );
        ReloadTicket {
            generation: self.generation,
            selection,
        }
    }

    /// The data step of a reload. The future owns what it needs, so any
    /// number of reloads may be in flight at once.
    pub fn fetch(
        &self,
        ticket: ReloadTicket,
    ) -> LocalBoxFuture<'static, Result<ReloadData, DataLoadError>> {
        fetch_reload(Rc::clone(&self.index), Rc::clone(&self.source), ticket).boxed_local()
    }

    fn is_current(&mut self, ticket: ReloadTicket) -> bool {
        if ticket.generation == self.generation {
            return true;
        }
        debug!(
            stale = ticket.generation,
            current = self.generation,
            "stale reload result discarded"
        );
        self.bus.emit(
            self.scheduler.frame_index(),
            EventKind::StaleDiscarded,
            format!("generation {}", ticket.generation),
        );
        false
    }

    /// Renders fetched rows unless a newer reload was dispatched meanwhile.
    pub fn apply(&mut self, data: ReloadData) -> ApplyOutcome {
        if !self.is_current(data.ticket) {
            return ApplyOutcome::Stale;
        }

        // Recorded first so the write-back below is recognised as an echo.
        self.last_dispatched = Some(SelectionState {
            focus_year: data.year,
            ..data.ticket.selection
        });
        if self.store.year_domain().as_ref() != Some(&data.years) {
            self.store.install_year_domain(data.years.clone());
        }
        if !data.years.contains(self.store.get().focus_year) {
            self.store.set(SelectionPatch::new().year(data.years.latest()));
        }
        if !self.directory_installed
            && let Some(table) = self.index.table()
        {
            self.controls.set_directory(CountryDirectory::from_table(&table));
            self.directory_installed = true;
        }

        let generation = data.ticket.generation;
        let builder = SceneBuilder {
            regions: &self.regions,
            engine: &self.engine,
            stroke_range: self.config.stroke.range,
            top_n: self.config.top_n,
        };
        self.scene = builder.build(data);
        self.animator.restart(&self.scene.corridors, &mut self.scheduler);
        self.bus.emit(
            self.scheduler.frame_index(),
            EventKind::ReloadApplied,
            format!(
                "generation {generation}: {} corridors",
                self.scene.corridors.len()
            ),
        );
        ApplyOutcome::Rendered
    }

    /// Shows the "no data" state for a failed load, if `ticket` is current.
    pub fn fail(&mut self, ticket: ReloadTicket, err: &DataLoadError) -> ApplyOutcome {
        if !self.is_current(ticket) {
            return ApplyOutcome::Stale;
        }
        self.animator.stop(&mut self.scheduler);
        self.scene = FlowScene::unavailable();
        // Let the next notification retry the load.
        self.last_dispatched = None;
        self.bus.emit(
            self.scheduler.frame_index(),
            EventKind::LoadFailed,
            err.to_string(),
        );
        ApplyOutcome::Failed
    }

    pub fn settle(
        &mut self,
        ticket: ReloadTicket,
        result: Result<ReloadData, DataLoadError>,
    ) -> ApplyOutcome {
        match result {
            Ok(data) => self.apply(data),
            Err(err) => self.fail(ticket, &err),
        }
    }

    /// Polls the selection and, if a reload is due, runs it to completion.
    pub async fn run_pending_reload(&mut self) -> Option<ApplyOutcome> {
        let ticket = self.poll_selection()?;
        let result = self.fetch(ticket).await;
        Some(self.settle(ticket, result))
    }

    /// Host display refresh; returns `true` if the particles advanced.
    pub fn on_animation_frame(&mut self, now: Time) -> bool {
        let Some(frame) = self.scheduler.on_host_frame(now) else {
            return false;
        };
        self.animator.tick(frame, &mut self.bus, &mut self.scheduler)
    }

    pub fn particle_sprites(&self) -> Vec<ParticleSprite> {
        self.animator.sprites(&self.scene.corridors)
    }

    pub fn start_autoplay(&mut self, kind: AutoplayKind, now: Time) -> Result<(), AutoplayError> {
        self.autoplay.start(kind, now)
    }

    pub fn stop_autoplay(&mut self, kind: AutoplayKind) -> bool {
        self.autoplay.stop(kind)
    }

    pub fn toggle_autoplay(&mut self, kind: AutoplayKind, now: Time) -> bool {
        self.autoplay.toggle(kind, now)
    }

    pub fn autoplay(&self) -> &Autoplay {
        &self.autoplay
    }

    /// Host timer callback: advances the year and/or metric when due.
    pub fn on_timer(&mut self, now: Time) -> Vec<AutoplayKind> {
        let fired = self.autoplay.poll(now);
        for &kind in &fired {
            let current = self.store.get();
            let patch = match kind {
                AutoplayKind::Year => match self.store.year_domain() {
                    Some(years) => SelectionPatch::new().year(years.next_after(current.focus_year)),
                    None => continue,
                },
                AutoplayKind::Metric => SelectionPatch::new().metric(current.metric.next()),
            };
            self.bus.emit(
                self.scheduler.frame_index(),
                EventKind::AutoplayTick,
                format!("{kind:?}"),
            );
            self.store.set(patch);
        }
        fired
    }
}

use std::rc::Rc;

use coordinator::{
    ApplyOutcome, AutoplayError, AutoplayKind, Concentration, FlowMapConfig, FlowMapCoordinator,
    SceneStatus,
};
use flows::{CorridorRecord, DataLoadError, FlowDataIndex, FlowPayload, FlowSource, StaticSource};
use foundation::IsoCode;
use foundation::math::LonLat;
use foundation::time::Time;
use futures::channel::oneshot;
use futures::future::{FutureExt, LocalBoxFuture, Shared};
use layers::{FlowDirection, RegionTable};
use pretty_assertions::assert_eq;
use runtime::EventKind;
use selection::{FlowLimit, Metric, SelectionPatch, SelectionState, SelectionStore, SetOutcome};

fn iso(s: &str) -> IsoCode {
    IsoCode::parse(s).unwrap()
}

fn name(code: &str) -> String {
    match code {
        "MEX" => "Mexico".into(),
        "USA" => "United States".into(),
        "CAN" => "Canada".into(),
        "FRA" => "France".into(),
        "DEU" => "Germany".into(),
        other => format!("Country {other}"),
    }
}

fn rec(year: i32, origin: &str, dest: &str, m: f64) -> CorridorRecord {
    CorridorRecord {
        year,
        origin_iso: iso(origin),
        destination_iso: iso(dest),
        origin_name: name(origin),
        destination_name: name(dest),
        origin_subregion: String::new(),
        destination_subregion: String::new(),
        migrants_millions: m,
    }
}

/// Synthetic partner codes `PAA`, `PAB`, ...
fn partner(i: usize) -> String {
    format!("P{}{}", (b'A' + (i / 26) as u8) as char, (b'A' + (i % 26) as u8) as char)
}

fn regions() -> RegionTable {
    let mut t = RegionTable::new();
    t.insert(iso("MEX"), "Mexico", LonLat::new(-102.5, 23.9));
    t.insert(iso("USA"), "United States", LonLat::new(-99.0, 39.5));
    t.insert(iso("CAN"), "Canada", LonLat::new(-98.3, 61.4));
    t.insert(iso("FRA"), "France", LonLat::new(2.5, 46.6));
    t.insert(iso("DEU"), "Germany", LonLat::new(10.4, 51.1));
    for i in 0..20 {
        t.insert(iso(&partner(i)), partner(i), LonLat::new(-60.0 + 6.0 * i as f64, -10.0));
    }
    t
}

fn seeded_config() -> FlowMapConfig {
    let mut config = FlowMapConfig::default();
    config.particles.seed = Some(7);
    config
}

fn build(source: Rc<dyn FlowSource>, initial: SelectionState) -> FlowMapCoordinator {
    FlowMapCoordinator::new(
        seeded_config(),
        SelectionStore::new(initial),
        Rc::new(FlowDataIndex::new()),
        source,
        regions(),
    )
    .expect("valid config")
}

fn static_source(records: &[CorridorRecord]) -> Rc<dyn FlowSource> {
    Rc::new(StaticSource::from_records(records).expect("serializable"))
}

#[test]
fn default_config_opens_on_mexico_in_the_latest_year() {
    let config = FlowMapConfig::default();
    let source = static_source(&[
        rec(2015, "MEX", "USA", 12.0),
        rec(2020, "MEX", "USA", 10.9),
        rec(2020, "CAN", "MEX", 0.1),
    ]);
    let mut map =
        FlowMapCoordinator::from_config(config, Rc::new(FlowDataIndex::new()), source, regions())
            .expect("valid config");
    assert_eq!(map.store().get().focus_country, Some(iso("MEX")));

    pollster::block_on(async {
        let ticket = map.reload_current();
        let result = map.fetch(ticket).await;
        assert_eq!(map.settle(ticket, result), ApplyOutcome::Rendered);
    });

    let state = map.store().get();
    assert_eq!(state.focus_country, Some(iso("MEX")));
    assert_eq!(state.focus_year, 2020);
    assert_eq!(state.flow_limit, map.config().default_flow_limit);
    assert_eq!(state.metric, map.config().default_metric);
    assert_eq!(map.scene().status, SceneStatus::Ready);
    assert_eq!(map.scene().selection, Some(state));
    assert!(map.poll_selection().is_none());
}

fn mex_scenario() -> Vec<CorridorRecord> {
    vec![rec(2020, "MEX", "USA", 5.0), rec(2020, "CAN", "MEX", 1.2)]
}

/// Holds every fetch until the gate opens.
struct GatedSource {
    payload: FlowPayload,
    gate: Shared<oneshot::Receiver<()>>,
}

impl FlowSource for GatedSource {
    fn fetch(&self) -> LocalBoxFuture<'static, Result<FlowPayload, DataLoadError>> {
        let gate = self.gate.clone();
        let payload = self.payload.clone();
        async move {
            gate.await
                .map_err(|_| DataLoadError::Fetch("gate dropped".into()))?;
            Ok(payload)
        }
        .boxed_local()
    }
}

struct BrokenSource;

impl FlowSource for BrokenSource {
    fn fetch(&self) -> LocalBoxFuture<'static, Result<FlowPayload, DataLoadError>> {
        futures::future::ready(Err(DataLoadError::Fetch("offline".into()))).boxed_local()
    }
}

#[test]
fn mexico_2020_is_concentrated_both_ways() {
    let mut map = build(
        static_source(&mex_scenario()),
        SelectionState::new(Some(iso("MEX")), 2020),
    );
    let ticket = map.reload_current();
    let result = pollster::block_on(map.fetch(ticket));
    assert_eq!(map.settle(ticket, result), ApplyOutcome::Rendered);

    let scene = map.scene();
    assert_eq!(scene.status, SceneStatus::Ready);
    let outbound: Vec<_> = scene
        .outbound()
        .map(|c| (c.record.destination_iso.to_string(), c.record.migrants_millions))
        .collect();
    let inbound: Vec<_> = scene
        .inbound()
        .map(|c| (c.record.origin_iso.to_string(), c.record.migrants_millions))
        .collect();
    assert_eq!(outbound, vec![("USA".to_string(), 5.0)]);
    assert_eq!(inbound, vec![("CAN".to_string(), 1.2)]);
    assert_eq!(scene.narrative.dominant_share, 1.0);
    assert_eq!(scene.narrative.concentration, Some(Concentration::Concentrated));
    assert_eq!(scene.narrative.title, "Migration corridors of Mexico in 2020");
    assert!(map.narrative_text().contains("highly concentrated"));

    // Outbound arcs bow up, inbound arcs bow down.
    let out = &scene.corridors[0];
    assert_eq!(out.direction, FlowDirection::Outbound);
    assert!(out.path.control.y < out.path.start.midpoint(out.path.end).y);
    let inb = &scene.corridors[1];
    assert!(inb.path.control.y > inb.path.start.midpoint(inb.path.end).y);
    assert!(scene.corridors.iter().all(|c| c.stroke_weight >= 1.3));
}

#[test]
fn country_without_corridors_gets_empty_state_text() {
    let mut map = build(
        static_source(&mex_scenario()),
        SelectionState::new(Some(iso("FRA")), 2020),
    );
    let ticket = map.reload_current();
    let result = pollster::block_on(map.fetch(ticket));
    let outcome = map.settle(ticket, result);
    assert_eq!(outcome, ApplyOutcome::Rendered);
    assert_eq!(map.scene().status, SceneStatus::Empty);
    assert_eq!(
        map.narrative_text(),
        "No migration corridor data is available for France in 2020."
    );
    assert!(!map.animator().is_running());
}

#[test]
fn rapid_year_changes_render_only_the_last() {
    let records: Vec<CorridorRecord> = (0..10)
        .map(|i| rec(2000 + i, "MEX", "USA", 1.0 + i as f64))
        .collect();
    let json = serde_json::to_string(&records).expect("serializable");
    let (open, gate) = oneshot::channel::<()>();
    let source = Rc::new(GatedSource {
        payload: FlowPayload::Json(json),
        gate: gate.shared(),
    });
    let mut map = build(source, SelectionState::new(Some(iso("MEX")), 1999));

    let mut in_flight = Vec::new();
    for i in 0..10 {
        assert_eq!(
            map.store().set(SelectionPatch::new().year(2000 + i)),
            SetOutcome::Applied
        );
        let ticket = map.poll_selection().expect("new year dispatches");
        let mut fut = map.fetch(ticket);
        assert!((&mut fut).now_or_never().is_none(), "load must still be pending");
        in_flight.push((ticket, fut));
    }
    assert_eq!(map.generation(), 10);

    open.send(()).expect("receiver alive");
    let order = [3, 9, 0, 5, 1, 8, 2, 7, 4, 6];
    let mut rendered = Vec::new();
    let mut slots: Vec<_> = in_flight.into_iter().map(Some).collect();
    for i in order {
        let (ticket, fut) = slots[i].take().expect("each once");
        let result = pollster::block_on(fut);
        if map.settle(ticket, result) == ApplyOutcome::Rendered {
            rendered.push(ticket.selection.focus_year);
        }
    }

    assert_eq!(rendered, vec![2009]);
    assert_eq!(map.scene().selection.map(|s| s.focus_year), Some(2009));
    assert_eq!(map.scene().corridors.len(), 1);
    assert_eq!(map.scene().corridors[0].record.migrants_millions, 10.0);
    assert_eq!(map.events().iter().filter(|e| e.kind == EventKind::StaleDiscarded).count(), 9);
}

#[test]
fn flow_limit_applies_per_direction() {
    let mut records = Vec::new();
    for i in 0..15 {
        records.push(rec(2020, "DEU", &partner(i), 15.0 - i as f64));
    }
    for i in 0..12 {
        records.push(rec(2020, &partner(i), "DEU", 0.5 + i as f64));
    }
    let mut map = build(static_source(&records), SelectionState::new(Some(iso("DEU")), 2020));

    pollster::block_on(async {
        let ticket = map.reload_current();
        let result = map.fetch(ticket).await;
        map.settle(ticket, result);
    });
    assert_eq!(map.scene().outbound().count(), 10);
    assert_eq!(map.scene().inbound().count(), 10);
    let top_in: Vec<f64> = map
        .scene()
        .inbound()
        .map(|c| c.record.migrants_millions)
        .collect();
    assert_eq!(top_in[0], 11.5);
    assert!(top_in.windows(2).all(|w| w[0] >= w[1]));

    assert_eq!(map.controls().toggle_flow_limit(), Some(SetOutcome::Applied));
    let outcome = pollster::block_on(map.run_pending_reload());
    assert_eq!(outcome, Some(ApplyOutcome::Rendered));
    assert_eq!(map.scene().outbound().count(), 15);
    assert_eq!(map.scene().inbound().count(), 12);
    assert_eq!(map.scene().selection.map(|s| s.flow_limit), Some(FlowLimit::All));
}

#[test]
fn year_write_back_does_not_reload_twice() {
    let mut map = build(
        static_source(&mex_scenario()),
        SelectionState::new(Some(iso("MEX")), 2024),
    );
    pollster::block_on(async {
        let ticket = map.reload_current();
        let result = map.fetch(ticket).await;
        map.settle(ticket, result);
    });
    // 2024 is not in the data; the store was snapped to the latest year.
    assert_eq!(map.store().get().focus_year, 2020);
    assert_eq!(map.store().year_domain().map(|d| d.latest()), Some(2020));
    assert_eq!(map.poll_selection(), None);
    assert_eq!(map.generation(), 1);
}

#[test]
fn echoed_search_box_does_not_reload() {
    let mut records = mex_scenario();
    records.push(rec(2020, "USA", "CAN", 0.9));
    let mut map = build(static_source(&records), SelectionState::new(Some(iso("MEX")), 2020));
    pollster::block_on(async {
        let ticket = map.reload_current();
        let result = map.fetch(ticket).await;
        map.settle(ticket, result);
    });
    assert_eq!(map.controls().surface().search_text, "Mexico");

    // Map click on Canada: the search box follows.
    assert_eq!(map.select_country(iso("CAN")), SetOutcome::Applied);
    assert_eq!(map.controls().surface().search_text, "Canada");
    let ticket = map.poll_selection().expect("country changed");

    // The box firing its (unchanged) text back is absorbed by the store.
    let echo = map.controls().surface().search_text;
    assert_eq!(map.controls().submit_search(&echo), Some(SetOutcome::Unchanged));
    assert_eq!(map.poll_selection(), None);
    assert_eq!(ticket.generation, map.generation());
}

#[test]
fn load_failure_shows_unavailable_and_can_retry() {
    let index = Rc::new(FlowDataIndex::new());
    let mut map = FlowMapCoordinator::new(
        seeded_config(),
        SelectionStore::new(SelectionState::new(Some(iso("MEX")), 2020)),
        Rc::clone(&index),
        Rc::new(BrokenSource),
        regions(),
    )
    .expect("valid config");

    let ticket = map.reload_current();
    let result = pollster::block_on(map.fetch(ticket));
    assert_eq!(map.settle(ticket, result), ApplyOutcome::Failed);
    assert_eq!(map.scene().status, SceneStatus::Unavailable);
    assert_eq!(map.narrative_text(), "Migration data could not be loaded.");
    assert!(!index.is_loaded());
    assert_eq!(map.events().iter().filter(|e| e.kind == EventKind::LoadFailed).count(), 1);
}

#[test]
fn particles_advance_on_host_frames() {
    let mut map = build(
        static_source(&mex_scenario()),
        SelectionState::new(Some(iso("MEX")), 2020),
    );
    pollster::block_on(async {
        let ticket = map.reload_current();
        let result = map.fetch(ticket).await;
        map.settle(ticket, result);
    });
    assert!(map.animator().is_running());
    assert_eq!(map.animator().particles().len(), 2);

    for i in 0..5 {
        assert!(map.on_animation_frame(Time(i as f64 / 60.0)));
    }
    let repaints = map
        .events()
        .iter()
        .filter(|e| e.kind == EventKind::Repaint)
        .count();
    assert_eq!(repaints, 5);
    let sprites = map.particle_sprites();
    assert_eq!(sprites.len(), 2);
    assert!(sprites.iter().all(|s| s.position.is_finite()));
}

#[test]
fn autoplay_steps_year_and_metric() {
    let records: Vec<CorridorRecord> = [2000, 2010, 2020]
        .into_iter()
        .map(|y| rec(y, "MEX", "USA", 1.0))
        .collect();
    let mut map = build(static_source(&records), SelectionState::new(Some(iso("MEX")), 2020));
    pollster::block_on(async {
        let ticket = map.reload_current();
        let result = map.fetch(ticket).await;
        map.settle(ticket, result);
    });

    assert!(map.toggle_autoplay(AutoplayKind::Year, Time(0.0)));
    assert_eq!(
        map.start_autoplay(AutoplayKind::Year, Time(0.1)),
        Err(AutoplayError::AlreadyRunning(AutoplayKind::Year))
    );
    assert_eq!(map.on_timer(Time(0.9)), vec![AutoplayKind::Year]);
    // Wraps from the last year to the first.
    assert_eq!(map.store().get().focus_year, 2000);
    assert_eq!(
        pollster::block_on(map.run_pending_reload()),
        Some(ApplyOutcome::Rendered)
    );
    assert_eq!(map.scene().selection.map(|s| s.focus_year), Some(2000));
    assert_eq!(map.on_timer(Time(1.8)), vec![AutoplayKind::Year]);
    assert_eq!(map.store().get().focus_year, 2010);
    assert!(map.stop_autoplay(AutoplayKind::Year));

    map.start_autoplay(AutoplayKind::Metric, Time(2.0)).expect("idle");
    map.on_timer(Time(3.5));
    assert_eq!(map.store().get().metric, Metric::Emigration);
}

#[test]
fn regions_from_geojson_feed_arc_endpoints() {
    let geojson = r#"{
        "type": "FeatureCollection",
        "features": [
            {"type": "Feature", "id": "MEX", "properties": {"name": "Mexico"},
             "geometry": {"type": "Polygon", "coordinates": [[[-110,20],[-95,20],[-95,28],[-110,28],[-110,20]]]}},
            {"type": "Feature", "id": "USA", "properties": {"name": "United States"},
             "geometry": {"type": "Polygon", "coordinates": [[[-120,35],[-80,35],[-80,45],[-120,45],[-120,35]]]}}
        ]
    }"#;
    let regions = RegionTable::from_geojson_str(geojson).expect("valid geojson");
    let mut map = FlowMapCoordinator::new(
        seeded_config(),
        SelectionStore::new(SelectionState::new(Some(iso("MEX")), 2020)),
        Rc::new(FlowDataIndex::new()),
        static_source(&mex_scenario()),
        regions,
    )
    .expect("valid config");
    pollster::block_on(async {
        let ticket = map.reload_current();
        let result = map.fetch(ticket).await;
        map.settle(ticket, result);
    });
    // Canada has no boundary, so only the USA corridor is drawn.
    assert_eq!(map.scene().corridors.len(), 1);
    let c = &map.scene().corridors[0];
    assert!((c.origin.lon_deg - (-102.5)).abs() < 1e-6);
    assert!(c.curvature >= 40.0 && c.curvature <= 120.0);
}

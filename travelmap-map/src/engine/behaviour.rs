//! Behavioural tests for the map engine.

use std::cell::RefCell;
use std::rc::Rc;

use geo::{Coord, LineString};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use travelmap_core::{HighlightSet, PlaceSummary, Route};

use super::{EngineConfig, EngineState, MapEngine, MapEvent, PendingExpansion};
use crate::test_support::RecordingSurface;

#[derive(Default)]
struct World {
    engine: Option<MapEngine<RecordingSurface>>,
    selections: Rc<RefCell<Vec<String>>>,
    pending: Option<PendingExpansion>,
    moved: Option<bool>,
}

type WorldCell = RefCell<World>;

#[fixture]
fn world() -> WorldCell {
    RefCell::new(World::default())
}

fn unquote(text: &str) -> &str {
    text.trim_matches('"')
}

fn summary(id: &str, offset: f64) -> PlaceSummary {
    PlaceSummary {
        id: id.to_owned(),
        title: id.to_owned(),
        coords: Coord {
            x: 135.76 + offset,
            y: 35.0 - offset,
        },
    }
}

fn route(id: &str) -> Route {
    Route::new(id, id, LineString::from(vec![(135.0, 35.0), (136.0, 35.5)]))
        .expect("valid route")
}

fn start(world: &WorldCell, places: Vec<PlaceSummary>, routes: Vec<Route>) {
    let mut state = world.borrow_mut();
    let sink = Rc::clone(&state.selections);
    let on_select = move |id: &str| sink.borrow_mut().push(id.to_owned());
    let mut engine = MapEngine::new(RecordingSurface::attached(), EngineConfig::new(), on_select)
        .with_inputs(places, routes);
    engine.mount().expect("mount");
    engine.handle(MapEvent::Loaded).expect("load");
    state.engine = Some(engine);
}

fn with_engine<T>(world: &WorldCell, f: impl FnOnce(&mut MapEngine<RecordingSurface>) -> T) -> T {
    let mut state = world.borrow_mut();
    f(state.engine.as_mut().expect("engine created"))
}

fn visible_routes(world: &WorldCell) -> Vec<String> {
    with_engine(world, |engine| {
        engine
            .surface()
            .visible_layers()
            .into_iter()
            .filter(|id| id.starts_with("route-lyr-"))
            .map(str::to_owned)
            .collect()
    })
}

#[given("an interactive map with places {first} and {second}")]
fn map_with_places(first: String, second: String, #[from(world)] world: &WorldCell) {
    start(
        world,
        vec![summary(unquote(&first), 0.0), summary(unquote(&second), 0.01)],
        Vec::new(),
    );
}

#[given("an interactive map with routes {first} and {second}")]
fn map_with_routes(first: String, second: String, #[from(world)] world: &WorldCell) {
    start(
        world,
        Vec::new(),
        vec![route(unquote(&first)), route(unquote(&second))],
    );
}

#[given("a map without a container")]
fn detached_map(#[from(world)] world: &WorldCell) {
    world.borrow_mut().engine = Some(MapEngine::new(
        RecordingSurface::detached(),
        EngineConfig::new(),
        |_: &str| {},
    ));
}

#[when("the place {id} is clicked")]
fn click_place(id: String, #[from(world)] world: &WorldCell) {
    let event = MapEvent::PointClicked {
        id: Some(unquote(&id).to_owned()),
    };
    with_engine(world, |engine| engine.handle(event)).expect("click");
}

#[when("route {id} is highlighted twice")]
fn highlight_twice(id: String, #[from(world)] world: &WorldCell) {
    let set: HighlightSet = [unquote(&id)].into_iter().collect();
    with_engine(world, |engine| {
        engine.set_highlight(set.clone());
        engine.set_highlight(set);
    });
}

#[when("the selection is cleared")]
fn clear_selection(#[from(world)] world: &WorldCell) {
    with_engine(world, |engine| engine.set_highlight(HighlightSet::new()));
}

#[when("the map is mounted")]
fn mount(#[from(world)] world: &WorldCell) {
    with_engine(world, MapEngine::mount).expect("mount");
}

fn number<T: std::str::FromStr>(text: &str) -> T {
    unquote(text)
        .parse()
        .unwrap_or_else(|_| panic!("{text} is not a number"))
}

#[when("the cluster drawn at {lon} {lat} is clicked at zoom {zoom}")]
fn click_cluster(lon: String, lat: String, zoom: String, #[from(world)] world: &WorldCell) {
    let event = MapEvent::ClusterClicked {
        center: Coord {
            x: number(&lon),
            y: number(&lat),
        },
        zoom: number(&zoom),
    };
    let pending = with_engine(world, |engine| engine.handle(event)).expect("click");
    world.borrow_mut().pending = pending;
}

#[when("the map is torn down")]
fn tear_down(#[from(world)] world: &WorldCell) {
    with_engine(world, MapEngine::teardown);
}

#[when("the expansion resolves")]
fn resolve(#[from(world)] world: &WorldCell) {
    let ticket = world.borrow().pending.expect("pending expansion");
    let moved = with_engine(world, |engine| {
        engine.complete_expansion(ticket, Ok::<_, &str>(Some(12)))
    });
    world.borrow_mut().moved = Some(moved);
}

#[then("the host is told {id} was selected exactly once")]
fn selected_once(id: String, #[from(world)] world: &WorldCell) {
    let state = world.borrow();
    assert_eq!(*state.selections.borrow(), vec![unquote(&id).to_owned()]);
}

#[then("only the route {id} is visible")]
fn only_route_visible(id: String, #[from(world)] world: &WorldCell) {
    assert_eq!(
        visible_routes(world),
        vec![crate::route_layer_id(unquote(&id))]
    );
}

#[then("no route is visible")]
fn no_route_visible(#[from(world)] world: &WorldCell) {
    assert!(visible_routes(world).is_empty());
}

#[then("no base map is created")]
fn no_base_map(#[from(world)] world: &WorldCell) {
    with_engine(world, |engine| {
        assert_eq!(engine.state(), EngineState::Uninitialized);
        assert!(!engine.surface().has_map());
        assert!(engine.surface().calls().is_empty());
    });
}

#[then("the camera eases to {lon} {lat} at zoom {zoom}")]
fn camera_eased(lon: String, lat: String, zoom: String, #[from(world)] world: &WorldCell) {
    assert_eq!(world.borrow().moved, Some(true));
    let target = Coord {
        x: number::<f64>(&lon),
        y: number::<f64>(&lat),
    };
    with_engine(world, |engine| {
        assert_eq!(engine.surface().eases(), vec![(target, number::<f64>(&zoom))]);
    });
}

#[then("no place is selected")]
fn nothing_selected(#[from(world)] world: &WorldCell) {
    assert!(world.borrow().selections.borrow().is_empty());
}

#[then("the camera does not move")]
fn camera_still(#[from(world)] world: &WorldCell) {
    assert_eq!(world.borrow().moved, Some(false));
    with_engine(world, |engine| assert!(engine.surface().eases().is_empty()));
}

#[scenario(path = "tests/features/engine.feature", index = 0)]
fn clicking_selects_once(world: WorldCell) {
    let _ = world;
}

#[scenario(path = "tests/features/engine.feature", index = 1)]
fn highlighting_is_idempotent(world: WorldCell) {
    let _ = world;
}

#[scenario(path = "tests/features/engine.feature", index = 2)]
fn clearing_hides_routes(world: WorldCell) {
    let _ = world;
}

#[scenario(path = "tests/features/engine.feature", index = 3)]
fn detached_map_stays_uninitialised(world: WorldCell) {
    let _ = world;
}

#[scenario(path = "tests/features/engine.feature", index = 4)]
fn stale_expansion_is_discarded(world: WorldCell) {
    let _ = world;
}

#[scenario(path = "tests/features/engine.feature", index = 5)]
fn clicking_a_cluster_zooms_without_selecting(world: WorldCell) {
    let _ = world;
}

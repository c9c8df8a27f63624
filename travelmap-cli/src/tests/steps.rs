//! Behaviour-driven step definitions driving the corpus commands.

use super::helpers::{SiteRoot, run_captured};
use super::*;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use serde_json::Value;
use std::cell::RefCell;

struct CliWorld {
    site: SiteRoot,
    extra_args: RefCell<Vec<String>>,
    outcome: RefCell<Option<(Result<(), CliError>, String)>>,
}

impl CliWorld {
    fn new() -> Self {
        Self {
            site: SiteRoot::new(),
            extra_args: RefCell::new(Vec::new()),
            outcome: RefCell::new(None),
        }
    }

    fn run(&self, command: &str, root: &str) {
        let mut argv = vec![
            "travelmap".to_owned(),
            command.to_owned(),
            format!("--{ARG_CONTENT_ROOT}"),
            root.to_owned(),
        ];
        argv.extend(self.extra_args.borrow().iter().cloned());
        let borrowed: Vec<&str> = argv.iter().map(String::as_str).collect();
        *self.outcome.borrow_mut() = Some(run_captured(&borrowed));
    }

    fn stdout(&self) -> String {
        let outcome = self.outcome.borrow();
        let (result, text) = outcome.as_ref().expect("command ran");
        if let Err(err) = result {
            panic!("command failed: {err}");
        }
        text.clone()
    }
}

#[fixture]
fn world() -> CliWorld {
    CliWorld::new()
}

fn unquote(text: &str) -> &str {
    text.trim_matches('"')
}

#[given("a place {id} dated {date}")]
fn a_place(id: String, date: String, #[from(world)] world: &CliWorld) {
    world.site.add_place(unquote(&id), unquote(&date), &[]);
}

#[given("a place {id} referencing the route {route}")]
fn a_place_with_ref(id: String, route: String, #[from(world)] world: &CliWorld) {
    world
        .site
        .add_place(unquote(&id), "2024-01-10", &[unquote(&route)]);
}

#[given("a route {id}")]
fn a_route(id: String, #[from(world)] world: &CliWorld) {
    world.site.add_route(unquote(&id));
}

#[given("dangling references are rejected")]
fn reject_refs(#[from(world)] world: &CliWorld) {
    world
        .extra_args
        .borrow_mut()
        .extend([format!("--{ARG_ROUTE_REFS}"), "reject".to_owned()]);
}

#[when("I run the {command} command")]
fn run_command(command: String, #[from(world)] world: &CliWorld) {
    world.run(unquote(&command), world.site.root().as_str());
}

#[when("I run the {command} command against a missing root")]
fn run_missing_root(command: String, #[from(world)] world: &CliWorld) {
    let missing = world.site.root().join("absent");
    world.run(unquote(&command), missing.as_str());
}

#[then("the printed place ids are {ids}")]
fn printed_ids(ids: String, #[from(world)] world: &CliWorld) {
    let value: Value = serde_json::from_str(&world.stdout()).expect("json output");
    let printed: Vec<&str> = value
        .as_array()
        .expect("array output")
        .iter()
        .filter_map(|place| place["id"].as_str())
        .collect();
    let expected: Vec<&str> = unquote(&ids).split(", ").collect();
    assert_eq!(printed, expected);
}

#[then("the summary lists {reference}")]
fn summary_lists(reference: String, #[from(world)] world: &CliWorld) {
    let stdout = world.stdout();
    assert!(stdout.contains("unresolved route references: 1"), "{stdout}");
    assert!(stdout.contains(unquote(&reference)), "{stdout}");
}

#[then("the command fails naming {needle}")]
fn fails_naming(needle: String, #[from(world)] world: &CliWorld) {
    let outcome = world.outcome.borrow();
    let (result, _) = outcome.as_ref().expect("command ran");
    match result {
        Err(err) => assert!(err.to_string().contains(unquote(&needle)), "{err}"),
        Ok(()) => panic!("expected the command to fail"),
    }
}

macro_rules! register_cli_scenario {
    ($fn_name:ident, $scenario_title:literal) => {
        #[scenario(path = "tests/features/corpus_commands.feature", name = $scenario_title)]
        fn $fn_name(#[from(world)] world: CliWorld) {
            let _ = world;
        }
    };
}

register_cli_scenario!(listing_places, "listing places newest first");
register_cli_scenario!(reporting_dangling_refs, "reporting dangling route references");
register_cli_scenario!(rejecting_dangling_refs, "rejecting dangling route references");
register_cli_scenario!(missing_root, "reporting a missing content root");

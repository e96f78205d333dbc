//! BDD step definitions for the content query lifecycle

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use bandsite::query::{loader, ContentQuery};
use bandsite::SiteError;
use cucumber::{given, then, when};
use tokio::sync::Notify;

use crate::world::SiteWorld;

fn parse_items(list: &str) -> Vec<String> {
    list.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[given(expr = "a loader returning {string}")]
fn loader_returning(world: &mut SiteWorld, items: String) {
    world.items = parse_items(&items);
}

#[given(expr = "the loader fails after {int} load(s)")]
fn loader_fails_after(world: &mut SiteWorld, loads: usize) {
    world.failing_after = Some(loads);
}

#[given("the loader waits to be released")]
fn loader_gated(world: &mut SiteWorld) {
    world.gate = Some(Arc::new(Notify::new()));
}

#[when("the query is mounted")]
fn mount_query(world: &mut SiteWorld) {
    let items = world.items.clone();
    let failing_after = world.failing_after;
    let gate = world.gate.clone();
    let loads = Arc::clone(&world.loads);

    world.query = Some(ContentQuery::mount(loader(move || {
        let items = items.clone();
        let gate = gate.clone();
        let n = loads.fetch_add(1, Ordering::SeqCst);
        async move {
            if let Some(gate) = gate {
                gate.notified().await;
            }
            match failing_after {
                Some(limit) if n >= limit => {
                    Err(SiteError::Http("connection reset".to_string()))
                }
                _ => Ok(items),
            }
        }
    })));
    world.observed = world.query.as_ref().map(|q| q.snapshot());
}

#[when("the query settles")]
async fn query_settles(world: &mut SiteWorld) {
    let query = world.query.as_ref().expect("query not mounted");
    world.observed = Some(query.settled().await);
}

#[when("the query is refetched")]
async fn query_refetched(world: &mut SiteWorld) {
    let query = world.query.as_ref().expect("query not mounted");
    world.observed = Some(query.refetch().await);
}

#[when("the query is unmounted")]
fn query_unmounted(world: &mut SiteWorld) {
    world.query.as_ref().expect("query not mounted").unmount();
}

#[when("the loader is released")]
async fn release_loader(world: &mut SiteWorld) {
    world.gate.as_ref().expect("loader not gated").notify_one();
    tokio::time::sleep(Duration::from_millis(20)).await;
    world.observed = world.query.as_ref().map(|q| q.snapshot());
}

#[then("the query is loading")]
fn query_loading(world: &mut SiteWorld) {
    assert!(world.observed.as_ref().expect("no state observed").loading);
}

#[then("the query is not loading")]
fn query_not_loading(world: &mut SiteWorld) {
    assert!(!world.observed.as_ref().expect("no state observed").loading);
}

#[then(expr = "the query data is {string}")]
fn query_data(world: &mut SiteWorld, expected: String) {
    let state = world.observed.as_ref().expect("no state observed");
    assert_eq!(state.data, Some(parse_items(&expected)));
}

#[then("the query has no data")]
fn query_no_data(world: &mut SiteWorld) {
    assert!(world.observed.as_ref().expect("no state observed").data.is_none());
}

#[then(expr = "the query error is {string}")]
fn query_error(world: &mut SiteWorld, expected: String) {
    let state = world.observed.as_ref().expect("no state observed");
    assert_eq!(state.error.as_deref(), Some(expected.as_str()));
}

#[then("the query has no error")]
fn query_no_error(world: &mut SiteWorld) {
    assert!(world.observed.as_ref().expect("no state observed").error.is_none());
}

#[then(expr = "the loader ran {int} time(s)")]
fn loader_ran(world: &mut SiteWorld, times: usize) {
    assert_eq!(world.loads.load(Ordering::SeqCst), times);
}

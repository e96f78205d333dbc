//! BDD step definitions for next show selection

use bandsite::content::{Show, ShowStatus};
use bandsite::selection::{next_show, Countdown};
use chrono::{DateTime, Utc};
use cucumber::{given, then, when};

use crate::world::SiteWorld;

fn parse_time(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .unwrap_or_else(|e| panic!("Invalid timestamp {}: {}", s, e))
        .with_timezone(&Utc)
}

#[given(expr = "the current time is {string}")]
fn current_time(world: &mut SiteWorld, at: String) {
    world.now = Some(parse_time(&at));
}

#[given(expr = "a show in {string} starting {string}")]
fn show_starting(world: &mut SiteWorld, city: String, at: String) {
    let id = world.shows.len() as i64 + 1;
    world.shows.push(Show {
        id,
        start_at: parse_time(&at),
        city,
        venue: "Teatro Royal".to_string(),
        status: ShowStatus::Tickets,
        ticket_url: None,
        min_age: None,
        latitude: None,
        longitude: None,
        created_at: None,
        updated_at: None,
    });
}

#[given("no shows are scheduled")]
fn no_shows(world: &mut SiteWorld) {
    world.shows.clear();
}

#[when("the next show is selected")]
fn select_next_show(world: &mut SiteWorld) {
    let now = world.now.expect("current time not set");
    world.featured = next_show(&world.shows, now).cloned();
    world.countdown = world
        .featured
        .as_ref()
        .and_then(|show| Countdown::until(show.start_at, now));
}

#[then(expr = "the featured show is in {string}")]
fn featured_city(world: &mut SiteWorld, city: String) {
    let featured = world.featured.as_ref().expect("no featured show");
    assert_eq!(featured.city, city);
}

#[then("there is no featured show")]
fn no_featured_show(world: &mut SiteWorld) {
    assert!(world.featured.is_none());
}

#[then(expr = "the countdown reads {string}")]
fn countdown_reads(world: &mut SiteWorld, expected: String) {
    let countdown = world.countdown.expect("no countdown");
    assert_eq!(countdown.to_string(), expected);
}

#[then("there is no countdown")]
fn no_countdown(world: &mut SiteWorld) {
    assert!(world.countdown.is_none());
}

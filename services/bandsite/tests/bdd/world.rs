//! BDD test world for the band site

use std::sync::atomic::AtomicUsize;
use std::sync::Arc;

use bandsite::content::Show;
use bandsite::query::{ContentQuery, QueryState};
use bandsite::selection::Countdown;
use chrono::{DateTime, Utc};
use cucumber::World;
use tokio::sync::Notify;

#[derive(Debug, Default, World)]
pub struct SiteWorld {
    // Next show selection
    pub now: Option<DateTime<Utc>>,
    pub shows: Vec<Show>,
    pub featured: Option<Show>,
    pub countdown: Option<Countdown>,

    // Content query lifecycle
    pub items: Vec<String>,
    pub failing_after: Option<usize>,
    pub gate: Option<Arc<Notify>>,
    pub loads: Arc<AtomicUsize>,
    pub query: Option<ContentQuery<Vec<String>>>,
    pub observed: Option<QueryState<Vec<String>>>,
}

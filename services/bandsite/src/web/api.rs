//! Public JSON endpoints and the countdown event stream

use std::convert::Infallible;
use std::time::Duration;

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use futures_core::Stream;
use serde::Serialize;

use super::AppState;
use crate::content::{MediaItem, Release, Show, SiteSettings};
use crate::selection::{self, Countdown};
use crate::Result;

pub async fn shows(State(state): State<AppState>) -> Result<Json<Vec<Show>>> {
    Ok(Json(state.repository.list_shows().await?))
}

pub async fn releases(State(state): State<AppState>) -> Result<Json<Vec<Release>>> {
    let mut releases = state.repository.list_releases().await?;
    selection::sort_catalog(&mut releases);
    Ok(Json(releases))
}

pub async fn media(State(state): State<AppState>) -> Result<Json<Vec<MediaItem>>> {
    Ok(Json(state.repository.list_media_items().await?))
}

pub async fn settings(State(state): State<AppState>) -> Result<Json<Option<SiteSettings>>> {
    Ok(Json(state.repository.current_site_settings().await?))
}

/// Featured show with the time left until it starts
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NextShow {
    pub show: Show,
    pub upcoming: bool,
    pub countdown: Option<Countdown>,
    pub display: Option<String>,
}

impl NextShow {
    fn new(show: Show) -> Self {
        let countdown = Countdown::until(show.start_at, Utc::now());
        Self {
            show,
            upcoming: countdown.is_some(),
            display: countdown.map(|c| c.to_string()),
            countdown,
        }
    }
}

pub async fn next_show(State(state): State<AppState>) -> Result<Json<Option<NextShow>>> {
    let shows = state.repository.list_shows().await?;
    let next = selection::next_show(&shows, Utc::now())
        .cloned()
        .map(NextShow::new);
    Ok(Json(next))
}

#[derive(Debug, Serialize)]
struct CountdownTick {
    #[serde(flatten)]
    countdown: Countdown,
    display: String,
}

/// Stream the countdown to the next show, one `countdown` event per tick
///
/// Ends with an `ended` event once the show starts, or right away when no
/// show is upcoming.
pub async fn countdown(
    State(state): State<AppState>,
) -> Result<Sse<impl Stream<Item = std::result::Result<Event, Infallible>>>> {
    let shows = state.repository.list_shows().await?;
    let now = Utc::now();
    let target = selection::next_show(&shows, now)
        .map(|show| show.start_at)
        .filter(|start| *start > now);
    let period = Duration::from_millis(state.config.site.countdown_interval_ms.max(1));

    let stream = async_stream::stream! {
        if let Some(target) = target {
            let ticks = selection::countdown_ticks(target, period);
            for await countdown in ticks {
                if countdown.is_zero() {
                    break;
                }
                let tick = CountdownTick { countdown, display: countdown.to_string() };
                match Event::default().event("countdown").json_data(&tick) {
                    Ok(event) => yield Ok(event),
                    Err(e) => tracing::warn!("Failed to encode countdown tick: {}", e),
                }
            }
        }
        yield Ok(Event::default().event("ended").data("0d 00h 00m 00s"));
    };

    Ok(Sse::new(stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(15))))
}

pub async fn health() -> impl IntoResponse {
    "OK"
}

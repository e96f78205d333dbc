//! Show and release selection for the public pages

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures_core::Stream;
use serde::Serialize;

use crate::content::{Release, Show};

/// Pick the show to feature on the home page
///
/// The earliest show starting strictly after `now`, or the most recent one
/// when every show is in the past.
pub fn next_show(shows: &[Show], now: DateTime<Utc>) -> Option<&Show> {
    let mut sorted: Vec<&Show> = shows.iter().collect();
    sorted.sort_by_key(|show| show.start_at);

    sorted
        .iter()
        .find(|show| show.start_at > now)
        .or(sorted.last())
        .copied()
}

/// Shows that have not started yet, soonest first
pub fn upcoming_shows(shows: &[Show], now: DateTime<Utc>) -> Vec<&Show> {
    let mut upcoming: Vec<&Show> = shows.iter().filter(|s| s.start_at > now).collect();
    upcoming.sort_by_key(|show| show.start_at);
    upcoming
}

/// Shows that already started, most recent first
pub fn past_shows(shows: &[Show], now: DateTime<Utc>) -> Vec<&Show> {
    let mut past: Vec<&Show> = shows.iter().filter(|s| s.start_at <= now).collect();
    past.sort_by(|a, b| b.start_at.cmp(&a.start_at));
    past
}

/// Newest release first; same-day releases by id, highest first
pub fn sort_catalog(releases: &mut [Release]) {
    releases.sort_by(|a, b| {
        b.release_date
            .cmp(&a.release_date)
            .then_with(|| b.id.cmp(&a.id))
    });
}

/// Split a catalog into its newest release and the rest
pub fn split_latest(mut releases: Vec<Release>) -> (Option<Release>, Vec<Release>) {
    sort_catalog(&mut releases);
    if releases.is_empty() {
        return (None, releases);
    }
    let latest = releases.remove(0);
    (Some(latest), releases)
}

/// Time remaining until a show starts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Countdown {
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
}

impl Countdown {
    /// `None` once `target` is no longer in the future
    pub fn until(target: DateTime<Utc>, now: DateTime<Utc>) -> Option<Self> {
        let remaining = (target - now).num_seconds();
        if target <= now {
            return None;
        }

        Some(Self {
            days: remaining / 86_400,
            hours: (remaining % 86_400) / 3_600,
            minutes: (remaining % 3_600) / 60,
            seconds: remaining % 60,
        })
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }
}

impl fmt::Display for Countdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}d {:02}h {:02}m {:02}s",
            self.days, self.hours, self.minutes, self.seconds
        )
    }
}

/// Recompute the countdown every `period` until `target` passes
///
/// The last item is always a zero countdown.
pub fn countdown_ticks(target: DateTime<Utc>, period: Duration) -> impl Stream<Item = Countdown> {
    async_stream::stream! {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            interval.tick().await;
            match Countdown::until(target, Utc::now()) {
                Some(countdown) => yield countdown,
                None => {
                    yield Countdown::default();
                    break;
                }
            }
        }
    }
}

//! Request-scoped content loading with loading/error bookkeeping
//!
//! A [`ContentQuery`] runs an async loader on a spawned task and publishes
//! `{data, loading, error}` through a watch channel. Once the query is
//! unmounted (or dropped, e.g. when a client disconnects mid-request) late
//! results are discarded; the in-flight request itself is not aborted.
//! Overlapping loads are not de-duplicated: the last one to finish wins.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Future returned by a loader
pub type LoadFuture<T> = Pin<Box<dyn Future<Output = crate::Result<T>> + Send>>;

/// An async content loader
pub type Loader<T> = Arc<dyn Fn() -> LoadFuture<T> + Send + Sync>;

/// Wrap a closure returning a future as a [`Loader`]
pub fn loader<T, F, Fut>(f: F) -> Loader<T>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = crate::Result<T>> + Send + 'static,
{
    Arc::new(move || Box::pin(f()) as LoadFuture<T>)
}

/// Observable state of a query
#[derive(Debug, Clone, PartialEq)]
pub struct QueryState<T> {
    pub data: Option<T>,
    pub loading: bool,
    pub error: Option<String>,
}

impl<T> Default for QueryState<T> {
    fn default() -> Self {
        Self {
            data: None,
            loading: true,
            error: None,
        }
    }
}

pub struct ContentQuery<T> {
    loader: Loader<T>,
    state: Arc<watch::Sender<QueryState<T>>>,
    mounted: CancellationToken,
}

impl<T> std::fmt::Debug for ContentQuery<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentQuery")
            .field("mounted", &self.is_mounted())
            .field("loading", &self.state.borrow().loading)
            .finish()
    }
}

impl<T> ContentQuery<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Create the query and start the first load. Must be called inside a tokio runtime.
    pub fn mount(loader: Loader<T>) -> Self {
        let (state, _) = watch::channel(QueryState::default());
        let query = Self {
            loader,
            state: Arc::new(state),
            mounted: CancellationToken::new(),
        };
        query.execute();
        query
    }

    /// Start a load on a background task
    fn execute(&self) -> Option<JoinHandle<()>> {
        if !self.is_mounted() {
            return None;
        }

        self.state.send_modify(|state| {
            state.loading = true;
            state.error = None;
        });

        let load = (self.loader)();
        let state = Arc::clone(&self.state);
        let mounted = self.mounted.clone();

        Some(tokio::spawn(async move {
            let result = load.await;
            if mounted.is_cancelled() {
                tracing::debug!("Discarding content loaded after unmount");
                return;
            }
            state.send_modify(|state| {
                match result {
                    Ok(data) => state.data = Some(data),
                    Err(e) => {
                        tracing::warn!("Content load failed: {}", e);
                        state.error = Some(e.to_string());
                    }
                }
                state.loading = false;
            });
        }))
    }

    /// Run the loader again and wait for it to settle
    pub async fn refetch(&self) -> QueryState<T> {
        if let Some(handle) = self.execute() {
            if let Err(e) = handle.await {
                tracing::warn!("Content load task failed: {}", e);
            }
        }
        self.snapshot()
    }

    /// Swap in a new loader and load with it
    pub fn replace_loader(&mut self, loader: Loader<T>) {
        self.loader = loader;
        self.execute();
    }

    pub fn snapshot(&self) -> QueryState<T> {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<QueryState<T>> {
        self.state.subscribe()
    }

    /// Wait until no load is in flight
    ///
    /// Returns the current state immediately if the query has been unmounted.
    pub async fn settled(&self) -> QueryState<T> {
        let mut rx = self.state.subscribe();
        let idle = async move {
            let _ = rx.wait_for(|state| !state.loading).await;
        };
        tokio::select! {
            _ = idle => {}
            _ = self.mounted.cancelled() => {}
        }
        self.snapshot()
    }
}

impl<T> ContentQuery<T> {
    pub fn is_mounted(&self) -> bool {
        !self.mounted.is_cancelled()
    }

    /// Stop accepting results; in-flight loads finish but are ignored
    pub fn unmount(&self) {
        self.mounted.cancel();
    }
}

impl<T> Drop for ContentQuery<T> {
    fn drop(&mut self) {
        self.unmount();
    }
}

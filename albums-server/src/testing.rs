//! Scripted store for unit tests
//!
//! [`FakeConnector`] replays a list of [`Step`]s through the real
//! [`collect_albums`] loop and counts open handles and cursors so tests can
//! assert nothing leaks.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::{stream, Stream, StreamExt};

use crate::db::{collect_albums, AlbumRow, AlbumSource, Connector};
use crate::error::{AccessError, AcquireError};
use crate::models::Album;

pub(crate) fn blue_train() -> Album {
    Album::new("1", "Blue Train", "John Coltrane", 56.99)
}

pub(crate) fn jeru() -> Album {
    Album::new("2", "Jeru", "Gerry Mulligan", 17.99)
}

/// One item of a scripted row stream.
#[derive(Debug, Clone)]
pub(crate) enum Step {
    Row(Album),
    /// A row whose price column has the wrong type.
    Malformed,
    /// The store reports an error at this point of the stream.
    Fail(&'static str),
    /// Decoding this row panics.
    Panic,
}

impl Step {
    pub(crate) fn into_item(self) -> Result<Step, sqlx::Error> {
        match self {
            Step::Fail(message) => Err(sqlx::Error::Protocol(message.to_owned())),
            other => Ok(other),
        }
    }
}

impl AlbumRow for Step {
    fn decode_album(&self) -> Result<Album, sqlx::Error> {
        match self {
            Step::Row(album) => Ok(album.clone()),
            Step::Malformed => Err(sqlx::Error::ColumnDecode {
                index: "3".to_owned(),
                source: "mismatched types; Rust type `f64` is not compatible with SQL type `TEXT`"
                    .into(),
            }),
            Step::Panic => panic!("row decoder blew up"),
            Step::Fail(_) => unreachable!("failures never reach the decoder"),
        }
    }
}

/// Counts live and total instances of some scoped resource.
#[derive(Debug, Clone, Default)]
pub(crate) struct OpenCounter {
    open: Arc<AtomicUsize>,
    total: Arc<AtomicUsize>,
}

impl OpenCounter {
    pub(crate) fn guard(&self) -> OpenGuard {
        self.open.fetch_add(1, Ordering::SeqCst);
        self.total.fetch_add(1, Ordering::SeqCst);
        OpenGuard(self.open.clone())
    }

    /// Wrap a stream so it counts as open until dropped.
    pub(crate) fn track<S: Stream>(&self, rows: S) -> impl Stream<Item = S::Item> {
        let guard = self.guard();
        rows.map(move |item| {
            let _held = &guard;
            item
        })
    }

    pub(crate) fn open(&self) -> usize {
        self.open.load(Ordering::SeqCst)
    }

    pub(crate) fn total(&self) -> usize {
        self.total.load(Ordering::SeqCst)
    }
}

pub(crate) struct OpenGuard(Arc<AtomicUsize>);

impl Drop for OpenGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Connector over a scripted table.
#[derive(Clone, Default)]
pub(crate) struct FakeConnector {
    steps: Arc<Vec<Step>>,
    unavailable: Arc<AtomicBool>,
    stall: Option<Duration>,
    acquires: Arc<AtomicUsize>,
    pub handles: OpenCounter,
    pub cursors: OpenCounter,
}

impl FakeConnector {
    pub(crate) fn with_steps(steps: Vec<Step>) -> Self {
        Self {
            steps: Arc::new(steps),
            ..Self::default()
        }
    }

    pub(crate) fn with_albums(albums: Vec<Album>) -> Self {
        Self::with_steps(albums.into_iter().map(Step::Row).collect())
    }

    /// Every acquisition fails.
    pub(crate) fn unavailable() -> Self {
        let connector = Self::default();
        connector.set_unavailable(true);
        connector
    }

    /// Each listing sleeps for `stall` before reading rows.
    pub(crate) fn stalled(mut self, stall: Duration) -> Self {
        self.stall = Some(stall);
        self
    }

    pub(crate) fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub(crate) fn acquires(&self) -> usize {
        self.acquires.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Connector for FakeConnector {
    async fn acquire(&self) -> Result<Box<dyn AlbumSource>, AcquireError> {
        self.acquires.fetch_add(1, Ordering::SeqCst);
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(AcquireError::Unavailable(sqlx::Error::PoolTimedOut));
        }

        Ok(Box::new(FakeSource {
            steps: self.steps.clone(),
            stall: self.stall,
            cursors: self.cursors.clone(),
            _handle: self.handles.guard(),
        }))
    }
}

struct FakeSource {
    steps: Arc<Vec<Step>>,
    stall: Option<Duration>,
    cursors: OpenCounter,
    _handle: OpenGuard,
}

#[async_trait]
impl AlbumSource for FakeSource {
    async fn list_albums(&mut self) -> Result<Vec<Album>, AccessError> {
        if let Some(stall) = self.stall {
            tokio::time::sleep(stall).await;
        }

        let items: Vec<_> = self.steps.iter().cloned().map(Step::into_item).collect();
        collect_albums(self.cursors.track(stream::iter(items))).await
    }
}

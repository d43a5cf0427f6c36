//! Background Track Loader
//!
//! Decoding a whole track (and fetching it, for remote sources) takes far
//! longer than an audio callback period, so it runs on its own thread.
//!
//! ## Architecture
//!
//! ```text
//! Engine (event loop)            Track Loader Thread
//!        │                              │
//!        │  request_load(handle, src)   │
//!        │─────────────────────────────>│
//!        │                              │ source::decode()
//!        │                              │ (I/O + decode + resample)
//!        │                              │
//!        │  poll_ready() -> Some(res)   │
//!        │<─────────────────────────────│
//!        │                              │
//! ```
//!
//! Only the most recent request matters. The queue holds a single request:
//! a new one replaces whatever is still waiting, and anything superseded
//! after the thread picks it up is skipped without decoding.

use crate::error::{AudioError, Result};
use crate::source::{self, DecodedTrack, TrackSource};
use crossbeam_channel::{bounded, unbounded, Receiver, Sender, TryRecvError};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Request to load a track
#[derive(Debug, Clone)]
pub struct LoadRequest {
    /// Engine handle the result belongs to
    pub handle: u64,
    pub source: TrackSource,
    /// Target sample rate for the decoded samples
    pub target_sample_rate: u32,
}

/// Result of loading a track
#[derive(Debug)]
pub struct LoadResult {
    pub handle: u64,
    /// Decoded track, or the error message
    pub outcome: std::result::Result<DecodedTrack, String>,
}

/// Background track loader
pub struct TrackLoader {
    request_tx: Option<Sender<LoadRequest>>,
    /// Our end of the request queue, for discarding superseded requests
    pending_rx: Receiver<LoadRequest>,
    result_rx: Receiver<LoadResult>,
    /// Handle of the newest request
    latest: Arc<AtomicU64>,
    _thread_handle: JoinHandle<()>,
}

impl TrackLoader {
    /// Create a new track loader with a background thread
    pub fn new() -> Result<Self> {
        let (request_tx, request_rx) = bounded::<LoadRequest>(1);
        let (result_tx, result_rx) = unbounded::<LoadResult>();
        let latest = Arc::new(AtomicU64::new(0));
        let latest_clone = Arc::clone(&latest);
        let pending_rx = request_rx.clone();

        let thread_handle = thread::Builder::new()
            .name("track-loader".to_string())
            .spawn(move || {
                Self::loader_thread(&request_rx, &result_tx, &latest_clone);
            })
            .map_err(|source| AudioError::ThreadSpawn {
                name: "track-loader",
                source,
            })?;

        Ok(Self {
            request_tx: Some(request_tx),
            pending_rx,
            result_rx,
            latest,
            _thread_handle: thread_handle,
        })
    }

    /// Request loading a track (non-blocking)
    ///
    /// Replaces any request still waiting in the queue. Returns false if the
    /// loader thread is gone.
    pub fn request_load(&self, request: LoadRequest) -> bool {
        let Some(request_tx) = &self.request_tx else {
            return false;
        };

        self.latest.store(request.handle, Ordering::Release);
        for stale in self.pending_rx.try_iter() {
            debug!(handle = stale.handle, "Discarding superseded load request");
        }
        match request_tx.try_send(request) {
            Ok(()) => true,
            Err(crossbeam_channel::TrySendError::Full(_)) => {
                warn!("Load request queue full, dropping request");
                false
            }
            Err(crossbeam_channel::TrySendError::Disconnected(_)) => {
                error!("Load request channel disconnected");
                false
            }
        }
    }

    /// Poll for a ready load result (non-blocking)
    pub fn poll_ready(&self) -> Option<LoadResult> {
        match self.result_rx.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                error!("Track loader result channel disconnected");
                None
            }
        }
    }

    /// Background thread that handles load requests
    fn loader_thread(
        request_rx: &Receiver<LoadRequest>,
        result_tx: &Sender<LoadResult>,
        latest: &AtomicU64,
    ) {
        debug!("Track loader thread started");

        while let Ok(request) = request_rx.recv() {
            if request.handle != latest.load(Ordering::Acquire) {
                debug!(handle = request.handle, "Skipping superseded load request");
                continue;
            }

            let start = Instant::now();
            let outcome = match source::decode(&request.source, request.target_sample_rate) {
                Ok(track) => {
                    info!(
                        handle = request.handle,
                        elapsed_ms = start.elapsed().as_millis() as u64,
                        "Loaded {:?}",
                        request.source
                    );
                    Ok(track)
                }
                Err(e) => {
                    warn!(handle = request.handle, "Failed to load {:?}: {}", request.source, e);
                    Err(e.to_string())
                }
            };

            let result = LoadResult {
                handle: request.handle,
                outcome,
            };
            if result_tx.send(result).is_err() {
                break;
            }
        }

        debug!("Track loader thread exiting");
    }
}

impl Drop for TrackLoader {
    fn drop(&mut self) {
        // Closing the request channel ends the thread after its current decode
        self.request_tx.take();
    }
}

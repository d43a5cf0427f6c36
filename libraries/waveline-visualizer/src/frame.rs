//! Frame scheduling
//!
//! A `FrameToken` stands for one scheduled invocation of the visualizer's
//! frame callback. Tokens are single-use: the host delivers each at most once.

use serde::{Deserialize, Serialize};

/// Cancellable handle for one scheduled frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FrameToken(u64);

impl FrameToken {
    pub fn id(self) -> u64 {
        self.0
    }
}

/// Host frame-scheduling primitive
pub trait FrameScheduler {
    /// Schedule one frame callback for the next display refresh
    fn request_frame(&mut self) -> FrameToken;

    /// Cancel a scheduled frame
    ///
    /// Cancelling a token that already fired or was already cancelled is a
    /// no-op.
    fn cancel_frame(&mut self, token: FrameToken);
}

/// Frame scheduler driven by the host's display cadence
///
/// Requested tokens queue up until the host calls `take_due()` on its next
/// refresh and feeds each token back to the visualizer.
#[derive(Debug, Default)]
pub struct QueuedFrameScheduler {
    next_id: u64,
    pending: Vec<FrameToken>,
}

impl QueuedFrameScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tokens due on this refresh (clears the queue)
    pub fn take_due(&mut self) -> Vec<FrameToken> {
        std::mem::take(&mut self.pending)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn is_pending(&self, token: FrameToken) -> bool {
        self.pending.contains(&token)
    }
}

impl FrameScheduler for QueuedFrameScheduler {
    fn request_frame(&mut self) -> FrameToken {
        self.next_id += 1;
        let token = FrameToken(self.next_id);
        self.pending.push(token);
        token
    }

    fn cancel_frame(&mut self, token: FrameToken) {
        self.pending.retain(|t| *t != token);
    }
}

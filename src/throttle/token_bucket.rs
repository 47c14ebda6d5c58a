use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::mpsc::{self, Receiver, Sender};
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::error::ThrottleError;

/// Largest accepted bucket capacity. The bucket is filled permit by permit
/// at construction, so this also bounds construction time.
pub const MAX_CAPACITY: usize = 1_000_000;

/// The right to issue one request.
///
/// Permits are interchangeable; the mint time is kept for diagnostics only.
#[derive(Debug)]
pub struct Permit {
    issued_at: Instant,
}

impl Default for Permit {
    fn default() -> Self {
        Self::new()
    }
}

impl Permit {
    pub fn new() -> Self {
        Permit {
            issued_at: Instant::now(),
        }
    }

    pub fn issued_at(&self) -> Instant {
        self.issued_at
    }
}

/// Bounded store of admission permits, created full.
///
/// Backed by a bounded channel: `try_insert` is a non-blocking send and
/// `acquire` receives. The receiver is shared behind an async mutex so any
/// number of tasks can wait on it; each permit still reaches exactly one of
/// them. Occupancy can never exceed `capacity` because the channel refuses
/// sends once it holds that many permits.
pub struct TokenBucket {
    capacity: usize,
    sender: Sender<Permit>,
    receiver: Mutex<Receiver<Permit>>,
}

impl TokenBucket {
    pub fn new(capacity: usize) -> Result<Self, ThrottleError> {
        if capacity == 0 || capacity > MAX_CAPACITY {
            return Err(ThrottleError::InvalidCapacity(capacity));
        }

        let (sender, receiver) = mpsc::channel(capacity);
        let bucket = TokenBucket {
            capacity,
            sender,
            receiver: Mutex::new(receiver),
        };
        bucket.initial_fill(capacity);
        Ok(bucket)
    }

    fn initial_fill(&self, n: usize) {
        for _ in 0..n.min(self.capacity) {
            // Nothing has been handed out yet, so there is always room.
            self.try_insert(Permit::new());
        }
    }

    /// Waits for a permit and takes it.
    ///
    /// There is no timeout; wrap the call in `tokio::time::timeout` to bound
    /// the wait. Dropping the future before it resolves gives up the turn
    /// without consuming a permit.
    pub async fn acquire(&self) -> Permit {
        let mut receiver = self.receiver.lock().await;
        match receiver.recv().await {
            Some(permit) => permit,
            // The bucket keeps its own sender alive, so the channel cannot
            // close while `self` exists.
            None => std::future::pending().await,
        }
    }

    /// Adds a permit unless the bucket is already full. Never waits.
    pub fn try_insert(&self, permit: Permit) -> bool {
        match self.sender.try_send(permit) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) | Err(TrySendError::Closed(_)) => false,
        }
    }

    pub fn available(&self) -> usize {
        self.capacity - self.sender.capacity()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

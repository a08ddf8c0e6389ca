//! Background fetch plumbing for the frame loop.
//!
//! Each fetch runs on its own thread with a single-use tokio runtime and
//! reports back over an mpsc channel that the UI polls non-blocking every
//! frame. A [`FetchSlot`] additionally tags every request with a
//! monotonically increasing sequence number: when a dependency changes
//! (selected framework, refresh serial) a new fetch supersedes the old
//! one, and a slow response issued under an older sequence is discarded
//! instead of overwriting newer state.

use std::future::Future;
use std::sync::mpsc::{channel, Receiver, Sender};

/// Run a future to completion on a background thread and deliver the
/// result over the returned receiver.
pub fn spawn_fetch<T, Fut>(fut: Fut) -> Receiver<T>
where
    T: Send + 'static,
    Fut: Future<Output = T> + Send + 'static,
{
    let (tx, rx) = channel();
    run_on_thread(fut, move |value| {
        let _ = tx.send(value);
    });
    rx
}

fn run_on_thread<T, Fut>(fut: Fut, deliver: impl FnOnce(T) + Send + 'static)
where
    T: Send + 'static,
    Fut: Future<Output = T> + Send + 'static,
{
    std::thread::spawn(move || {
        let rt = match tokio::runtime::Runtime::new() {
            Ok(rt) => rt,
            Err(e) => {
                tracing::warn!("failed to start async runtime: {}", e);
                return;
            }
        };
        deliver(rt.block_on(fut));
    });
}

/// A re-issuable fetch with stale-response guarding.
///
/// All responses arrive on one persistent channel tagged with the
/// sequence they were issued under; [`FetchSlot::poll`] only surfaces a
/// response matching the latest issued sequence.
pub struct FetchSlot<T> {
    tx: Sender<(u64, T)>,
    rx: Receiver<(u64, T)>,
    seq: u64,
    in_flight: bool,
}

impl<T: Send + 'static> FetchSlot<T> {
    pub fn new() -> Self {
        let (tx, rx) = channel();
        Self {
            tx,
            rx,
            seq: 0,
            in_flight: false,
        }
    }

    /// Issue a new fetch, superseding any still in flight.
    pub fn start<Fut>(&mut self, fut: Fut)
    where
        Fut: Future<Output = T> + Send + 'static,
    {
        let (seq, tx) = self.issue();
        run_on_thread(fut, move |value| {
            let _ = tx.send((seq, value));
        });
    }

    /// Allocate the next sequence number and a sender for its response.
    fn issue(&mut self) -> (u64, Sender<(u64, T)>) {
        self.seq += 1;
        self.in_flight = true;
        (self.seq, self.tx.clone())
    }

    /// Non-blocking poll. Responses issued under a superseded sequence
    /// are dropped; only the latest request's result is returned.
    pub fn poll(&mut self) -> Option<T> {
        while let Ok((seq, value)) = self.rx.try_recv() {
            if seq == self.seq {
                self.in_flight = false;
                return Some(value);
            }
            tracing::debug!(stale = seq, current = self.seq, "discarding stale response");
        }
        None
    }

    /// True while the latest issued fetch has not yet answered.
    pub fn in_flight(&self) -> bool {
        self.in_flight
    }
}

impl<T: Send + 'static> Default for FetchSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

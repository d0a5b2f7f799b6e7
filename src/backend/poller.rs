//! Periodic state polling
//!
//! At most one poll is outstanding at any time; a tick that finds one still
//! running is skipped. Only replies carrying a sequence number newer than the
//! last accepted one are forwarded.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::backend::client::AlienBackend;
use crate::backend::models::AlienUpdate;
use crate::errors::Result;
use crate::types::Personality;

/// Accepts sequence numbers strictly greater than the last accepted one.
///
/// Replies without a sequence, or with sequence `0`, never pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SequenceGate {
    last: u64,
}

impl SequenceGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> u64 {
        self.last
    }

    pub fn accept(&mut self, sequence: Option<u64>) -> bool {
        match sequence {
            Some(seq) if seq > self.last => {
                self.last = seq;
                true
            }
            _ => false,
        }
    }
}

/// Result of a single poll attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    /// Another poll was still in flight.
    Skipped,
    /// The backend answered with nothing newer.
    Stale,
    Update(AlienUpdate),
}

#[derive(Debug)]
struct PollState {
    gate: SequenceGate,
    personality: Personality,
}

/// Clears the in-flight flag when the poll finishes, even on error.
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

#[derive(Clone)]
pub struct Poller {
    backend: Arc<dyn AlienBackend>,
    interval: Duration,
    in_flight: Arc<AtomicBool>,
    state: Arc<Mutex<PollState>>,
}

impl Poller {
    /// `personality` resolves partial personalities in the first replies.
    pub fn new(backend: Arc<dyn AlienBackend>, interval: Duration, personality: Personality) -> Self {
        Self {
            backend,
            interval,
            in_flight: Arc::new(AtomicBool::new(false)),
            state: Arc::new(Mutex::new(PollState {
                gate: SequenceGate::new(),
                personality,
            })),
        }
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    pub async fn last_sequence(&self) -> u64 {
        self.state.lock().await.gate.last()
    }

    pub async fn poll_once(&self) -> Result<PollOutcome> {
        if self.in_flight.swap(true, Ordering::AcqRel) {
            debug!("Previous poll still in flight, skipping");
            return Ok(PollOutcome::Skipped);
        }
        let _guard = InFlight(&self.in_flight);

        let reply = self.backend.poll().await?;

        let mut state = self.state.lock().await;
        if !state.gate.accept(reply.sequence()) {
            return Ok(PollOutcome::Stale);
        }
        let update = reply.into_update(&state.personality);
        if let Some(personality) = update.personality {
            state.personality = personality;
        }
        debug!("Accepted update with sequence {}", state.gate.last());
        Ok(PollOutcome::Update(update))
    }

    /// Poll until `shutdown` turns `true` or the receiver of `updates` is gone.
    ///
    /// The first poll happens immediately. Each poll finishes before the next
    /// tick is taken, so nothing is sent once this returns.
    pub async fn run(self, updates: mpsc::Sender<AlienUpdate>, mut shutdown: watch::Receiver<bool>) {
        info!("Polling backend every {:?}", self.interval);
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if updates.is_closed() {
                        break;
                    }
                    match self.poll_once().await {
                        Ok(PollOutcome::Update(update)) => {
                            if updates.send(update).await.is_err() {
                                debug!("Update receiver dropped");
                                break;
                            }
                        }
                        Ok(_) => {}
                        Err(e) => warn!("Polling error: {}", e),
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
        info!("Polling stopped");
    }

    pub fn spawn(
        self,
        updates: mpsc::Sender<AlienUpdate>,
        shutdown: watch::Receiver<bool>,
    ) -> JoinHandle<()> {
        tokio::spawn(self.run(updates, shutdown))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::models::{BackendReply, StateReply};
    use crate::errors::FeelienError;
    use crate::types::Environment;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::path::Path;

    struct ScriptedBackend {
        replies: Mutex<VecDeque<Result<BackendReply>>>,
        delay: Duration,
    }

    impl ScriptedBackend {
        fn new(replies: Vec<Result<BackendReply>>, delay: Duration) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.into()),
                delay,
            })
        }
    }

    fn state(sequence: Option<u64>, anger: Option<f64>) -> Result<BackendReply> {
        let alien = anger.map(|a| crate::backend::models::PersonalityPatch {
            anger: Some(a),
            ..Default::default()
        });
        Ok(BackendReply::State(StateReply {
            alien,
            sequence,
            ..StateReply::default()
        }))
    }

    #[async_trait]
    impl AlienBackend for ScriptedBackend {
        async fn poll(&self) -> Result<BackendReply> {
            tokio::time::sleep(self.delay).await;
            self.replies
                .lock()
                .await
                .pop_front()
                .unwrap_or_else(|| Ok(BackendReply::State(StateReply::default())))
        }

        async fn reset(&self) -> Result<BackendReply> {
            Ok(BackendReply::State(StateReply::default()))
        }

        async fn vocalize(&self, _environment: &Environment) -> Result<BackendReply> {
            Ok(BackendReply::State(StateReply::default()))
        }

        async fn process_text(&self, _text: &str, _p: &Personality) -> Result<BackendReply> {
            Err(FeelienError::BackendDisabled)
        }

        async fn process_audio(&self, _path: &Path, _p: &Personality) -> Result<BackendReply> {
            Err(FeelienError::BackendDisabled)
        }
    }

    #[test]
    fn test_sequence_gate() {
        let mut gate = SequenceGate::new();
        assert!(!gate.accept(None));
        assert!(!gate.accept(Some(0)));
        assert!(gate.accept(Some(3)));
        assert!(!gate.accept(Some(3)));
        assert!(!gate.accept(Some(2)));
        assert!(gate.accept(Some(4)));
        assert_eq!(gate.last(), 4);
    }

    #[tokio::test]
    async fn test_only_newer_sequences_forwarded() {
        let backend = ScriptedBackend::new(
            vec![state(Some(1), None), state(Some(1), None), state(Some(5), None), state(Some(4), None)],
            Duration::ZERO,
        );
        let poller = Poller::new(backend, Duration::from_millis(10), Personality::default());

        assert!(matches!(poller.poll_once().await.unwrap(), PollOutcome::Update(_)));
        assert_eq!(poller.poll_once().await.unwrap(), PollOutcome::Stale);
        assert!(matches!(poller.poll_once().await.unwrap(), PollOutcome::Update(_)));
        assert_eq!(poller.poll_once().await.unwrap(), PollOutcome::Stale);
        assert_eq!(poller.last_sequence().await, 5);
    }

    #[tokio::test]
    async fn test_concurrent_poll_is_skipped() {
        let backend = ScriptedBackend::new(vec![state(Some(1), None)], Duration::from_millis(50));
        let poller = Poller::new(backend, Duration::from_millis(10), Personality::default());

        let (first, second) = tokio::join!(poller.poll_once(), poller.poll_once());
        assert!(matches!(first.unwrap(), PollOutcome::Update(_)));
        assert_eq!(second.unwrap(), PollOutcome::Skipped);
        assert!(!poller.is_in_flight());
    }

    #[tokio::test]
    async fn test_error_clears_in_flight() {
        let backend = ScriptedBackend::new(
            vec![Err(FeelienError::network("down")), state(Some(2), None)],
            Duration::ZERO,
        );
        let poller = Poller::new(backend, Duration::from_millis(10), Personality::default());

        assert!(poller.poll_once().await.is_err());
        assert!(!poller.is_in_flight());
        assert!(matches!(poller.poll_once().await.unwrap(), PollOutcome::Update(_)));
    }

    #[tokio::test]
    async fn test_partial_personalities_accumulate() {
        let backend = ScriptedBackend::new(
            vec![state(Some(1), Some(70.0)), state(Some(2), None)],
            Duration::ZERO,
        );
        let poller = Poller::new(backend, Duration::from_millis(10), Personality::default());

        let PollOutcome::Update(update) = poller.poll_once().await.unwrap() else {
            panic!("expected an update");
        };
        let p = update.personality.unwrap();
        assert_eq!(p.anger, 70.0);
        assert_eq!(p.happiness, Personality::default().happiness);
    }

    #[tokio::test]
    async fn test_run_forwards_and_stops() {
        let backend = ScriptedBackend::new(
            vec![state(Some(1), None), state(Some(1), None), state(Some(2), None)],
            Duration::ZERO,
        );
        let poller = Poller::new(backend, Duration::from_millis(5), Personality::default());
        let (tx, mut rx) = mpsc::channel(8);
        let (stop_tx, stop_rx) = watch::channel(false);
        let handle = poller.spawn(tx, stop_rx);

        let first = rx.recv().await.unwrap();
        let second = rx.recv().await.unwrap();
        assert_eq!(first.sequence, Some(1));
        assert_eq!(second.sequence, Some(2));

        stop_tx.send(true).unwrap();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn test_no_update_after_shutdown() {
        let backend = ScriptedBackend::new(vec![state(Some(1), None)], Duration::from_millis(60));
        let poller = Poller::new(backend, Duration::from_millis(5), Personality::default());
        let (tx, mut rx) = mpsc::channel(8);
        let (stop_tx, stop_rx) = watch::channel(false);
        let handle = poller.spawn(tx, stop_rx);

        // stop while the first poll is still waiting on the backend
        tokio::time::sleep(Duration::from_millis(20)).await;
        stop_tx.send(true).unwrap();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .unwrap()
            .unwrap();

        // every sender is gone once the loop has returned
        while rx.try_recv().is_ok() {}
        assert!(matches!(
            rx.try_recv(),
            Err(mpsc::error::TryRecvError::Disconnected)
        ));
    }
}

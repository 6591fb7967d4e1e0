use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use aliases::engine::SupervisorEvent;
use aliases::types::{ExitState, TerminationKind};
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;

/// Records every `SupervisorEvent` published during a test.
///
/// Subscribe before the supervisor runs:
/// `EventRecorder::start(supervisor.subscribe())`.
pub struct EventRecorder {
    events: Arc<Mutex<Vec<SupervisorEvent>>>,
    _pump: JoinHandle<()>,
}

impl EventRecorder {
    pub fn start(mut rx: broadcast::Receiver<SupervisorEvent>) -> Self {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);

        let pump = tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(event) => sink.lock().unwrap().push(event),
                    Err(RecvError::Lagged(n)) => panic!("event recorder lagged by {n} events"),
                    Err(RecvError::Closed) => break,
                }
            }
        });

        Self {
            events,
            _pump: pump,
        }
    }

    pub fn events(&self) -> Vec<SupervisorEvent> {
        self.events.lock().unwrap().clone()
    }

    /// `(generation, at)` of every start of `alias`, in order.
    pub fn starts(&self, alias: &str) -> Vec<(u32, Instant)> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                SupervisorEvent::ProcessStarted {
                    alias: a,
                    generation,
                    at,
                    ..
                } if a == alias => Some((generation, at)),
                _ => None,
            })
            .collect()
    }

    /// `(state, at)` of every exit of `alias`, in order.
    pub fn exits(&self, alias: &str) -> Vec<(ExitState, Instant)> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                SupervisorEvent::ProcessExited {
                    alias: a, state, at, ..
                } if a == alias => Some((state, at)),
                _ => None,
            })
            .collect()
    }

    pub fn signals(&self, alias: &str, kind: TerminationKind) -> Vec<Instant> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                SupervisorEvent::SignalSent {
                    alias: a,
                    kind: k,
                    at,
                } if a == alias && k == kind => Some(at),
                _ => None,
            })
            .collect()
    }

    pub fn shutdown_starts(&self) -> Vec<Instant> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                SupervisorEvent::ShutdownStarted { at, .. } => Some(at),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, pred: impl Fn(&SupervisorEvent) -> bool) -> usize {
        self.events().iter().filter(|e| pred(e)).count()
    }

    /// Poll until `pred` holds over the recorded events.
    pub async fn wait_until(&self, pred: impl Fn(&[SupervisorEvent]) -> bool) {
        for _ in 0..500 {
            {
                let guard = self.events.lock().unwrap();
                if pred(&guard) {
                    return;
                }
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("condition not reached; events: {:#?}", self.events());
    }

    /// Wait until `alias` has been started at least `n` times.
    pub async fn wait_for_starts(&self, alias: &str, n: usize) {
        self.wait_until(|events| {
            events
                .iter()
                .filter(|e| matches!(e, SupervisorEvent::ProcessStarted { alias: a, .. } if a == alias))
                .count()
                >= n
        })
        .await;
    }
}

// src/engine/completion.rs

//! Countdown barrier for "every tracked alias is done".
//!
//! Each alias runner holds a [`CompletionToken`] from before its first
//! launch until it will never launch again; the shutdown cascade holds one
//! while it signals. The barrier opens when the count reaches zero.

use std::sync::Arc;

use tokio::sync::watch;

#[derive(Debug, Clone)]
pub struct CompletionBarrier {
    count: Arc<watch::Sender<usize>>,
}

impl CompletionBarrier {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(0usize);
        Self {
            count: Arc::new(tx),
        }
    }

    /// Register one more participant.
    pub fn token(&self) -> CompletionToken {
        self.count.send_modify(|n| *n += 1);
        CompletionToken {
            count: Arc::clone(&self.count),
        }
    }

    pub fn outstanding(&self) -> usize {
        *self.count.borrow()
    }

    /// Resolve once no tokens are outstanding.
    pub async fn wait(&self) {
        let mut rx = self.count.subscribe();
        let _ = rx.wait_for(|n| *n == 0).await;
    }
}

impl Default for CompletionBarrier {
    fn default() -> Self {
        Self::new()
    }
}

/// Released on drop.
#[derive(Debug)]
pub struct CompletionToken {
    count: Arc<watch::Sender<usize>>,
}

impl Drop for CompletionToken {
    fn drop(&mut self) {
        self.count.send_modify(|n| *n = n.saturating_sub(1));
    }
}

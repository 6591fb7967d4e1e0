#![allow(dead_code)]

use std::time::Duration;

use aliases::engine::SupervisorOptions;

pub use aliases_test_utils::builders;
pub use aliases_test_utils::events::EventRecorder;
pub use aliases_test_utils::{init_tracing, with_timeout};

/// Supervisor options for tests: no OS signal handling, short grace period.
pub fn options(grace_period: Duration) -> SupervisorOptions {
    SupervisorOptions {
        grace_period,
        listen_for_signals: false,
    }
}

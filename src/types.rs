use std::fmt;
use std::time::Duration;

/// How an alias is attached to the supervisor's launch sequence.
///
/// - `Attached`: foreground. The launching sequence blocks until the process
///   exits, and the child receives the supervisor's interactive input.
/// - `Detached`: background. The launch returns immediately and waiting
///   happens in its own Tokio task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachMode {
    Attached,
    Detached,
}

impl AttachMode {
    /// Map the config-file `background = true|false` flag to a mode.
    pub fn from_background(background: bool) -> Self {
        if background {
            AttachMode::Detached
        } else {
            AttachMode::Attached
        }
    }

    pub fn is_attached(self) -> bool {
        matches!(self, AttachMode::Attached)
    }

    /// Short tag used in progress lines (`fg` / `bg`).
    pub fn tag(self) -> &'static str {
        match self {
            AttachMode::Attached => "fg",
            AttachMode::Detached => "bg",
        }
    }
}

/// Last known exit state of a supervised process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitState {
    /// Exited with status code 0.
    Success,
    /// Exited on its own with a non-zero status code.
    Failed(i32),
    /// Terminated by a signal (graceful or forceful) or by a kill request.
    Killed,
}

impl ExitState {
    pub fn from_status(status: std::process::ExitStatus) -> Self {
        match status.code() {
            Some(0) => ExitState::Success,
            Some(code) => ExitState::Failed(code),
            None => ExitState::Killed,
        }
    }
}

impl fmt::Display for ExitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitState::Success => write!(f, "success"),
            ExitState::Failed(code) => write!(f, "failed ({code})"),
            ExitState::Killed => write!(f, "killed"),
        }
    }
}

/// The two kinds of termination request the shutdown cascade delivers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationKind {
    /// SIGTERM on Unix.
    Graceful,
    /// SIGKILL / `TerminateProcess`.
    Forceful,
}

impl fmt::Display for TerminationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TerminationKind::Graceful => write!(f, "SIGTERM"),
            TerminationKind::Forceful => write!(f, "SIGKILL"),
        }
    }
}

/// Parse a simple duration string like `"3s"`, `"250ms"`, `"1m"`, `"2h"`.
pub fn parse_duration(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty duration string".to_string());
    }

    // Find the boundary between digits and suffix.
    let idx = s
        .chars()
        .position(|c| !c.is_ascii_digit())
        .ok_or_else(|| "duration missing unit suffix".to_string())?;

    let (num_part, unit_part) = s.split_at(idx);
    let value: u64 = num_part
        .parse()
        .map_err(|e| format!("invalid duration number '{}': {}", num_part, e))?;
    let unit = unit_part.trim().to_lowercase();

    match unit.as_str() {
        "ms" => Ok(Duration::from_millis(value)),
        "s" => Ok(Duration::from_secs(value)),
        "m" => secs_times(value, 60),
        "h" => secs_times(value, 60 * 60),
        _ => Err(format!(
            "unsupported duration unit '{}'; expected ms, s, m, or h",
            unit
        )),
    }
}

fn secs_times(value: u64, factor: u64) -> Result<Duration, String> {
    value
        .checked_mul(factor)
        .map(Duration::from_secs)
        .ok_or_else(|| format!("duration too large: {value} x {factor}s"))
}

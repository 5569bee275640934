use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::error::{EditError, Result};

/// Cancellation flag with an optional deadline.
///
/// Clones share the flag, so a UI thread can hold one copy while the engine
/// and the analysis join poll another.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Token that also expires after `timeout`
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            flag: Arc::new(AtomicBool::new(false)),
            deadline: Instant::now().checked_add(timeout),
        }
    }

    /// Request cancellation.
    ///
    /// Work stops at the next check point.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation was requested or the deadline has passed
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst) || self.deadline_passed()
    }

    fn deadline_passed(&self) -> bool {
        self.deadline.map(|d| Instant::now() >= d).unwrap_or(false)
    }

    /// Fail with `EditError::Cancelled` if the token has fired
    pub fn check(&self, stage: &str) -> Result<()> {
        if self.flag.load(Ordering::SeqCst) {
            return Err(EditError::Cancelled {
                reason: format!("cancelled during {}", stage),
            });
        }
        if self.deadline_passed() {
            return Err(EditError::Cancelled {
                reason: format!("deadline passed during {}", stage),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_flag() {
        let token = CancelToken::new();
        let worker = token.clone();
        assert!(worker.check("assignment").is_ok());

        token.cancel();
        assert!(worker.is_cancelled());
        assert!(matches!(worker.check("assignment"), Err(EditError::Cancelled { .. })));
    }

    #[test]
    fn test_expired_deadline() {
        let token = CancelToken::with_timeout(Duration::ZERO);
        assert!(token.is_cancelled());

        let token = CancelToken::with_timeout(Duration::from_secs(3600));
        assert!(!token.is_cancelled());
    }
}

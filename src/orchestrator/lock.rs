use tokio::time::{Duration, Instant};

/// Default window after an intent submission during which map
/// interactions do not hide the chat.
pub const DEFAULT_LOCK_WINDOW: Duration = Duration::from_millis(1000);

/// Deadline-based interaction lock.
///
/// Engaging sets a deadline; the lock reads as released once the deadline
/// passes, so no timer task is needed. Suppressed events are dropped.
#[derive(Debug, Clone)]
pub struct InteractionLock {
    window: Duration,
    until: Option<Instant>,
}

impl InteractionLock {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            until: None,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Engage (or re-arm) the lock for one full window from now.
    pub fn engage(&mut self) {
        self.until = Some(Instant::now() + self.window);
    }

    pub fn is_engaged(&self) -> bool {
        self.until.is_some_and(|until| Instant::now() < until)
    }

    pub fn release(&mut self) {
        self.until = None;
    }
}

impl Default for InteractionLock {
    fn default() -> Self {
        Self::new(DEFAULT_LOCK_WINDOW)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_lock_expires_after_window() {
        let mut lock = InteractionLock::default();
        assert!(!lock.is_engaged());

        lock.engage();
        assert!(lock.is_engaged());

        tokio::time::advance(Duration::from_millis(999)).await;
        assert!(lock.is_engaged());

        tokio::time::advance(Duration::from_millis(1)).await;
        assert!(!lock.is_engaged());
    }

    #[tokio::test(start_paused = true)]
    async fn test_reengage_extends_deadline() {
        let mut lock = InteractionLock::new(Duration::from_millis(500));
        lock.engage();
        tokio::time::advance(Duration::from_millis(400)).await;
        lock.engage();
        tokio::time::advance(Duration::from_millis(400)).await;
        assert!(lock.is_engaged());
        lock.release();
        assert!(!lock.is_engaged());
    }
}

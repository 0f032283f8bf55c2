use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Settle delay applied to search input before the task list is recomputed.
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);

/// Runs a callback once no new call has been scheduled for `delay`.
///
/// Must be used from within a tokio runtime. Dropping the debouncer cancels
/// whatever is pending.
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    pending: Option<JoinHandle<()>>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// Schedule `f`, discarding any call still waiting to fire.
    pub fn schedule<F>(&mut self, f: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.cancel();
        let delay = self.delay;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            f();
        }));
    }

    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// A value whose settled state is published only after input stops changing.
#[derive(Debug)]
pub struct DebouncedValue<T> {
    debouncer: Debouncer,
    settled: Arc<watch::Sender<T>>,
}

impl<T> DebouncedValue<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new(initial: T, delay: Duration) -> Self {
        let (settled, _) = watch::channel(initial);
        Self {
            debouncer: Debouncer::new(delay),
            settled: Arc::new(settled),
        }
    }

    /// Record a new raw value; it becomes the settled value after the delay.
    pub fn set(&mut self, value: T) {
        let settled = self.settled.clone();
        self.debouncer.schedule(move || {
            settled.send_replace(value);
        });
    }

    /// Publish `value` immediately, dropping any pending update.
    pub fn flush(&mut self, value: T) {
        self.debouncer.cancel();
        self.settled.send_replace(value);
    }

    pub fn settled(&self) -> T {
        self.settled.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<T> {
        self.settled.subscribe()
    }

    pub fn is_pending(&self) -> bool {
        self.debouncer.is_pending()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test(start_paused = true)]
    async fn fires_once_after_quiet_period() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut debouncer = Debouncer::new(SEARCH_DEBOUNCE);

        for _ in 0..3 {
            let calls = calls.clone();
            debouncer.schedule(move || {
                calls.fetch_add(1, Ordering::SeqCst);
            });
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(debouncer.is_pending());

        tokio::time::sleep(Duration::from_millis(250)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(!debouncer.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_discards_pending_call() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut debouncer = Debouncer::new(SEARCH_DEBOUNCE);
        let counter = calls.clone();
        debouncer.schedule(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        debouncer.cancel();

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn debounced_value_settles_on_last_input() {
        let mut search = DebouncedValue::new(String::new(), SEARCH_DEBOUNCE);
        let mut rx = search.subscribe();

        search.set("w".to_string());
        tokio::time::sleep(Duration::from_millis(50)).await;
        search.set("wo".to_string());
        tokio::time::sleep(Duration::from_millis(50)).await;
        search.set("wor".to_string());
        assert_eq!(search.settled(), "");

        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), "wor");
        assert_eq!(search.settled(), "wor");
    }

    #[tokio::test(start_paused = true)]
    async fn flush_publishes_immediately() {
        let mut search = DebouncedValue::new(String::new(), SEARCH_DEBOUNCE);
        search.set("stale".to_string());
        search.flush("now".to_string());
        assert_eq!(search.settled(), "now");

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(search.settled(), "now");
    }
}

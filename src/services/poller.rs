use std::future::Future;
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration, MissedTickBehavior};

use crate::models::Tab;

/// Periodic background refresh bound to one tab. Stopping aborts the task;
/// a new poller starts from a fresh interval.
pub struct Poller {
    tab: Tab,
    handle: JoinHandle<()>,
}

impl Poller {
    /// Spawns the task. The first tick fires one `period` after start, since
    /// the tab's own selection already fetched.
    pub fn start<F, Fut>(tab: Tab, period: Duration, tick: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            ticker.tick().await;

            loop {
                ticker.tick().await;
                tracing::trace!("poll tick for {}", tab);
                tick().await;
            }
        });

        tracing::debug!("poller started for {} every {:?}", tab, period);
        Self { tab, handle }
    }

    pub fn tab(&self) -> Tab {
        self.tab
    }

    pub fn stop(self) {
        drop(self);
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.handle.abort();
        tracing::debug!("poller stopped for {}", self.tab);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Category;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counting_poller(period: Duration) -> (Poller, Arc<AtomicUsize>) {
        let ticks = Arc::new(AtomicUsize::new(0));
        let counter = ticks.clone();
        let poller = Poller::start(Tab::Collection(Category::LastTrade), period, move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        });
        (poller, ticks)
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_once_per_period_after_start() {
        let (poller, ticks) = counting_poller(Duration::from_secs(5));

        tokio::time::sleep(Duration::from_millis(4_900)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_millis(10_200)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 3);

        drop(poller);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_halts_ticks() {
        let (poller, ticks) = counting_poller(Duration::from_secs(5));
        tokio::time::sleep(Duration::from_millis(5_100)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 1);

        poller.stop();
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 1);
    }
}

//! Balance polling
//!
//! A cancellable periodic task bound to one smart account: an immediate
//! fetch, then one per interval, for as long as the handle lives. Fetches
//! are serialized - the loop awaits each fetch before waiting for the next
//! tick, so a slow fetch delays the schedule rather than racing it.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use ethers::types::Address;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

use crate::transfer::adapters::traits::AbstractionService;
use crate::transfer::types::BalanceSnapshot;

/// Shared slot the poller publishes snapshots into
pub type BalanceSlot = Arc<RwLock<Option<BalanceSnapshot>>>;

pub struct BalancePoller {
    service: Arc<dyn AbstractionService>,
    account: Address,
    every: Duration,
    slot: BalanceSlot,
}

impl BalancePoller {
    pub fn new(
        service: Arc<dyn AbstractionService>,
        account: Address,
        every: Duration,
        slot: BalanceSlot,
    ) -> Self {
        Self {
            service,
            account,
            every,
            slot,
        }
    }

    /// Start the poll loop in a background task
    pub fn spawn(self) -> PollerHandle {
        let BalancePoller {
            service,
            account,
            every,
            slot,
        } = self;

        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

        let task = tokio::spawn(async move {
            log::info!(
                "Balance poller started for {:#x} (every {}ms)",
                account,
                every.as_millis()
            );

            // First tick fires immediately
            let mut ticker = interval(every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = shutdown_rx.changed() => {
                        log::info!("Balance poller stopped for {:#x}", account);
                        return;
                    }
                    _ = ticker.tick() => {
                        match service.get_balance(account).await {
                            Ok(snapshot) => {
                                *slot.write().unwrap() = Some(snapshot);
                            }
                            Err(e) => {
                                // Previous snapshot stays in the slot
                                log::error!("Error fetching balance for {:#x}: {}", account, e);
                            }
                        }
                    }
                }
            }
        });

        PollerHandle {
            shutdown: shutdown_tx,
            task,
        }
    }
}

/// Stops the poll loop when cancelled, and unconditionally when dropped
pub struct PollerHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl PollerHandle {
    pub fn cancel(&self) {
        let _ = self.shutdown.send(true);
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        let _ = self.shutdown.send(true);
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::TransferError;
    use crate::transfer::adapters::mock::MockService;
    use tokio::time::sleep;

    fn account() -> Address {
        "0x00000000000000000000000000000000000000Aa"
            .parse()
            .unwrap()
    }

    fn spawn_poller(service: &Arc<MockService>, every_ms: u64) -> (PollerHandle, BalanceSlot) {
        let slot: BalanceSlot = Arc::new(RwLock::new(None));
        let poller = BalancePoller::new(
            service.clone() as Arc<dyn AbstractionService>,
            account(),
            Duration::from_millis(every_ms),
            slot.clone(),
        );
        (poller.spawn(), slot)
    }

    #[tokio::test]
    async fn test_polls_immediately_then_on_interval() {
        let service = Arc::new(MockService::new());
        let (handle, slot) = spawn_poller(&service, 25);

        // First fetch lands well before one full interval
        sleep(Duration::from_millis(15)).await;
        assert_eq!(service.balance_calls(), 1);
        assert!(slot.read().unwrap().is_some());

        sleep(Duration::from_millis(80)).await;
        assert!(service.balance_calls() >= 3);

        handle.cancel();
    }

    #[tokio::test]
    async fn test_cancel_stops_polling() {
        let service = Arc::new(MockService::new());
        let (handle, _slot) = spawn_poller(&service, 20);

        sleep(Duration::from_millis(50)).await;
        handle.cancel();
        sleep(Duration::from_millis(20)).await;

        let calls_after_cancel = service.balance_calls();
        sleep(Duration::from_millis(60)).await;
        assert_eq!(service.balance_calls(), calls_after_cancel);
        assert!(handle.is_finished());
    }

    #[tokio::test]
    async fn test_drop_stops_polling() {
        let service = Arc::new(MockService::new());
        let (handle, _slot) = spawn_poller(&service, 20);

        sleep(Duration::from_millis(30)).await;
        drop(handle);
        sleep(Duration::from_millis(20)).await;

        let calls_after_drop = service.balance_calls();
        sleep(Duration::from_millis(60)).await;
        assert_eq!(service.balance_calls(), calls_after_drop);
    }

    #[tokio::test]
    async fn test_fetch_failure_keeps_previous_snapshot() {
        let service = Arc::new(MockService::new());
        service.set_net_balance(2_000_000);
        let (handle, slot) = spawn_poller(&service, 20);

        sleep(Duration::from_millis(30)).await;
        let first = slot.read().unwrap().expect("first fetch should land");
        assert_eq!(first.net_balance, 2_000_000);

        // Subsequent fetches fail; the stale snapshot stays displayed
        service.fail_balance(Some(TransferError::Service {
            operation: "get_balance".to_string(),
            reason: "HTTP 500".to_string(),
        }));
        sleep(Duration::from_millis(60)).await;

        let current = slot.read().unwrap().expect("snapshot should be retained");
        assert_eq!(current.net_balance, 2_000_000);

        handle.cancel();
    }
}

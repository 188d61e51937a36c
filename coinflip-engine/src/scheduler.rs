use crate::RoundEngine;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

/// Background task resolving rounds once their end time passes
pub struct ExpiryScheduler {
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl ExpiryScheduler {
    /// Tick at the engine's configured interval
    pub fn start(engine: Arc<RoundEngine>) -> Self {
        let tick = engine.config().tick_interval;
        Self::spawn(engine, tick)
    }

    pub fn spawn(engine: Arc<RoundEngine>, tick: Duration) -> Self {
        let (shutdown, mut shutdown_rx) = watch::channel(false);

        let handle = tokio::spawn(async move {
            let mut interval = time::interval(tick);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        match engine.check_expiry() {
                            Ok(Some(outcome)) => {
                                tracing::debug!(
                                    "Scheduler resolved round {} ({} winners)",
                                    outcome.round_id,
                                    outcome.winners.len()
                                );
                            }
                            Ok(None) => {}
                            Err(e) => tracing::warn!("Expiry check failed: {}", e),
                        }
                    }
                    changed = shutdown_rx.changed() => {
                        if changed.is_err() || *shutdown_rx.borrow() {
                            break;
                        }
                    }
                }
            }

            tracing::debug!("Expiry scheduler stopped");
        });

        Self { shutdown, handle }
    }

    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }

    /// Stop ticking and wait for the task to exit
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);
        if let Err(e) = self.handle.await {
            tracing::warn!("Expiry scheduler task failed: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::coin::FixedCoin;
    use crate::{CoinSide, EngineConfig, PlayerProfile, RoundEvent};

    fn manual_engine() -> (Arc<RoundEngine>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::default());
        let engine = RoundEngine::builder(EngineConfig::default())
            .with_clock(clock.clone())
            .with_coin(Arc::new(FixedCoin(CoinSide::Tails)))
            .build()
            .unwrap();
        (Arc::new(engine), clock)
    }

    #[tokio::test(start_paused = true)]
    async fn test_scheduler_resolves_expired_round() {
        let (engine, clock) = manual_engine();
        let mut events = engine.subscribe();
        let scheduler = ExpiryScheduler::spawn(engine.clone(), Duration::from_secs(1));

        engine
            .join_round("alice", CoinSide::Tails, PlayerProfile::default(), None)
            .await
            .unwrap();
        assert!(matches!(
            events.recv().await.unwrap(),
            RoundEvent::PlayerJoined { .. }
        ));

        // ticks before expiry leave the round alone
        time::sleep(Duration::from_secs(3)).await;
        assert!(engine.past_rounds(10).is_empty());

        clock.advance(Duration::from_secs(60));
        match events.recv().await.unwrap() {
            RoundEvent::RoundResolved(outcome) => {
                assert_eq!(outcome.result, Some(CoinSide::Tails));
                assert_eq!(outcome.winners[0].address, "alice");
            }
            other => panic!("unexpected event {:?}", other),
        }

        assert_eq!(engine.past_rounds(10).len(), 1);
        assert_eq!(engine.player_stats("alice").wins, 1);

        scheduler.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_scheduler_rotates_empty_rounds() {
        let (engine, clock) = manual_engine();
        let first = engine.round_info().id;
        let scheduler = ExpiryScheduler::start(engine.clone());
        assert!(scheduler.is_running());

        clock.advance(Duration::from_secs(120));
        time::sleep(Duration::from_secs(2)).await;

        assert_ne!(engine.round_info().id, first);
        assert!(engine.past_rounds(10).is_empty());

        scheduler.shutdown().await;
    }
}

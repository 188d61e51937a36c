use crate::clock::{Clock, SystemClock};
use crate::coin::{CoinSource, RandomCoin};
use crate::payment::{PaymentVerifier, StubVerifier};
use crate::{
    CoinSide, EngineConfig, EngineError, Player, PlayerProfile, PlayerStats, Result, Round,
    RoundEvent, RoundOutcome, RoundStatus, RoundSummary,
};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use uuid::Uuid;

const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Everything the engine mutates, guarded by a single lock
#[derive(Debug)]
pub struct GameState {
    pub current_round: Round,
    /// Completed rounds, most recent first
    pub past_rounds: VecDeque<Round>,
    pub player_stats: HashMap<String, PlayerStats>,
    last_sequence: u64,
}

/// Returned to a player once their stake is in the pot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinReceipt {
    pub round_id: Uuid,
    pub amount: f64,
    pub end_time: DateTime<Utc>,
}

pub struct RoundEngineBuilder {
    config: EngineConfig,
    clock: Arc<dyn Clock>,
    coin: Arc<dyn CoinSource>,
    verifier: Arc<dyn PaymentVerifier>,
}

impl RoundEngineBuilder {
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_coin(mut self, coin: Arc<dyn CoinSource>) -> Self {
        self.coin = coin;
        self
    }

    pub fn with_verifier(mut self, verifier: Arc<dyn PaymentVerifier>) -> Self {
        self.verifier = verifier;
        self
    }

    pub fn build(self) -> Result<RoundEngine> {
        self.config.validate()?;
        let round_duration = chrono::Duration::from_std(self.config.round_duration)
            .map_err(|e| EngineError::config(format!("Round duration out of range: {}", e)))?;

        let current_round = Round::open(1, self.clock.now(), round_duration);
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        tracing::info!(
            "Round engine started: buy-in {}, rake {}, round {} ends at {}",
            self.config.buy_in,
            self.config.rake,
            current_round.id,
            current_round.end_time
        );

        Ok(RoundEngine {
            config: self.config,
            round_duration,
            clock: self.clock,
            coin: self.coin,
            verifier: self.verifier,
            state: Mutex::new(GameState {
                current_round,
                past_rounds: VecDeque::new(),
                player_stats: HashMap::new(),
                last_sequence: 1,
            }),
            events,
        })
    }
}

pub struct RoundEngine {
    config: EngineConfig,
    round_duration: chrono::Duration,
    clock: Arc<dyn Clock>,
    coin: Arc<dyn CoinSource>,
    verifier: Arc<dyn PaymentVerifier>,
    state: Mutex<GameState>,
    events: broadcast::Sender<RoundEvent>,
}

impl RoundEngine {
    /// Engine on the wall clock with a random coin and the stub verifier
    pub fn new(config: EngineConfig) -> Result<Self> {
        Self::builder(config).build()
    }

    pub fn builder(config: EngineConfig) -> RoundEngineBuilder {
        RoundEngineBuilder {
            config,
            clock: Arc::new(SystemClock),
            coin: Arc::new(RandomCoin),
            verifier: Arc::new(StubVerifier::default()),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RoundEvent> {
        self.events.subscribe()
    }

    /// Add a player to the current round.
    ///
    /// Admission is checked, the payment reference (if any) is verified with
    /// the lock released, and admission is checked again before the stake is
    /// recorded. A round that rotated during verification rejects the join
    /// with [`EngineError::RoundEnded`].
    pub async fn join_round(
        &self,
        address: &str,
        choice: CoinSide,
        profile: PlayerProfile,
        payment_ref: Option<&str>,
    ) -> Result<JoinReceipt> {
        let round_id = {
            let state = self.state.lock();
            Self::check_admission(&state.current_round, address, self.clock.now())?;
            state.current_round.id
        };

        if let Some(reference) = payment_ref {
            if !self
                .verifier
                .verify(reference, address, self.config.buy_in)
                .await
            {
                tracing::warn!("Payment {} from {} rejected", reference, address);
                return Err(EngineError::PaymentVerificationFailed);
            }
        }

        let buy_in = self.config.buy_in;
        let (receipt, pot) = {
            let mut state = self.state.lock();
            let now = self.clock.now();

            if state.current_round.id != round_id {
                return Err(EngineError::RoundEnded);
            }
            Self::check_admission(&state.current_round, address, now)?;

            let round = &mut state.current_round;
            round.players.push(Player::new(
                address,
                choice,
                buy_in,
                profile,
                payment_ref.map(str::to_string),
                now,
            ));
            round.pot = buy_in * round.players.len() as f64;

            let receipt = JoinReceipt {
                round_id,
                amount: buy_in,
                end_time: round.end_time,
            };
            let pot = round.pot;

            state
                .player_stats
                .entry(address.to_string())
                .or_default()
                .total_staked += buy_in;

            (receipt, pot)
        };

        tracing::info!(
            "Player {} joined round {} on {} (pot {})",
            address,
            round_id,
            choice,
            pot
        );
        self.publish(RoundEvent::PlayerJoined {
            round_id,
            address: address.to_string(),
            choice,
            pot,
        });

        Ok(receipt)
    }

    /// Flip the coin for the current round and open the next one.
    ///
    /// A round nobody joined is dropped without touching the history.
    pub fn resolve_round(&self) -> Result<RoundOutcome> {
        let (outcome, started) = {
            let mut state = self.state.lock();
            self.resolve_locked(&mut state)?
        };

        self.publish_resolution(&outcome, started);
        Ok(outcome)
    }

    /// Resolve the current round if its end time has passed
    pub fn check_expiry(&self) -> Result<Option<RoundOutcome>> {
        let (outcome, started) = {
            let mut state = self.state.lock();
            let now = self.clock.now();
            let round = &state.current_round;
            if !round.is_active() || !round.has_expired(now) {
                return Ok(None);
            }

            tracing::debug!("Round {} expired at {}", round.id, round.end_time);
            self.resolve_locked(&mut state)?
        };

        self.publish_resolution(&outcome, started);
        Ok(Some(outcome))
    }

    pub fn round_info(&self) -> Round {
        self.state.lock().current_round.clone()
    }

    pub fn current_summary(&self) -> RoundSummary {
        self.state.lock().current_round.summary()
    }

    pub fn time_remaining(&self) -> Duration {
        let end_time = self.state.lock().current_round.end_time;
        (end_time - self.clock.now())
            .to_std()
            .unwrap_or(Duration::ZERO)
    }

    pub fn time_remaining_ms(&self) -> u64 {
        self.time_remaining().as_millis() as u64
    }

    pub fn player_stats(&self, address: &str) -> PlayerStats {
        self.state
            .lock()
            .player_stats
            .get(address)
            .cloned()
            .unwrap_or_default()
    }

    /// Stats for every address that ever joined, most wins first
    pub fn leaderboard(&self) -> Vec<(String, PlayerStats)> {
        let mut entries: Vec<(String, PlayerStats)> = self
            .state
            .lock()
            .player_stats
            .iter()
            .map(|(address, stats)| (address.clone(), stats.clone()))
            .collect();

        entries.sort_by(|(a_addr, a), (b_addr, b)| {
            b.wins
                .cmp(&a.wins)
                .then(a.losses.cmp(&b.losses))
                .then(a_addr.cmp(b_addr))
        });
        entries
    }

    pub fn past_rounds(&self, limit: usize) -> Vec<Round> {
        self.state
            .lock()
            .past_rounds
            .iter()
            .take(limit)
            .cloned()
            .collect()
    }

    pub fn round_summary(&self, round_id: Uuid) -> Option<RoundSummary> {
        self.state
            .lock()
            .past_rounds
            .iter()
            .find(|round| round.id == round_id)
            .map(Round::summary)
    }

    pub fn has_joined(&self, address: &str) -> bool {
        self.player_choice(address).is_some()
    }

    pub fn player_choice(&self, address: &str) -> Option<CoinSide> {
        self.state
            .lock()
            .current_round
            .player(address)
            .map(|p| p.choice)
    }

    pub fn required_payment(&self) -> f64 {
        self.config.buy_in
    }

    fn check_admission(round: &Round, address: &str, now: DateTime<Utc>) -> Result<()> {
        if !round.is_active() {
            return Err(EngineError::RoundNotActive);
        }

        if round.has_expired(now) {
            return Err(EngineError::RoundEnded);
        }

        if round.player(address).is_some() {
            return Err(EngineError::AlreadyJoined(address.to_string()));
        }

        Ok(())
    }

    fn open_next_round(&self, state: &mut GameState, now: DateTime<Utc>) -> Round {
        state.last_sequence += 1;
        Round::open(state.last_sequence, now, self.round_duration)
    }

    fn resolve_locked(&self, state: &mut GameState) -> Result<(RoundOutcome, RoundEvent)> {
        if !state.current_round.is_active() {
            return Err(EngineError::invalid_state(format!(
                "round {} is {:?}, expected active",
                state.current_round.id, state.current_round.status
            )));
        }

        let now = self.clock.now();

        if state.current_round.players.is_empty() {
            let next = self.open_next_round(state, now);
            let started = Self::started_event(&next);
            let discarded = std::mem::replace(&mut state.current_round, next);
            return Ok((RoundOutcome::discarded(discarded.id), started));
        }

        let round = &mut state.current_round;
        round.status = RoundStatus::Resolving;

        let result = self.coin.flip();
        let winners: Vec<Player> = round
            .players
            .iter()
            .filter(|p| p.choice == result)
            .cloned()
            .collect();

        // no winners: the protocol keeps the whole pot
        let mut payouts = HashMap::new();
        let mut rake = round.pot;
        if !winners.is_empty() {
            let prize_pool = round.pot * (1.0 - self.config.rake);
            let payout_per_winner = prize_pool / winners.len() as f64;
            for winner in &winners {
                payouts.insert(winner.address.clone(), payout_per_winner);
            }
            rake = round.pot - prize_pool;
        }

        round.result = Some(result);
        round.winners = Some(winners.clone());
        round.status = RoundStatus::Completed;

        for player in &state.current_round.players {
            let stats = state
                .player_stats
                .entry(player.address.clone())
                .or_default();
            match payouts.get(&player.address) {
                Some(payout) => {
                    stats.wins += 1;
                    stats.total_won += payout;
                }
                None => stats.losses += 1,
            }
        }

        let next = self.open_next_round(state, now);
        let started = Self::started_event(&next);
        let completed = std::mem::replace(&mut state.current_round, next);

        tracing::info!(
            "Round {} landed on {}: {} of {} players won, pot {}",
            completed.id,
            result,
            winners.len(),
            completed.players.len(),
            completed.pot
        );

        let outcome = RoundOutcome {
            round_id: completed.id,
            result: Some(result),
            winners,
            payouts,
            rake,
        };

        state.past_rounds.push_front(completed);
        state.past_rounds.truncate(self.config.history_limit);

        Ok((outcome, started))
    }

    fn started_event(round: &Round) -> RoundEvent {
        RoundEvent::RoundStarted {
            round_id: round.id,
            sequence: round.sequence,
            end_time: round.end_time,
        }
    }

    fn publish_resolution(&self, outcome: &RoundOutcome, started: RoundEvent) {
        if outcome.is_discarded() {
            tracing::debug!("Round {} had no players, discarded", outcome.round_id);
            self.publish(RoundEvent::RoundDiscarded {
                round_id: outcome.round_id,
            });
        } else {
            self.publish(RoundEvent::RoundResolved(outcome.clone()));
        }
        self.publish(started);
    }

    fn publish(&self, event: RoundEvent) {
        // no subscribers is fine
        let _ = self.events.send(event);
    }
}

impl std::fmt::Debug for RoundEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoundEngine")
            .field("config", &self.config)
            .field("state", &*self.state.lock())
            .finish()
    }
}

//! Coin-flip round engine
//!
//! Runs timed betting rounds: players pick heads or tails and pay a fixed
//! buy-in, the coin is flipped when the round expires, and the winners split
//! the pot minus the protocol rake. All state lives in memory for the
//! lifetime of the engine.

pub mod clock;
pub mod coin;
pub mod config;
pub mod error;
pub mod game;
pub mod payment;
pub mod player;
pub mod round;
pub mod scheduler;

pub use clock::{Clock, ManualClock, SystemClock};
pub use coin::{CoinSide, CoinSource, FixedCoin, RandomCoin, ScriptedCoin, SeededCoin};
pub use config::EngineConfig;
pub use error::{EngineError, Result};
pub use game::{GameState, JoinReceipt, RoundEngine, RoundEngineBuilder};
pub use payment::{PaymentVerifier, RejectAllVerifier, StubVerifier};
pub use player::{Player, PlayerProfile, PlayerStats};
pub use round::{Round, RoundEvent, RoundOutcome, RoundStatus, RoundSummary};
pub use scheduler::ExpiryScheduler;

use std::sync::Arc;

/// Create a shared engine on the wall clock and start its expiry scheduler
pub fn start_engine(config: EngineConfig) -> Result<(Arc<RoundEngine>, ExpiryScheduler)> {
    let engine = Arc::new(RoundEngine::new(config)?);
    let scheduler = ExpiryScheduler::start(engine.clone());
    Ok((engine, scheduler))
}

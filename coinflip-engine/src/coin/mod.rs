pub mod seeded;

pub use seeded::SeededCoin;

use crate::EngineError;
use parking_lot::Mutex;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoinSide {
    Heads,
    Tails,
}

impl CoinSide {
    pub fn opposite(self) -> Self {
        match self {
            CoinSide::Heads => CoinSide::Tails,
            CoinSide::Tails => CoinSide::Heads,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CoinSide::Heads => "heads",
            CoinSide::Tails => "tails",
        }
    }
}

impl fmt::Display for CoinSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CoinSide {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "h" | "heads" => Ok(CoinSide::Heads),
            "t" | "tails" => Ok(CoinSide::Tails),
            other => Err(EngineError::InvalidSide(other.to_string())),
        }
    }
}

/// Source of coin flip outcomes
pub trait CoinSource: Send + Sync {
    fn flip(&self) -> CoinSide;
}

/// Uniform 50/50 flip from the thread-local RNG. Not verifiable.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomCoin;

impl CoinSource for RandomCoin {
    fn flip(&self) -> CoinSide {
        if rand::thread_rng().gen_bool(0.5) {
            CoinSide::Heads
        } else {
            CoinSide::Tails
        }
    }
}

/// Always lands on the same side
#[derive(Debug, Clone, Copy)]
pub struct FixedCoin(pub CoinSide);

impl CoinSource for FixedCoin {
    fn flip(&self) -> CoinSide {
        self.0
    }
}

/// Replays queued outcomes in order, then keeps returning `fallback`
#[derive(Debug)]
pub struct ScriptedCoin {
    queue: Mutex<VecDeque<CoinSide>>,
    fallback: CoinSide,
}

impl ScriptedCoin {
    pub fn new(outcomes: impl IntoIterator<Item = CoinSide>, fallback: CoinSide) -> Self {
        Self {
            queue: Mutex::new(outcomes.into_iter().collect()),
            fallback,
        }
    }

    pub fn push(&self, side: CoinSide) {
        self.queue.lock().push_back(side);
    }
}

impl CoinSource for ScriptedCoin {
    fn flip(&self) -> CoinSide {
        self.queue.lock().pop_front().unwrap_or(self.fallback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_side() {
        assert_eq!("heads".parse::<CoinSide>().unwrap(), CoinSide::Heads);
        assert_eq!(" T ".parse::<CoinSide>().unwrap(), CoinSide::Tails);
        assert_eq!("HEADS".parse::<CoinSide>().unwrap(), CoinSide::Heads);
        assert!("edge".parse::<CoinSide>().is_err());
    }

    #[test]
    fn test_scripted_coin() {
        let coin = ScriptedCoin::new([CoinSide::Tails, CoinSide::Tails], CoinSide::Heads);
        coin.push(CoinSide::Tails);

        assert_eq!(coin.flip(), CoinSide::Tails);
        assert_eq!(coin.flip(), CoinSide::Tails);
        assert_eq!(coin.flip(), CoinSide::Tails);
        assert_eq!(coin.flip(), CoinSide::Heads);
    }

    #[test]
    fn test_random_coin_hits_both_sides() {
        let coin = RandomCoin;
        let heads = (0..1000).filter(|_| coin.flip() == CoinSide::Heads).count();
        assert!(heads > 0 && heads < 1000);
    }

    #[test]
    fn test_side_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&CoinSide::Heads).unwrap(), "\"heads\"");
        assert_eq!(CoinSide::Heads.opposite(), CoinSide::Tails);
    }
}

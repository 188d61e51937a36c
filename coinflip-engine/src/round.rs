use crate::{CoinSide, Player};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Round status, only ever moves forward
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoundStatus {
    Active,
    Resolving,
    Completed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Round {
    pub id: Uuid,
    pub sequence: u64,
    pub players: Vec<Player>,
    pub pot: f64,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: RoundStatus,
    /// Set only once the round is completed
    pub result: Option<CoinSide>,
    pub winners: Option<Vec<Player>>,
}

impl Round {
    pub(crate) fn open(sequence: u64, start_time: DateTime<Utc>, duration: chrono::Duration) -> Self {
        Self {
            id: Uuid::new_v4(),
            sequence,
            players: Vec::new(),
            pot: 0.0,
            start_time,
            end_time: start_time + duration,
            status: RoundStatus::Active,
            result: None,
            winners: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == RoundStatus::Active
    }

    pub fn has_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.end_time
    }

    pub fn player(&self, address: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.address == address)
    }

    pub fn count_side(&self, side: CoinSide) -> usize {
        self.players.iter().filter(|p| p.choice == side).count()
    }

    pub fn summary(&self) -> RoundSummary {
        RoundSummary {
            id: self.id,
            sequence: self.sequence,
            status: self.status,
            result: self.result,
            total_players: self.players.len(),
            heads_count: self.count_side(CoinSide::Heads),
            tails_count: self.count_side(CoinSide::Tails),
            pot: self.pot,
            winners_count: self.winners.as_ref().map_or(0, Vec::len),
        }
    }
}

/// Result of resolving (or discarding) a round
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundOutcome {
    pub round_id: Uuid,
    /// `None` when the round had no players and was discarded
    pub result: Option<CoinSide>,
    pub winners: Vec<Player>,
    pub payouts: HashMap<String, f64>,
    /// Amount retained by the protocol
    pub rake: f64,
}

impl RoundOutcome {
    pub(crate) fn discarded(round_id: Uuid) -> Self {
        Self {
            round_id,
            result: None,
            winners: Vec::new(),
            payouts: HashMap::new(),
            rake: 0.0,
        }
    }

    pub fn is_discarded(&self) -> bool {
        self.result.is_none()
    }

    pub fn payout_for(&self, address: &str) -> Option<f64> {
        self.payouts.get(address).copied()
    }

    pub fn total_paid(&self) -> f64 {
        self.payouts.values().sum()
    }
}

/// Round info for display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundSummary {
    pub id: Uuid,
    pub sequence: u64,
    pub status: RoundStatus,
    pub result: Option<CoinSide>,
    pub total_players: usize,
    pub heads_count: usize,
    pub tails_count: usize,
    pub pot: f64,
    pub winners_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RoundEvent {
    RoundStarted {
        round_id: Uuid,
        sequence: u64,
        end_time: DateTime<Utc>,
    },
    PlayerJoined {
        round_id: Uuid,
        address: String,
        choice: CoinSide,
        pot: f64,
    },
    RoundResolved(RoundOutcome),
    RoundDiscarded {
        round_id: Uuid,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PlayerProfile;

    #[test]
    fn test_summary_counts_sides() {
        let now = Utc::now();
        let mut round = Round::open(3, now, chrono::Duration::seconds(60));
        for (address, side) in [
            ("a", CoinSide::Heads),
            ("b", CoinSide::Tails),
            ("c", CoinSide::Heads),
        ] {
            round.players.push(Player::new(
                address,
                side,
                1.0,
                PlayerProfile::default(),
                None,
                now,
            ));
        }
        round.pot = 3.0;

        let summary = round.summary();
        assert_eq!(summary.sequence, 3);
        assert_eq!(summary.total_players, 3);
        assert_eq!(summary.heads_count, 2);
        assert_eq!(summary.tails_count, 1);
        assert_eq!(summary.winners_count, 0);
        assert_eq!(summary.status, RoundStatus::Active);
        assert!(summary.result.is_none());
    }

    #[test]
    fn test_expiry_boundary() {
        let now = Utc::now();
        let round = Round::open(1, now, chrono::Duration::seconds(60));
        assert!(!round.has_expired(now + chrono::Duration::milliseconds(59_999)));
        assert!(round.has_expired(round.end_time));
    }
}

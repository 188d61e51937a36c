use crate::CoinSide;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Cosmetic display metadata; never consulted during resolution
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerProfile {
    pub username: Option<String>,
    pub avatar_url: Option<String>,
}

impl PlayerProfile {
    pub fn with_username(username: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
            avatar_url: None,
        }
    }
}

/// A player's entry in a single round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub address: String,
    pub choice: CoinSide,
    pub amount: f64,
    pub username: Option<String>,
    pub avatar_url: Option<String>,
    pub payment_ref: Option<String>,
    pub joined_at: DateTime<Utc>,
}

impl Player {
    pub fn new(
        address: impl Into<String>,
        choice: CoinSide,
        amount: f64,
        profile: PlayerProfile,
        payment_ref: Option<String>,
        joined_at: DateTime<Utc>,
    ) -> Self {
        Self {
            address: address.into(),
            choice,
            amount,
            username: profile.username,
            avatar_url: profile.avatar_url,
            payment_ref,
            joined_at,
        }
    }

    pub fn display_name(&self) -> &str {
        self.username.as_deref().unwrap_or(&self.address)
    }
}

/// Lifetime statistics for one address
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerStats {
    pub wins: u64,
    pub losses: u64,
    pub total_staked: f64,
    pub total_won: f64,
}

impl PlayerStats {
    pub fn games_played(&self) -> u64 {
        self.wins + self.losses
    }

    /// Fraction of resolved rounds won, `None` before the first resolution.
    pub fn win_rate(&self) -> Option<f64> {
        match self.games_played() {
            0 => None,
            played => Some(self.wins as f64 / played as f64),
        }
    }

    pub fn net(&self) -> f64 {
        self.total_won - self.total_staked
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_falls_back_to_address() {
        let now = Utc::now();
        let anon = Player::new("0xabc", CoinSide::Heads, 1.0, PlayerProfile::default(), None, now);
        assert_eq!(anon.display_name(), "0xabc");

        let named = Player::new(
            "0xdef",
            CoinSide::Tails,
            1.0,
            PlayerProfile::with_username("dwr"),
            None,
            now,
        );
        assert_eq!(named.display_name(), "dwr");
    }

    #[test]
    fn test_win_rate() {
        let mut stats = PlayerStats::default();
        assert_eq!(stats.win_rate(), None);

        stats.wins = 3;
        stats.losses = 1;
        assert_eq!(stats.games_played(), 4);
        assert_eq!(stats.win_rate(), Some(0.75));
    }
}

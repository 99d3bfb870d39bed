//! Tournament data model
//!
//! A `Tournament` document owns its contestant pool and the full round
//! tree; vote-log entries live in their own append-only collection and
//! are never referenced back from the tournament.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A track competing in a tournament.
///
/// `id` is the canonical track URL and doubles as the dedup key for the
/// contestant pool. Immutable once attached to a pool or a match slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contestant {
    pub id: String,
    pub title: String,
    pub artist: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embed_html: Option<String>,
    pub original_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview_url: Option<String>,
}

/// A single pairing within a round.
///
/// `contestant_b = None` signals a bye: the sole contestant advances
/// without a vote. `match_id` is the 1-based position within the round
/// and is stable for the round's lifetime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub match_id: i64,
    pub contestant_a: Contestant,
    #[serde(default)]
    pub contestant_b: Option<Contestant>,
    #[serde(default)]
    pub votes_a: i64,
    #[serde(default)]
    pub votes_b: i64,
    #[serde(default)]
    pub winner_id: Option<String>,
}

impl Match {
    /// A match with only one contestant, whose winner needs no vote.
    pub fn is_bye(&self) -> bool {
        self.contestant_b.is_none()
    }
}

/// One voting window over an ordered set of matches.
///
/// Match order is the bracket position and is semantically meaningful:
/// the next round's pairings are derived from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Round {
    pub round_index: i64,
    pub round_name: String,
    pub matches: Vec<Match>,
    pub end_time: DateTime<Utc>,
}

impl Round {
    /// Whether the round's voting window has passed at `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.end_time
    }
}

/// Tournament lifecycle state.
///
/// Transitions are monotone: draft → active → completed, or
/// draft → cancelled. Never backward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TournamentStatus {
    Draft,
    Active,
    Completed,
    Cancelled,
}

impl TournamentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TournamentStatus::Draft => "draft",
            TournamentStatus::Active => "active",
            TournamentStatus::Completed => "completed",
            TournamentStatus::Cancelled => "cancelled",
        }
    }
}

impl std::str::FromStr for TournamentStatus {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(TournamentStatus::Draft),
            "active" => Ok(TournamentStatus::Active),
            "completed" => Ok(TournamentStatus::Completed),
            "cancelled" => Ok(TournamentStatus::Cancelled),
            other => Err(crate::Error::Internal(format!(
                "unknown tournament status: {other}"
            ))),
        }
    }
}

impl std::fmt::Display for TournamentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The tournament document: the sole unit of consistency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tournament {
    pub id: Uuid,
    pub name: String,
    pub voting_duration_minutes: i64,
    pub current_round_index: i64,
    pub status: TournamentStatus,
    /// The full contestant pool, independent of round pairings.
    /// Used for draft-stage editing.
    pub contestants: Vec<Contestant>,
    /// Append-only; `current_round_index` always indexes a valid element.
    pub rounds: Vec<Round>,
    pub created_at: DateTime<Utc>,
}

impl Tournament {
    pub fn new(name: String, voting_duration_minutes: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            voting_duration_minutes,
            current_round_index: 0,
            status: TournamentStatus::Draft,
            contestants: Vec::new(),
            rounds: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// The round indexed by `current_round_index`, if any rounds exist.
    pub fn current_round(&self) -> Option<&Round> {
        self.rounds.get(self.current_round_index as usize)
    }
}

/// Projection of a tournament for public listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TournamentSummary {
    pub id: Uuid,
    pub name: String,
    pub status: TournamentStatus,
}

/// The side of a match a vote is cast for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteOption {
    A,
    B,
}

impl VoteOption {
    /// Column suffix used by the vote-increment statement.
    pub fn field(&self) -> &'static str {
        match self {
            VoteOption::A => "votes_a",
            VoteOption::B => "votes_b",
        }
    }
}

impl std::str::FromStr for VoteOption {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "a" => Ok(VoteOption::A),
            "b" => Ok(VoteOption::B),
            other => Err(crate::Error::InvalidInput(format!(
                "invalid vote option: {other} (expected 'a' or 'b')"
            ))),
        }
    }
}

/// One cast vote. Append-only; the tuple
/// (tournament_id, round_index, match_id, voter_fingerprint) is unique
/// by policy and is the sole durable record preventing double voting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoteLog {
    pub tournament_id: Uuid,
    pub round_index: i64,
    pub match_id: i64,
    pub voter_fingerprint: String,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn status_round_trips_through_str() {
        for status in [
            TournamentStatus::Draft,
            TournamentStatus::Active,
            TournamentStatus::Completed,
            TournamentStatus::Cancelled,
        ] {
            assert_eq!(TournamentStatus::from_str(status.as_str()).unwrap(), status);
        }
    }

    #[test]
    fn vote_option_parses_lowercase_only() {
        assert_eq!(VoteOption::from_str("a").unwrap(), VoteOption::A);
        assert_eq!(VoteOption::from_str("b").unwrap(), VoteOption::B);
        assert!(VoteOption::from_str("A").is_err());
        assert!(VoteOption::from_str("both").is_err());
    }

    #[test]
    fn status_serializes_lowercase() {
        let json = serde_json::to_string(&TournamentStatus::Active).unwrap();
        assert_eq!(json, "\"active\"");
    }
}

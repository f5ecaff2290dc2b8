//! Community vote ledger
//!
//! 每个用户对一个 issue 最多一票（confirm/flag），重复同向投票即撤回。

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Vote direction: `up` confirms a report, `down` flags it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteDirection {
    Up,
    Down,
}

impl VoteDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
        }
    }
}

impl std::str::FromStr for VoteDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "up" => Ok(Self::Up),
            "down" => Ok(Self::Down),
            other => Err(format!("unknown vote direction: {other}")),
        }
    }
}

/// What a single tally did to the ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VoteOutcome {
    /// First vote from this user
    Cast,
    /// User changed direction
    Switched,
    /// Same direction repeated, vote removed
    Withdrawn,
}

/// Per-issue vote ledger
///
/// `userVotes` is the only stored state. `upCount` and `downCount` are
/// written to the wire for clients but recomputed on read, so a record with
/// drifted counts heals on load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "LedgerRecord", into = "LedgerRecord")]
pub struct VoteLedger {
    user_votes: BTreeMap<String, VoteDirection>,
}

/// Wire form of [`VoteLedger`]
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LedgerRecord {
    #[serde(default)]
    up_count: u32,
    #[serde(default)]
    down_count: u32,
    #[serde(default)]
    user_votes: BTreeMap<String, VoteDirection>,
}

impl From<LedgerRecord> for VoteLedger {
    fn from(record: LedgerRecord) -> Self {
        Self {
            user_votes: record.user_votes,
        }
    }
}

impl From<VoteLedger> for LedgerRecord {
    fn from(ledger: VoteLedger) -> Self {
        Self {
            up_count: ledger.up_count(),
            down_count: ledger.down_count(),
            user_votes: ledger.user_votes,
        }
    }
}

impl VoteLedger {
    pub fn up_count(&self) -> u32 {
        self.count(VoteDirection::Up)
    }

    pub fn down_count(&self) -> u32 {
        self.count(VoteDirection::Down)
    }

    fn count(&self, direction: VoteDirection) -> u32 {
        let n = self.user_votes.values().filter(|d| **d == direction).count();
        u32::try_from(n).unwrap_or(u32::MAX)
    }

    /// Current vote of `user_id`, if any
    pub fn vote_of(&self, user_id: &str) -> Option<VoteDirection> {
        self.user_votes.get(user_id).copied()
    }

    pub fn user_votes(&self) -> &BTreeMap<String, VoteDirection> {
        &self.user_votes
    }

    pub fn voter_count(&self) -> usize {
        self.user_votes.len()
    }

    /// Apply one vote and return the resulting ledger
    ///
    /// - same direction as the existing vote: withdrawn
    /// - opposite direction: switched
    /// - no previous vote: cast
    ///
    /// `self` is left untouched.
    pub fn tally(&self, user_id: &str, direction: VoteDirection) -> (VoteLedger, VoteOutcome) {
        let mut next = self.clone();
        let outcome = match self.user_votes.get(user_id).copied() {
            Some(prev) if prev == direction => {
                next.user_votes.remove(user_id);
                VoteOutcome::Withdrawn
            }
            Some(_) => {
                next.user_votes.insert(user_id.to_string(), direction);
                VoteOutcome::Switched
            }
            None => {
                next.user_votes.insert(user_id.to_string(), direction);
                VoteOutcome::Cast
            }
        };
        (next, outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_vote_is_cast() {
        let (ledger, outcome) = VoteLedger::default().tally("u1", VoteDirection::Up);
        assert_eq!(outcome, VoteOutcome::Cast);
        assert_eq!(ledger.up_count(), 1);
        assert_eq!(ledger.down_count(), 0);
        assert_eq!(ledger.vote_of("u1"), Some(VoteDirection::Up));
    }

    #[test]
    fn test_same_direction_twice_restores_ledger() {
        let start = VoteLedger::default();
        let (once, _) = start.tally("u1", VoteDirection::Down);
        let (twice, outcome) = once.tally("u1", VoteDirection::Down);

        assert_eq!(outcome, VoteOutcome::Withdrawn);
        assert_eq!(twice, start);
        assert_eq!(twice.vote_of("u1"), None);
    }

    #[test]
    fn test_switch_moves_count() {
        let (up, _) = VoteLedger::default().tally("u1", VoteDirection::Up);
        let (down, outcome) = up.tally("u1", VoteDirection::Down);

        assert_eq!(outcome, VoteOutcome::Switched);
        assert_eq!(down.up_count(), 0);
        assert_eq!(down.down_count(), 1);
        assert_eq!(down.vote_of("u1"), Some(VoteDirection::Down));
        assert_eq!(down.voter_count(), 1);
    }

    #[test]
    fn test_tally_does_not_touch_input() {
        let (base, _) = VoteLedger::default().tally("u1", VoteDirection::Up);
        let _ = base.tally("u2", VoteDirection::Up);
        assert_eq!(base.up_count(), 1);
        assert_eq!(base.voter_count(), 1);
    }

    #[test]
    fn test_drifted_counts_recomputed_on_load() {
        let drifted: VoteLedger = serde_json::from_str(
            r#"{"upCount":0,"downCount":7,"userVotes":{"u1":"up","u2":"up","u3":"down"}}"#,
        )
        .unwrap();
        assert_eq!(drifted.up_count(), 2);
        assert_eq!(drifted.down_count(), 1);

        let json = serde_json::to_value(&drifted).unwrap();
        assert_eq!(json["upCount"], 2);
        assert_eq!(json["downCount"], 1);

        let (ledger, outcome) = drifted.tally("u1", VoteDirection::Up);
        assert_eq!(outcome, VoteOutcome::Withdrawn);
        assert_eq!(ledger.up_count(), 1);
    }

    #[test]
    fn test_missing_vote_map_is_empty_ledger() {
        let ledger: VoteLedger = serde_json::from_str(r#"{"upCount":3}"#).unwrap();
        assert_eq!(ledger, VoteLedger::default());
        assert_eq!(ledger.up_count(), 0);
    }

    #[test]
    fn test_serialized_shape() {
        let (ledger, _) = VoteLedger::default().tally("citizen-b", VoteDirection::Up);
        let json = serde_json::to_value(&ledger).unwrap();
        assert_eq!(json["upCount"], 1);
        assert_eq!(json["downCount"], 0);
        assert_eq!(json["userVotes"]["citizen-b"], "up");
    }

    #[test]
    fn test_direction_from_str() {
        assert_eq!("up".parse::<VoteDirection>(), Ok(VoteDirection::Up));
        assert_eq!("down".parse::<VoteDirection>(), Ok(VoteDirection::Down));
        assert!("sideways".parse::<VoteDirection>().is_err());
    }
}

//! Raw per-player counters produced by the log parser.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::YakuCounts;

/// A snapshot that decoded but fails semantic checks.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SnapshotError {
    #[error("tot_rate must be finite, got {0}")]
    NonFiniteRating(f64),

    #[error("tot_rate must not be negative, got {0}")]
    NegativeRating(f64),
}

/// Raw counters for one player across every parsed match.
///
/// Counts are unsigned so a negative value cannot decode. Point totals are
/// signed because net income goes negative. Every field is required.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Matches played
    pub matches: u32,
    /// First-place finishes
    pub rank1: u32,
    /// Second-place finishes
    pub rank2: u32,
    /// Third-place finishes
    pub rank3: u32,
    /// Fourth-place finishes
    pub rank4: u32,
    /// Matches ended below zero points
    pub tobi: u32,

    /// Rounds played
    pub rounds: u32,

    /// Rounds won
    pub wins: u32,
    pub win_tsumo: u32,
    pub win_ron: u32,
    /// Net points from wins
    pub win_score: i64,
    /// Gross points from wins
    pub win_total_score: i64,
    pub win_total_junme: u32,
    pub win_riichi: u32,
    pub win_dama: u32,
    pub win_furo: u32,
    pub win_oya: u32,
    pub win_ko: u32,

    /// Rounds lost by dealing in
    pub loses: u32,
    /// Net points paid when dealing in
    pub lose_score: i64,
    pub lose_total_score: i64,
    pub lose_total_junme: u32,
    pub lose_riichi: u32,
    pub lose_menzen: u32,
    pub lose_furo: u32,
    pub lose_ko_to_oya: u32,
    pub lose_ko_to_ko: u32,
    pub lose_oya_to_ko: u32,
    pub lose_to_riichi: u32,
    pub lose_to_dama: u32,
    pub lose_to_furo: u32,

    /// Rounds where another player won by self-draw
    pub be_tsumo: u32,
    pub be_tsumo_total_score: i64,
    pub be_tsumo_oya: u32,
    pub be_tsumo_oya_total_score: i64,
    /// Self-draws of mangan or more suffered while dealer
    pub be_tsumo_oya_mangan: u32,
    pub be_tsumo_oya_mangan_total_score: i64,
    pub be_tsumo_total_junme: u32,
    pub be_tsumo_riichi: u32,
    pub be_tsumo_menzen: u32,
    pub be_tsumo_furo: u32,
    pub be_tsumo_ko_to_oya: u32,
    pub be_tsumo_ko_to_ko: u32,
    pub be_tsumo_oya_to_ko: u32,

    /// Rounds where points moved between two other players
    pub no_change: u32,

    /// Exhaustive draws
    pub draw: u32,
    pub draw_total_score: i64,
    pub draw_tenpai: u32,

    /// Riichi declarations
    pub riichi: u32,
    pub riichi_double: u32,
    pub riichi_first: u32,
    pub riichi_follow: u32,
    pub riichi_followed: u32,
    pub riichi_total_junme: u32,
    pub riichi_win: u32,
    pub riichi_lose: u32,
    pub riichi_be_tsumo: u32,
    pub riichi_draw: u32,
    pub riichi_win_score: u64,
    pub riichi_lose_score: i64,
    /// Net income over all riichi rounds
    pub riichi_total_score: i64,
    pub riichi_ippatsu_tsumo: u32,

    /// Net income over all rounds
    pub total_score: i64,

    /// Rounds with at least one open meld
    pub total_furo: u32,

    /// Occurrences per scoring pattern
    pub yakus: YakuCounts,

    /// Sum of Tenhou rate over all matches
    pub tot_rate: f64,
}

impl Snapshot {
    /// Decode a snapshot from the parser's JSON. Call [`validate`](Self::validate) after.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Semantic checks the type system cannot express.
    pub fn validate(&self) -> Result<(), SnapshotError> {
        if !self.tot_rate.is_finite() {
            return Err(SnapshotError::NonFiniteRating(self.tot_rate));
        }
        if self.tot_rate < 0.0 {
            return Err(SnapshotError::NegativeRating(self.tot_rate));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Yaku;

    fn sample() -> Snapshot {
        Snapshot {
            matches: 12,
            rank1: 4,
            rank2: 3,
            rank3: 3,
            rank4: 2,
            rounds: 110,
            wins: 25,
            win_score: 160_000,
            lose_score: -90_000,
            total_score: 42_000,
            yakus: YakuCounts::new().with(Yaku::Riichi, 9),
            tot_rate: 20_100.5,
            ..Default::default()
        }
    }

    #[test]
    fn test_from_json_accepts_parser_output() {
        let json = serde_json::to_string(&sample()).unwrap();
        let parsed = Snapshot::from_json(&json).unwrap();
        assert_eq!(parsed, sample());
        assert_eq!(parsed.yakus.get(Yaku::Riichi), 9);
    }

    #[test]
    fn test_from_json_rejects_missing_field() {
        let mut value = serde_json::to_value(sample()).unwrap();
        value.as_object_mut().unwrap().remove("riichi_draw");

        let err = Snapshot::from_json(&value.to_string()).unwrap_err();
        assert!(err.to_string().contains("riichi_draw"));
    }

    #[test]
    fn test_from_json_rejects_non_numeric_field() {
        let mut value = serde_json::to_value(sample()).unwrap();
        value["wins"] = serde_json::json!("twenty");

        assert!(Snapshot::from_json(&value.to_string()).is_err());
    }

    #[test]
    fn test_from_json_rejects_negative_count() {
        let mut value = serde_json::to_value(sample()).unwrap();
        value["loses"] = serde_json::json!(-3);

        assert!(Snapshot::from_json(&value.to_string()).is_err());
    }

    #[test]
    fn test_negative_point_totals_are_valid() {
        let snapshot = Snapshot {
            total_score: -15_000,
            riichi_total_score: -4_000,
            ..sample()
        };
        assert!(snapshot.validate().is_ok());
    }

    #[test]
    fn test_validate_rating() {
        let bad = Snapshot {
            tot_rate: -1.0,
            ..sample()
        };
        assert_eq!(bad.validate(), Err(SnapshotError::NegativeRating(-1.0)));

        let nan = Snapshot {
            tot_rate: f64::NAN,
            ..sample()
        };
        assert!(matches!(
            nan.validate(),
            Err(SnapshotError::NonFiniteRating(_))
        ));
    }
}

//! Finish order and payouts.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::engine::RaceState;
use crate::types::WinMode;

/// One line of the result board.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankEntry {
    pub horse: usize,
    /// Race time at which the horse was finish-judged.
    pub finish_time: f64,
}

/// Judged horses, best first.
///
/// Ordered by judged time only. Horses judged at the same instant keep
/// their index order, so the result never depends on float noise in
/// anything but the judged times themselves.
pub fn ranking(state: &RaceState) -> Vec<RankEntry> {
    let mut board: Vec<RankEntry> = state
        .horses
        .iter()
        .enumerate()
        .filter_map(|(horse, h)| {
            h.judged_at.map(|finish_time| RankEntry { horse, finish_time })
        })
        .collect();
    board.sort_by(|a, b| a.finish_time.total_cmp(&b.finish_time));
    board
}

/// The horse whose backers win under `mode`.
pub fn winning_horse(board: &[RankEntry], mode: WinMode) -> Option<usize> {
    match mode {
        WinMode::First => board.first(),
        WinMode::Last => board.last(),
    }
    .map(|e| e.horse)
}

/// Names of everyone who bet on the winning horse, sorted.
pub fn winners(
    board: &[RankEntry],
    mode: WinMode,
    bets: &BTreeMap<String, usize>,
) -> Vec<String> {
    let Some(horse) = winning_horse(board, mode) else {
        return Vec::new();
    };
    bets.iter()
        .filter(|(_, h)| **h == horse)
        .map(|(name, _)| name.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::HorseState;

    fn board(times: &[f64]) -> Vec<RankEntry> {
        times
            .iter()
            .enumerate()
            .map(|(horse, &finish_time)| RankEntry { horse, finish_time })
            .collect()
    }

    fn judged_state(times: &[Option<f64>]) -> RaceState {
        let horses = times
            .iter()
            .enumerate()
            .map(|(i, &t)| {
                let mut h = HorseState::at(0, i, 0.0);
                h.judged_at = t;
                h
            })
            .collect();
        RaceState {
            elapsed: 0.0,
            horses,
            weather_index: None,
            slow_motion: false,
        }
    }

    #[test]
    fn test_ranking_ties_keep_index_order() {
        let state =
            judged_state(&[Some(3.0), Some(1.0), Some(3.0), Some(2.0)]);
        let order: Vec<usize> = ranking(&state).iter().map(|e| e.horse).collect();
        assert_eq!(order, vec![1, 3, 0, 2]);
    }

    #[test]
    fn test_ranking_skips_unjudged() {
        let state = judged_state(&[None, Some(5.0)]);
        let board = ranking(&state);
        assert_eq!(board.len(), 1);
        assert_eq!(board[0].horse, 1);
    }

    #[test]
    fn test_winning_horse_by_mode() {
        let b = board(&[1.0, 2.0, 3.0]);
        assert_eq!(winning_horse(&b, WinMode::First), Some(0));
        assert_eq!(winning_horse(&b, WinMode::Last), Some(2));
        assert_eq!(winning_horse(&[], WinMode::First), None);
    }

    #[test]
    fn test_winners_are_backers_of_winning_horse() {
        let b = board(&[1.0, 2.0]);
        let bets = BTreeMap::from([
            ("zoe".to_string(), 0),
            ("amy".to_string(), 0),
            ("bob".to_string(), 1),
        ]);
        assert_eq!(winners(&b, WinMode::First, &bets), vec!["amy", "zoe"]);
        assert_eq!(winners(&b, WinMode::Last, &bets), vec!["bob"]);
    }

    #[test]
    fn test_winners_empty_when_nobody_backed_winner() {
        let b = board(&[1.0, 2.0, 3.0]);
        let bets = BTreeMap::from([("amy".to_string(), 1)]);
        assert!(winners(&b, WinMode::First, &bets).is_empty());
    }
}

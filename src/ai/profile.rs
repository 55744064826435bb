use serde::{Deserialize, Serialize};

use crate::game::{CENTER, CORNERS};

/// 开局记录的步数。
const OPENING_PLIES: usize = 2;
/// 风格判定所看的最近步数。
const STYLE_WINDOW: usize = 3;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PlayStyle {
    Aggressive,
    Defensive,
    #[default]
    Balanced,
}

/// 人类玩家本局的落子画像。只作为遥测数据展示，不参与机器人的选择。
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PlayerProfile {
    moves: Vec<usize>,
    opening_moves: Vec<usize>,
    favorite_corners: Vec<usize>,
    style: PlayStyle,
}

impl PlayerProfile {
    pub fn moves(&self) -> &[usize] {
        &self.moves
    }

    pub fn opening_moves(&self) -> &[usize] {
        &self.opening_moves
    }

    pub fn favorite_corners(&self) -> &[usize] {
        &self.favorite_corners
    }

    pub fn style(&self) -> PlayStyle {
        self.style
    }

    pub fn record(&mut self, cell: usize) {
        self.moves.push(cell);

        if self.opening_moves.len() < OPENING_PLIES {
            self.opening_moves.push(cell);
        }
        if CORNERS.contains(&cell) && !self.favorite_corners.contains(&cell) {
            self.favorite_corners.push(cell);
        }
        if self.moves.len() >= STYLE_WINDOW {
            self.style = classify(&self.moves[self.moves.len() - STYLE_WINDOW..]);
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

fn classify(recent: &[usize]) -> PlayStyle {
    let center = recent.iter().filter(|&&cell| cell == CENTER).count();
    let corner = recent.iter().filter(|cell| CORNERS.contains(cell)).count();
    if center > corner {
        PlayStyle::Aggressive
    } else if corner > center {
        PlayStyle::Defensive
    } else {
        PlayStyle::Balanced
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile_of(moves: &[usize]) -> PlayerProfile {
        let mut profile = PlayerProfile::default();
        for &cell in moves {
            profile.record(cell);
        }
        profile
    }

    #[test]
    fn opening_keeps_first_two_moves() {
        let profile = profile_of(&[4, 0, 8, 2]);
        assert_eq!(profile.opening_moves(), &[4, 0]);
        assert_eq!(profile.moves(), &[4, 0, 8, 2]);
    }

    #[test]
    fn corners_are_distinct_in_play_order() {
        let profile = profile_of(&[8, 1, 0, 8]);
        assert_eq!(profile.favorite_corners(), &[8, 0]);
    }

    #[test]
    fn style_needs_three_moves() {
        assert_eq!(profile_of(&[0, 2]).style(), PlayStyle::Balanced);
        assert_eq!(profile_of(&[0, 2, 6]).style(), PlayStyle::Defensive);
    }

    #[test]
    fn style_is_recomputed_from_recent_window() {
        // 中心 1 次，角 0 次。
        assert_eq!(profile_of(&[4, 1, 3]).style(), PlayStyle::Aggressive);
        // 先是防守型，最近三步中心与角相等后回到均衡。
        assert_eq!(profile_of(&[0, 2, 6, 4, 1]).style(), PlayStyle::Balanced);
        assert_eq!(profile_of(&[1, 3, 5]).style(), PlayStyle::Balanced);
    }

    #[test]
    fn reset_clears_everything() {
        let mut profile = profile_of(&[0, 4, 8]);
        profile.reset();
        assert_eq!(profile, PlayerProfile::default());
    }
}

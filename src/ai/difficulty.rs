use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::minimax::MoveCandidate;

/// 简单难度下随机落子的概率。
pub const EASY_RANDOM_CHANCE: f64 = 0.7;
/// 中等难度下随机落子的概率。
pub const MEDIUM_RANDOM_CHANCE: f64 = 0.2;
/// 中等难度下，抽样值低于该值（且不随机）时选次优解。
pub const MEDIUM_SECOND_BEST_CUTOFF: f64 = 0.5;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl FromStr for Difficulty {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" | "normal" => Ok(Difficulty::Medium),
            "hard" | "expert" => Ok(Difficulty::Hard),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        };
        f.write_str(name)
    }
}

/// 难度层选中候选时走的分支。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum SelectionBranch {
    Random,
    Best,
    SecondBest,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Selection {
    pub cell: usize,
    pub branch: SelectionBranch,
}

/// 按难度从已排序的候选中挑一步。候选为空（棋盘已满）时返回 `None`。
pub fn select_move<R: Rng + ?Sized>(
    candidates: &[MoveCandidate],
    difficulty: Difficulty,
    rng: &mut R,
) -> Option<Selection> {
    let best = candidates.first()?;
    let pick_best = Selection {
        cell: best.cell,
        branch: SelectionBranch::Best,
    };

    let selection = match difficulty {
        Difficulty::Hard => pick_best,
        Difficulty::Easy => {
            if rng.gen::<f64>() < EASY_RANDOM_CHANCE {
                pick_random(candidates, rng)
            } else {
                pick_best
            }
        }
        Difficulty::Medium => {
            let roll = rng.gen::<f64>();
            if roll < MEDIUM_RANDOM_CHANCE {
                pick_random(candidates, rng)
            } else if roll < MEDIUM_SECOND_BEST_CUTOFF {
                candidates
                    .get(1)
                    .map(|second| Selection {
                        cell: second.cell,
                        branch: SelectionBranch::SecondBest,
                    })
                    .unwrap_or(pick_best)
            } else {
                pick_best
            }
        }
    };
    Some(selection)
}

fn pick_random<R: Rng + ?Sized>(candidates: &[MoveCandidate], rng: &mut R) -> Selection {
    let index = rng.gen_range(0..candidates.len());
    Selection {
        cell: candidates[index].cell,
        branch: SelectionBranch::Random,
    }
}

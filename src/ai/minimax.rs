use serde::{Deserialize, Serialize};

use crate::game::{static_score, Board, Player, WIN_SCORE};

/// 超出任何可能评分的窗口边界。
const SCORE_BOUND: i32 = 1000;

/// 一次搜索给出的候选落子。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct MoveCandidate {
    pub cell: usize,
    pub score: i32,
}

/// 完整深度的 minimax + alpha-beta 剪枝。分数永远站在机器人一方（极大方）。
#[derive(Debug, Clone)]
pub struct Minimax {
    bot: Player,
    nodes: u64,
}

impl Minimax {
    pub fn new(bot: Player) -> Self {
        Self { bot, nodes: 0 }
    }

    pub fn bot(&self) -> Player {
        self.bot
    }

    /// Positions visited since construction.
    pub fn nodes(&self) -> u64 {
        self.nodes
    }

    // static_score 以 X 为正方向，这里换算成机器人视角。
    fn perspective(&self) -> i32 {
        match self.bot {
            Player::X => 1,
            Player::O => -1,
        }
    }

    pub fn best_move_value(
        &mut self,
        board: &Board,
        depth: u8,
        mut alpha: i32,
        mut beta: i32,
        maximizing: bool,
    ) -> i32 {
        self.nodes += 1;
        let depth_penalty = i32::from(depth);

        let score = static_score(board) * self.perspective();
        if score == WIN_SCORE {
            return score - depth_penalty;
        }
        if score == -WIN_SCORE {
            return score + depth_penalty;
        }
        if board.is_full() {
            return 0;
        }

        if maximizing {
            let mut best = -SCORE_BOUND;
            for cell in board.empty_cells() {
                let child = board.with_move(cell, self.bot);
                let value = self.best_move_value(&child, depth + 1, alpha, beta, false);
                best = best.max(value);
                alpha = alpha.max(best);
                if beta <= alpha {
                    break;
                }
            }
            best
        } else {
            let human = self.bot.opponent();
            let mut best = SCORE_BOUND;
            for cell in board.empty_cells() {
                let child = board.with_move(cell, human);
                let value = self.best_move_value(&child, depth + 1, alpha, beta, true);
                best = best.min(value);
                beta = beta.min(best);
                if beta <= alpha {
                    break;
                }
            }
            best
        }
    }

    /// 枚举所有空位，机器人落子后以完整窗口评估，按分数从高到低稳定排序。
    pub fn rank_moves(&mut self, board: &Board) -> Vec<MoveCandidate> {
        let mut candidates: Vec<MoveCandidate> = board
            .empty_cells()
            .map(|cell| {
                let child = board.with_move(cell, self.bot);
                let score = self.best_move_value(&child, 1, -SCORE_BOUND, SCORE_BOUND, false);
                MoveCandidate { cell, score }
            })
            .collect();

        candidates.sort_by(|a, b| b.score.cmp(&a.score));
        candidates
    }
}

impl Default for Minimax {
    fn default() -> Self {
        Minimax::new(Player::O)
    }
}

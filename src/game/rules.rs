use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::state::{Board, Player, CELL_COUNT};

/// 一条获胜连线的三个格子索引。
pub type WinPattern = [usize; 3];

pub const WIN_PATTERNS: [WinPattern; 8] = [
    // rows
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    // columns
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    // diagonals
    [0, 4, 8],
    [2, 4, 6],
];

/// `static_score` 的胜负分值。
pub const WIN_SCORE: i32 = 10;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum GameOutcome {
    Won { winner: Player, pattern: WinPattern },
    Draw,
    InProgress,
}

impl GameOutcome {
    pub fn winner(&self) -> Option<Player> {
        match self {
            GameOutcome::Won { winner, .. } => Some(*winner),
            _ => None,
        }
    }

    pub fn is_finished(&self) -> bool {
        !matches!(self, GameOutcome::InProgress)
    }
}

/// 非法操作。核心不会因此改变任何状态，调用方可以直接忽略。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Error)]
#[serde(tag = "type")]
pub enum MoveRejected {
    #[error("cell {cell} is outside the board")]
    OutOfRange { cell: usize },
    #[error("cell {cell} is already occupied")]
    CellOccupied { cell: usize },
    #[error("the game is already decided")]
    GameOver,
    #[error("it is not this side's turn")]
    NotYourTurn,
    #[error("the bot is still thinking")]
    BotThinking,
    #[error("no pending bot move for round {round}")]
    NoPendingMove { round: u32 },
    #[error("no move available")]
    NoMoveAvailable,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct MoveResult {
    pub board: Board,
    pub outcome: GameOutcome,
}

/// 判定胜负与平局的唯一入口，人类落子、机器人落子和搜索都调用这里。
pub fn evaluate_outcome(board: &Board) -> GameOutcome {
    let cells = board.cells();
    for pattern in WIN_PATTERNS {
        let [a, b, c] = pattern;
        if let Some(player) = cells[a] {
            if cells[b] == Some(player) && cells[c] == Some(player) {
                return GameOutcome::Won {
                    winner: player,
                    pattern,
                };
            }
        }
    }

    if board.is_full() {
        GameOutcome::Draw
    } else {
        GameOutcome::InProgress
    }
}

/// X 连成一线为 +10，O 为 -10，否则为 0。只在搜索内部使用。
pub fn static_score(board: &Board) -> i32 {
    match evaluate_outcome(board).winner() {
        Some(Player::X) => WIN_SCORE,
        Some(Player::O) => -WIN_SCORE,
        None => 0,
    }
}

/// 在 `cell` 落下 `player` 的棋子。格子被占、越界或对局已结束时拒绝，原棋盘不变。
pub fn apply_move(board: &Board, cell: usize, player: Player) -> Result<MoveResult, MoveRejected> {
    if cell >= CELL_COUNT {
        return Err(MoveRejected::OutOfRange { cell });
    }
    if evaluate_outcome(board).is_finished() {
        return Err(MoveRejected::GameOver);
    }
    if !board.is_empty_at(cell) {
        return Err(MoveRejected::CellOccupied { cell });
    }

    let board = board.with_move(cell, player);
    Ok(MoveResult {
        board,
        outcome: evaluate_outcome(&board),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(text: &str) -> Board {
        text.parse().expect("board literal should parse")
    }

    #[test]
    fn every_pattern_reports_its_winner() {
        for pattern in WIN_PATTERNS {
            for player in [Player::X, Player::O] {
                // 任意填入顺序得到的棋盘都一样，结果也必须一样。
                let orders = [
                    [pattern[0], pattern[1], pattern[2]],
                    [pattern[2], pattern[0], pattern[1]],
                    [pattern[1], pattern[2], pattern[0]],
                ];
                for order in orders {
                    let filled = order
                        .iter()
                        .fold(Board::new(), |acc, &cell| acc.with_move(cell, player));
                    assert_eq!(
                        evaluate_outcome(&filled),
                        GameOutcome::Won {
                            winner: player,
                            pattern
                        },
                        "pattern {pattern:?} for {player}"
                    );
                }
            }
        }
    }

    #[test]
    fn full_board_without_line_is_draw() {
        for text in ["XOXXOOOXX", "XXOOOXXOX", "OXOXXOXOX"] {
            assert_eq!(evaluate_outcome(&board(text)), GameOutcome::Draw, "{text}");
        }
    }

    #[test]
    fn full_board_with_line_is_a_win() {
        assert_eq!(
            evaluate_outcome(&board("XXXOOXOXO")),
            GameOutcome::Won {
                winner: Player::X,
                pattern: [0, 1, 2]
            }
        );
    }

    #[test]
    fn partial_board_is_in_progress() {
        assert_eq!(evaluate_outcome(&Board::new()), GameOutcome::InProgress);
        assert_eq!(evaluate_outcome(&board("XO_X_O___")), GameOutcome::InProgress);
    }

    #[test]
    fn static_score_is_signed_by_winner() {
        assert_eq!(static_score(&board("XXX_OO___")), WIN_SCORE);
        assert_eq!(static_score(&board("XX_OOOX__")), -WIN_SCORE);
        assert_eq!(static_score(&board("XOXXOOOXX")), 0);
    }

    #[test]
    fn apply_move_returns_new_board_and_outcome() {
        let start = board("XX_OO____");
        let result = apply_move(&start, 2, Player::X).expect("cell 2 is free");
        assert_eq!(
            result.outcome,
            GameOutcome::Won {
                winner: Player::X,
                pattern: [0, 1, 2]
            }
        );
        assert!(start.is_empty_at(2));
    }

    #[test]
    fn apply_move_rejects_invalid_moves() {
        let start = board("XX_OO____");
        assert_eq!(
            apply_move(&start, 0, Player::X),
            Err(MoveRejected::CellOccupied { cell: 0 })
        );
        assert_eq!(
            apply_move(&start, 9, Player::X),
            Err(MoveRejected::OutOfRange { cell: 9 })
        );
        assert_eq!(
            apply_move(&board("XXXOO____"), 8, Player::O),
            Err(MoveRejected::GameOver)
        );
    }

    #[test]
    fn rejection_serializes_with_type_tag() {
        let json = serde_json::to_value(MoveRejected::CellOccupied { cell: 3 }).expect("serialize");
        assert_eq!(json["type"], "CellOccupied");
        assert_eq!(json["cell"], 3);
        assert_eq!(
            MoveRejected::CellOccupied { cell: 3 }.to_string(),
            "cell 3 is already occupied"
        );
    }
}

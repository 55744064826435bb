//! 一步之内的战术判断：立即取胜、必须封堵，以及落子制造的威胁数量。

use crate::game::{evaluate_outcome, Board, Player, WIN_PATTERNS};

/// 直接取胜时 `winning_potential` 的返回值。
pub const WINNING_POTENTIAL: u8 = 10;

/// 按格子序号扫描，返回第一个能让 `player` 立即获胜的空位。
pub fn find_winning_move(board: &Board, player: Player) -> Option<usize> {
    board.empty_cells().find(|&cell| {
        evaluate_outcome(&board.with_move(cell, player)).winner() == Some(player)
    })
}

/// `player` 落在 `cell` 后：若直接获胜返回 10，否则返回经过该格、形成“两子一空”的连线数量。
pub fn winning_potential(board: &Board, cell: usize, player: Player) -> u8 {
    if !board.is_empty_at(cell) {
        return 0;
    }
    let next = board.with_move(cell, player);
    if evaluate_outcome(&next).winner() == Some(player) {
        return WINNING_POTENTIAL;
    }
    open_lines_through(&next, cell, player)
}

/// 站在对手角度评估 `cell`：占住它能拆掉对手多少威胁。
pub fn blocking_potential(board: &Board, cell: usize, opponent: Player) -> u8 {
    winning_potential(board, cell, opponent)
}

fn open_lines_through(board: &Board, cell: usize, player: Player) -> u8 {
    let cells = board.cells();
    let threats = WIN_PATTERNS
        .iter()
        .filter(|pattern| pattern.contains(&cell))
        .filter(|pattern| {
            let owned = pattern.iter().filter(|&&i| cells[i] == Some(player)).count();
            let empty = pattern.iter().filter(|&&i| cells[i].is_none()).count();
            owned == 2 && empty == 1
        })
        .count();
    // 最多 4 条连线经过同一格。
    threats as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(text: &str) -> Board {
        text.parse().expect("board literal should parse")
    }

    #[test]
    fn finds_first_winning_cell() {
        let position = board("XX_OO____");
        assert_eq!(find_winning_move(&position, Player::X), Some(2));
        assert_eq!(find_winning_move(&position, Player::O), Some(5));
        assert_eq!(find_winning_move(&board("X___O____"), Player::O), None);
    }

    #[test]
    fn winning_potential_scores_win_and_forks() {
        let position = board("X___O___X");
        // O 下在 4 已占，X 下在 2 形成 0-1-2 与 2-5-8 两条威胁。
        assert_eq!(winning_potential(&position, 2, Player::X), 2);
        assert_eq!(winning_potential(&position, 4, Player::X), 0);
        assert_eq!(
            winning_potential(&board("XX_OO____"), 2, Player::X),
            WINNING_POTENTIAL
        );
    }

    #[test]
    fn blocking_potential_measures_opponent_threat() {
        let position = board("XX__O____");
        assert_eq!(blocking_potential(&position, 2, Player::X), WINNING_POTENTIAL);
        assert_eq!(blocking_potential(&position, 3, Player::X), 1);
    }
}

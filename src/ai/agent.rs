use rand::rngs::SmallRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use super::difficulty::{select_move, Difficulty, SelectionBranch};
use super::minimax::{Minimax, MoveCandidate};
use super::tactics::{blocking_potential, find_winning_move, winning_potential};
use crate::console_log;
use crate::game::{evaluate_outcome, Board, Player};

/// 机器人落子前的“思考”时间。
pub const DEFAULT_THINKING_DELAY_MS: u32 = 500;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BotConfig {
    pub difficulty: Difficulty,
    pub thinking_delay_ms: u32,
}

impl BotConfig {
    pub fn from_difficulty(difficulty: Difficulty) -> Self {
        Self {
            difficulty,
            thinking_delay_ms: DEFAULT_THINKING_DELAY_MS,
        }
    }

    pub fn with_thinking_delay(mut self, delay_ms: u32) -> Self {
        self.thinking_delay_ms = delay_ms;
        self
    }
}

impl Default for BotConfig {
    fn default() -> Self {
        BotConfig::from_difficulty(Difficulty::default())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum DecisionReason {
    ImmediateWin,
    ForcedBlock,
    Search { branch: SelectionBranch },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BotDecision {
    pub cell: usize,
    pub player: Player,
    pub reason: DecisionReason,
    pub difficulty: Difficulty,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub candidates: Vec<MoveCandidate>,
    pub nodes: u64,
    /// `winning_potential` of the chosen cell for the bot.
    pub threats: u8,
    /// `blocking_potential` of the chosen cell against the human.
    pub blocks: u8,
}

/// 机器人的决策入口：先处理一步必胜、一步必堵，再交给搜索和难度层。
#[derive(Debug, Clone)]
pub struct BotAgent {
    config: BotConfig,
    player: Player,
    rng: SmallRng,
}

impl BotAgent {
    pub fn new(config: BotConfig) -> Self {
        Self {
            config,
            player: Player::O,
            rng: SmallRng::from_entropy(),
        }
    }

    pub fn with_seed(config: BotConfig, seed: u64) -> Self {
        Self {
            config,
            player: Player::O,
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    pub fn config(&self) -> &BotConfig {
        &self.config
    }

    pub fn player(&self) -> Player {
        self.player
    }

    pub fn set_difficulty(&mut self, difficulty: Difficulty) {
        self.config.difficulty = difficulty;
    }

    /// 棋盘已满或胜负已分时返回 `None`。
    pub fn decide(&mut self, board: &Board) -> Option<BotDecision> {
        if evaluate_outcome(board).is_finished() {
            return None;
        }

        let bot = self.player;
        let human = bot.opponent();
        let difficulty = self.config.difficulty;

        if let Some(cell) = find_winning_move(board, bot) {
            console_log!("bot found winning move {cell}");
            return Some(self.decision(board, cell, DecisionReason::ImmediateWin, Vec::new(), 0));
        }
        if let Some(cell) = find_winning_move(board, human) {
            console_log!("bot blocking winning move {cell}");
            return Some(self.decision(board, cell, DecisionReason::ForcedBlock, Vec::new(), 0));
        }

        let mut search = Minimax::new(bot);
        let candidates = search.rank_moves(board);
        let selection = select_move(&candidates, difficulty, &mut self.rng)?;
        console_log!(
            "bot ({difficulty}) ranked {} moves, {:?} pick {}",
            candidates.len(),
            selection.branch,
            selection.cell
        );

        Some(self.decision(
            board,
            selection.cell,
            DecisionReason::Search {
                branch: selection.branch,
            },
            candidates,
            search.nodes(),
        ))
    }

    fn decision(
        &self,
        board: &Board,
        cell: usize,
        reason: DecisionReason,
        candidates: Vec<MoveCandidate>,
        nodes: u64,
    ) -> BotDecision {
        BotDecision {
            cell,
            player: self.player,
            reason,
            difficulty: self.config.difficulty,
            candidates,
            nodes,
            threats: winning_potential(board, cell, self.player),
            blocks: blocking_potential(board, cell, self.player.opponent()),
        }
    }
}

impl Default for BotAgent {
    fn default() -> Self {
        BotAgent::new(BotConfig::default())
    }
}

/// 用一次性的机器人为给定局面选一步。
pub fn choose_bot_move(board: &Board, difficulty: Difficulty) -> Option<usize> {
    BotAgent::new(BotConfig::from_difficulty(difficulty))
        .decide(board)
        .map(|decision| decision.cell)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::GameOutcome;

    const ALL_DIFFICULTIES: [Difficulty; 3] =
        [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    fn board(text: &str) -> Board {
        text.parse().expect("board literal should parse")
    }

    fn agent(difficulty: Difficulty, seed: u64) -> BotAgent {
        BotAgent::with_seed(BotConfig::from_difficulty(difficulty), seed)
    }

    #[test]
    fn takes_immediate_win_at_every_difficulty() {
        // O 可在 5 取胜，同时 X 在 2 有威胁：取胜优先。
        let position = board("XX_OO_X__");
        for difficulty in ALL_DIFFICULTIES {
            for seed in 0..50 {
                let decision = agent(difficulty, seed).decide(&position).expect("move");
                assert_eq!(decision.cell, 5);
                assert_eq!(decision.reason, DecisionReason::ImmediateWin);
                assert_eq!(decision.threats, 10);
            }
            assert_eq!(choose_bot_move(&position, difficulty), Some(5));
        }
    }

    #[test]
    fn blocks_opponent_win_at_every_difficulty() {
        let position = board("XX__O____");
        for difficulty in ALL_DIFFICULTIES {
            for seed in 0..50 {
                let decision = agent(difficulty, seed).decide(&position).expect("move");
                assert_eq!(decision.cell, 2);
                assert_eq!(decision.reason, DecisionReason::ForcedBlock);
                assert_eq!(decision.blocks, 10);
            }
            assert_eq!(choose_bot_move(&position, difficulty), Some(2));
        }
    }

    #[test]
    fn no_move_on_finished_boards() {
        assert_eq!(choose_bot_move(&board("XOXXOOOXX"), Difficulty::Hard), None);
        assert_eq!(choose_bot_move(&board("XXXOO____"), Difficulty::Easy), None);
    }

    #[test]
    fn search_decision_reports_candidates() {
        let decision = agent(Difficulty::Hard, 1)
            .decide(&board("X________"))
            .expect("move");
        assert_eq!(decision.cell, 4);
        assert_eq!(
            decision.reason,
            DecisionReason::Search {
                branch: SelectionBranch::Best
            }
        );
        assert_eq!(decision.candidates.len(), 8);
        assert!(decision.nodes > 0);
    }

    // X 的所有合法走法（含最优走法）都无法战胜困难难度的机器人。
    fn explore_human_moves(position: Board, bot: &mut BotAgent, games: &mut u32) {
        let moves: Vec<usize> = position.empty_cells().collect();
        for cell in moves {
            let after_human = position.with_move(cell, Player::X);
            match evaluate_outcome(&after_human) {
                GameOutcome::Won { winner, .. } => {
                    panic!("{winner} beat the hard bot: {after_human}")
                }
                GameOutcome::Draw => {
                    *games += 1;
                    continue;
                }
                GameOutcome::InProgress => {}
            }

            let reply = bot.decide(&after_human).expect("bot has a move").cell;
            let after_bot = after_human.with_move(reply, Player::O);
            match evaluate_outcome(&after_bot) {
                GameOutcome::InProgress => explore_human_moves(after_bot, bot, games),
                GameOutcome::Won { winner, .. } => {
                    assert_eq!(winner, Player::O);
                    *games += 1;
                }
                GameOutcome::Draw => *games += 1,
            }
        }
    }

    #[test]
    fn hard_bot_never_loses() {
        let mut bot = agent(Difficulty::Hard, 11);
        let mut games = 0;
        explore_human_moves(Board::new(), &mut bot, &mut games);
        assert!(games > 0);
    }

    #[test]
    fn easy_picks_best_about_thirty_percent() {
        // 无一步杀也无须封堵的局面。
        let position = board("X___O___X");
        let mut bot = agent(Difficulty::Easy, 42);
        let trials = 4_000;
        let mut best = 0u32;
        let mut random = 0u32;
        for _ in 0..trials {
            match bot.decide(&position).expect("move").reason {
                DecisionReason::Search {
                    branch: SelectionBranch::Best,
                } => best += 1,
                DecisionReason::Search {
                    branch: SelectionBranch::Random,
                } => random += 1,
                other => panic!("unexpected reason {other:?}"),
            }
        }
        let best_share = f64::from(best) / f64::from(trials);
        let random_share = f64::from(random) / f64::from(trials);
        assert!((best_share - 0.3).abs() < 0.03, "best {best_share}");
        assert!((random_share - 0.7).abs() < 0.03, "random {random_share}");
    }
}

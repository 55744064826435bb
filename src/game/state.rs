use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::rules::{self, GameOutcome, MoveRejected};
use crate::ai::{BotAgent, BotDecision, Difficulty, PlayerProfile};
use crate::console_log;

/// 棋盘格子数量（3×3）。
pub const CELL_COUNT: usize = 9;
/// 中心格。
pub const CENTER: usize = 4;
/// 四个角格。
pub const CORNERS: [usize; 4] = [0, 2, 6, 8];

/// 单个格子：`None` 表示空位。
pub type Cell = Option<Player>;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Player {
    X,
    O,
}

impl Player {
    pub fn opponent(self) -> Self {
        match self {
            Player::X => Player::O,
            Player::O => Player::X,
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Player::X => f.write_str("X"),
            Player::O => f.write_str("O"),
        }
    }
}

impl FromStr for Player {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "X" | "x" => Ok(Player::X),
            "O" | "o" => Ok(Player::O),
            _ => Err(()),
        }
    }
}

/// 3×3 棋盘，按行优先存储。落子总是产生新的副本，搜索分支之间互不影响。
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Board {
    cells: [Cell; CELL_COUNT],
}

impl Board {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_cells(cells: [Cell; CELL_COUNT]) -> Self {
        Self { cells }
    }

    pub fn cells(&self) -> &[Cell; CELL_COUNT] {
        &self.cells
    }

    /// 越界索引视为不存在，返回 `None`。
    pub fn get(&self, index: usize) -> Option<Cell> {
        self.cells.get(index).copied()
    }

    pub fn is_empty_at(&self, index: usize) -> bool {
        matches!(self.get(index), Some(None))
    }

    pub fn empty_cells(&self) -> impl Iterator<Item = usize> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| cell.is_none())
            .map(|(index, _)| index)
    }

    pub fn is_full(&self) -> bool {
        self.cells.iter().all(Option::is_some)
    }

    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(Option::is_none)
    }

    pub fn count(&self, player: Player) -> usize {
        self.cells
            .iter()
            .filter(|cell| **cell == Some(player))
            .count()
    }

    /// X 永远先手，因此轮到谁可以直接由双方棋子数推出。
    pub fn next_player(&self) -> Player {
        if self.count(Player::X) > self.count(Player::O) {
            Player::O
        } else {
            Player::X
        }
    }

    /// Returns a copy with `player` at `index`. The caller has already checked the cell.
    pub fn with_move(&self, index: usize, player: Player) -> Board {
        let mut next = *self;
        next.cells[index] = Some(player);
        next
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseBoardError {
    #[error("expected 9 cells, found {found}")]
    WrongLength { found: usize },
    #[error("unexpected cell character {0:?}")]
    InvalidCell(char),
}

/// 文本形式：`X`、`O` 以及 `_`/`.`/`-` 表示空位，空白和 `|` 会被忽略。
impl FromStr for Board {
    type Err = ParseBoardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parsed = s
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '|')
            .map(|c| match c {
                'X' | 'x' => Ok(Some(Player::X)),
                'O' | 'o' => Ok(Some(Player::O)),
                '_' | '.' | '-' => Ok(None),
                other => Err(ParseBoardError::InvalidCell(other)),
            })
            .collect::<Result<Vec<Cell>, _>>()?;

        let found = parsed.len();
        let cells: [Cell; CELL_COUNT] = parsed
            .try_into()
            .map_err(|_| ParseBoardError::WrongLength { found })?;
        Ok(Board { cells })
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, cell) in self.cells.iter().enumerate() {
            if index > 0 && index % 3 == 0 {
                f.write_str("|")?;
            }
            match cell {
                Some(player) => write!(f, "{player}")?,
                None => f.write_str("_")?,
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum GameMode {
    HumanVsHuman,
    #[default]
    HumanVsBot,
}

impl FromStr for GameMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pvp" | "human-vs-human" | "local" => Ok(GameMode::HumanVsHuman),
            "pve" | "human-vs-bot" | "bot" => Ok(GameMode::HumanVsBot),
            _ => Err(()),
        }
    }
}

/// 当前回合所处的阶段，完全由棋盘和模式推导。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum TurnPhase {
    AwaitingHuman,
    AwaitingBot,
    Won,
    Draw,
}

/// 累计比分，跨局保留，只有 `reset_scores` 会清零。
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Scores {
    pub x: u32,
    pub o: u32,
    pub draws: u32,
}

impl Scores {
    pub fn record(&mut self, outcome: &GameOutcome) {
        match outcome {
            GameOutcome::Won {
                winner: Player::X, ..
            } => self.x += 1,
            GameOutcome::Won {
                winner: Player::O, ..
            } => self.o += 1,
            GameOutcome::Draw => self.draws += 1,
            GameOutcome::InProgress => {}
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct MoveRecord {
    pub cell: usize,
    pub player: Player,
}

/// 一次落子后的结果，返回给前端刷新界面。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnResolution {
    #[serde(rename = "move")]
    pub placed: MoveRecord,
    pub board: Board,
    pub outcome: GameOutcome,
    pub phase: TurnPhase,
    pub scores: Scores,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decision: Option<BotDecision>,
}

/// 前端需要的完整状态快照。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSnapshot {
    pub board: Board,
    pub mode: GameMode,
    pub difficulty: Difficulty,
    pub current_player: Player,
    pub phase: TurnPhase,
    pub outcome: GameOutcome,
    pub scores: Scores,
    pub history: Vec<MoveRecord>,
    pub thinking: bool,
    pub round: u32,
    pub profile: PlayerProfile,
}

#[derive(Debug, Clone)]
struct PendingBotMove {
    round: u32,
    decision: BotDecision,
}

/// 单局游戏的聚合状态。所有变化都经由下面的转移函数完成。
#[derive(Debug, Clone)]
pub struct GameState {
    board: Board,
    mode: GameMode,
    scores: Scores,
    history: Vec<MoveRecord>,
    profile: PlayerProfile,
    bot: BotAgent,
    thinking: bool,
    pending: Option<PendingBotMove>,
    round: u32,
}

impl GameState {
    pub fn new(mode: GameMode, bot: BotAgent) -> Self {
        Self {
            board: Board::new(),
            mode,
            scores: Scores::default(),
            history: Vec::new(),
            profile: PlayerProfile::default(),
            bot,
            thinking: false,
            pending: None,
            round: 0,
        }
    }

    /// 从已有局面继续，历史与画像从空开始。
    pub fn with_board(mut self, board: Board) -> Self {
        self.board = board;
        self.history.clear();
        self.profile.reset();
        self
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    pub fn scores(&self) -> Scores {
        self.scores
    }

    pub fn history(&self) -> &[MoveRecord] {
        &self.history
    }

    pub fn profile(&self) -> &PlayerProfile {
        &self.profile
    }

    pub fn bot(&self) -> &BotAgent {
        &self.bot
    }

    pub fn is_thinking(&self) -> bool {
        self.thinking
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn outcome(&self) -> GameOutcome {
        rules::evaluate_outcome(&self.board)
    }

    pub fn current_player(&self) -> Player {
        self.board.next_player()
    }

    pub fn phase(&self) -> TurnPhase {
        match self.outcome() {
            GameOutcome::Won { .. } => TurnPhase::Won,
            GameOutcome::Draw => TurnPhase::Draw,
            GameOutcome::InProgress => {
                if self.mode == GameMode::HumanVsBot && self.current_player() == self.bot.player()
                {
                    TurnPhase::AwaitingBot
                } else {
                    TurnPhase::AwaitingHuman
                }
            }
        }
    }

    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            board: self.board,
            mode: self.mode,
            difficulty: self.bot.config().difficulty,
            current_player: self.current_player(),
            phase: self.phase(),
            outcome: self.outcome(),
            scores: self.scores,
            history: self.history.clone(),
            thinking: self.thinking,
            round: self.round,
            profile: self.profile.clone(),
        }
    }

    /// 难度可以随时修改，但不会影响已经算好、正在等待落下的那一步。
    pub fn set_difficulty(&mut self, difficulty: Difficulty) {
        let previous = self.bot.config().difficulty;
        self.bot.set_difficulty(difficulty);
        console_log!("bot difficulty changed from {previous} to {difficulty}");
    }

    pub fn apply_human_move(&mut self, cell: usize) -> Result<TurnResolution, MoveRejected> {
        if self.thinking {
            return Err(MoveRejected::BotThinking);
        }
        match self.phase() {
            TurnPhase::Won | TurnPhase::Draw => return Err(MoveRejected::GameOver),
            TurnPhase::AwaitingBot => return Err(MoveRejected::NotYourTurn),
            TurnPhase::AwaitingHuman => {}
        }

        let player = self.current_player();
        let result = rules::apply_move(&self.board, cell, player)?;
        if self.mode == GameMode::HumanVsBot {
            self.profile.record(cell);
        }
        console_log!("player {player} moved at {cell}");
        Ok(self.commit(MoveRecord { cell, player }, result.board, None))
    }

    /// 计算机器人的落子并挂起，等待“思考”延迟结束后由 `complete_bot_turn` 落下。
    pub fn begin_bot_turn(&mut self) -> Result<BotDecision, MoveRejected> {
        if self.mode != GameMode::HumanVsBot {
            return Err(MoveRejected::NotYourTurn);
        }
        if self.thinking {
            return Err(MoveRejected::BotThinking);
        }
        match self.phase() {
            TurnPhase::Won | TurnPhase::Draw => return Err(MoveRejected::GameOver),
            TurnPhase::AwaitingHuman => return Err(MoveRejected::NotYourTurn),
            TurnPhase::AwaitingBot => {}
        }

        let decision = self
            .bot
            .decide(&self.board)
            .ok_or(MoveRejected::NoMoveAvailable)?;
        console_log!(
            "bot ({}) is thinking, move {} already chosen",
            self.bot.config().difficulty,
            decision.cell
        );
        self.thinking = true;
        self.pending = Some(PendingBotMove {
            round: self.round,
            decision: decision.clone(),
        });
        Ok(decision)
    }

    pub fn complete_bot_turn(&mut self, round: u32) -> Result<TurnResolution, MoveRejected> {
        let pending = match self.pending.take() {
            Some(pending) if pending.round == round => pending,
            other => {
                self.pending = other;
                return Err(MoveRejected::NoPendingMove { round });
            }
        };
        self.thinking = false;

        let decision = pending.decision;
        let player = decision.player;
        let result = rules::apply_move(&self.board, decision.cell, player)?;
        console_log!("bot placed {player} at {}", decision.cell);
        Ok(self.commit(
            MoveRecord {
                cell: decision.cell,
                player,
            },
            result.board,
            Some(decision),
        ))
    }

    /// 不经过延迟，直接计算并落子。
    pub fn apply_bot_move(&mut self) -> Result<TurnResolution, MoveRejected> {
        self.begin_bot_turn()?;
        self.complete_bot_turn(self.round)
    }

    pub fn reset_game(&mut self) {
        self.board = Board::new();
        self.history.clear();
        self.profile.reset();
        self.thinking = false;
        self.pending = None;
        self.round = self.round.wrapping_add(1);
        if self.mode == GameMode::HumanVsBot {
            console_log!(
                "new game started with bot difficulty {}",
                self.bot.config().difficulty
            );
        }
    }

    pub fn reset_scores(&mut self) {
        self.scores = Scores::default();
    }

    // 先判定胜负再决定轮次：轮次本身由棋盘推出，所以这里只需更新棋盘与比分。
    fn commit(
        &mut self,
        placed: MoveRecord,
        board: Board,
        decision: Option<BotDecision>,
    ) -> TurnResolution {
        self.board = board;
        self.history.push(placed);

        let outcome = self.outcome();
        self.scores.record(&outcome);
        match &outcome {
            GameOutcome::Won { winner, pattern } => {
                console_log!("{winner} won the game on {pattern:?}");
            }
            GameOutcome::Draw => console_log!("game ended in a draw"),
            GameOutcome::InProgress => {}
        }

        TurnResolution {
            placed,
            board: self.board,
            outcome,
            phase: self.phase(),
            scores: self.scores,
            decision,
        }
    }
}

impl Default for GameState {
    fn default() -> Self {
        GameState::new(GameMode::default(), BotAgent::default())
    }
}

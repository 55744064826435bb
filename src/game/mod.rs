//! 棋盘、胜负判定与对局状态机。

pub mod rules;
pub mod state;

pub use rules::{
    apply_move,
    evaluate_outcome,
    static_score,
    GameOutcome,
    MoveRejected,
    MoveResult,
    WinPattern,
    WIN_PATTERNS,
    WIN_SCORE,
};
pub use state::{
    Board,
    Cell,
    GameMode,
    GameSnapshot,
    GameState,
    MoveRecord,
    ParseBoardError,
    Player,
    Scores,
    TurnPhase,
    TurnResolution,
    CELL_COUNT,
    CENTER,
    CORNERS,
};

pub mod agent;
pub mod difficulty;
pub mod minimax;
pub mod profile;
pub mod tactics;

pub use agent::{
    choose_bot_move, BotAgent, BotConfig, BotDecision, DecisionReason, DEFAULT_THINKING_DELAY_MS,
};
pub use difficulty::{select_move, Difficulty, Selection, SelectionBranch};
pub use minimax::{Minimax, MoveCandidate};
pub use profile::{PlayStyle, PlayerProfile};
pub use tactics::{blocking_potential, find_winning_move, winning_potential};

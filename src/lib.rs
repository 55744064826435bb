pub mod ai;
pub mod game;
pub mod utils;

use std::cell::RefCell;
use std::rc::Rc;
use std::str::FromStr;

use gloo_timers::future::TimeoutFuture;
use serde_wasm_bindgen::{from_value, to_value};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;
use web_sys::js_sys::Promise;

pub use ai::{
    choose_bot_move, select_move, BotAgent, BotConfig, BotDecision, DecisionReason, Difficulty,
    Minimax, MoveCandidate, PlayStyle, PlayerProfile, Selection, SelectionBranch,
};
pub use game::{
    apply_move, evaluate_outcome, Board, GameMode, GameOutcome, GameSnapshot, GameState,
    MoveRecord, MoveRejected, MoveResult, Player, Scores, TurnPhase, TurnResolution, WinPattern,
    WIN_PATTERNS,
};

#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn start() {
    utils::set_panic_hook();
}

fn to_js_error(error: MoveRejected) -> JsValue {
    to_value(&error).unwrap_or_else(|serialize_err| JsValue::from_str(&serialize_err.to_string()))
}

fn serde_to_js_error<E: std::fmt::Display>(error: E) -> JsValue {
    JsValue::from_str(&error.to_string())
}

fn parse_difficulty(value: Option<&str>) -> Result<Difficulty, JsValue> {
    match value {
        None => Ok(Difficulty::default()),
        Some(value) => Difficulty::from_str(value)
            .map_err(|_| JsValue::from_str(&format!("unknown difficulty: {value}"))),
    }
}

fn parse_mode(value: Option<&str>) -> Result<GameMode, JsValue> {
    match value {
        None => Ok(GameMode::default()),
        Some(value) => GameMode::from_str(value)
            .map_err(|_| JsValue::from_str(&format!("unknown game mode: {value}"))),
    }
}

fn resolution_json(resolution: &TurnResolution) -> Result<String, JsValue> {
    serde_json::to_string(resolution).map_err(serde_to_js_error)
}

/// 一个浏览器会话中的对局。模式在构造时确定，整个会话内不变。
#[wasm_bindgen]
pub struct TicTacToe {
    state: Rc<RefCell<GameState>>,
}

#[wasm_bindgen]
impl TicTacToe {
    #[wasm_bindgen(constructor)]
    pub fn new(mode: Option<String>, difficulty: Option<String>) -> Result<TicTacToe, JsValue> {
        let mode = parse_mode(mode.as_deref())?;
        let difficulty = parse_difficulty(difficulty.as_deref())?;
        let bot = BotAgent::new(BotConfig::from_difficulty(difficulty));
        Ok(TicTacToe {
            state: Rc::new(RefCell::new(GameState::new(mode, bot))),
        })
    }

    pub fn state_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.state.borrow().snapshot()).map_err(serde_to_js_error)
    }

    pub fn profile_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(self.state.borrow().profile()).map_err(serde_to_js_error)
    }

    /// 人类点击格子。非法点击返回带 `type` 字段的错误对象，状态保持不变。
    pub fn play(&mut self, cell: usize) -> Result<String, JsValue> {
        let resolution = self
            .state
            .borrow_mut()
            .apply_human_move(cell)
            .map_err(to_js_error)?;
        resolution_json(&resolution)
    }

    /// 立即完成机器人的一步，不等待。
    pub fn bot_move(&mut self) -> Result<String, JsValue> {
        let resolution = self
            .state
            .borrow_mut()
            .apply_bot_move()
            .map_err(to_js_error)?;
        resolution_json(&resolution)
    }

    /// 先算好机器人的落子，等待思考延迟后再落下。Promise 解析为落子结果 JSON。
    pub fn think(&self, delay_ms: Option<u32>) -> Promise {
        let shared = Rc::clone(&self.state);
        let begun = {
            let mut state = shared.borrow_mut();
            let delay = delay_ms.unwrap_or(state.bot().config().thinking_delay_ms);
            let round = state.round();
            state.begin_bot_turn().map(|_| (round, delay))
        };

        future_to_promise(async move {
            let (round, delay) = begun.map_err(to_js_error)?;
            if delay > 0 {
                TimeoutFuture::new(delay).await;
            }
            let resolution = shared
                .borrow_mut()
                .complete_bot_turn(round)
                .map_err(to_js_error)?;
            Ok(JsValue::from_str(&resolution_json(&resolution)?))
        })
    }

    pub fn set_difficulty(&mut self, difficulty: &str) -> Result<(), JsValue> {
        let difficulty = parse_difficulty(Some(difficulty))?;
        self.state.borrow_mut().set_difficulty(difficulty);
        Ok(())
    }

    pub fn reset_game(&mut self) {
        self.state.borrow_mut().reset_game();
    }

    pub fn reset_scores(&mut self) {
        self.state.borrow_mut().reset_scores();
    }

    pub fn is_thinking(&self) -> bool {
        self.state.borrow().is_thinking()
    }
}

#[wasm_bindgen(js_name = "evaluateOutcome")]
pub fn evaluate_outcome_js(board: JsValue) -> Result<JsValue, JsValue> {
    let board: Board = from_value(board).map_err(JsValue::from)?;
    to_value(&evaluate_outcome(&board)).map_err(JsValue::from)
}

/// 纯函数版本：返回 `{ board, outcome }`，不修改传入的棋盘。
#[wasm_bindgen(js_name = "applyHumanMove")]
pub fn apply_human_move_js(board: JsValue, cell: usize, player: &str) -> Result<JsValue, JsValue> {
    let board: Board = from_value(board).map_err(JsValue::from)?;
    let player = Player::from_str(player)
        .map_err(|_| JsValue::from_str(&format!("unknown player: {player}")))?;
    let result = apply_move(&board, cell, player).map_err(to_js_error)?;
    to_value(&result).map_err(JsValue::from)
}

#[wasm_bindgen(js_name = "chooseBotMove")]
pub fn choose_bot_move_js(board: JsValue, difficulty: Option<String>) -> Result<Option<u32>, JsValue> {
    let board: Board = from_value(board).map_err(JsValue::from)?;
    let difficulty = parse_difficulty(difficulty.as_deref())?;
    Ok(choose_bot_move(&board, difficulty).map(|cell| cell as u32))
}

#[wasm_bindgen(js_name = "rankMoves")]
pub fn rank_moves_js(board: JsValue) -> Result<JsValue, JsValue> {
    let board: Board = from_value(board).map_err(JsValue::from)?;
    let ranked = Minimax::default().rank_moves(&board);
    to_value(&ranked).map_err(JsValue::from)
}

//! Path: native/game_platform/src/game_logic/mod.rs
//! Summary: ゲームロジック層（ティック駆動・AI ステート）

pub mod ai_state;
pub mod physics_step;

mod chase_ai;

pub use ai_state::{update_ai, AiAction, AiController, Behavior, MotionIntent};
pub use chase_ai::ChaseState;
pub use physics_step::physics_step_inner;

//! Path: native/game_platform/src/game_logic/chase_ai.rs
//! Summary: 追跡行動（接地レイキャストによる実行可否判定つき）
//!
//! 水平追跡のみを扱う。ホストとターゲットの真下の地面が同じタイル行に
//! あるときだけ直進し、段差・穴越しでは追跡を保留する。縦移動（ジャンプ
//! での追い上げ）は別の行動バリアントの責務。

use glam::Vec2;

use crate::constants::GROUND_RAY_MAX;
use crate::entity_params::ActorParams;
use crate::physics::raycast::raycast_down;
use crate::physics::rng::SimpleRng;
use crate::world::tile_map::TileMap;

use super::ai_state::{AiAction, BodySnap, MotionIntent};

/// 追跡行動の内部状態
#[derive(Clone, Debug)]
pub struct ChaseState {
    /// この距離（px）を超えたら即座に追跡をやめる（デバウンスなし）
    pub chase_release_distance:  f32,
    /// 方向反転を 1 ティック見送る確率（振動ダンピング）
    pub direction_switch_chance: f32,
    /// 同一地面レベルが見つからず追跡保留中か
    pub searching: bool,
}

impl ChaseState {
    pub fn new(chase_release_distance: f32, direction_switch_chance: f32) -> Self {
        Self {
            chase_release_distance,
            direction_switch_chance,
            searching: false,
        }
    }

    pub fn from_params(p: &ActorParams) -> Self {
        Self::new(p.chase_release_distance, p.direction_switch_chance)
    }
}

/// 1 ティック分の追跡判断。intent / action にのみ書き込む
#[allow(clippy::too_many_arguments)]
pub(crate) fn determine_current_action(
    state: &mut ChaseState,
    host: BodySnap,
    target: BodySnap,
    map: &TileMap,
    rng: &mut SimpleRng,
    walk_dir: &mut i8,
    intent: &mut MotionIntent,
    action: &mut AiAction,
) {
    let delta = target.center - host.center;

    if delta.length() > state.chase_release_distance {
        state.searching = false;
        *action = AiAction::None;
        return;
    }

    if !same_ground_row(host, target, map) {
        // 穴・段差越し。水平直進では届かないので保留
        state.searching = true;
        *action = AiAction::None;
        return;
    }

    state.searching = false;
    run_to_host(state, delta, rng, walk_dir, intent, action);
}

/// 双方の中心から真下にレイを撃ち、同じタイル行の地面に立っているか調べる
fn same_ground_row(host: BodySnap, target: BodySnap, map: &TileMap) -> bool {
    let host_ground = raycast_down(map, host.center, GROUND_RAY_MAX);
    let target_ground = raycast_down(map, target.center, GROUND_RAY_MAX);
    match (host_ground, target_ground) {
        (Some(h), Some(t)) => h.tile_y == t.tile_y,
        _ => false,
    }
}

fn run_to_host(
    state: &ChaseState,
    delta: Vec2,
    rng: &mut SimpleRng,
    walk_dir: &mut i8,
    intent: &mut MotionIntent,
    action: &mut AiAction,
) {
    // X 成分の符号だけで向きを決める。真上・真下（delta.x == 0）は
    // 正規化で NaN を作らず「このティックは歩かない」
    let desired: i8 = if delta.x > 0.0 {
        1
    } else if delta.x < 0.0 {
        -1
    } else {
        0
    };
    if desired == 0 {
        *action = AiAction::None;
        return;
    }

    let resolved = if desired != *walk_dir
        && *walk_dir != 0
        && rng.chance(state.direction_switch_chance)
    {
        // 反転を 1 ティック見送って現在方向を維持（細かい振動の抑制）
        *walk_dir
    } else {
        desired
    };

    *walk_dir = resolved;
    intent.motion_walk(resolved);
    *action = AiAction::RunHost;
}

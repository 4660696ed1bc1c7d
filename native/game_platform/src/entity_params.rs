//! Path: native/game_platform/src/entity_params.rs
//! Summary: アクター種別の ID ベースパラメータテーブル
//!
//! テーブルはレベルローダ等の外部から注入する。
//! `ActorParamTables::default()` は空テーブルを返し、未登録 ID には
//! フォールバック定数を適用する。

// ─── フォールバック定数 ─────────────────────────────────────────────

/// params テーブルに該当 ID が存在しない場合のデフォルト歩行速度（px/s）
pub const DEFAULT_WALK_SPEED: f32 = 120.0;

/// params テーブルに該当 ID が存在しない場合のデフォルトジャンプ初速（px/s）
pub const DEFAULT_JUMP_SPEED: f32 = 420.0;

/// params テーブルに該当 ID が存在しない場合の追跡解除距離（px）
pub const DEFAULT_CHASE_RELEASE_DISTANCE: f32 = 320.0;

/// params テーブルに該当 ID が存在しない場合の方向転換抑制確率
pub const DEFAULT_DIRECTION_SWITCH_CHANCE: f32 = 0.25;

// ─── ActorParams ─────────────────────────────────────────────────────

/// アクターのパラメータ（kind_id: u8 で参照）
#[derive(Clone, Debug)]
pub struct ActorParams {
    pub walk_speed:              f32,
    pub jump_speed:              f32,
    /// 追跡をあきらめるホスト↔ターゲット距離
    pub chase_release_distance:  f32,
    /// 方向反転を 1 ティック見送る確率（振動ダンピング）
    pub direction_switch_chance: f32,
}

impl Default for ActorParams {
    fn default() -> Self {
        Self {
            walk_speed:              DEFAULT_WALK_SPEED,
            jump_speed:              DEFAULT_JUMP_SPEED,
            chase_release_distance:  DEFAULT_CHASE_RELEASE_DISTANCE,
            direction_switch_chance: DEFAULT_DIRECTION_SWITCH_CHANCE,
        }
    }
}

// ─── ActorParamTables ────────────────────────────────────────────────

/// 外部注入可能なアクターパラメータテーブル
#[derive(Clone, Debug, Default)]
pub struct ActorParamTables {
    pub actors: Vec<ActorParams>,
}

impl ActorParamTables {
    pub fn get_actor(&self, id: u8) -> Option<&ActorParams> {
        self.actors.get(id as usize)
    }

    /// 未登録 ID にはデフォルト値を返す
    pub fn actor_or_default(&self, id: u8) -> ActorParams {
        self.get_actor(id).cloned().unwrap_or_default()
    }
}

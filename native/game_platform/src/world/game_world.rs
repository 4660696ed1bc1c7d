//! Path: native/game_platform/src/world/game_world.rs
//! Summary: ティック駆動シミュレーション全体の集約ルート

use crate::constants::SPATIAL_CELL_SIZE;
use crate::entity_params::ActorParamTables;
use crate::game_logic::ai_state::AiController;
use crate::physics::spatial_hash::SpatialHash;

use super::body::BodyWorld;
use super::tile_map::TileMap;

/// シミュレーション状態の集約ルート。
/// `physics_step_inner` が毎ティックこれを進める
pub struct GameWorld {
    /// 単調増加するティック番号
    pub frame_id: u32,
    pub bodies:   BodyWorld,
    pub map:      TileMap,
    pub ai:       Vec<AiController>,
    pub params:   ActorParamTables,
    /// ブロードフェーズ。毎ティック再構築される
    pub(crate) collision: SpatialHash,
    /// 近傍クエリの使い回しバッファ（ティック毎の再確保を避ける）
    pub(crate) spatial_query_buf: Vec<usize>,
    /// 直近ティックの実測所要時間（ms）
    pub last_frame_time_ms: f64,
    /// シミュレーション開始からの累積秒
    pub elapsed_seconds: f32,
}

impl GameWorld {
    pub fn new(map: TileMap) -> Self {
        Self {
            frame_id: 0,
            bodies: BodyWorld::new(),
            map,
            ai: Vec::new(),
            params: ActorParamTables::default(),
            collision: SpatialHash::new(SPATIAL_CELL_SIZE),
            spatial_query_buf: Vec::new(),
            last_frame_time_ms: 0.0,
            elapsed_seconds: 0.0,
        }
    }
}

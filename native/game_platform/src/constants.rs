//! Path: native/game_platform/src/constants.rs
//! Summary: 物理・AI のチューニング定数

/// 重力加速度（px/s²、y 軸下向きが正）
pub const GRAVITY_Y: f32 = 1800.0;

/// 落下速度の上限（px/s）。タイルすり抜けを防ぐため速度を頭打ちにする
pub const MAX_FALL_SPEED: f32 = 1200.0;

/// 1 フレームの処理時間バジェット（ミリ秒）。超過時に [PERF] 警告を出す
pub const FRAME_BUDGET_MS: f64 = 8.0;

/// Spatial Hash のセルサイズ（px）。平均的なボディサイズの 2 倍程度
pub const SPATIAL_CELL_SIZE: f32 = 64.0;

/// 下方向レイキャストの最大距離（px）。AI の接地判定に使用
pub const GROUND_RAY_MAX: f32 = 512.0;

/// セミソリッド判定の許容誤差（px）。
/// 前フレームの下端がタイル上端と「一致」とみなす幅
pub const SEMI_SOLID_EDGE_TOLERANCE: f32 = 0.01;

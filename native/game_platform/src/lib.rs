//! game_platform: 2D タイルプラットフォーマーのランタイムコア
//! （ヘッドレス動作可能 — レンダラ・オーディオ等の外部依存なし）
//!
//! 毎ティックの処理順は固定: モーション意図の適用 → 積分 → 衝突解決 →
//! イベント配信 → AI 判断。詳細は game_logic::physics_step を参照。

pub mod constants;
pub mod entity_params;
pub mod event;
pub mod physics;

pub mod game_logic;
pub mod world;

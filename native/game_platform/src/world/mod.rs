//! Path: native/game_platform/src/world/mod.rs
//! Summary: ワールド状態（ボディレジストリ・タイルマップ・集約ルート）

pub mod body;
pub mod game_world;
pub mod tile_map;

pub use body::{Body, BodyEvents, BodyId, BodyTag, BodyWorld, TagValue};
pub use game_world::GameWorld;
pub use tile_map::{TileKind, TileMap};

//! Path: native/game_platform/src/physics/mod.rs
//! Summary: 物理サブシステム（ブロードフェーズ・レイキャスト・衝突解決・乱数）

pub mod raycast;
pub mod rng;
pub mod spatial_hash;

pub(crate) mod resolver;

pub use raycast::{raycast_down, GroundHit};
pub use rng::SimpleRng;
pub use spatial_hash::SpatialHash;

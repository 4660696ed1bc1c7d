//! Path: native/game_platform/src/physics/raycast.rs
//! Summary: 下方向タイルレイキャスト（接地センシング）

use glam::Vec2;

use crate::world::tile_map::TileMap;

/// 下方向レイキャストのヒット結果
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GroundHit {
    pub tile_x: usize,
    pub tile_y: usize,
}

impl GroundHit {
    /// ヒットしたタイル上端のワールド Y 座標
    pub fn top_y(&self, map: &TileMap) -> f32 {
        self.tile_y as f32 * map.tile_size()
    }
}

/// `origin` から真下へ最大 `max_dist` px 走査し、最初の Solid / SemiSolid
/// タイルを返す。
///
/// グリッドの X 範囲外・非有限座標は None（退化ジオメトリは衝突しない扱い）。
/// origin がグリッドより上にある場合は 0 行目から走査を始める。
pub fn raycast_down(map: &TileMap, origin: Vec2, max_dist: f32) -> Option<GroundHit> {
    if !origin.x.is_finite() || !origin.y.is_finite() || !max_dist.is_finite() {
        return None;
    }
    if origin.x < 0.0 {
        return None;
    }
    let tile_x = (origin.x / map.tile_size()) as usize;
    if tile_x >= map.width() {
        return None;
    }

    let start_y = origin.y.max(0.0);
    let end_y = origin.y + max_dist;
    let row0 = (start_y / map.tile_size()) as usize;
    let row1 = ((end_y / map.tile_size()) as usize).min(map.height().saturating_sub(1));
    if map.height() == 0 || row0 > row1 {
        return None;
    }

    (row0..=row1)
        .find(|&y| map.get(tile_x, y).is_ground())
        .map(|y| GroundHit {
            tile_x,
            tile_y: y,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map() -> TileMap {
        // y=3 行目が床、x=2 だけ y=1 にセミソリッド足場
        TileMap::from_rows(&["....", "..-.", "....", "####"], 16.0)
    }

    #[test]
    fn finds_nearest_solid_below() {
        let hit = raycast_down(&map(), Vec2::new(8.0, 0.0), 512.0).expect("床が見つかるべき");
        assert_eq!((hit.tile_x, hit.tile_y), (0, 3));
        assert!((hit.top_y(&map()) - 48.0).abs() < f32::EPSILON);
    }

    #[test]
    fn semi_solid_counts_as_ground() {
        let hit = raycast_down(&map(), Vec2::new(40.0, 0.0), 512.0).expect("足場が見つかるべき");
        assert_eq!((hit.tile_x, hit.tile_y), (2, 1), "最初のセミソリッドで止まるべき");
    }

    #[test]
    fn ray_starts_from_origin_row() {
        // 足場（y=1）より下から撃つと床（y=3）に当たる
        let hit = raycast_down(&map(), Vec2::new(40.0, 34.0), 512.0).expect("床が見つかるべき");
        assert_eq!(hit.tile_y, 3);
    }

    #[test]
    fn respects_max_distance() {
        // 床は y=48 から。最大 10px では届かない
        assert_eq!(raycast_down(&map(), Vec2::new(8.0, 0.0), 10.0), None);
    }

    #[test]
    fn out_of_grid_or_nan_returns_none() {
        assert_eq!(raycast_down(&map(), Vec2::new(-1.0, 0.0), 512.0), None);
        assert_eq!(raycast_down(&map(), Vec2::new(1000.0, 0.0), 512.0), None);
        assert_eq!(raycast_down(&map(), Vec2::new(f32::NAN, 0.0), 512.0), None);
    }

    #[test]
    fn empty_column_returns_none() {
        let open = TileMap::from_rows(&["....", "...."], 16.0);
        assert_eq!(raycast_down(&open, Vec2::new(8.0, 0.0), 512.0), None);
    }
}

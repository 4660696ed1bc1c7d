//! Path: native/game_platform/src/world/tile_map.rs
//! Summary: フラットなタイルグリッド（ソリッド属性のみ）とワールド境界

use glam::Vec2;

/// タイルのソリッド属性。タイルの中身（絵柄・ファクトリ）はコア外の責務
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum TileKind {
    #[default]
    Empty,
    /// 全方向からブロックする
    Solid,
    /// 上からのみブロックする（一方通行足場）
    SemiSolid,
}

impl TileKind {
    /// 接地判定・レイキャストの対象になるか
    pub fn is_ground(self) -> bool {
        matches!(self, TileKind::Solid | TileKind::SemiSolid)
    }
}

/// フラット配列のタイルグリッド。
///
/// 範囲外アクセスは Empty を返す（エラーにしない）。
/// ワールド境界（px 単位）は `bounds_constrained` なボディのクランプに使う。
pub struct TileMap {
    width:     usize,
    height:    usize,
    tile_size: f32,
    tiles:     Vec<TileKind>,
}

impl TileMap {
    pub fn new(width: usize, height: usize, tile_size: f32) -> Self {
        Self {
            width,
            height,
            tile_size,
            tiles: vec![TileKind::Empty; width * height],
        }
    }

    /// 文字列からの流し込み（テスト・レベル組み込み用）。
    /// `#` = Solid, `-` = SemiSolid, その他 = Empty。行長は先頭行に合わせる
    pub fn from_rows(rows: &[&str], tile_size: f32) -> Self {
        let width = rows.first().map_or(0, |r| r.chars().count());
        let mut map = Self::new(width, rows.len(), tile_size);
        for (y, row) in rows.iter().enumerate() {
            for (x, ch) in row.chars().enumerate() {
                let kind = match ch {
                    '#' => TileKind::Solid,
                    '-' => TileKind::SemiSolid,
                    _ => TileKind::Empty,
                };
                map.set(x, y, kind);
            }
        }
        map
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn tile_size(&self) -> f32 {
        self.tile_size
    }

    /// ワールド境界（px）。(0, 0) 起点
    pub fn pixel_size(&self) -> Vec2 {
        Vec2::new(
            self.width as f32 * self.tile_size,
            self.height as f32 * self.tile_size,
        )
    }

    pub fn set(&mut self, x: usize, y: usize, kind: TileKind) {
        if x < self.width && y < self.height {
            self.tiles[y * self.width + x] = kind;
        }
    }

    /// 範囲外は Empty を返す
    pub fn get(&self, x: usize, y: usize) -> TileKind {
        if x < self.width && y < self.height {
            self.tiles[y * self.width + x]
        } else {
            TileKind::Empty
        }
    }

    /// ワールド座標が属するタイル座標。グリッド外・非有限座標は None
    pub fn tile_at(&self, p: Vec2) -> Option<(usize, usize)> {
        if !p.x.is_finite() || !p.y.is_finite() || p.x < 0.0 || p.y < 0.0 {
            return None;
        }
        let x = (p.x / self.tile_size) as usize;
        let y = (p.y / self.tile_size) as usize;
        if x < self.width && y < self.height {
            Some((x, y))
        } else {
            None
        }
    }

    /// タイル (x, y) のワールド AABB（min, max）
    pub fn tile_aabb(&self, x: usize, y: usize) -> (Vec2, Vec2) {
        let min = Vec2::new(x as f32 * self.tile_size, y as f32 * self.tile_size);
        (min, min + Vec2::splat(self.tile_size))
    }

    /// AABB と交差し得るタイル座標範囲 (x0..=x1, y0..=y1)。
    /// 退化 AABB（NaN・負サイズ）は空の範囲を返し、呼び出し側は素通りする
    #[allow(clippy::type_complexity)]
    pub fn tile_range(
        &self,
        min: Vec2,
        max: Vec2,
    ) -> Option<(std::ops::RangeInclusive<usize>, std::ops::RangeInclusive<usize>)> {
        if !(min.x <= max.x) || !(min.y <= max.y) {
            return None; // NaN もここで弾かれる
        }
        if max.x <= 0.0 || max.y <= 0.0 {
            return None;
        }
        let x0 = (min.x.max(0.0) / self.tile_size) as usize;
        let y0 = (min.y.max(0.0) / self.tile_size) as usize;
        if x0 >= self.width || y0 >= self.height {
            return None;
        }
        let x1 = ((max.x / self.tile_size) as usize).min(self.width - 1);
        let y1 = ((max.y / self.tile_size) as usize).min(self.height - 1);
        Some((x0..=x1, y0..=y1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_rows_parses_kinds() {
        let map = TileMap::from_rows(&["..#", "--.", "###"], 16.0);
        assert_eq!(map.get(2, 0), TileKind::Solid);
        assert_eq!(map.get(0, 1), TileKind::SemiSolid);
        assert_eq!(map.get(1, 1), TileKind::SemiSolid);
        assert_eq!(map.get(0, 0), TileKind::Empty);
        assert_eq!(map.width(), 3);
        assert_eq!(map.height(), 3);
    }

    #[test]
    fn out_of_range_is_empty() {
        let map = TileMap::new(2, 2, 16.0);
        assert_eq!(map.get(5, 5), TileKind::Empty);
        assert_eq!(map.tile_at(Vec2::new(-1.0, 0.0)), None);
        assert_eq!(map.tile_at(Vec2::new(100.0, 0.0)), None);
    }

    #[test]
    fn tile_range_covers_overlapping_tiles() {
        let map = TileMap::new(4, 4, 16.0);
        let (xs, ys) = map
            .tile_range(Vec2::new(8.0, 8.0), Vec2::new(24.0, 40.0))
            .expect("範囲は存在するべき");
        assert_eq!(xs, 0..=1);
        assert_eq!(ys, 0..=2);
    }

    #[test]
    fn degenerate_aabb_yields_no_range() {
        let map = TileMap::new(4, 4, 16.0);
        // 負サイズ（min > max）
        assert!(map.tile_range(Vec2::new(10.0, 10.0), Vec2::new(5.0, 5.0)).is_none());
        // NaN
        assert!(map
            .tile_range(Vec2::new(f32::NAN, 0.0), Vec2::new(1.0, 1.0))
            .is_none());
        // グリッド外（完全に左上の外）
        assert!(map
            .tile_range(Vec2::new(-30.0, -30.0), Vec2::new(-10.0, -10.0))
            .is_none());
    }

    #[test]
    fn pixel_size_is_grid_times_tile() {
        let map = TileMap::new(10, 5, 16.0);
        assert_eq!(map.pixel_size(), Vec2::new(160.0, 80.0));
    }
}

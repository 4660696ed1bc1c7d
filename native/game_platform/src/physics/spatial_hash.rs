//! Path: native/game_platform/src/physics/spatial_hash.rs
//! Summary: ボディ同士のブロードフェーズ用 Spatial Hash（一様グリッド）

use hashbrown::HashMap;

/// 一様グリッドによる近傍クエリ。
///
/// 毎ティック `clear` → `insert` で再構築し、`query_nearby_into` は呼び出し元の
/// バッファへ書き込む（毎フレームのヒープアロケーションを回避）。
/// 挿入は中心点のみ。AABB の大きさはクエリ半径側で吸収する。
pub struct SpatialHash {
    cell:  f32,
    cells: HashMap<(i32, i32), Vec<usize>>,
}

impl SpatialHash {
    pub fn new(cell: f32) -> Self {
        Self {
            cell:  cell.max(1.0),
            cells: HashMap::new(),
        }
    }

    pub fn clear(&mut self) {
        // セルの Vec を捨てずに再利用する
        for bucket in self.cells.values_mut() {
            bucket.clear();
        }
    }

    fn key(&self, x: f32, y: f32) -> (i32, i32) {
        ((x / self.cell).floor() as i32, (y / self.cell).floor() as i32)
    }

    /// インデックス `i` を座標 (x, y) のセルへ登録する。
    /// 非有限座標（NaN 等）は登録しない — 退化ジオメトリは「衝突しない」扱い
    pub fn insert(&mut self, i: usize, x: f32, y: f32) {
        if !x.is_finite() || !y.is_finite() {
            return;
        }
        self.cells.entry(self.key(x, y)).or_default().push(i);
    }

    /// (x, y) から半径 `radius` 以内のセルに登録された候補を `buf` へ集める。
    /// buf はクリアしてから昇順ソートで返す（ペア処理順の決定性のため）
    pub fn query_nearby_into(&self, x: f32, y: f32, radius: f32, buf: &mut Vec<usize>) {
        buf.clear();
        if !x.is_finite() || !y.is_finite() || !radius.is_finite() {
            return;
        }
        let (x0, y0) = self.key(x - radius, y - radius);
        let (x1, y1) = self.key(x + radius, y + radius);
        for cy in y0..=y1 {
            for cx in x0..=x1 {
                if let Some(bucket) = self.cells.get(&(cx, cy)) {
                    buf.extend_from_slice(bucket);
                }
            }
        }
        buf.sort_unstable();
    }
}

//! Path: native/game_platform/src/physics/rng.rs
//! Summary: 決定論的な軽量乱数（SimpleRng、xorshift64*）

/// シード固定で再現可能な軽量乱数。
///
/// AI の方向転換エントロピー等に使用する。リプレイの再現性を保つため
/// グローバルな乱数源ではなく各コントローラが自前の状態を持つ。
#[derive(Clone, Debug)]
pub struct SimpleRng {
    state: u64,
}

impl SimpleRng {
    /// シードから生成する。xorshift はゼロ状態で停止するため 0 は避ける
    pub fn new(seed: u64) -> Self {
        Self {
            state: if seed == 0 { 0x9E37_79B9_7F4A_7C15 } else { seed },
        }
    }

    /// xorshift64* で次の u64 を返す
    pub fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(0x2545_F491_4F6C_DD1D)
    }

    /// [0, 1) の f32 を返す（上位 24bit を使用）
    pub fn next_f32(&mut self) -> f32 {
        (self.next_u64() >> 40) as f32 / (1u64 << 24) as f32
    }

    /// 確率 `p` で true を返す。p <= 0 なら常に false、p >= 1 なら常に true
    pub fn chance(&mut self, p: f32) -> bool {
        if p <= 0.0 {
            return false;
        }
        if p >= 1.0 {
            return true;
        }
        self.next_f32() < p
    }
}

//! Path: native/game_platform/src/world/body.rs
//! Summary: 物理ボディ（Body）・タグ・ライフサイクルイベントとボディレジストリ（BodyWorld）

use glam::Vec2;
use hashbrown::{HashMap, HashSet};

use crate::event::Event;

/// レジストリ内のボディを指す識別子（スロットインデックス）
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BodyId(pub(crate) u32);

impl BodyId {
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// タグのキー。既知の分類は閉じた enum で持つ（文字列キーの open map にしない）
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BodyTag {
    /// 登攀可能（はしご・ツタ等）
    Climbable,
    /// タイルへの逆参照（タイルをボディとしてミラーする呼び出し元向け）
    TileRef,
    /// 接触ダメージ源
    Hazard,
    /// チェックポイント・トリガー
    Checkpoint,
}

/// タグの値。フラグか、タイル等へのインデックス
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TagValue {
    Flag,
    Index(usize),
}

/// ボディのライフサイクルイベント群。
/// 配信はすべて衝突解決後・AI 判断前に同期で行われる
#[derive(Default)]
pub struct BodyEvents {
    /// 新規に重なったペアごとに一度だけ発火（重なり継続中は発火しない）
    pub collision:       Event<BodyId>,
    /// 重なりが解消されたティックに一度だけ発火
    pub collision_ended: Event<BodyId>,
    /// `bounds_constrained` なボディがワールド境界を出たとき（位置は補正済み）
    pub out_of_bounds:   Event<()>,
    /// 積分ステップごとに一度発火
    pub updated:         Event<()>,
    /// `floored` が false→true に遷移したティックに発火
    pub on_floor:        Event<()>,
}

impl BodyEvents {
    /// 全イベントのリスナーを解除する（エンティティ破棄時）
    pub fn clear_all(&mut self) {
        self.collision.clear();
        self.collision_ended.clear();
        self.out_of_bounds.clear();
        self.updated.clear();
        self.on_floor.clear();
    }
}

/// エンティティ 1 体の物理状態。
///
/// 数値フィールドの検証は行わない — 負サイズや NaN はそのまま受け入れ、
/// 衝突計算側が「重ならない」退化ジオメトリとして吸収する。
pub struct Body {
    pub position:           Vec2,
    pub velocity:           Vec2,
    /// AABB の大きさ。position が左上隅
    pub size:               Vec2,
    pub rotation:           f32,
    pub angular_velocity:   f32,
    /// 毎ティックの乗算ダンピング [0, 1]（0 = 減衰なし、1 = 即停止）
    pub friction:           f32,
    pub angular_friction:   f32,
    /// 0 なら重力の影響を受けない
    pub gravity_scale:      f32,
    /// ワールド境界にクランプするか
    pub bounds_constrained: bool,
    /// 完全に静的（積分も押し出しも受けないが、重なりは報告される）
    pub anchored:           bool,
    pub ignore_gravity:     bool,
    /// 衝突検出に参加するか
    pub has_collisions:     bool,
    /// 所属グループ（0..=31）
    pub collision_group:    u8,
    /// 衝突対象グループのビットマスク。None = 全グループと判定
    pub collides_with:      Option<u32>,
    /// false なら検出のみで押し出さない（トリガーボリューム）
    pub resolve_collisions: bool,
    /// 上からのみブロックする（一方通行足場）
    pub semi_solid:         bool,
    /// 全方向からブロックする
    pub solid:              bool,

    /// 前ティックの位置。セミソリッドの「上から接近」判定に使う
    pub(crate) prev_position: Vec2,
    /// 現在重なっているボディの集合（対称性はリゾルバが保証する）
    pub(crate) colliding:     HashSet<BodyId>,
    /// 今ティックに接地解決があったか。毎ティック再計算される
    pub(crate) floored:       bool,

    pub(crate) tags: HashMap<BodyTag, TagValue>,
    pub events: BodyEvents,
}

impl Default for Body {
    fn default() -> Self {
        Self {
            position:           Vec2::ZERO,
            velocity:           Vec2::ZERO,
            size:               Vec2::splat(16.0),
            rotation:           0.0,
            angular_velocity:   0.0,
            friction:           0.0,
            angular_friction:   0.0,
            gravity_scale:      1.0,
            bounds_constrained: false,
            anchored:           false,
            ignore_gravity:     false,
            has_collisions:     true,
            collision_group:    0,
            collides_with:      None,
            resolve_collisions: true,
            semi_solid:         false,
            solid:              false,
            prev_position:      Vec2::ZERO,
            colliding:          HashSet::new(),
            floored:            false,
            tags:               HashMap::new(),
            events:             BodyEvents::default(),
        }
    }
}

impl Body {
    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn size(&self) -> Vec2 {
        self.size
    }

    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    pub fn center(&self) -> Vec2 {
        self.position + self.size * 0.5
    }

    pub fn is_floored(&self) -> bool {
        self.floored
    }

    pub fn anchor(&mut self) {
        self.anchored = true;
    }

    pub fn unanchor(&mut self) {
        self.anchored = false;
    }

    /// 現在重なっているボディのスナップショット（ID 昇順で決定的）
    pub fn collisions(&self) -> Vec<BodyId> {
        let mut ids: Vec<BodyId> = self.colliding.iter().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// 静止状態へ戻す。リスナーとタグは保持する
    /// （タグは物理状態ではなくアイデンティティの分類であるため）
    pub fn reset_state(&mut self) {
        self.position = Vec2::ZERO;
        self.prev_position = Vec2::ZERO;
        self.velocity = Vec2::ZERO;
        self.rotation = 0.0;
        self.angular_velocity = 0.0;
        self.colliding.clear();
        self.floored = false;
    }

    /// フラグタグを付与する
    pub fn set_tag(&mut self, tag: BodyTag) {
        self.tags.insert(tag, TagValue::Flag);
    }

    /// 値つきタグを付与する
    pub fn set_tag_value(&mut self, tag: BodyTag, value: TagValue) {
        self.tags.insert(tag, value);
    }

    /// タグの値。未設定なら None（エラーにしない）
    pub fn tag(&self, tag: BodyTag) -> Option<TagValue> {
        self.tags.get(&tag).copied()
    }

    pub fn has_tag(&self, tag: BodyTag) -> bool {
        self.tags.contains_key(&tag)
    }

    /// AABB の 4 頂点をワールド座標で返す。
    /// position の隅から時計回り（左上 → 右上 → 右下 → 左下）
    pub fn vertices(&self) -> [Vec2; 4] {
        let p = self.position;
        let s = self.size;
        [
            p,
            Vec2::new(p.x + s.x, p.y),
            p + s,
            Vec2::new(p.x, p.y + s.y),
        ]
    }

    /// AABB（min, max）。負サイズなら min > max となり重なり判定で自然に弾かれる
    pub fn aabb(&self) -> (Vec2, Vec2) {
        (self.position, self.position + self.size)
    }

    /// 自分のマスクが相手グループとの判定を許すか（グループ 0..=31）
    pub fn mask_allows(&self, other_group: u8) -> bool {
        match self.collides_with {
            None => true,
            Some(mask) => 1u32
                .checked_shl(u32::from(other_group))
                .is_some_and(|bit| mask & bit != 0),
        }
    }
}

/// ペアとして衝突判定するか（両方向のマスクが許す場合のみ。
/// 片方向判定だと `colliding` 集合の対称性が崩れる）
pub(crate) fn pair_eligible(a: &Body, b: &Body) -> bool {
    a.has_collisions
        && b.has_collisions
        && a.mask_allows(b.collision_group)
        && b.mask_allows(a.collision_group)
}

// ─── BodyWorld ───────────────────────────────────────────────────────

/// ボディレジストリ。空きスロットをスタックで再利用し、ID（= スロット
/// インデックス）の昇順走査が毎ティックの決定的な処理順になる
#[derive(Default)]
pub struct BodyWorld {
    slots:     Vec<Option<Body>>,
    free_list: Vec<usize>,
    count:     usize,
}

impl BodyWorld {
    pub fn new() -> Self {
        Self::default()
    }

    /// ボディを登録して ID を返す（O(1) でスロット取得）
    pub fn spawn(&mut self, mut body: Body) -> BodyId {
        body.prev_position = body.position;
        self.count += 1;
        if let Some(i) = self.free_list.pop() {
            self.slots[i] = Some(body);
            BodyId(i as u32)
        } else {
            self.slots.push(Some(body));
            BodyId((self.slots.len() - 1) as u32)
        }
    }

    /// ボディを破棄する。リスナーを解除し、他ボディの `colliding` からも
    /// 外す（スロット再利用時に古い重なりが新しいボディへ漏れないように）
    pub fn despawn(&mut self, id: BodyId) {
        let Some(slot) = self.slots.get_mut(id.index()) else {
            return;
        };
        let Some(mut body) = slot.take() else {
            return;
        };
        body.events.clear_all();
        self.count -= 1;
        self.free_list.push(id.index());
        for other in self.slots.iter_mut().flatten() {
            other.colliding.remove(&id);
        }
    }

    pub fn get(&self, id: BodyId) -> Option<&Body> {
        self.slots.get(id.index()).and_then(|s| s.as_ref())
    }

    pub fn get_mut(&mut self, id: BodyId) -> Option<&mut Body> {
        self.slots.get_mut(id.index()).and_then(|s| s.as_mut())
    }

    /// 生存ボディ数
    pub fn count(&self) -> usize {
        self.count
    }

    /// スロット数（free スロット込み）
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// 生存ボディの ID を昇順で返す（リゾルバの決定的処理順）
    pub fn iter_ids(&self) -> impl Iterator<Item = BodyId> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, s)| s.is_some())
            .map(|(i, _)| BodyId(i as u32))
    }
}

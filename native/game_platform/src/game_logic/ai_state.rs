//! Path: native/game_platform/src/game_logic/ai_state.rs
//! Summary: AI ステート機構（AiAction / Behavior / AiController / update_ai）
//!
//! 行動は閉じたタグ付きユニオン（Behavior）で持ち、単一の判断関数で
//! ディスパッチする。AI はワールドを読み取り専用スナップショットで参照し、
//! 書き込みは自分のコントローラ（意図・ラベル）に限る。

use glam::Vec2;
use rayon::prelude::*;

use crate::physics::rng::SimpleRng;
use crate::world::body::{Body, BodyId, BodyWorld};
use crate::world::tile_map::TileMap;

use super::chase_ai::{self, ChaseState};

/// 外部（アニメーション選択・テレメトリ）から参照される「現在のアクション」。
/// None は有効な終端状態（指示なし）
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum AiAction {
    #[default]
    None,
    RunHost,
}

/// 行動バリアント。既知の行動は小さく固定なので enum で網羅性を保証する
pub enum Behavior {
    /// 指示なし。intent は外部ドライバ（プレイヤー入力等）が所有する
    Idle,
    Chase(ChaseState),
}

/// 次ティックの先頭で消費されるモーション意図
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MotionIntent {
    /// Some(-1 | 0 | 1) = 歩行指示。None = 指示なし（速度に触らない）
    pub walk: Option<i8>,
    /// 単発。適用時にクリアされ、接地中のみ効く
    pub jump: bool,
}

impl MotionIntent {
    pub fn motion_walk(&mut self, dir: i8) {
        self.walk = Some(dir.clamp(-1, 1));
    }

    pub fn motion_jump(&mut self) {
        self.jump = true;
    }
}

/// AI 判断に必要なボディ状態の読み取りスナップショット。
/// rayon パスでボディ本体（リスナー保持のため !Sync）を共有しないための写し
#[derive(Clone, Copy, Debug)]
pub(crate) struct BodySnap {
    pub center:  Vec2,
    pub floored: bool,
}

fn snap(b: &Body) -> BodySnap {
    BodySnap {
        center:  b.center(),
        floored: b.is_floored(),
    }
}

/// AI 制御エンティティ 1 体分の状態
pub struct AiController {
    pub host:     BodyId,
    pub target:   Option<BodyId>,
    /// entity_params テーブルの参照キー
    pub kind_id:  u8,
    pub behavior: Behavior,
    pub action:   AiAction,
    /// ステート起動からの経過秒（基底フックが毎ティック加算）
    pub elapsed:  f32,
    /// 現在の歩行方向（-1 / 0 / 1）。方向転換ダンピングの基準
    pub walk_dir: i8,
    pub intent:   MotionIntent,
    pub(crate) rng: SimpleRng,
}

impl AiController {
    pub fn new(host: BodyId, behavior: Behavior, seed: u64) -> Self {
        Self {
            host,
            target: None,
            kind_id: 0,
            behavior,
            action: AiAction::None,
            elapsed: 0.0,
            walk_dir: 0,
            intent: MotionIntent::default(),
            rng: SimpleRng::new(seed),
        }
    }

    pub fn with_target(mut self, target: BodyId) -> Self {
        self.target = Some(target);
        self
    }

    pub fn with_kind(mut self, kind_id: u8) -> Self {
        self.kind_id = kind_id;
        self
    }
}

/// rayon 並列化を適用する最小コントローラ数。
/// これ未満ではスレッドプールのオーバーヘッドが本体処理を上回るため
/// シングルスレッド版へフォールバックする。
/// `cargo bench --bench ai_decide_bench` で調整する。
const RAYON_THRESHOLD: usize = 256;

/// AI 判断パス。毎ティック、衝突解決とイベント配信の後に呼ぶ。
///
/// 各コントローラは (1) 基底フック（経過時間）、(2) ホスト／ターゲットの
/// 取得、(3) どちらか欠けていれば何もしない、(4) 行動バリアントの判断関数、
/// の順で処理される。意図は次ティックの先頭で消費される
pub fn update_ai(controllers: &mut [AiController], bodies: &BodyWorld, map: &TileMap, dt: f32) {
    let snaps: Vec<(Option<BodySnap>, Option<BodySnap>)> = controllers
        .iter()
        .map(|c| {
            (
                bodies.get(c.host).map(snap),
                c.target.and_then(|t| bodies.get(t)).map(snap),
            )
        })
        .collect();

    if controllers.len() < RAYON_THRESHOLD {
        for (c, &(host, target)) in controllers.iter_mut().zip(snaps.iter()) {
            decide_one(c, host, target, map, dt);
        }
        return;
    }

    controllers
        .par_iter_mut()
        .zip(snaps.par_iter())
        .for_each(|(c, &(host, target))| decide_one(c, host, target, map, dt));
}

fn decide_one(
    c: &mut AiController,
    host: Option<BodySnap>,
    target: Option<BodySnap>,
    map: &TileMap,
    dt: f32,
) {
    c.elapsed += dt; // 基底フック

    match &mut c.behavior {
        Behavior::Idle => {
            // intent は外部所有。触らない
            c.action = AiAction::None;
        }
        Behavior::Chase(state) => {
            c.intent = MotionIntent::default(); // 追跡は毎ティック意図を出し直す
            let (Some(host), Some(target)) = (host, target) else {
                // ホストかターゲットが欠けていれば何もしない
                c.action = AiAction::None;
                return;
            };
            chase_ai::determine_current_action(
                state,
                host,
                target,
                map,
                &mut c.rng,
                &mut c.walk_dir,
                &mut c.intent,
                &mut c.action,
            );
        }
    }
}

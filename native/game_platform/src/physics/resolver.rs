//! Path: native/game_platform/src/physics/resolver.rs
//! Summary: 毎ティックの衝突解決パス（タイル・ボディ間、接地・境界・出入りイベント）

use glam::Vec2;

use crate::constants::SEMI_SOLID_EDGE_TOLERANCE;
use crate::physics::spatial_hash::SpatialHash;
use crate::world::body::{pair_eligible, Body, BodyId, BodyWorld};
use crate::world::tile_map::{TileKind, TileMap};

/// 解決パス中に確定し、パス終了後にまとめて配信されるイベント。
/// 位置・集合の更新（リゾルバの責務）とリスナー呼び出しを分離する
#[derive(Clone, Copy, Debug)]
pub(crate) enum PendingEvent {
    Collision { body: BodyId, other: BodyId },
    CollisionEnded { body: BodyId, other: BodyId },
    OnFloor { body: BodyId },
    OutOfBounds { body: BodyId },
}

/// 衝突解決の 1 ティック分を実行する。
///
/// 処理順は固定で再現可能:
///   1. ブロードフェーズ再構築（Spatial Hash、生存ボディの中心点）
///   2. 検出フェーズ — 積分後の位置でペアの重なりを対称に記録
///   3. 解決フェーズ — ボディ ID 昇順に、タイル（行優先の昇順）→ ボディ
///      （相手 ID 昇順）の順で最小貫入軸の押し出しと接地・境界処理
///   4. 差分フェーズ — 前ティックの `colliding` と突き合わせて
///      enter / exit をペアごとに一度だけ確定
///
/// 退化ジオメトリ（NaN・負サイズ）は「重ならない」として吸収され、
/// このパスからパニックや Err が出ることはない。
pub(crate) fn resolve_tick(
    bodies: &mut BodyWorld,
    map: &TileMap,
    hash: &mut SpatialHash,
    query_buf: &mut Vec<usize>,
) -> Vec<PendingEvent> {
    let ids: Vec<BodyId> = bodies.iter_ids().collect();

    // ── 1. ブロードフェーズ再構築 ────────────────────────────────────
    hash.clear();
    let mut max_extent = 0.0_f32;
    for &id in &ids {
        let Some(b) = bodies.get(id) else { continue };
        if !b.has_collisions {
            continue;
        }
        let c = b.center();
        hash.insert(id.index(), c.x, c.y);
        if b.size.x.is_finite() && b.size.y.is_finite() {
            max_extent = max_extent.max(b.size.x.abs().max(b.size.y.abs()));
        }
    }

    // ── 2. 検出フェーズ（ペアは小さい ID 側で一度だけ記録） ──────────
    let mut overlaps: Vec<(BodyId, BodyId)> = Vec::new();
    for &id in &ids {
        let Some(b) = bodies.get(id) else { continue };
        if !b.has_collisions {
            continue;
        }
        let c = b.center();
        // クエリは軸ごとの距離をカバーすればよい（矩形セル範囲のため）
        let radius = 0.5 * b.size.x.abs().max(b.size.y.abs()) + 0.5 * max_extent + 1.0;
        hash.query_nearby_into(c.x, c.y, radius, query_buf);
        for &oi in query_buf.iter() {
            let oid = BodyId(oi as u32);
            if oid <= id {
                continue;
            }
            let Some(o) = bodies.get(oid) else { continue };
            if !pair_eligible(b, o) {
                continue;
            }
            let (amin, amax) = b.aabb();
            let (omin, omax) = o.aabb();
            if aabb_overlaps(amin, amax, omin, omax) {
                overlaps.push((id, oid));
            }
        }
    }

    // ── 3. 解決フェーズ ─────────────────────────────────────────────
    // 各ペアを両方向に展開し (自分, 相手) 昇順で処理する
    let mut directed: Vec<(BodyId, BodyId)> = Vec::with_capacity(overlaps.len() * 2);
    for &(a, b) in &overlaps {
        directed.push((a, b));
        directed.push((b, a));
    }
    directed.sort_unstable();

    let mut floor_events: Vec<PendingEvent> = Vec::new();
    let mut bounds_events: Vec<PendingEvent> = Vec::new();
    let world_px = map.pixel_size();

    for &id in &ids {
        let Some(b) = bodies.get(id) else { continue };
        let was_floored = b.floored;
        let movable = b.has_collisions && b.resolve_collisions && !b.anchored;

        // floored は毎ティックゼロから再計算する（前ティックから持ち越さない）
        if let Some(b) = bodies.get_mut(id) {
            b.floored = false;
        }

        if movable {
            // タイルパス（行優先の昇順 = フラットインデックス昇順）
            if let Some(b) = bodies.get_mut(id) {
                resolve_tiles(b, map);
            }

            // ボディパス（相手 ID 昇順）。相手の形状は読み取りスナップショット
            let start = directed.partition_point(|&(s, _)| s < id);
            let mut i = start;
            while i < directed.len() && directed[i].0 == id {
                let oid = directed[i].1;
                i += 1;
                let Some(o) = bodies.get(oid) else { continue };
                if !(o.solid || o.semi_solid) {
                    continue; // 非ブロッキング相手はメンバーシップのみ
                }
                let (omin, omax) = o.aabb();
                let (o_solid, o_semi) = (o.solid, o.semi_solid);
                if let Some(b) = bodies.get_mut(id) {
                    resolve_against_aabb(b, omin, omax, o_solid, o_semi);
                }
            }
        }

        // 境界クランプ。イベントは通知であり、位置補正後も発火する
        if let Some(b) = bodies.get_mut(id) {
            if b.bounds_constrained && clamp_to_bounds(b, world_px) {
                bounds_events.push(PendingEvent::OutOfBounds { body: id });
            }
            if !was_floored && b.floored {
                floor_events.push(PendingEvent::OnFloor { body: id });
            }
        }
    }

    // ── 4. 差分フェーズ（enter / exit をペアごとに一度だけ） ────────
    let mut pending: Vec<PendingEvent> = Vec::new();

    let mut exits: Vec<(BodyId, BodyId)> = Vec::new();
    for &id in &ids {
        let Some(b) = bodies.get(id) else { continue };
        for other in b.collisions() {
            if other > id && !overlaps.contains(&(id, other)) {
                exits.push((id, other));
            }
        }
    }
    for &(a, b) in &exits {
        if let Some(body) = bodies.get_mut(a) {
            body.colliding.remove(&b);
        }
        if let Some(body) = bodies.get_mut(b) {
            body.colliding.remove(&a);
        }
        pending.push(PendingEvent::CollisionEnded { body: a, other: b });
        pending.push(PendingEvent::CollisionEnded { body: b, other: a });
    }

    for &(a, b) in &overlaps {
        let already = bodies
            .get(a)
            .is_some_and(|body| body.colliding.contains(&b));
        if already {
            continue; // 継続中の重なりは再発火しない
        }
        if let Some(body) = bodies.get_mut(a) {
            body.colliding.insert(b);
        }
        if let Some(body) = bodies.get_mut(b) {
            body.colliding.insert(a);
        }
        pending.push(PendingEvent::Collision { body: a, other: b });
        pending.push(PendingEvent::Collision { body: b, other: a });
    }

    pending.extend(floor_events);
    pending.extend(bounds_events);
    pending
}

/// 確定済みイベントを各ボディのリスナーへ同期配信する
pub(crate) fn dispatch_pending(bodies: &mut BodyWorld, pending: Vec<PendingEvent>) {
    for ev in pending {
        match ev {
            PendingEvent::Collision { body, other } => {
                if let Some(b) = bodies.get_mut(body) {
                    b.events.collision.trigger(&other);
                }
            }
            PendingEvent::CollisionEnded { body, other } => {
                if let Some(b) = bodies.get_mut(body) {
                    b.events.collision_ended.trigger(&other);
                }
            }
            PendingEvent::OnFloor { body } => {
                if let Some(b) = bodies.get_mut(body) {
                    b.events.on_floor.trigger(&());
                }
            }
            PendingEvent::OutOfBounds { body } => {
                if let Some(b) = bodies.get_mut(body) {
                    b.events.out_of_bounds.trigger(&());
                }
            }
        }
    }
}

/// AABB の重なり判定。NaN・負サイズは比較が false になり「重ならない」
fn aabb_overlaps(amin: Vec2, amax: Vec2, bmin: Vec2, bmax: Vec2) -> bool {
    let overlap_x = amax.x.min(bmax.x) - amin.x.max(bmin.x);
    let overlap_y = amax.y.min(bmax.y) - amin.y.max(bmin.y);
    overlap_x > 0.0 && overlap_y > 0.0
}

/// ボディと交差し得るタイルを行優先で走査して押し出す
fn resolve_tiles(b: &mut Body, map: &TileMap) {
    let (min, max) = b.aabb();
    let Some((xs, ys)) = map.tile_range(min, max) else {
        return;
    };
    for y in ys {
        for x in xs.clone() {
            let kind = map.get(x, y);
            if !kind.is_ground() {
                continue;
            }
            let (tmin, tmax) = map.tile_aabb(x, y);
            resolve_against_aabb(b, tmin, tmax, kind == TileKind::Solid, kind == TileKind::SemiSolid);
        }
    }
}

/// 障害物 AABB に対する押し出し。重なりを現在位置で再計算するため、
/// 先行する押し出しで既に離れていれば何もしない
fn resolve_against_aabb(b: &mut Body, o_min: Vec2, o_max: Vec2, solid: bool, semi: bool) {
    let (min, max) = b.aabb();
    let overlap_x = max.x.min(o_max.x) - min.x.max(o_min.x);
    let overlap_y = max.y.min(o_max.y) - min.y.max(o_min.y);
    if !(overlap_x > 0.0) || !(overlap_y > 0.0) {
        return; // NaN もここで吸収される
    }

    if semi && !solid {
        // 一方通行足場: 前ティックの下端が相手上端以上（上から接近）かつ
        // 下向き速度のときだけ解決する。それ以外はこのティックは素通り
        let prev_bottom = b.prev_position.y + b.size.y;
        if !(prev_bottom <= o_min.y + SEMI_SOLID_EDGE_TOLERANCE && b.velocity.y >= 0.0) {
            return;
        }
    }

    // 最小貫入軸で押し出し、その軸の速度成分をゼロにする
    let b_center = (min + max) * 0.5;
    let o_center = (o_min + o_max) * 0.5;
    if overlap_x < overlap_y {
        if b_center.x < o_center.x {
            b.position.x -= overlap_x;
        } else {
            b.position.x += overlap_x;
        }
        b.velocity.x = 0.0;
    } else {
        if b_center.y < o_center.y {
            // 上方向への解決 = 相手の上に乗った → 接地
            b.position.y -= overlap_y;
            b.floored = true;
        } else {
            b.position.y += overlap_y;
        }
        b.velocity.y = 0.0;
    }
}

/// ワールド境界内へクランプする。補正が発生したら true
fn clamp_to_bounds(b: &mut Body, world_px: Vec2) -> bool {
    let (min, max) = b.aabb();
    let mut corrected = false;
    if min.x < 0.0 {
        b.position.x = 0.0;
        corrected = true;
    } else if max.x > world_px.x {
        b.position.x = world_px.x - b.size.x;
        corrected = true;
    }
    if min.y < 0.0 {
        b.position.y = 0.0;
        corrected = true;
    } else if max.y > world_px.y {
        b.position.y = world_px.y - b.size.y;
        corrected = true;
    }
    corrected
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::SPATIAL_CELL_SIZE;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// リゾルバを 1 ティック実行してイベントまで配信する
    fn run_tick(bodies: &mut BodyWorld, map: &TileMap) {
        let mut hash = SpatialHash::new(SPATIAL_CELL_SIZE);
        let mut buf = Vec::new();
        let pending = resolve_tick(bodies, map, &mut hash, &mut buf);
        dispatch_pending(bodies, pending);
    }

    fn floor_map() -> TileMap {
        // 最下段が床
        TileMap::from_rows(&["....", "....", "....", "####"], 16.0)
    }

    #[test]
    fn falling_body_lands_on_solid_tile() {
        let mut bodies = BodyWorld::new();
        let id = bodies.spawn(Body {
            position: Vec2::new(8.0, 40.0), // 下端 56 > 床上端 48
            velocity: Vec2::new(0.0, 100.0),
            ..Body::default()
        });

        run_tick(&mut bodies, &floor_map());

        let b = bodies.get(id).unwrap();
        assert!((b.position.y - 32.0).abs() < 0.001, "床の上へ押し出されるべき: y={}", b.position.y);
        assert_eq!(b.velocity.y, 0.0, "接地解決で垂直速度はゼロになるべき");
        assert!(b.is_floored());
    }

    #[test]
    fn floored_is_recomputed_every_tick() {
        let mut bodies = BodyWorld::new();
        let id = bodies.spawn(Body {
            position: Vec2::new(8.0, 33.0),
            velocity: Vec2::new(0.0, 10.0),
            ..Body::default()
        });
        let map = floor_map();

        run_tick(&mut bodies, &map);
        assert!(bodies.get(id).unwrap().is_floored());

        // 床のない位置へ移動（足場から歩き出た状況）
        let b = bodies.get_mut(id).unwrap();
        b.position = Vec2::new(8.0, 0.0);
        b.prev_position = b.position;
        run_tick(&mut bodies, &map);

        assert!(
            !bodies.get(id).unwrap().is_floored(),
            "支えがなければ前ティックの floored は持ち越されないべき"
        );
    }

    #[test]
    fn on_floor_fires_only_on_transition() {
        let mut bodies = BodyWorld::new();
        let id = bodies.spawn(Body {
            position: Vec2::new(8.0, 40.0),
            velocity: Vec2::new(0.0, 100.0),
            ..Body::default()
        });
        let count = Rc::new(RefCell::new(0));
        {
            let count = Rc::clone(&count);
            bodies
                .get_mut(id)
                .unwrap()
                .events
                .on_floor
                .listen(move |_| *count.borrow_mut() += 1);
        }
        let map = floor_map();

        // 着地ティック + 接地継続 3 ティック（毎ティック重力相当の沈み込みを再現）
        for _ in 0..4 {
            let b = bodies.get_mut(id).unwrap();
            b.prev_position = b.position;
            b.position.y += 2.0;
            b.velocity.y = 2.0;
            run_tick(&mut bodies, &map);
        }

        assert_eq!(*count.borrow(), 1, "on_floor は false→true 遷移の一度だけ発火するべき");
    }

    #[test]
    fn semi_solid_platform_one_way() {
        let map = TileMap::from_rows(&["....", ".--.", "...."], 16.0);

        // 上から落下 → 乗る
        let mut bodies = BodyWorld::new();
        let faller = bodies.spawn(Body {
            position: Vec2::new(20.0, 2.0), // 下端 18 が足場上端 16 を 2px 貫入
            velocity: Vec2::new(0.0, 60.0),
            ..Body::default()
        });
        // 前ティックは足場より上
        bodies.get_mut(faller).unwrap().prev_position = Vec2::new(20.0, -16.0);
        run_tick(&mut bodies, &map);
        let b = bodies.get(faller).unwrap();
        assert!((b.position.y - 0.0).abs() < 0.001, "足場の上で静止するべき: y={}", b.position.y);
        assert_eq!(b.velocity.y, 0.0);
        assert!(b.is_floored(), "セミソリッドに乗ったら floored になるべき");

        // 下から上昇 → すり抜け
        let mut bodies = BodyWorld::new();
        let jumper = bodies.spawn(Body {
            position: Vec2::new(20.0, 20.0), // 足場と重なっている
            velocity: Vec2::new(0.0, -120.0),
            ..Body::default()
        });
        bodies.get_mut(jumper).unwrap().prev_position = Vec2::new(20.0, 40.0);
        run_tick(&mut bodies, &map);
        let b = bodies.get(jumper).unwrap();
        assert!((b.position.y - 20.0).abs() < 0.001, "下からは素通りするべき");
        assert_eq!(b.velocity.y, -120.0, "速度も変更されないべき");
        assert!(!b.is_floored());
    }

    #[test]
    fn collision_events_fire_once_per_pair_and_sets_are_symmetric() {
        let map = TileMap::new(8, 8, 16.0);
        let mut bodies = BodyWorld::new();
        let a = bodies.spawn(Body {
            position: Vec2::new(0.0, 0.0),
            ..Body::default()
        });
        let b = bodies.spawn(Body {
            position: Vec2::new(8.0, 0.0), // a と重なる
            ..Body::default()
        });
        let enters = Rc::new(RefCell::new(0));
        let exits = Rc::new(RefCell::new(0));
        {
            let enters = Rc::clone(&enters);
            bodies
                .get_mut(a)
                .unwrap()
                .events
                .collision
                .listen(move |_| *enters.borrow_mut() += 1);
            let exits = Rc::clone(&exits);
            bodies
                .get_mut(a)
                .unwrap()
                .events
                .collision_ended
                .listen(move |_| *exits.borrow_mut() += 1);
        }

        // 重なったまま 3 ティック
        for _ in 0..3 {
            run_tick(&mut bodies, &map);
            assert!(bodies.get(a).unwrap().collisions().contains(&b));
            assert!(
                bodies.get(b).unwrap().collisions().contains(&a),
                "colliding 集合は対称であるべき"
            );
        }
        assert_eq!(*enters.borrow(), 1, "collision は進入ティックの一度だけ発火するべき");
        assert_eq!(*exits.borrow(), 0);

        // 離す → exit が一度
        bodies.get_mut(b).unwrap().position = Vec2::new(100.0, 0.0);
        run_tick(&mut bodies, &map);
        run_tick(&mut bodies, &map);

        assert_eq!(*exits.borrow(), 1, "collision_ended は解消ティックの一度だけ発火するべき");
        assert!(bodies.get(a).unwrap().collisions().is_empty());
        assert!(bodies.get(b).unwrap().collisions().is_empty());
    }

    #[test]
    fn non_blocking_overlap_records_membership_without_pushout() {
        let map = TileMap::new(8, 8, 16.0);
        let mut bodies = BodyWorld::new();
        // どちらも solid でない = トリガー
        let a = bodies.spawn(Body {
            position: Vec2::new(0.0, 0.0),
            ..Body::default()
        });
        let b = bodies.spawn(Body {
            position: Vec2::new(4.0, 4.0),
            ..Body::default()
        });

        run_tick(&mut bodies, &map);

        assert_eq!(bodies.get(a).unwrap().position, Vec2::new(0.0, 0.0), "押し出しは発生しないべき");
        assert_eq!(bodies.get(b).unwrap().position, Vec2::new(4.0, 4.0));
        assert!(bodies.get(a).unwrap().collisions().contains(&b));
    }

    #[test]
    fn solid_body_pushes_intruder_out_along_min_axis() {
        let map = TileMap::new(16, 16, 16.0);
        let mut bodies = BodyWorld::new();
        let block = bodies.spawn(Body {
            position: Vec2::new(32.0, 32.0),
            size: Vec2::splat(16.0),
            solid: true,
            anchored: true,
            ..Body::default()
        });
        // 左から 2px 食い込む（X 貫入 2 < Y 貫入 16）
        let mover = bodies.spawn(Body {
            position: Vec2::new(18.0, 32.0),
            velocity: Vec2::new(50.0, 7.0),
            ..Body::default()
        });

        run_tick(&mut bodies, &map);

        let m = bodies.get(mover).unwrap();
        assert!((m.position.x - 16.0).abs() < 0.001, "X 軸で押し出されるべき: x={}", m.position.x);
        assert_eq!(m.velocity.x, 0.0, "押し出し軸の速度成分がゼロになるべき");
        assert_eq!(m.velocity.y, 7.0, "もう一方の軸は保持されるべき");
        assert_eq!(
            bodies.get(block).unwrap().position,
            Vec2::new(32.0, 32.0),
            "anchored な相手は動かないべき"
        );
    }

    #[test]
    fn trigger_only_body_is_not_displaced() {
        let map = TileMap::new(16, 16, 16.0);
        let mut bodies = BodyWorld::new();
        let _wall = bodies.spawn(Body {
            position: Vec2::new(32.0, 32.0),
            solid: true,
            anchored: true,
            ..Body::default()
        });
        let sensor = bodies.spawn(Body {
            position: Vec2::new(30.0, 32.0),
            resolve_collisions: false,
            ..Body::default()
        });

        run_tick(&mut bodies, &map);

        assert_eq!(
            bodies.get(sensor).unwrap().position,
            Vec2::new(30.0, 32.0),
            "resolve_collisions=false は検出のみで押し出されないべき"
        );
        assert_eq!(bodies.get(sensor).unwrap().collisions().len(), 1);
    }

    #[test]
    fn mask_filtering_prevents_pair() {
        let map = TileMap::new(8, 8, 16.0);
        let mut bodies = BodyWorld::new();
        let a = bodies.spawn(Body {
            position: Vec2::ZERO,
            collision_group: 1,
            collides_with: Some(1 << 5), // グループ 5 のみ
            ..Body::default()
        });
        let b = bodies.spawn(Body {
            position: Vec2::new(4.0, 0.0),
            collision_group: 2,
            ..Body::default()
        });

        run_tick(&mut bodies, &map);

        assert!(bodies.get(a).unwrap().collisions().is_empty(), "マスク外のペアは記録されないべき");
        assert!(bodies.get(b).unwrap().collisions().is_empty());
    }

    #[test]
    fn out_of_bounds_fires_and_clamps() {
        let map = TileMap::new(4, 4, 16.0); // 64x64 px
        let mut bodies = BodyWorld::new();
        let id = bodies.spawn(Body {
            position: Vec2::new(60.0, -8.0),
            bounds_constrained: true,
            ..Body::default()
        });
        let fired = Rc::new(RefCell::new(0));
        {
            let fired = Rc::clone(&fired);
            bodies
                .get_mut(id)
                .unwrap()
                .events
                .out_of_bounds
                .listen(move |_| *fired.borrow_mut() += 1);
        }

        run_tick(&mut bodies, &map);

        let b = bodies.get(id).unwrap();
        assert_eq!(b.position, Vec2::new(48.0, 0.0), "境界内へクランプされるべき");
        assert_eq!(*fired.borrow(), 1, "補正後でも out_of_bounds は発火するべき");
    }

    #[test]
    fn degenerate_geometry_never_collides() {
        let map = floor_map();
        let mut bodies = BodyWorld::new();
        let nan = bodies.spawn(Body {
            position: Vec2::new(f32::NAN, 8.0),
            ..Body::default()
        });
        let neg = bodies.spawn(Body {
            position: Vec2::new(8.0, 40.0),
            size: Vec2::new(-10.0, -10.0),
            ..Body::default()
        });

        run_tick(&mut bodies, &map); // パニックしないこと

        assert!(bodies.get(nan).unwrap().collisions().is_empty());
        assert!(bodies.get(neg).unwrap().collisions().is_empty());
        assert!(!bodies.get(neg).unwrap().is_floored(), "負サイズは決して衝突しないべき");
    }

    #[test]
    fn resolution_is_deterministic() {
        let build = || {
            let mut bodies = BodyWorld::new();
            for i in 0..6 {
                bodies.spawn(Body {
                    position: Vec2::new(10.0 + i as f32 * 7.0, 30.0 + (i % 2) as f32 * 5.0),
                    velocity: Vec2::new(5.0, 40.0),
                    solid: true,
                    ..Body::default()
                });
            }
            bodies
        };
        let map = floor_map();
        let mut w1 = build();
        let mut w2 = build();

        for _ in 0..5 {
            run_tick(&mut w1, &map);
            run_tick(&mut w2, &map);
        }

        for id in w1.iter_ids().collect::<Vec<_>>() {
            assert_eq!(
                w1.get(id).unwrap().position,
                w2.get(id).unwrap().position,
                "同一入力から同一結果になるべき（決定性）"
            );
        }
    }
}

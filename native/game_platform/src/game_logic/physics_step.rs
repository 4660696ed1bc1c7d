//! Path: native/game_platform/src/game_logic/physics_step.rs
//! Summary: 1 ティックの駆動（意図適用 → 積分 → 衝突解決 → イベント → AI）

use std::time::Instant;

use crate::constants::{FRAME_BUDGET_MS, GRAVITY_Y, MAX_FALL_SPEED};
use crate::physics::resolver::{dispatch_pending, resolve_tick};
use crate::world::body::BodyId;
use crate::world::game_world::GameWorld;

use super::ai_state;

/// 物理ティック本体。`delta_ms` は前ティックからの経過ミリ秒。
///
/// 順序は固定: モーション意図の消費 → 積分 → 衝突解決 →
/// 保留イベント配信 → AI 判断。AI が出した意図は次ティックの先頭で効く
pub fn physics_step_inner(world: &mut GameWorld, delta_ms: f64) {
    log::trace!(
        "physics_step: delta={}ms frame_id={} bodies={}",
        delta_ms,
        world.frame_id,
        world.bodies.count()
    );
    let frame_start = Instant::now();

    world.frame_id = world.frame_id.wrapping_add(1);
    let dt = (delta_ms / 1000.0) as f32;
    world.elapsed_seconds += dt;

    apply_motion_intents(world);
    integrate_bodies(world, dt);

    let pending = resolve_tick(
        &mut world.bodies,
        &world.map,
        &mut world.collision,
        &mut world.spatial_query_buf,
    );
    dispatch_pending(&mut world.bodies, pending);

    ai_state::update_ai(&mut world.ai, &world.bodies, &world.map, dt);

    let frame_time_ms = frame_start.elapsed().as_secs_f64() * 1000.0;
    world.last_frame_time_ms = frame_time_ms;
    if frame_time_ms > FRAME_BUDGET_MS {
        eprintln!(
            "[PERF] Frame budget exceeded: {:.2}ms (bodies: {}, ai: {})",
            frame_time_ms,
            world.bodies.count(),
            world.ai.len()
        );
    }
}

/// 前ティックに AI / 外部ドライバが発行した意図をホストの速度へ反映する。
/// 歩行は水平速度の直接設定、ジャンプは接地中のみの単発
fn apply_motion_intents(world: &mut GameWorld) {
    for c in world.ai.iter_mut() {
        let params = world.params.actor_or_default(c.kind_id);
        let Some(body) = world.bodies.get_mut(c.host) else {
            continue;
        };
        if let Some(dir) = c.intent.walk {
            body.velocity.x = dir as f32 * params.walk_speed;
        }
        if c.intent.jump {
            if body.floored {
                body.velocity.y = -params.jump_speed;
            }
            c.intent.jump = false; // 単発。非接地で空振りしても消費する
        }
    }
}

/// 速度積分。重力 → 落下上限 → 摩擦減衰 → 位置・回転更新。
/// prev_position はセミソリッド判定のためここで確定する
fn integrate_bodies(world: &mut GameWorld, dt: f32) {
    let ids: Vec<BodyId> = world.bodies.iter_ids().collect();
    for id in ids {
        let Some(b) = world.bodies.get_mut(id) else {
            continue;
        };
        b.prev_position = b.position;

        if !b.anchored {
            if !b.ignore_gravity {
                b.velocity.y += GRAVITY_Y * b.gravity_scale * dt;
                b.velocity.y = b.velocity.y.min(MAX_FALL_SPEED);
            }
            // 乗算ダンピング（0 = 減衰なし、1 = 即停止）
            b.velocity *= 1.0 - b.friction.clamp(0.0, 1.0);
            b.position += b.velocity * dt;

            b.rotation += b.angular_velocity * dt;
            b.angular_velocity *= 1.0 - b.angular_friction.clamp(0.0, 1.0);
        }

        b.events.updated.trigger(&());
    }
}

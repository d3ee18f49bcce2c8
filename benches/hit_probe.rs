//! Benchmarks for the melee hit probe and a full swing through the world.
//!
//! Run with: cargo bench --bench hit_probe

use ability_forge::character::{InputAction, InputValue, TriggerEvent};
use ability_forge::combat::{CapsuleBody, CapsuleOverlapProbe, CollisionCategory, PhysicsProbe, ProbeQuery};
use ability_forge::core::{ActorId, GameplayConfig};
use ability_forge::world::World;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::Vec3;

/// Bodies on a grid in front of the attacker
fn bodies(count: u32) -> Vec<CapsuleBody> {
    (0..count)
        .map(|i| CapsuleBody {
            id: ActorId::new(i + 1, 0),
            category: CollisionCategory::Pawn,
            base: Vec3::new(50.0 + (i % 10) as f32 * 40.0, (i / 10) as f32 * 40.0 - 100.0, 0.0),
            radius: 34.0,
            height: 180.0,
        })
        .collect()
}

fn bench_capsule_sweep(c: &mut Criterion) {
    let mut group = c.benchmark_group("capsule_sweep");
    let query = ProbeQuery {
        start: Vec3::new(20.0, 30.0, 110.0),
        end: Vec3::new(200.0, 30.0, 110.0),
        radius: 20.0,
        category: CollisionCategory::Pawn,
        ignore: vec![ActorId::new(0, 0)],
    };

    for count in [1, 10, 50, 200] {
        let bodies = bodies(count);
        group.bench_with_input(BenchmarkId::from_parameter(format!("{}_bodies", count)), &bodies, |b, bodies| {
            b.iter(|| black_box(CapsuleOverlapProbe.sweep(black_box(&query), bodies)));
        });
    }

    group.finish();
}

fn bench_primary_swing(c: &mut Criterion) {
    c.bench_function("primary_swing_1s", |b| {
        b.iter(|| {
            let mut world = World::new(GameplayConfig::default());
            let player = world.spawn_player("Wukong", Vec3::ZERO);
            world.spawn_enemy("Minion", Vec3::new(100.0, 0.0, 0.0));
            let _ = world.handle_input(player, InputAction::PrimaryAttack, TriggerEvent::Started, InputValue::None);
            for _ in 0..60 {
                world.tick(1.0 / 60.0);
            }
            black_box(world.log().len())
        });
    });
}

criterion_group!(benches, bench_capsule_sweep, bench_primary_swing);
criterion_main!(benches);

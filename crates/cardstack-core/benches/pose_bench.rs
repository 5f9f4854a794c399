//! Benchmark: pose recomputation and full swipe resolution.
//!
//! Run with: `cargo bench -p cardstack-core --bench pose_bench`
//!
//! Every commit recomputes the pose of every slot; this keeps an eye on
//! that cost for the stock four-card stack and for deeper stacks.

use cardstack_core::{
    GestureSample, ItemId, MotionParams, PoseMapper, PoseTable, StackController,
};
use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

// ===========================================================================
// Pose mapping
// ===========================================================================

fn bench_pose_mapping(c: &mut Criterion) {
    let mut group = c.benchmark_group("pose_mapping");
    let params = MotionParams::default();

    for len in [2usize, 4, 16, 64] {
        let mapper = PoseMapper::new(PoseTable::Primary, len).unwrap();
        group.bench_with_input(BenchmarkId::new("poses", len), &mapper, |b, mapper| {
            b.iter(|| black_box(mapper.poses(black_box(&params))));
        });
    }

    group.finish();
}

// ===========================================================================
// Controller
// ===========================================================================

fn bench_swipe_commit(c: &mut Criterion) {
    let mut group = c.benchmark_group("controller");
    let mut stack =
        StackController::new((1..=4).map(ItemId), PoseTable::Primary, MotionParams::default())
            .unwrap();

    group.bench_function("swipe_commit", |b| {
        b.iter(|| {
            stack.pointer_down(0);
            stack.pointer_move(GestureSample::new(120.0, 40.0));
            black_box(stack.pointer_up(GestureSample::new(200.0, 60.0)))
        });
    });

    group.bench_function("swipe_snap_back", |b| {
        b.iter(|| {
            stack.pointer_down(0);
            let update = stack.pointer_up(GestureSample::new(10.0, 1.0));
            stack.settle();
            black_box(update)
        });
    });

    group.finish();
}

criterion_group!(benches, bench_pose_mapping, bench_swipe_commit);
criterion_main!(benches);

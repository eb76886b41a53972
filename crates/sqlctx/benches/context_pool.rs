use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use sqlctx::testing::RecordingDriver;
use sqlctx::{Db, Row, params};
use std::time::Duration;

fn db() -> Db<RecordingDriver> {
    Db::new(RecordingDriver::new(), Duration::from_secs(5))
}

fn bench_acquire_release(c: &mut Criterion) {
    let db = db();
    // warm the free-list so the loop measures reuse, not allocation
    drop(db.acquire());

    c.bench_function("context_pool/acquire_release", |b| {
        b.iter(|| black_box(db.acquire()));
    });
}

fn bench_render_select(c: &mut Criterion) {
    let db = db();
    let mut group = c.benchmark_group("context_pool/render_select");

    for n in [1, 5, 20, 100] {
        let values: Vec<i64> = (0..n).collect();
        group.bench_with_input(BenchmarkId::from_parameter(n), &values, |b, values| {
            b.iter(|| {
                let sql = db
                    .acquire()
                    .name("users")
                    .where_("age > ?", params![18])
                    .where_in("id", values.iter().copied())
                    .order("id desc")
                    .limit(20)
                    .select_sql::<Row>();
                black_box(sql)
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_acquire_release, bench_render_select);
criterion_main!(benches);

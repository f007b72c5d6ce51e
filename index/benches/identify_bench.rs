use criterion::{black_box, criterion_group, criterion_main, Criterion};
use fingerhash_index::Context;
use fingerhash_minutiae::Template;

/// Pseudo-random minutiae inside a 200x200 window, so every
/// neighbor fits the default index bounds.
fn random_template(count: usize, seed: u64) -> Template {
    let mut state = seed;
    let mut next = |bound: u64| {
        state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        ((state >> 33) % bound) as u32
    };
    let points: Vec<(u32, u32, u32)> = (0..count).map(|_| (next(200), next(200), next(360))).collect();
    Template::from_points(&points, 20).expect("valid template")
}

fn bench_add_template(c: &mut Criterion) {
    let tpl = random_template(40, 7);

    c.bench_function("fingerhash_add_template_40min_20nbr", |b| {
        b.iter_with_setup(
            || Context::with_config(None).expect("context"),
            |mut ctx| {
                let _ = black_box(ctx.add_template(black_box(&tpl)));
            },
        );
    });
}

fn bench_identify(c: &mut Criterion) {
    let mut ctx = Context::with_config(None).expect("context");
    for seed in 0..100 {
        ctx.add_template(&random_template(40, seed)).expect("enroll");
    }
    let probe = random_template(40, 42);

    c.bench_function("fingerhash_identify_100templates", |b| {
        b.iter(|| {
            let _ = black_box(ctx.identify(black_box(&probe)));
        });
    });

    c.bench_function("fingerhash_identify_best_100templates", |b| {
        b.iter(|| {
            let _ = black_box(ctx.identify_best(black_box(&probe)));
        });
    });
}

criterion_group!(benches, bench_add_template, bench_identify);
criterion_main!(benches);

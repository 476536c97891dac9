use criterion::{black_box, criterion_group, criterion_main, Criterion};
use dashboard_builder::dashboard::{GridPos, LayoutEngine, LayoutItem, TOOLBOX_ITEMS};

fn build_engine(count: usize) -> LayoutEngine {
    let mut engine = LayoutEngine::new();
    for i in 0..count {
        let item = TOOLBOX_ITEMS[i % TOOLBOX_ITEMS.len()];
        engine.place_new_widget(&item, GridPos::new((i % 12) as u32, (i / 12) as u32));
    }
    engine
}

fn shifted_layout(engine: &LayoutEngine) -> Vec<LayoutItem> {
    engine
        .layout()
        .into_iter()
        .rev()
        .map(|mut item| {
            item.y += 1;
            item
        })
        .collect()
}

fn bench_reconcile(c: &mut Criterion) {
    for count in [50usize, 500, 5000] {
        let engine = build_engine(count);
        let layout = shifted_layout(&engine);
        let widgets = engine.widgets().to_vec();
        c.bench_function(&format!("reconcile_{count}"), |b| {
            b.iter(|| {
                let mut engine = LayoutEngine::from_widgets(widgets.clone());
                black_box(engine.reconcile(black_box(&layout)))
            })
        });
    }
}

criterion_group!(benches, bench_reconcile);
criterion_main!(benches);

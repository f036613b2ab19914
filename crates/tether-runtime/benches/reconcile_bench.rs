//! Reconciler and update-cycle benchmarks.
//!
//! Run with: cargo bench -p tether-runtime --bench reconcile_bench

use std::hint::black_box;

use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use serde_json::json;
use tether_dom::parse_fragment;
use tether_runtime::{App, AppOptions, reconcile};

fn list_markup(rows: usize, generation: usize) -> String {
    let mut out = String::from("<div class=\"list\">");
    for row in 0..rows {
        out.push_str(&format!(
            "<div class=\"row\"><span>item {row}</span><p>gen {generation}</p></div>"
        ));
    }
    out.push_str("</div>");
    out
}

fn bench_reconcile(c: &mut Criterion) {
    let mut group = c.benchmark_group("reconcile");

    for rows in [10usize, 100, 500] {
        let old = parse_fragment(&list_markup(rows, 0));
        let new = parse_fragment(&list_markup(rows, 1));
        group.bench_function(format!("changed_texts/{rows}"), |b| {
            b.iter_batched(
                || old.clone(),
                |mut live| {
                    let root = live.root();
                    black_box(reconcile(&mut live, root, &new, new.root()))
                },
                BatchSize::SmallInput,
            );
        });

        let same = parse_fragment(&list_markup(rows, 0));
        group.bench_function(format!("no_changes/{rows}"), |b| {
            b.iter_batched(
                || old.clone(),
                |mut live| {
                    let root = live.root();
                    black_box(reconcile(&mut live, root, &same, same.root()))
                },
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

fn bench_update_cycle(c: &mut Criterion) {
    let mut group = c.benchmark_group("update_cycle");

    let host = parse_fragment(concat!(
        r#"<div id="app">"#,
        "<h1>{{title}}</h1>",
        r##"<input #value="query">"##,
        r##"<p #show="visible">{{status}}</p>"##,
        "<div><span>{{counter}}</span></div>",
        "</div>",
    ));
    let options = AppOptions::new(json!({
        "title": "bench",
        "query": "",
        "visible": true,
        "status": "ok",
        "counter": 0,
    }))
    .el("#app");
    let mut app = match App::mount(host, options) {
        Ok(app) => app,
        Err(err) => panic!("mount failed: {err}"),
    };

    let mut n = 0i64;
    group.bench_function("set_counter", |b| {
        b.iter(|| {
            n += 1;
            app.set("counter", n);
            black_box(app.last_patch())
        });
    });

    group.finish();
}

criterion_group!(benches, bench_reconcile, bench_update_cycle);
criterion_main!(benches);

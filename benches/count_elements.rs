use criterion::{criterion_group, criterion_main, Criterion};
use elemap::count_elements;
use std::fmt::Write as _;
use std::hint::black_box;
use std::io::Write;
use std::time::Duration;

const SYMBOLS: [&str; 6] = ["H", "C", "N", "O", "Fe", "Cu"];

/// Extended XYZ trajectory with `frames` frames of `atoms` atoms each.
fn trajectory_text(frames: usize, atoms: usize) -> String {
    let mut text = String::new();
    for frame in 0..frames {
        let _ = writeln!(text, "{atoms}");
        let _ = writeln!(
            text,
            "Properties=species:S:1:pos:R:3 structure_name=s{} energy=-{frame}.5",
            frame % 50
        );
        for atom in 0..atoms {
            let _ = writeln!(
                text,
                "{} {:.4} {:.4} {:.4}",
                SYMBOLS[(frame + atom) % SYMBOLS.len()],
                atom as f64 * 0.5,
                frame as f64 * 0.25,
                1.0
            );
        }
    }
    text
}

fn criterion_benchmark(c: &mut Criterion) {
    let mut file = tempfile::Builder::new()
        .suffix(".extxyz")
        .tempfile()
        .unwrap();
    file.write_all(trajectory_text(2000, 64).as_bytes()).unwrap();
    let path = file.path().to_path_buf();

    let mut group = c.benchmark_group("counting");
    group.measurement_time(Duration::from_secs(6));
    group.bench_function("count large extxyz", |b| {
        b.iter(|| black_box(count_elements(&path).unwrap()))
    });
    group.bench_function("count pdb models", |b| {
        b.iter(|| {
            black_box(count_elements(std::path::Path::new("./src/tests-data/pdb/models.pdb")).unwrap())
        })
    });
    group.finish();
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);

//! Transpilation benchmarks.
//!
//! Measures parse, generation and the metadata round trip for a small
//! typed program.
//!
//! Run with: cargo bench --bench transpile

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use polyglot_syntax::{reader_for_language, writer_for_language, writers};

const TYPESCRIPT: &str = "\
function area(w: number, h: number): number {
    let result: number = w * h;
    if (result > 100) {
        console.log('big');
    } else {
        console.log(result);
    }
    return result;
}
class Shape {
    name: string = 'square';
    describe(): void {
        console.log(this.name);
    }
}
let total: number = area(3, (1 + 2) * 4);
let pair: [string, number] = ['a', 1];
";

/// Repeat the program so timings are not dominated by setup.
fn program(copies: usize) -> String {
    TYPESCRIPT.repeat(copies)
}

fn bench_read(c: &mut Criterion) {
    let mut group = c.benchmark_group("read");
    let Some(reader) = reader_for_language("typescript") else {
        return;
    };

    for copies in [1, 16] {
        let source = program(copies);
        group.bench_with_input(BenchmarkId::new("typescript", copies), &source, |b, src| {
            b.iter(|| black_box(reader.read(black_box(src))));
        });
    }

    group.finish();
}

fn bench_write(c: &mut Criterion) {
    let mut group = c.benchmark_group("write");
    let Some(module) = reader_for_language("typescript").and_then(|r| r.read(&program(16)).ok())
    else {
        return;
    };

    for writer in writers() {
        group.bench_function(writer.language(), |b| {
            b.iter(|| black_box(writer.write(black_box(&module))));
        });
    }

    group.finish();
}

fn bench_metadata_round_trip(c: &mut Criterion) {
    let mut group = c.benchmark_group("metadata_round_trip");
    let (Some(ts), Some(py), Some(py_writer)) = (
        reader_for_language("typescript"),
        reader_for_language("python"),
        writer_for_language("python"),
    ) else {
        return;
    };
    let Ok(module) = ts.read(&program(16)) else {
        return;
    };

    group.bench_function("inline", |b| {
        b.iter(|| {
            let code = py_writer.write(black_box(&module));
            black_box(py.read(&code))
        });
    });

    group.bench_function("sidecar", |b| {
        b.iter(|| {
            let out = py_writer.write_with_metadata(black_box(&module));
            black_box(py.read_with_metadata(&out.code, out.metadata))
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_read,
    bench_write,
    bench_metadata_round_trip
);
criterion_main!(benches);

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use zcodec::{
    io::{compress_to_vec, decompress_to_vec},
    BackendKind, ByteBuf, CompositeBuf, DirectBuf, HeapBuf, Status, BEST_COMPRESSION, BEST_SPEED,
    DEFAULT_COMPRESSION,
};

fn lorem_ipsum() -> Vec<u8> {
    b"Lorem ipsum dolor sit amet, consectetur adipiscing elit, sed do eiusmod tempor \
      incididunt ut labore et dolore magna aliqua. Ut enim ad minim veniam, quis nostrud \
      exercitation ullamco laboris nisi ut aliquip ex ea commodo consequat. "
        .repeat(256)
}

fn compress(kind: BackendKind, level: i32, input: &mut dyn ByteBuf, output: &mut dyn ByteBuf) {
    let comp = kind.create_compressor(level).unwrap();
    assert_eq!(comp.compress(input, output, true).unwrap(), Status::Finished);
    comp.close().unwrap();
}

fn decompress(kind: BackendKind, input: &mut dyn ByteBuf, output: &mut dyn ByteBuf) {
    let decomp = kind.create_decompressor().unwrap();
    assert_eq!(decomp.decompress(input, output).unwrap(), Status::Finished);
    decomp.close().unwrap();
}

fn stream_benchmark(c: &mut Criterion) {
    let data = lorem_ipsum();
    let mut packed = Vec::new();
    compress_to_vec(&data, &mut packed, DEFAULT_COMPRESSION).unwrap();

    for kind in vec![BackendKind::Software, BackendKind::Native] {
        if !kind.is_available() {
            continue;
        }

        for &(name, level) in &[
            ("BEST_SPEED", BEST_SPEED),
            ("DEFAULT_COMPRESSION", DEFAULT_COMPRESSION),
            ("BEST_COMPRESSION", BEST_COMPRESSION),
        ] {
            c.bench_function(&format!("{:?}::compress HeapBuf ({})", kind, name), |b| {
                b.iter(|| {
                    compress(
                        kind,
                        level,
                        &mut HeapBuf::wrap(black_box(&data).clone()),
                        &mut HeapBuf::new(),
                    )
                })
            });
        }

        c.bench_function(&format!("{:?}::compress DirectBuf", kind), |b| {
            b.iter(|| {
                compress(
                    kind,
                    DEFAULT_COMPRESSION,
                    &mut DirectBuf::from_slice(black_box(&data)),
                    &mut DirectBuf::new(),
                )
            })
        });

        c.bench_function(&format!("{:?}::compress CompositeBuf", kind), |b| {
            b.iter(|| {
                compress(
                    kind,
                    DEFAULT_COMPRESSION,
                    &mut CompositeBuf::from_slice(black_box(&data), 1024),
                    &mut CompositeBuf::new(),
                )
            })
        });

        c.bench_function(&format!("{:?}::decompress HeapBuf", kind), |b| {
            b.iter(|| {
                decompress(
                    kind,
                    &mut HeapBuf::wrap(black_box(&packed).clone()),
                    &mut HeapBuf::new(),
                )
            })
        });

        c.bench_function(&format!("{:?}::decompress CompositeBuf", kind), |b| {
            b.iter(|| {
                decompress(
                    kind,
                    &mut CompositeBuf::from_slice(black_box(&packed), 1024),
                    &mut CompositeBuf::new(),
                )
            })
        });
    }

    c.bench_function("io::decompress_to_vec", |b| {
        b.iter(|| {
            let mut buf = Vec::new();
            decompress_to_vec(black_box(&packed), &mut buf).unwrap();
        })
    });
}

criterion_group!(benches, stream_benchmark);
criterion_main!(benches);

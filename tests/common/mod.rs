#![allow(dead_code)]

use rand::{distributions::Standard, rngs::SmallRng, Rng, SeedableRng};
use zcodec::{BackendKind, ByteBuf, CompositeBuf, DirectBuf, HeapBuf, Status, Stream};

pub type Buf = Box<dyn ByteBuf + Send>;

pub fn random_data(seed: u64, len: usize) -> Vec<u8> {
    let rng = SmallRng::seed_from_u64(seed);
    rng.sample_iter(Standard).take(len).collect()
}

fn generate_data() -> impl Iterator<Item = Vec<u8>> {
    let fixed = vec![
        Vec::new(),
        vec![b'x'],
        b"ABCDEFGH".repeat(128),
        random_data(0, 2048),
    ];
    let sized = (0..14).map(|n| {
        let mut rng = SmallRng::seed_from_u64(n as u64);
        // Narrow alphabets compress; wide ones stay close to incompressible.
        let width = 1u8 << rng.gen_range(1..8);
        (0..16 << n)
            .map(|_| rng.gen_range(0..width))
            .collect::<Vec<u8>>()
    });
    fixed.into_iter().chain(sized)
}

/// Backends usable in this build.
pub fn backend_set() -> impl Iterator<Item = BackendKind> {
    vec![BackendKind::Software, BackendKind::Native]
        .into_iter()
        .filter(|kind| kind.is_available())
}

/// The three storage capabilities: segment only, address only, neither.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BufKind {
    Heap,
    Direct,
    Composite,
}

impl BufKind {
    pub fn all() -> impl Iterator<Item = BufKind> {
        vec![BufKind::Heap, BufKind::Direct, BufKind::Composite].into_iter()
    }

    /// A buffer holding `data`, all of it readable.
    pub fn filled(self, data: &[u8]) -> Buf {
        match self {
            BufKind::Heap => Box::new(HeapBuf::wrap(data.to_vec())),
            BufKind::Direct => Box::new(DirectBuf::from_slice(data)),
            BufKind::Composite => Box::new(CompositeBuf::from_slice(data, 100)),
        }
    }

    pub fn empty(self) -> Buf {
        match self {
            BufKind::Heap => Box::new(HeapBuf::new()),
            BufKind::Direct => Box::new(DirectBuf::new()),
            BufKind::Composite => Box::new(CompositeBuf::new()),
        }
    }

    /// An empty buffer which never grows past `max_capacity`.
    pub fn bounded(self, max_capacity: usize) -> Buf {
        match self {
            BufKind::Heap => Box::new(HeapBuf::with_max_capacity(0, max_capacity)),
            BufKind::Direct => Box::new(DirectBuf::with_max_capacity(0, max_capacity)),
            BufKind::Composite => Box::new(CompositeBuf::with_component_size(4, max_capacity)),
        }
    }
}

pub fn test_set() -> impl Iterator<Item = (Vec<u8>, BackendKind, BufKind, BufKind)> {
    generate_data().flat_map(|data| {
        backend_set().flat_map(move |kind| {
            let data = data.clone();
            BufKind::all().flat_map(move |input| {
                let data = data.clone();
                BufKind::all().map(move |output| (data.clone(), kind, input, output))
            })
        })
    })
}

/// Compresses all of `src` in one call and returns the zlib stream.
pub fn compress(kind: BackendKind, src: &[u8]) -> Vec<u8> {
    let comp = kind.create_compressor(6).unwrap();
    let mut out = HeapBuf::new();
    let status = comp
        .compress(&mut HeapBuf::wrap(src.to_vec()), &mut out, true)
        .unwrap();
    assert_eq!(status, Status::Finished);
    comp.close().unwrap();
    out.into_vec()
}

/// Decompresses `input` until the stream finishes.
pub fn decompress_all(stream: &Stream, input: &mut dyn ByteBuf, output: &mut dyn ByteBuf) {
    let status = stream.decompress(input, output).unwrap();
    assert_eq!(status, Status::Finished);
}

use lzma_rc::{LengthCodec, PosBits, RangeDecoder, RangeEncoder};

fn main() {
    env_logger::init();

    let pb = PosBits::default();
    // Mostly short lengths with an occasional long one, like real LZ77 output.
    let input: Vec<(u32, u32)> = (0..10000u64)
        .map(|i| {
            let l = match i % 11 {
                0 => 16 + (i % 256) as u32,
                1 | 2 => 8 + (i % 8) as u32,
                _ => (i % 8) as u32,
            };
            (l, pb.pos_state(i))
        })
        .collect();

    for _ in 0..1000 {
        let mut codec = LengthCodec::new();
        let mut encoder = RangeEncoder::new(Vec::with_capacity(input.len()));
        for &(l, pos_state) in &input {
            codec.encode(l, pos_state, &mut encoder).unwrap();
        }
        let stream = encoder.finish().unwrap();

        let mut codec = LengthCodec::new();
        let mut decoder = RangeDecoder::new(&stream[..]).unwrap();
        for &(l, pos_state) in &input {
            assert_eq!(codec.decode(pos_state, &mut decoder).unwrap(), l);
        }
    }
}

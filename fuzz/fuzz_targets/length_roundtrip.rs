#![no_main]
use libfuzzer_sys::fuzz_target;
use lzma_rc::{LengthCodec, RangeDecoder, RangeEncoder, MAX_LEN_OFFSET};

fuzz_target!(|data: (Vec<(u16, u8)>, Vec<u8>)| {
    let (pairs, garbage) = data;

    let input: Vec<(u32, u32)> = pairs
        .iter()
        .map(|&(l, ps)| (u32::from(l) % (MAX_LEN_OFFSET + 1), u32::from(ps % 16)))
        .collect();

    let mut codec = LengthCodec::new();
    let mut encoder = RangeEncoder::new(Vec::new());
    for &(l, ps) in &input {
        codec.encode(l, ps, &mut encoder).unwrap();
    }
    let stream = encoder.finish().unwrap();

    let mut codec = LengthCodec::new();
    let mut decoder = RangeDecoder::new(&stream[..]).unwrap();
    for &(l, ps) in &input {
        assert_eq!(codec.decode(ps, &mut decoder).unwrap(), l);
    }
    assert!(decoder.is_finished_ok());

    // Arbitrary bytes may fail to decode but must never panic.
    let mut codec = LengthCodec::new();
    if let Ok(mut decoder) = RangeDecoder::new(&garbage[..]) {
        for i in 0..garbage.len() {
            if codec.decode((i % 16) as u32, &mut decoder).is_err() {
                break;
            }
        }
    }
});

//! Binary range coder.
//!
//! The encoder keeps the interval `[low, low + range)` and narrows it for
//! every bit. Whenever `range` drops below [`TOP_VALUE`] the top byte of `low`
//! is shifted out and `range` is scaled up by 256. Because a later addition to
//! `low` may carry into bytes that were already shifted out, the encoder holds
//! back one byte (`cache`) plus a run of `0xFF` bytes until it knows whether a
//! carry reaches them.
//!
//! The decoder mirrors the encoder: it tracks `code - low` directly and pulls a
//! byte from the source every time it renormalizes.

use std::io::{ErrorKind, Read, Write};

use log::{debug, trace};

use crate::error::{Error, Result};
use crate::prob::Prob;

/// Renormalization threshold.
pub const TOP_VALUE: u32 = 1 << 24;

/// Number of bytes the encoder emits on finish and the decoder reads on start.
const INIT_BYTES: usize = 5;

#[inline(always)]
fn needs_renorm(range: u32) -> bool {
    range < TOP_VALUE
}

/// Range encoder writing to a byte sink.
pub struct RangeEncoder<W: Write> {
    writer: W,
    low: u64,
    range: u32,
    cache: u8,
    // Bytes held back: the cache byte plus any pending 0xFF bytes.
    cache_size: u64,
    written: u64,
}

impl<W: Write> RangeEncoder<W> {
    /// Create a new range encoder on top of `writer`.
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            low: 0,
            range: 0xFFFF_FFFF,
            cache: 0,
            cache_size: 1,
            written: 0,
        }
    }

    /// Encode `bit` using `prob` as the probability of a 0, then adapt `prob`.
    #[inline]
    pub fn encode_bit(&mut self, prob: &mut Prob, bit: u32) -> Result<()> {
        let bound = prob.bound(self.range);
        if bit == 0 {
            self.range = bound;
        } else {
            self.low += u64::from(bound);
            self.range -= bound;
        }
        prob.update(bit);
        self.normalize()
    }

    /// Encode the low `count` bits of `value`, most significant first, each
    /// with a fixed probability of one half.
    pub fn encode_direct_bits(&mut self, value: u32, count: u32) -> Result<()> {
        debug_assert!(count <= 32);
        for i in (0..count).rev() {
            self.range >>= 1;
            if (value >> i) & 1 == 1 {
                self.low += u64::from(self.range);
            }
            self.normalize()?;
        }
        Ok(())
    }

    /// Bytes committed to the sink so far.
    pub fn bytes_written(&self) -> u64 {
        self.written
    }

    /// Bytes committed plus bytes held back waiting for a possible carry.
    pub fn pending_len(&self) -> u64 {
        self.written + self.cache_size
    }

    /// Flush the final state of `low` and return the sink.
    pub fn finish(mut self) -> Result<W> {
        for _ in 0..INIT_BYTES {
            self.shift_low()?;
        }
        self.writer.flush()?;
        debug!("range encoder finished, {} bytes written", self.written);
        Ok(self.writer)
    }

    #[inline(always)]
    fn normalize(&mut self) -> Result<()> {
        while needs_renorm(self.range) {
            self.range <<= 8;
            self.shift_low()?;
        }
        Ok(())
    }

    fn shift_low(&mut self) -> Result<()> {
        // Bit 32 of `low` is a carry into the bytes held back.
        if (self.low as u32) < 0xFF00_0000 || (self.low >> 32) != 0 {
            let carry = (self.low >> 32) as u8;
            let mut byte = self.cache;
            loop {
                self.write_byte(byte.wrapping_add(carry))?;
                byte = 0xFF;
                self.cache_size -= 1;
                if self.cache_size == 0 {
                    break;
                }
            }
            self.cache = (self.low >> 24) as u8;
        }
        self.cache_size += 1;
        self.low = (self.low & 0x00FF_FFFF) << 8;
        Ok(())
    }

    fn write_byte(&mut self, byte: u8) -> Result<()> {
        self.writer.write_all(&[byte])?;
        self.written += 1;
        Ok(())
    }
}

/// Range decoder reading from a byte source.
pub struct RangeDecoder<R: Read> {
    reader: R,
    code: u32,
    range: u32,
}

impl<R: Read> RangeDecoder<R> {
    /// Create a decoder and prime it with the first five bytes of `reader`.
    ///
    /// # Errors
    /// Returns `Error::UnexpectedEof` if the source holds fewer than five
    /// bytes and `Error::Corrupted` if the first byte is not zero.
    pub fn new(reader: R) -> Result<Self> {
        let mut dec = Self {
            reader,
            code: 0,
            range: 0xFFFF_FFFF,
        };
        if dec.read_byte()? != 0 {
            debug!("range decoder rejected stream: non-zero first byte");
            return Err(Error::Corrupted("first byte must be zero"));
        }
        for _ in 1..INIT_BYTES {
            dec.code = (dec.code << 8) | u32::from(dec.read_byte()?);
        }
        trace!("range decoder primed, code = {:#010x}", dec.code);
        Ok(dec)
    }

    /// Decode one bit using `prob` as the probability of a 0, then adapt `prob`.
    #[inline]
    pub fn decode_bit(&mut self, prob: &mut Prob) -> Result<u32> {
        let bound = prob.bound(self.range);
        let bit = if self.code < bound {
            self.range = bound;
            0
        } else {
            self.code -= bound;
            self.range -= bound;
            1
        };
        prob.update(bit);
        self.normalize()?;
        Ok(bit)
    }

    /// Decode `count` bits written by [`RangeEncoder::encode_direct_bits`].
    pub fn decode_direct_bits(&mut self, count: u32) -> Result<u32> {
        debug_assert!(count <= 32);
        let mut value = 0u32;
        for _ in 0..count {
            self.range >>= 1;
            let bit = if self.code >= self.range {
                self.code -= self.range;
                1
            } else {
                0
            };
            value = (value << 1) | bit;
            self.normalize()?;
        }
        Ok(value)
    }

    /// Whether the decoder sits at the end of a correctly terminated stream.
    ///
    /// Only meaningful once every symbol of the stream has been decoded.
    pub fn is_finished_ok(&self) -> bool {
        self.code == 0
    }

    /// Return the underlying byte source.
    pub fn into_inner(self) -> R {
        self.reader
    }

    #[inline(always)]
    fn normalize(&mut self) -> Result<()> {
        while needs_renorm(self.range) {
            self.range <<= 8;
            self.code = (self.code << 8) | u32::from(self.read_byte()?);
        }
        Ok(())
    }

    fn read_byte(&mut self) -> Result<u8> {
        let mut buf = [0u8; 1];
        match self.reader.read_exact(&mut buf) {
            Ok(()) => Ok(buf[0]),
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => Err(Error::UnexpectedEof),
            Err(e) => Err(Error::Io(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn encode_bits(bits: &[u32]) -> Vec<u8> {
        let mut probs = [Prob::new(); 4];
        let mut enc = RangeEncoder::new(Vec::new());
        for (i, &bit) in bits.iter().enumerate() {
            enc.encode_bit(&mut probs[i % 4], bit).unwrap();
        }
        enc.finish().unwrap()
    }

    #[test]
    fn test_empty_stream_is_five_zero_bytes() {
        let out = RangeEncoder::new(Vec::new()).finish().unwrap();
        assert_eq!(out, vec![0; 5]);

        let dec = RangeDecoder::new(&out[..]).unwrap();
        assert!(dec.is_finished_ok());
    }

    #[test]
    fn test_adaptive_bits_roundtrip() {
        let bits: Vec<u32> = (0..2000).map(|i| u32::from(i % 7 == 0)).collect();
        let out = encode_bits(&bits);

        let mut probs = [Prob::new(); 4];
        let mut dec = RangeDecoder::new(&out[..]).unwrap();
        for (i, &bit) in bits.iter().enumerate() {
            assert_eq!(dec.decode_bit(&mut probs[i % 4]).unwrap(), bit);
        }
        assert!(dec.is_finished_ok());
    }

    #[test]
    fn test_skewed_bits_compress() {
        let bits = vec![0u32; 8000];
        let out = encode_bits(&bits);
        assert!(out.len() < 100, "got {} bytes", out.len());
    }

    #[test]
    fn test_direct_bits_roundtrip() {
        let values = [0u32, 1, 0xFFFF_FFFF, 0x1234_5678, 0xDEAD_BEEF, 42];
        let mut enc = RangeEncoder::new(Vec::new());
        for &v in &values {
            enc.encode_direct_bits(v, 32).unwrap();
            enc.encode_direct_bits(v, 5).unwrap();
        }
        let out = enc.finish().unwrap();

        let mut dec = RangeDecoder::new(&out[..]).unwrap();
        for &v in &values {
            assert_eq!(dec.decode_direct_bits(32).unwrap(), v);
            assert_eq!(dec.decode_direct_bits(5).unwrap(), v & 0x1F);
        }
        assert!(dec.is_finished_ok());
    }

    #[test]
    fn test_shift_low_propagates_carry_into_pending_bytes() {
        let mut enc = RangeEncoder::new(Vec::new());
        enc.cache = 0x12;
        enc.cache_size = 1;

        // Top byte 0xFF cannot be emitted yet: two bytes are now held back.
        enc.low = 0xFF34_5678;
        enc.shift_low().unwrap();
        assert_eq!(enc.cache_size, 2);
        assert!(enc.writer.is_empty());

        // A carry turns 0x12 0xFF into 0x13 0x00.
        enc.low = 0x1_0000_0000 | 0x0012_3456;
        enc.shift_low().unwrap();
        assert_eq!(enc.writer, vec![0x13, 0x00]);
        assert_eq!(enc.cache, 0x00);
        assert_eq!(enc.cache_size, 1);
        assert_eq!(enc.pending_len(), 3);
    }

    #[test]
    fn test_shift_low_without_carry_keeps_pending_ff() {
        let mut enc = RangeEncoder::new(Vec::new());
        enc.cache = 0x12;
        enc.low = 0xFFAB_CDEF;
        enc.shift_low().unwrap();
        enc.low = 0x0012_3456;
        enc.shift_low().unwrap();
        assert_eq!(enc.writer, vec![0x12, 0xFF]);
        assert_eq!(enc.bytes_written(), 2);
    }

    #[test]
    fn test_decoder_rejects_nonzero_first_byte() {
        let data = [1u8, 0, 0, 0, 0];
        assert!(matches!(
            RangeDecoder::new(&data[..]),
            Err(Error::Corrupted(_))
        ));
    }

    #[test]
    fn test_decoder_short_header_is_eof() {
        let data = [0u8, 0, 0];
        assert!(matches!(
            RangeDecoder::new(&data[..]),
            Err(Error::UnexpectedEof)
        ));
    }

    #[test]
    fn test_decoder_exhaustion_is_eof() {
        let data = [0u8; 5];
        let mut dec = RangeDecoder::new(&data[..]).unwrap();
        let mut prob = Prob::new();
        let err = (0..64)
            .map(|_| dec.decode_bit(&mut prob))
            .find_map(|r| r.err())
            .expect("decoder must run out of input");
        assert!(matches!(err, Error::UnexpectedEof));
    }

    #[test]
    fn test_sink_error_is_propagated() {
        struct Broken;
        impl Write for Broken {
            fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
                Err(std::io::Error::new(ErrorKind::Other, "sink closed"))
            }
            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }
        let enc = RangeEncoder::new(Broken);
        assert!(matches!(enc.finish(), Err(Error::Io(_))));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn prop_mixed_bits_roundtrip(
            ops in prop::collection::vec((0u32..2, any::<u32>(), 0u32..33), 1..300),
        ) {
            // Each op is either an adaptive bit or a run of direct bits.
            let mut probs = [Prob::new(); 8];
            let mut enc = RangeEncoder::new(Vec::new());
            for (i, &(kind, value, count)) in ops.iter().enumerate() {
                if kind == 0 {
                    enc.encode_bit(&mut probs[i % 8], value & 1).unwrap();
                } else {
                    enc.encode_direct_bits(value, count).unwrap();
                }
            }
            let out = enc.finish().unwrap();

            let mut probs = [Prob::new(); 8];
            let mut dec = RangeDecoder::new(&out[..]).unwrap();
            for (i, &(kind, value, count)) in ops.iter().enumerate() {
                if kind == 0 {
                    prop_assert_eq!(dec.decode_bit(&mut probs[i % 8]).unwrap(), value & 1);
                } else {
                    let mask = if count == 32 { u32::MAX } else { (1u32 << count) - 1 };
                    prop_assert_eq!(dec.decode_direct_bits(count).unwrap(), value & mask);
                }
            }
            prop_assert!(dec.is_finished_ok());
        }
    }
}

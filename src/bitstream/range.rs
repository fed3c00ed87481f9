//! Range encoder boundary
//!
//! The entropy coder is an external collaborator; the core only needs the
//! operations below. Symbol probabilities are expressed as ICDF tables in
//! the RFC 6716 convention (entry `k` = `256 - cumulative(k)`, terminated
//! by 0).

use bytes::{Bytes, BytesMut};

use crate::basic_ops::lin2log;
use crate::tables::icdf_prob_q8;

/// Interface the encoder core drives to produce the bitstream
pub trait RangeEncoder {
    /// Encode `symbol` under the 8-bit ICDF table `icdf`
    fn encode_icdf(&mut self, symbol: usize, icdf: &[u8]);

    /// Encode a single bit with probability `2^-logp` of being 1
    fn encode_bit_logp(&mut self, bit: bool, logp: u32);

    /// Total bits consumed so far, in Q3 (eighth-bit) resolution
    fn tell_bits_q3(&self) -> u32;
}

/// Recording range encoder
///
/// Stores the raw symbol stream one byte per symbol and accounts bits with
/// the same fixed-point log the core uses elsewhere, so two encodes of
/// identical input produce byte-identical output. Hosts that own a real
/// arithmetic coder replay the stream; tests read it back directly.
#[derive(Debug, Default)]
pub struct BufferRangeEncoder {
    symbols: BytesMut,
    bits_q3: u32,
}

impl BufferRangeEncoder {
    /// Create an empty encoder
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of symbols recorded
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// True when nothing has been encoded
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Recorded symbol at `index`
    pub fn symbol(&self, index: usize) -> u8 {
        self.symbols[index]
    }

    /// Freeze and return the recorded payload
    pub fn finish(self) -> Bytes {
        self.symbols.freeze()
    }

    /// Recorded payload as a slice without consuming the encoder
    pub fn as_slice(&self) -> &[u8] {
        &self.symbols
    }

    /// Reset to the empty state
    pub fn reset(&mut self) {
        self.symbols.clear();
        self.bits_q3 = 0;
    }
}

impl RangeEncoder for BufferRangeEncoder {
    fn encode_icdf(&mut self, symbol: usize, icdf: &[u8]) {
        debug_assert!(symbol < icdf.len(), "symbol {} outside ICDF of {}", symbol, icdf.len());
        let p = icdf_prob_q8(icdf, symbol).max(1);
        // Q7 log -> Q3 bits
        self.bits_q3 += (((8 << 7) - lin2log(p)) >> 4) as u32;
        self.symbols.extend_from_slice(&[symbol as u8]);
    }

    fn encode_bit_logp(&mut self, bit: bool, logp: u32) {
        // A bit that is 1 costs logp bits; 0 costs -log2(1 - 2^-logp)
        let p_one_q8 = (256 >> logp).max(1);
        let p = if bit { p_one_q8 } else { 256 - p_one_q8 };
        self.bits_q3 += (((8 << 7) - lin2log(p)) >> 4) as u32;
        self.symbols.extend_from_slice(&[u8::from(bit)]);
    }

    fn tell_bits_q3(&self) -> u32 {
        self.bits_q3
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_symbols_in_order() {
        let mut enc = BufferRangeEncoder::new();
        let icdf = [192u8, 128, 64, 0];
        enc.encode_icdf(2, &icdf);
        enc.encode_icdf(0, &icdf);
        enc.encode_bit_logp(true, 1);
        assert_eq!(enc.len(), 3);
        assert_eq!(enc.symbol(0), 2);
        assert_eq!(enc.symbol(1), 0);
        assert_eq!(enc.symbol(2), 1);
    }

    #[test]
    fn test_bit_accounting_uniform() {
        let mut enc = BufferRangeEncoder::new();
        let icdf = [192u8, 128, 64, 0];
        // Four uniform symbols of 2 bits each
        for s in 0..4 {
            enc.encode_icdf(s, &icdf);
        }
        let bits = enc.tell_bits_q3() as f64 / 8.0;
        assert!((bits - 8.0).abs() < 0.5, "bits = {}", bits);
    }

    #[test]
    fn test_determinism() {
        let run = || {
            let mut enc = BufferRangeEncoder::new();
            let icdf = [224u8, 112, 44, 15, 3, 2, 1, 0];
            for s in [0usize, 3, 1, 7, 2] {
                enc.encode_icdf(s, &icdf);
            }
            enc.finish()
        };
        assert_eq!(run(), run());
    }
}

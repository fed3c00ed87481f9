//! Encoder control surface
//!
//! Idempotent setters for the externally controlled knobs. Bandwidth
//! changes imply a stream discontinuity and reset the encoder state.

use crate::encoder::SilkEncoder;
use crate::error::{Result, SilkError};
use crate::types::{Bandwidth, VadState};

/// Usable bitrate range per bandwidth, bps
fn bitrate_range(bandwidth: Bandwidth) -> (u32, u32) {
    match bandwidth {
        Bandwidth::Narrowband => (5_000, 40_000),
        Bandwidth::Mediumband => (7_000, 55_000),
        Bandwidth::Wideband => (8_000, 80_000),
    }
}

impl SilkEncoder {
    /// Switch the audio bandwidth; resets the stream state when changed
    pub fn set_bandwidth(&mut self, bandwidth: Bandwidth) {
        if self.bandwidth != bandwidth {
            tracing::debug!("Bandwidth change to {:?}, resetting encoder", bandwidth);
            self.bandwidth = bandwidth;
            self.reset();
        }
    }

    /// Set the target bitrate in bits per second
    pub fn set_bitrate(&mut self, bitrate: u32) -> Result<()> {
        let (min, max) = bitrate_range(self.bandwidth);
        if !(min..=max).contains(&bitrate) {
            return Err(SilkError::InvalidBitrate { bitrate, min, max });
        }
        self.bitrate = bitrate;
        tracing::debug!("Bitrate set to {} bps", bitrate);
        Ok(())
    }

    /// Set the encoder complexity, 0 (cheapest) to 10 (best)
    pub fn set_complexity(&mut self, complexity: u8) -> Result<()> {
        if complexity > 10 {
            return Err(SilkError::InvalidComplexity {
                complexity: complexity as i32,
            });
        }
        self.complexity = complexity;
        tracing::debug!("Complexity set to {}", complexity);
        Ok(())
    }

    /// Set the SNR target in Q7 dB
    pub fn set_snr(&mut self, snr_db_q7: i32) {
        self.snr_db_q7 = snr_db_q7.clamp(0, 80 << 7);
    }

    /// Enable or disable variable bitrate
    pub fn set_vbr(&mut self, vbr: bool) {
        self.vbr = vbr;
    }

    /// Enable or disable constant-bitrate shaping
    pub fn set_use_cbr(&mut self, use_cbr: bool) {
        self.use_cbr = use_cbr;
    }

    /// Enable or disable forward error correction (LBRR)
    pub fn set_fec(&mut self, enabled: bool) {
        self.fec_enabled = enabled;
        tracing::debug!("FEC {}", if enabled { "enabled" } else { "disabled" });
    }

    /// Expected packet loss in percent, 0..=100
    pub fn set_packet_loss(&mut self, percent: i32) {
        self.packet_loss_percent = percent.clamp(0, 100);
    }

    /// Supply the per-frame VAD result from the external detector
    pub fn set_vad_state(&mut self, vad: VadState) {
        self.vad = vad;
    }

    /// Cumulative rate-control feedback: bits spent above target, Q3
    pub fn bits_exceeded_q3(&self) -> i64 {
        self.bits_exceeded_q3
    }
}

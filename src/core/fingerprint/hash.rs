// src/core/fingerprint/hash.rs
//
// Fixed-width landmark hash keys: anchor frequency in the high bits,
// anchor-to-target frequency delta in the low bits.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SetlistError};

/// Packed landmark hash
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HashKey(pub u32);

impl HashKey {
    pub fn value(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for HashKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#010x}", self.0)
    }
}

/// Bit layout of a [`HashKey`]
///
/// `key = (anchor << delta_bits) | (delta & delta_mask)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HashLayout {
    pub freq_bits: u32,
    pub delta_bits: u32,
}

impl Default for HashLayout {
    fn default() -> Self {
        Self {
            freq_bits: 12,
            delta_bits: 12,
        }
    }
}

impl HashLayout {
    pub fn validate(&self) -> Result<()> {
        if self.freq_bits == 0 || self.delta_bits == 0 {
            return Err(SetlistError::config("hash", "bit widths must be positive"));
        }
        if self.freq_bits + self.delta_bits > 32 {
            return Err(SetlistError::config(
                "hash",
                format!(
                    "freq_bits ({}) + delta_bits ({}) exceeds 32",
                    self.freq_bits, self.delta_bits
                ),
            ));
        }
        Ok(())
    }

    pub fn delta_mask(&self) -> u32 {
        mask(self.delta_bits)
    }

    pub fn freq_mask(&self) -> u32 {
        mask(self.freq_bits)
    }

    /// Number of distinct anchor values, i.e. the exclusive anchor limit in Hz
    pub fn anchor_capacity(&self) -> u64 {
        1u64 << self.freq_bits
    }

    pub fn delta_capacity(&self) -> u64 {
        1u64 << self.delta_bits
    }

    /// Pack an anchor frequency and a delta, both already rounded to whole Hz
    pub fn encode(&self, anchor_hz: u32, delta_hz: u32) -> HashKey {
        let anchor = anchor_hz & self.freq_mask();
        HashKey((anchor << self.delta_bits) | (delta_hz & self.delta_mask()))
    }

    /// Round and pack floating-point frequencies
    pub fn encode_hz(&self, anchor_hz: f32, delta_hz: f32) -> HashKey {
        self.encode(anchor_hz.round() as u32, delta_hz.round() as u32)
    }

    /// Recover `(anchor, delta)` from a key
    pub fn decode(&self, key: HashKey) -> (u32, u32) {
        let anchor = (key.0 >> self.delta_bits) & self.freq_mask();
        let delta = key.0 & self.delta_mask();
        (anchor, delta)
    }
}

fn mask(bits: u32) -> u32 {
    if bits >= 32 {
        u32::MAX
    } else {
        (1u32 << bits) - 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_layout() {
        let layout = HashLayout::default();
        assert_eq!(layout.delta_mask(), 0xFFF);
        assert_eq!(layout.anchor_capacity(), 4096);
        assert_eq!(layout.encode(440, 220), HashKey((440 << 12) | 220));
    }

    #[test]
    fn test_round_trip_at_limits() {
        let layout = HashLayout::default();
        for &(anchor, delta) in &[(0, 0), (4095, 4095), (100, 31), (4094, 999), (1, 4095)] {
            let key = layout.encode(anchor, delta);
            assert_eq!(layout.decode(key), (anchor, delta));
        }
    }

    #[test]
    fn test_wide_layout_round_trip() {
        let layout = HashLayout { freq_bits: 14, delta_bits: 10 };
        assert!(layout.validate().is_ok());
        let key = layout.encode(9000, 1000);
        assert_eq!(layout.decode(key), (9000, 1000));
    }

    #[test]
    fn test_layout_too_wide() {
        let layout = HashLayout { freq_bits: 20, delta_bits: 16 };
        assert!(layout.validate().is_err());
    }

    #[test]
    fn test_encode_rounds() {
        let layout = HashLayout::default();
        assert_eq!(layout.encode_hz(430.66, 215.33), layout.encode(431, 215));
    }

    #[test]
    fn test_hash_key_is_transparent_in_json() {
        let key = HashKey(1234);
        assert_eq!(serde_json::to_string(&key).unwrap(), "1234");
    }
}

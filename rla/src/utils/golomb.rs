//! Golomb-Rice entropy coding.
//!
//! Codes a non-negative integer as a unary quotient followed by a
//! truncated-binary remainder under a divisor `m`. When `m` is not a power
//! of two the remainder uses the two nearest code lengths instead of a full
//! fixed-width field. Signed values reach the unsigned coder through one of
//! two mappings:
//!
//! - **ZigZag**: `0, -1, 1, -2, 2, … → 0, 1, 2, 3, 4, …`
//! - **Sign-magnitude**: the magnitude's code followed by one sign bit;
//!   zero carries no sign bit.

use std::io;

use crate::utils::bitstream_io::{BitstreamIoReader, BitstreamIoWriter};
use crate::utils::errors::ConfigError;

/// How signed values are mapped onto the unsigned Golomb domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NegativeHandling {
    #[default]
    ZigZag = 0,
    SignMagnitude = 1,
}

impl NegativeHandling {
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::ZigZag),
            1 => Some(Self::SignMagnitude),
            _ => None,
        }
    }

    pub fn code(self) -> u8 {
        self as u8
    }
}

/// Golomb-Rice coder for one channel's code sequence.
///
/// The divisor and its derived truncated-binary constants are fixed at
/// construction; `m = 0` is rejected there, before any I/O happens.
#[derive(Debug, Clone, Copy)]
pub struct GolombRice {
    m: u64,
    bits: u32,
    cutoff: u64,
    neg_handling: NegativeHandling,
}

impl GolombRice {
    pub fn new(m: u32, neg_handling: NegativeHandling) -> Result<Self, ConfigError> {
        if m == 0 {
            return Err(ConfigError::InvalidGolombParameter);
        }

        let bits = 32 - m.leading_zeros();
        let m = u64::from(m);

        Ok(Self {
            m,
            bits,
            cutoff: (1u64 << bits) - m,
            neg_handling,
        })
    }

    pub fn m(&self) -> u32 {
        self.m as u32
    }

    pub fn put_unsigned<W: io::Write>(
        &self,
        writer: &mut BitstreamIoWriter<W>,
        value: u32,
    ) -> io::Result<()> {
        let value = u64::from(value);
        let quotient = value / self.m;
        let remainder = value % self.m;

        for _ in 0..quotient {
            writer.put(true)?;
        }
        writer.put(false)?;

        if remainder < self.cutoff {
            if self.bits > 1 {
                writer.put_n(remainder, self.bits - 1)?;
            }
        } else {
            writer.put_n(remainder + self.cutoff, self.bits)?;
        }

        Ok(())
    }

    pub fn get_unsigned<R: io::Read + io::Seek>(
        &self,
        reader: &mut BitstreamIoReader<R>,
    ) -> io::Result<u32> {
        let mut quotient = 0u64;
        while reader.get()? {
            quotient += 1;
        }

        let mut remainder = if self.bits > 1 {
            reader.get_n::<u64>(self.bits - 1)?
        } else {
            0
        };

        if remainder >= self.cutoff {
            remainder = ((remainder << 1) | u64::from(reader.get()?)) - self.cutoff;
        }

        quotient
            .checked_mul(self.m)
            .and_then(|q| q.checked_add(remainder))
            .filter(|&value| value <= u64::from(u32::MAX))
            .map(|value| value as u32)
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::InvalidData,
                    "Golomb code exceeds the 32-bit value range",
                )
            })
    }

    pub fn put_signed<W: io::Write>(
        &self,
        writer: &mut BitstreamIoWriter<W>,
        value: i32,
    ) -> io::Result<()> {
        match self.neg_handling {
            NegativeHandling::ZigZag => self.put_unsigned(writer, zigzag(value)),
            NegativeHandling::SignMagnitude => {
                self.put_unsigned(writer, value.unsigned_abs())?;
                if value != 0 {
                    writer.put(value < 0)?;
                }
                Ok(())
            }
        }
    }

    pub fn get_signed<R: io::Read + io::Seek>(
        &self,
        reader: &mut BitstreamIoReader<R>,
    ) -> io::Result<i32> {
        match self.neg_handling {
            NegativeHandling::ZigZag => Ok(unzigzag(self.get_unsigned(reader)?)),
            NegativeHandling::SignMagnitude => {
                let magnitude = i64::from(self.get_unsigned(reader)?);
                if magnitude == 0 {
                    return Ok(0);
                }

                let value = if reader.get()? { -magnitude } else { magnitude };

                i32::try_from(value).map_err(|_| {
                    io::Error::new(
                        io::ErrorKind::InvalidData,
                        "sign-magnitude code exceeds the 32-bit value range",
                    )
                })
            }
        }
    }
}

#[inline]
fn zigzag(value: i32) -> u32 {
    (value.wrapping_shl(1) ^ (value >> 31)) as u32
}

#[inline]
fn unzigzag(value: u32) -> i32 {
    ((value >> 1) as i32) ^ -((value & 1) as i32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::bitstream_io::BsIoSliceReader;

    fn signed_round_trip(values: &[i32], m: u32, neg_handling: NegativeHandling) {
        let coder = GolombRice::new(m, neg_handling).unwrap();

        let mut writer = BitstreamIoWriter::new(Vec::new());
        for &value in values {
            coder.put_signed(&mut writer, value).unwrap();
        }
        let bytes = writer.finalize().unwrap();

        let mut reader = BsIoSliceReader::from_slice(&bytes);
        for &value in values {
            assert_eq!(
                coder.get_signed(&mut reader).unwrap(),
                value,
                "value {value} under m = {m}, {neg_handling:?}"
            );
        }
    }

    #[test]
    fn zigzag_mapping_is_the_documented_bijection() {
        assert_eq!(zigzag(0), 0);
        assert_eq!(zigzag(-1), 1);
        assert_eq!(zigzag(1), 2);
        assert_eq!(zigzag(-2), 3);
        assert_eq!(zigzag(2), 4);

        for value in [i32::MIN, -100_000, -1, 0, 1, 100_000, i32::MAX] {
            assert_eq!(unzigzag(zigzag(value)), value);
        }
    }

    #[test]
    fn signed_round_trips_across_divisors() {
        let mut values: Vec<i32> = (-260..=260).collect();
        values.extend_from_slice(&[-100_000, -32_768, 32_767, 100_000]);

        for m in [1, 2, 3, 5, 8, 16] {
            signed_round_trip(&values, m, NegativeHandling::ZigZag);
            signed_round_trip(&values, m, NegativeHandling::SignMagnitude);
        }
    }

    #[test]
    fn unsigned_round_trips_under_odd_divisors() {
        for m in [1u32, 3, 5, 7, 100, 1000] {
            let coder = GolombRice::new(m, NegativeHandling::ZigZag).unwrap();

            let mut writer = BitstreamIoWriter::new(Vec::new());
            for value in 0..200u32 {
                coder.put_unsigned(&mut writer, value).unwrap();
            }
            let bytes = writer.finalize().unwrap();

            let mut reader = BsIoSliceReader::from_slice(&bytes);
            for value in 0..200u32 {
                assert_eq!(coder.get_unsigned(&mut reader).unwrap(), value);
            }
        }
    }

    #[test]
    fn m4_zigzag_sequence_has_the_expected_bits() {
        // m = 4: three-bit divisor, cutoff = 4, so every remainder takes the
        // two-bit short form. [0, -1, 1, -2, 2] maps to [0, 1, 2, 3, 4] and
        // serializes as 000 001 010 011 1000.
        let coder = GolombRice::new(4, NegativeHandling::ZigZag).unwrap();

        let mut writer = BitstreamIoWriter::new(Vec::new());
        for value in [0, -1, 1, -2, 2] {
            coder.put_signed(&mut writer, value).unwrap();
        }
        assert_eq!(writer.bits_written(), 16);

        let bytes = writer.finalize().unwrap();
        assert_eq!(bytes, vec![0b0000_0101, 0b0011_1000]);

        let mut reader = BsIoSliceReader::from_slice(&bytes);
        for value in [0, -1, 1, -2, 2] {
            assert_eq!(coder.get_signed(&mut reader).unwrap(), value);
        }
    }

    #[test]
    fn sign_magnitude_zero_has_no_sign_bit() {
        let coder = GolombRice::new(1, NegativeHandling::SignMagnitude).unwrap();

        let mut writer = BitstreamIoWriter::new(Vec::new());
        coder.put_signed(&mut writer, 0).unwrap();
        // Pure unary zero under m = 1: a single terminator bit, no sign.
        assert_eq!(writer.bits_written(), 1);

        coder.put_signed(&mut writer, -1).unwrap();
        // Magnitude 1 is "10", plus one sign bit.
        assert_eq!(writer.bits_written(), 4);

        let bytes = writer.finalize().unwrap();
        let mut reader = BsIoSliceReader::from_slice(&bytes);
        assert_eq!(coder.get_signed(&mut reader).unwrap(), 0);
        assert_eq!(coder.get_signed(&mut reader).unwrap(), -1);
    }

    #[test]
    fn zero_divisor_is_rejected_at_construction() {
        assert!(GolombRice::new(0, NegativeHandling::ZigZag).is_err());
        assert!(GolombRice::new(1, NegativeHandling::ZigZag).is_ok());
    }
}

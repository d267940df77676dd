//! One block of coded audio.
//!
//! A block covers up to `block_size` frames. Each channel opens with a
//! warmup prefix of raw samples (one per predictor tap, fewer when the
//! block itself is shorter) followed by prediction residuals. In dynamic
//! parameter mode the block leads with one freshly estimated Golomb
//! parameter per channel; in static mode the header parameter is reused and
//! nothing extra is written.
//!
//! ## Block layout
//!
//! - `mid m` (32 bits) and, for stereo, `side m` (32 bits): dynamic mode only
//! - mid warmup codes, then mid residual codes
//! - side warmup codes, then side residual codes (stereo only)
//!
//! The channels are fully independent code sequences; only their order in
//! the stream is fixed.

use std::io;

use anyhow::{Result, bail};
use log::debug;

use crate::structs::header::{ParameterMode, StreamHeader};
use crate::structs::predictor::{self, PredictorOrder};
use crate::structs::stereo;
use crate::utils::bitstream_io::{BitstreamIoReader, BitstreamIoWriter};
use crate::utils::errors::BlockError;
use crate::utils::golomb::GolombRice;

/// Per-channel working samples for one block.
///
/// `side` stays empty for mono streams. Buffers are `i32`: the side signal
/// of a 16-bit stereo pair needs 17 bits.
#[derive(Debug, Default)]
pub struct Block {
    pub mid: Vec<i32>,
    pub side: Vec<i32>,
}

impl Block {
    /// Splits one block of interleaved frames into coding channels,
    /// applying the mid/side transform for stereo input.
    pub fn from_frames(frames: &[i16], channels: u8) -> Self {
        if channels == 1 {
            let mid = frames.iter().map(|&s| i32::from(s)).collect();
            return Block {
                mid,
                side: Vec::new(),
            };
        }

        let mut mid = Vec::with_capacity(frames.len() / 2);
        let mut side = Vec::with_capacity(frames.len() / 2);
        for pair in frames.chunks_exact(2) {
            let (m, s) = stereo::to_mid_side(i32::from(pair[0]), i32::from(pair[1]));
            mid.push(m);
            side.push(s);
        }

        Block { mid, side }
    }

    /// Frames covered by this block.
    pub fn len(&self) -> usize {
        self.mid.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mid.is_empty()
    }

    /// Serializes the block: dynamic parameters first (when enabled), then
    /// the mid channel, then the side channel.
    pub fn write<W: io::Write>(
        &self,
        header: &StreamHeader,
        index: usize,
        writer: &mut BitstreamIoWriter<W>,
    ) -> Result<()> {
        let order = header.predictor_order;
        let mid_residuals = residuals(&self.mid, order);
        let side_residuals = residuals(&self.side, order);

        let (mid_m, side_m) = match header.parameter_mode {
            ParameterMode::Static(m) => (m, m),
            ParameterMode::Dynamic => {
                let mid_m = estimate_parameter(&mid_residuals);
                let side_m = estimate_parameter(&side_residuals);

                writer.put_n(mid_m, 32)?;
                if header.stereo() {
                    writer.put_n(side_m, 32)?;
                }

                (mid_m, side_m)
            }
        };

        if header.stereo() {
            debug!(
                "block {index}: {} frames, mid m = {mid_m}, side m = {side_m}",
                self.len()
            );
        } else {
            debug!("block {index}: {} frames, m = {mid_m}", self.len());
        }

        let neg_handling = header.negative_handling;
        write_channel(
            writer,
            &GolombRice::new(mid_m, neg_handling)?,
            &self.mid,
            &mid_residuals,
        )?;
        if header.stereo() {
            write_channel(
                writer,
                &GolombRice::new(side_m, neg_handling)?,
                &self.side,
                &side_residuals,
            )?;
        }

        Ok(())
    }

    /// Parses one block of `length` frames, reconstructing each channel's
    /// samples from the decoded residuals as it goes.
    pub fn read<R: io::Read + io::Seek>(
        header: &StreamHeader,
        length: usize,
        index: usize,
        reader: &mut BitstreamIoReader<R>,
    ) -> Result<Self> {
        let (mid_m, side_m) = match header.parameter_mode {
            ParameterMode::Static(m) => (m, m),
            ParameterMode::Dynamic => {
                let mid_m = reader.get_n::<u32>(32)?;
                let side_m = if header.stereo() {
                    reader.get_n::<u32>(32)?
                } else {
                    mid_m
                };

                if mid_m == 0 || side_m == 0 {
                    bail!(BlockError::InvalidParameter { block: index });
                }

                (mid_m, side_m)
            }
        };

        let order = header.predictor_order;
        let neg_handling = header.negative_handling;

        let mid = read_channel(reader, &GolombRice::new(mid_m, neg_handling)?, order, length)?;
        let side = if header.stereo() {
            read_channel(reader, &GolombRice::new(side_m, neg_handling)?, order, length)?
        } else {
            Vec::new()
        };

        Ok(Block { mid, side })
    }

    /// Appends this block's frames to `out`, undoing the mid/side transform
    /// for stereo streams. Fails when a reconstructed sample does not fit
    /// 16 bits, which only a corrupt stream can produce.
    pub fn interleave_into(
        &self,
        header: &StreamHeader,
        index: usize,
        out: &mut Vec<i16>,
    ) -> Result<()> {
        if header.stereo() {
            for (&m, &s) in self.mid.iter().zip(&self.side) {
                let (left, right) = stereo::to_left_right(m, s);
                out.push(check_range(left, index)?);
                out.push(check_range(right, index)?);
            }
        } else {
            for &m in &self.mid {
                out.push(check_range(m, index)?);
            }
        }

        Ok(())
    }
}

/// Estimates the Golomb parameter for one channel of residuals.
///
/// Models the residual magnitudes as geometrically distributed: the mean
/// absolute value implies the distribution parameter `alpha`, and the
/// divisor follows as `ceil(-1 / ln alpha)`. The clamp keeps the logarithm
/// away from its poles for silent or extremely loud blocks.
pub(crate) fn estimate_parameter(residuals: &[i32]) -> u32 {
    if residuals.is_empty() {
        return 1;
    }

    let sum: f64 = residuals.iter().map(|&r| f64::from(r.unsigned_abs())).sum();
    let mean = sum / residuals.len() as f64;
    let alpha = (mean / (mean + 1.0)).clamp(0.001, 0.999);

    ((-1.0 / alpha.ln()).ceil() as u32).max(1)
}

/// Residuals for every position at or past the warmup prefix.
fn residuals(samples: &[i32], order: PredictorOrder) -> Vec<i32> {
    let warmup = order.taps().min(samples.len());
    (warmup..samples.len())
        .map(|i| samples[i] - predictor::predict(samples, i, order))
        .collect()
}

fn write_channel<W: io::Write>(
    writer: &mut BitstreamIoWriter<W>,
    coder: &GolombRice,
    samples: &[i32],
    residuals: &[i32],
) -> io::Result<()> {
    let warmup = samples.len() - residuals.len();

    for &sample in &samples[..warmup] {
        coder.put_signed(writer, sample)?;
    }
    for &residual in residuals {
        coder.put_signed(writer, residual)?;
    }

    Ok(())
}

fn read_channel<R: io::Read + io::Seek>(
    reader: &mut BitstreamIoReader<R>,
    coder: &GolombRice,
    order: PredictorOrder,
    length: usize,
) -> io::Result<Vec<i32>> {
    let warmup = order.taps().min(length);
    let mut samples = Vec::with_capacity(length);

    for _ in 0..warmup {
        samples.push(coder.get_signed(reader)?);
    }
    for i in warmup..length {
        let predicted = predictor::predict(&samples, i, order);
        samples.push(predicted + coder.get_signed(reader)?);
    }

    Ok(samples)
}

fn check_range(value: i32, block: usize) -> Result<i16> {
    i16::try_from(value).map_err(|_| BlockError::SampleOutOfRange { block, value }.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structs::predictor::PredictorOrder;
    use crate::utils::bitstream_io::BsIoSliceReader;
    use crate::utils::golomb::NegativeHandling;

    #[test]
    fn silent_residuals_select_the_smallest_parameter() {
        // Zero mean clamps alpha to 0.001, and ceil(-1 / ln 0.001) = 1.
        assert_eq!(estimate_parameter(&[0, 0, 0, 0]), 1);
        assert_eq!(estimate_parameter(&[]), 1);
    }

    #[test]
    fn parameter_grows_with_residual_energy() {
        let quiet = estimate_parameter(&[1, -1, 0, 2]);
        let loud = estimate_parameter(&[900, -750, 1200, -1100]);
        assert!(quiet < loud);
        assert!(loud >= 100);
    }

    #[test]
    fn warmup_shrinks_with_short_blocks() {
        let samples = [5, 9];
        assert_eq!(residuals(&samples, PredictorOrder::Order3).len(), 0);
        assert_eq!(residuals(&samples, PredictorOrder::Order1).len(), 1);
        assert_eq!(residuals(&samples, PredictorOrder::Order0).len(), 2);
    }

    #[test]
    fn block_round_trips_standalone() {
        let header = StreamHeader {
            sample_rate: 48000,
            total_frames: 6,
            block_size: 6,
            channels: 2,
            predictor_order: PredictorOrder::Order2,
            negative_handling: NegativeHandling::ZigZag,
            parameter_mode: ParameterMode::Dynamic,
        };

        let frames: [i16; 12] = [100, 98, 102, 101, 99, 100, -5, -4, 0, 1, 7, 6];
        let block = Block::from_frames(&frames, header.channels);

        let mut writer = BitstreamIoWriter::new(Vec::new());
        block.write(&header, 0, &mut writer).unwrap();
        let bytes = writer.finalize().unwrap();

        let mut reader = BsIoSliceReader::from_slice(&bytes);
        let decoded = Block::read(&header, 6, 0, &mut reader).unwrap();
        assert_eq!(decoded.mid, block.mid);
        assert_eq!(decoded.side, block.side);

        let mut out = Vec::new();
        decoded.interleave_into(&header, 0, &mut out).unwrap();
        assert_eq!(out, frames);
    }

    #[test]
    fn out_of_range_samples_are_a_block_error() {
        let header = StreamHeader {
            sample_rate: 48000,
            total_frames: 1,
            block_size: 1,
            channels: 1,
            predictor_order: PredictorOrder::Order0,
            negative_handling: NegativeHandling::ZigZag,
            parameter_mode: ParameterMode::Dynamic,
        };

        let block = Block {
            mid: vec![40_000],
            side: Vec::new(),
        };

        let mut out = Vec::new();
        let err = block.interleave_into(&header, 3, &mut out).unwrap_err();
        assert!(err.downcast_ref::<BlockError>().is_some());
    }
}

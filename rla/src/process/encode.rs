use std::io;

use anyhow::Result;
use log::debug;

use crate::process::DEFAULT_BLOCK_SIZE;
use crate::structs::block::Block;
use crate::structs::header::{ParameterMode, StreamHeader};
use crate::structs::pcm::PcmBuffer;
use crate::structs::predictor::PredictorOrder;
use crate::utils::bitstream_io::BitstreamIoWriter;
use crate::utils::errors::ConfigError;
use crate::utils::golomb::NegativeHandling;

/// Per-file encoding options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncoderOptions {
    pub block_size: u16,
    pub predictor_order: PredictorOrder,
    pub negative_handling: NegativeHandling,
    pub parameter_mode: ParameterMode,
}

impl Default for EncoderOptions {
    fn default() -> Self {
        Self {
            block_size: DEFAULT_BLOCK_SIZE,
            predictor_order: PredictorOrder::default(),
            negative_handling: NegativeHandling::default(),
            parameter_mode: ParameterMode::default(),
        }
    }
}

/// Sizes reported by a finished encode.
#[derive(Debug, Clone, Copy)]
pub struct EncodeStats {
    pub frames: usize,
    pub blocks: usize,
    pub bytes_written: u64,
}

/// Encodes PCM buffers into complete RLA streams.
#[derive(Debug, Default)]
pub struct Encoder {
    options: EncoderOptions,
}

impl Encoder {
    /// Creates an encoder after validating the options.
    pub fn with_options(options: EncoderOptions) -> Result<Self, ConfigError> {
        if options.block_size == 0 {
            return Err(ConfigError::InvalidBlockSize);
        }

        if let ParameterMode::Static(m) = options.parameter_mode {
            if m == 0 {
                return Err(ConfigError::InvalidGolombParameter);
            }
        }

        Ok(Self { options })
    }

    pub fn options(&self) -> &EncoderOptions {
        &self.options
    }

    /// Encodes `pcm` into `sink` as one complete stream, header first.
    pub fn encode<W: io::Write>(&self, pcm: &PcmBuffer, sink: W) -> Result<EncodeStats> {
        let total_frames = u32::try_from(pcm.frame_count())
            .map_err(|_| ConfigError::FrameCountTooLarge(pcm.frame_count()))?;

        let header = StreamHeader {
            sample_rate: pcm.sample_rate(),
            total_frames,
            block_size: self.options.block_size,
            channels: pcm.channels(),
            predictor_order: self.options.predictor_order,
            negative_handling: self.options.negative_handling,
            parameter_mode: self.options.parameter_mode,
        };

        let mut writer = BitstreamIoWriter::new(sink);
        header.write(&mut writer)?;

        let samples_per_block = header.block_size as usize * header.channels as usize;
        let mut blocks = 0usize;
        for (index, frames) in pcm.samples().chunks(samples_per_block).enumerate() {
            let block = Block::from_frames(frames, header.channels);
            block.write(&header, index, &mut writer)?;
            blocks += 1;
        }

        let bytes_written = writer.bits_written().div_ceil(8);
        writer.finalize()?;

        debug!("encoded {total_frames} frames in {blocks} blocks, {bytes_written} bytes");

        Ok(EncodeStats {
            frames: total_frames as usize,
            blocks,
            bytes_written,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_options_are_rejected_before_io() {
        let zero_block = EncoderOptions {
            block_size: 0,
            ..EncoderOptions::default()
        };
        assert!(Encoder::with_options(zero_block).is_err());

        let zero_m = EncoderOptions {
            parameter_mode: ParameterMode::Static(0),
            ..EncoderOptions::default()
        };
        assert!(Encoder::with_options(zero_m).is_err());

        assert!(Encoder::with_options(EncoderOptions::default()).is_ok());
    }

    #[test]
    fn stats_match_the_produced_stream() {
        let pcm = PcmBuffer::new(44100, 1, vec![0i16; 100]).unwrap();
        let encoder = Encoder::with_options(EncoderOptions {
            block_size: 32,
            ..EncoderOptions::default()
        })
        .unwrap();

        let mut data = Vec::new();
        let stats = encoder.encode(&pcm, &mut data).unwrap();

        assert_eq!(stats.frames, 100);
        assert_eq!(stats.blocks, 4);
        assert_eq!(stats.bytes_written, data.len() as u64);
    }

    #[test]
    fn empty_input_produces_a_bare_header() {
        let pcm = PcmBuffer::new(44100, 2, Vec::new()).unwrap();
        let encoder = Encoder::default();

        let mut data = Vec::new();
        let stats = encoder.encode(&pcm, &mut data).unwrap();

        assert_eq!(stats.frames, 0);
        assert_eq!(stats.blocks, 0);
        // 105 header bits round up to 14 bytes.
        assert_eq!(data.len(), 14);
    }
}

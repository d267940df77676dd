//! Stream header for the RLA container.
//!
//! The header is written once at the start of the stream and fixes every
//! decoding parameter for the file's lifetime:
//!
//! | field             | bits |
//! |-------------------|------|
//! | sample_rate       | 32   |
//! | total_frames      | 32   |
//! | block_size        | 16   |
//! | channels          | 8    |
//! | predictor_order   | 8    |
//! | negative_handling | 8    |
//! | dynamic flag      | 1    |
//! | static m          | 32, present only when the flag is 0 |
//!
//! `total_frames` is the per-channel frame count, not the total sample
//! count. Reading validates every field before any block is touched.

use std::io;

use anyhow::{Result, bail};

use crate::structs::predictor::PredictorOrder;
use crate::utils::bitstream_io::{BitstreamIoReader, BitstreamIoWriter};
use crate::utils::errors::HeaderError;
use crate::utils::golomb::NegativeHandling;

/// Whether the Golomb parameter is re-estimated per block or fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParameterMode {
    /// One parameter per channel per block, estimated from that block's
    /// residuals.
    #[default]
    Dynamic,
    /// A single parameter shared by every block and both channels.
    Static(u32),
}

/// Immutable per-file coding parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamHeader {
    pub sample_rate: u32,
    pub total_frames: u32,
    pub block_size: u16,
    pub channels: u8,
    pub predictor_order: PredictorOrder,
    pub negative_handling: NegativeHandling,
    pub parameter_mode: ParameterMode,
}

impl StreamHeader {
    pub fn write<W: io::Write>(&self, writer: &mut BitstreamIoWriter<W>) -> Result<()> {
        writer.put_n(self.sample_rate, 32)?;
        writer.put_n(self.total_frames, 32)?;
        writer.put_n(self.block_size, 16)?;
        writer.put_n(self.channels, 8)?;
        writer.put_n(self.predictor_order.code(), 8)?;
        writer.put_n(self.negative_handling.code(), 8)?;

        match self.parameter_mode {
            ParameterMode::Dynamic => writer.put(true)?,
            ParameterMode::Static(m) => {
                writer.put(false)?;
                writer.put_n(m, 32)?;
            }
        }

        Ok(())
    }

    pub fn read<R: io::Read + io::Seek>(reader: &mut BitstreamIoReader<R>) -> Result<Self> {
        let sample_rate = reader.get_n::<u32>(32)?;
        let total_frames = reader.get_n::<u32>(32)?;

        let block_size = reader.get_n::<u16>(16)?;
        if block_size == 0 {
            bail!(HeaderError::InvalidBlockSize);
        }

        let channels = reader.get_n::<u8>(8)?;
        if channels != 1 && channels != 2 {
            bail!(HeaderError::InvalidChannelCount(channels));
        }

        let order_code = reader.get_n::<u8>(8)?;
        let Some(predictor_order) = PredictorOrder::from_code(order_code) else {
            bail!(HeaderError::InvalidPredictorOrder(order_code));
        };

        let neg_code = reader.get_n::<u8>(8)?;
        let Some(negative_handling) = NegativeHandling::from_code(neg_code) else {
            bail!(HeaderError::InvalidNegativeHandling(neg_code));
        };

        let parameter_mode = if reader.get()? {
            ParameterMode::Dynamic
        } else {
            let m = reader.get_n::<u32>(32)?;
            if m == 0 {
                bail!(HeaderError::InvalidStaticParameter);
            }
            ParameterMode::Static(m)
        };

        Ok(Self {
            sample_rate,
            total_frames,
            block_size,
            channels,
            predictor_order,
            negative_handling,
            parameter_mode,
        })
    }

    pub fn stereo(&self) -> bool {
        self.channels == 2
    }

    /// Length in frames of the block starting at `frames_done`.
    ///
    /// Every block spans `block_size` frames except the last, which covers
    /// whatever remains of the declared frame count.
    pub fn block_length(&self, frames_done: usize) -> usize {
        let remaining = self.total_frames as usize - frames_done;
        remaining.min(self.block_size as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::bitstream_io::BsIoSliceReader;

    fn sample_header(parameter_mode: ParameterMode) -> StreamHeader {
        StreamHeader {
            sample_rate: 44100,
            total_frames: 123_456,
            block_size: 1024,
            channels: 2,
            predictor_order: PredictorOrder::Order2,
            negative_handling: NegativeHandling::SignMagnitude,
            parameter_mode,
        }
    }

    fn write_to_bytes(header: &StreamHeader) -> Vec<u8> {
        let mut writer = BitstreamIoWriter::new(Vec::new());
        header.write(&mut writer).unwrap();
        writer.finalize().unwrap()
    }

    #[test]
    fn round_trips_in_both_parameter_modes() {
        for mode in [ParameterMode::Dynamic, ParameterMode::Static(8)] {
            let header = sample_header(mode);
            let bytes = write_to_bytes(&header);

            let mut reader = BsIoSliceReader::from_slice(&bytes);
            assert_eq!(StreamHeader::read(&mut reader).unwrap(), header);
        }
    }

    #[test]
    fn static_mode_adds_the_parameter_field() {
        // 32 + 32 + 16 + 8 + 8 + 8 + 1 bits, plus 32 for the static m.
        let dynamic = write_to_bytes(&sample_header(ParameterMode::Dynamic));
        let fixed = write_to_bytes(&sample_header(ParameterMode::Static(8)));

        assert_eq!(dynamic.len(), 14);
        assert_eq!(fixed.len(), 18);
    }

    #[test]
    fn invalid_fields_are_rejected() {
        let mut bad_channels = sample_header(ParameterMode::Dynamic);
        bad_channels.channels = 5;
        let bytes = write_to_bytes(&bad_channels);
        assert!(StreamHeader::read(&mut BsIoSliceReader::from_slice(&bytes)).is_err());

        let mut bad_block = sample_header(ParameterMode::Dynamic);
        bad_block.block_size = 0;
        let bytes = write_to_bytes(&bad_block);
        assert!(StreamHeader::read(&mut BsIoSliceReader::from_slice(&bytes)).is_err());

        let zero_m = write_to_bytes(&sample_header(ParameterMode::Static(0)));
        assert!(StreamHeader::read(&mut BsIoSliceReader::from_slice(&zero_m)).is_err());
    }

    #[test]
    fn final_block_is_the_remainder() {
        let header = StreamHeader {
            total_frames: 2500,
            ..sample_header(ParameterMode::Dynamic)
        };

        assert_eq!(header.block_length(0), 1024);
        assert_eq!(header.block_length(2048), 452);
    }
}

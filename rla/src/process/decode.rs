use std::io;

use anyhow::{Context, Result, anyhow};
use log::Level::Warn;
use log::debug;

use crate::log_or_err;
use crate::structs::block::Block;
use crate::structs::header::StreamHeader;
use crate::structs::pcm::PcmBuffer;
use crate::utils::bitstream_io::BsIoSliceReader;
use crate::utils::errors::{BlockError, StreamError};

/// Decodes complete RLA streams back to PCM.
///
/// Decoding is a single sequential pass: the header fixes every parameter,
/// then blocks are consumed until the declared frame count is met. The
/// output reproduces the encoder's input bit-exactly.
#[derive(Debug)]
pub struct Decoder {
    fail_level: log::Level,
}

impl Default for Decoder {
    fn default() -> Self {
        Self {
            fail_level: log::Level::Error,
        }
    }
}

impl Decoder {
    /// Sets the failure level for validation findings.
    ///
    /// - `log::Level::Error`: only fail on errors (default)
    /// - `log::Level::Warn`: fail on warnings too (strict mode)
    pub fn set_fail_level(&mut self, level: log::Level) {
        self.fail_level = level;
    }

    /// Decodes an in-memory stream to its original PCM buffer.
    pub fn decode(&self, data: &[u8]) -> Result<PcmBuffer> {
        let mut reader = BsIoSliceReader::from_slice(data);

        let header = StreamHeader::read(&mut reader).context("reading stream header")?;
        debug!(
            "header: {} Hz, {} channel(s), {} frames, block size {}",
            header.sample_rate, header.channels, header.total_frames, header.block_size
        );

        let total_frames = header.total_frames as usize;
        let mut samples = Vec::with_capacity(total_frames * header.channels as usize);

        let mut frames_done = 0usize;
        let mut index = 0usize;
        while frames_done < total_frames {
            let length = header.block_length(frames_done);
            let block = Block::read(&header, length, index, &mut reader)
                .map_err(|e| mark_truncation(e, index))?;
            block.interleave_into(&header, index, &mut samples)?;

            frames_done += length;
            index += 1;
        }

        // Zero-padding of the final byte never reaches a full byte; anything
        // more was not produced by an encoder.
        let leftover = reader.available()?;
        if leftover >= 8 {
            log_or_err!(
                self,
                Warn,
                anyhow!(StreamError::TrailingData {
                    bytes: leftover / 8
                })
            );
        }

        Ok(PcmBuffer::new(header.sample_rate, header.channels, samples)?)
    }
}

/// Reclassifies an end-of-stream inside a block as corruption: the declared
/// frame count, not the physical end of data, terminates decoding.
fn mark_truncation(error: anyhow::Error, block: usize) -> anyhow::Error {
    match error.downcast_ref::<io::Error>() {
        Some(io_err) if io_err.kind() == io::ErrorKind::UnexpectedEof => {
            error.context(BlockError::Truncated { block })
        }
        _ => error,
    }
}

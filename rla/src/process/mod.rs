//! Whole-file encode and decode drivers.
//!
//! The container is strictly sequential: one
//! [`StreamHeader`](crate::structs::header::StreamHeader), then coded blocks
//! until the declared frame count is exhausted. There is no sync pattern and
//! no seek table; a stream is consumed front to back in a single pass, and
//! every error aborts the run.

/// Encoding PCM buffers into RLA streams.
///
/// Provides the [`Encoder`](encode::Encoder) for turning a
/// [`PcmBuffer`](crate::structs::pcm::PcmBuffer) into a complete stream.
pub mod encode;

/// Decoding RLA streams back to PCM.
///
/// Provides the [`Decoder`](decode::Decoder) for reconstructing the original
/// [`PcmBuffer`](crate::structs::pcm::PcmBuffer) bit-exactly.
pub mod decode;

/// Default block size in frames.
pub const DEFAULT_BLOCK_SIZE: u16 = 1024;

#![doc = include_str!("../README.md")]
//!
//! ## Technical Overview
//!
//! Encoder and decoder for RLA streams. The encode path runs each block of
//! samples through stereo decorrelation, fixed linear prediction, and
//! Golomb-Rice coding onto a raw bitstream; the decode path reverses each
//! stage, re-deriving predictions from already-decoded samples, and
//! reproduces the input bit-exactly.
//!
//! ### Stream Organization
//!
//! A stream is one immutable header followed by coded blocks until the
//! declared frame count is exhausted. Each block carries, per channel, a
//! short warmup prefix of raw samples and then prediction residuals; in
//! dynamic parameter mode it is led by one freshly estimated Golomb
//! parameter per channel.
//!
//! ### Channels
//!
//! - Mono: the single channel is coded directly.
//! - Stereo: coded as a mid/side pair, two independent code sequences.
//!
//! ## Quick Start
//!
//! 1. Build a [`structs::pcm::PcmBuffer`] from interleaved 16-bit samples
//! 2. Encode it with [`process::encode::Encoder`]
//! 3. Decode the stream back with [`process::decode::Decoder`]

/// Whole-file processing for RLA streams.
///
/// 1. **Encoding** ([`process::encode`]): PCM buffers to complete streams.
/// 2. **Decoding** ([`process::decode`]): streams back to bit-exact PCM.
pub mod process;

/// Data structures representing RLA format components.
///
/// - **Stream header** ([`structs::header`]): per-file coding parameters
/// - **Blocks** ([`structs::block`]): warmup samples and coded residuals
/// - **Predictors** ([`structs::predictor`]): fixed linear prediction
/// - **Stereo transform** ([`structs::stereo`]): mid/side decorrelation
/// - **PCM buffers** ([`structs::pcm`]): the codec's outward-facing audio type
pub mod structs;

/// Utility functions and supporting infrastructure.
///
/// - **Bitstream I/O** ([`utils::bitstream_io`]): bit-level reading/writing
/// - **Golomb-Rice coding** ([`utils::golomb`]): variable-length integer codes
/// - **Error Handling** ([`utils::errors`]): error types
pub mod utils;

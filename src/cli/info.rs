use anyhow::{Context, Result};
use serde::Serialize;

use super::command::{Cli, InfoArgs};
use crate::input::InputReader;
use rla::structs::header::{ParameterMode, StreamHeader};
use rla::utils::bitstream_io::BsIoSliceReader;

pub fn cmd_info(args: &InfoArgs, _cli: &Cli) -> Result<()> {
    let mut input_reader = InputReader::new(&args.input)?;
    let data = input_reader.read_all()?;

    let mut reader = BsIoSliceReader::from_slice(&data);
    let header = StreamHeader::read(&mut reader).context("reading stream header")?;
    let info = StreamInfo::with_header(&header, data.len());

    if args.yaml {
        print!("{}", serde_yaml_ng::to_string(&info)?);
    } else {
        display_stream_info(&info);
    }

    Ok(())
}

#[derive(Debug, Serialize)]
struct StreamInfo {
    sample_rate: u32,
    channels: u8,
    total_frames: u32,
    duration_secs: f64,
    block_size: u16,
    predictor_order: u8,
    negative_handling: &'static str,
    parameter_mode: &'static str,
    static_m: Option<u32>,
    file_size: usize,
    compression_ratio: f64,
}

impl StreamInfo {
    fn with_header(header: &StreamHeader, file_size: usize) -> Self {
        let duration_secs = if header.sample_rate > 0 {
            f64::from(header.total_frames) / f64::from(header.sample_rate)
        } else {
            0.0
        };

        let pcm_bytes = u64::from(header.total_frames) * u64::from(header.channels) * 2;
        let compression_ratio = pcm_bytes as f64 / file_size.max(1) as f64;

        let (parameter_mode, static_m) = match header.parameter_mode {
            ParameterMode::Dynamic => ("dynamic", None),
            ParameterMode::Static(m) => ("static", Some(m)),
        };

        Self {
            sample_rate: header.sample_rate,
            channels: header.channels,
            total_frames: header.total_frames,
            duration_secs,
            block_size: header.block_size,
            predictor_order: header.predictor_order.code(),
            negative_handling: match header.negative_handling.code() {
                0 => "zigzag",
                _ => "sign_magnitude",
            },
            parameter_mode,
            static_m,
            file_size,
            compression_ratio,
        }
    }
}

fn display_stream_info(info: &StreamInfo) {
    println!("RLA Stream Information");
    println!("======================");
    println!();
    println!("  Sampling rate             {} Hz", info.sample_rate);
    println!("  Channels                  {}", info.channels);
    println!("  Total frames              {}", info.total_frames);
    println!("  Duration                  {:.3} s", info.duration_secs);
    println!("  Block size                {} frames", info.block_size);
    println!("  Predictor order           {}", info.predictor_order);
    println!("  Negative handling         {}", info.negative_handling);
    match info.static_m {
        Some(m) => println!("  Golomb parameter          static, m = {m}"),
        None => println!("  Golomb parameter          dynamic (per block)"),
    }
    println!("  File size                 {} bytes", info.file_size);
    println!("  Compression ratio         {:.2}:1", info.compression_ratio);
    println!();
}

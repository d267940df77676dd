use std::fs::File;
use std::io::BufWriter;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

use super::command::{Cli, EncodeArgs, Method};
use crate::input::InputReader;
use crate::wav::WavReader;
use rla::process::encode::{Encoder, EncoderOptions};
use rla::structs::header::ParameterMode;
use rla::structs::predictor::PredictorOrder;
use rla::utils::errors::ConfigError;
use rla::utils::golomb::NegativeHandling;

pub fn cmd_encode(args: &EncodeArgs, _cli: &Cli, multi: Option<&MultiProgress>) -> Result<()> {
    let predictor_order = PredictorOrder::from_code(args.predictor_order)
        .ok_or(ConfigError::InvalidPredictorOrder(args.predictor_order))?;

    let negative_handling = match args.method {
        Method::Zigzag => NegativeHandling::ZigZag,
        Method::SignMagnitude => NegativeHandling::SignMagnitude,
    };

    let parameter_mode = match args.static_m {
        Some(m) => ParameterMode::Static(m),
        None => ParameterMode::Dynamic,
    };

    log::info!(
        "Encoding WAV file: {} (block size: {}, order: {}, method: {:?}, Golomb m: {})",
        args.input.display(),
        args.block_size,
        args.predictor_order,
        args.method,
        match args.static_m {
            Some(m) => format!("static {m}"),
            None => "dynamic".to_string(),
        }
    );

    let encoder = Encoder::with_options(EncoderOptions {
        block_size: args.block_size,
        predictor_order,
        negative_handling,
        parameter_mode,
    })?;

    let mut input_reader = InputReader::new(&args.input)?;
    let data = input_reader.read_all()?;
    let pcm = WavReader::parse(&data).context("reading WAV input")?;

    log::info!(
        "Input: {} Hz, {} channel(s), {} frames",
        pcm.sample_rate(),
        pcm.channels(),
        pcm.frame_count()
    );

    let pb = multi.map(|multi| {
        let pb = multi.add(ProgressBar::new_spinner());
        pb.set_style(
            ProgressStyle::with_template("{spinner:.green} {msg} | elapsed: {elapsed_precise}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.enable_steady_tick(Duration::from_millis(100));
        pb.set_message(format!("encoding {}", args.input.display()));
        pb
    });

    let start = Instant::now();
    let sink = BufWriter::new(File::create(&args.output).context("creating output file")?);
    let stats = encoder.encode(&pcm, sink)?;
    let elapsed = start.elapsed();

    if let Some(pb) = pb {
        pb.finish_and_clear();
    }

    let pcm_bytes = (pcm.samples().len() * 2) as u64;
    let ratio = pcm_bytes as f64 / stats.bytes_written.max(1) as f64;
    log::info!(
        "Encoded {} frames in {} blocks: {} -> {} bytes ({ratio:.2}:1) in {:.3}s",
        stats.frames,
        stats.blocks,
        pcm_bytes,
        stats.bytes_written,
        elapsed.as_secs_f64()
    );

    Ok(())
}

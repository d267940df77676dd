use std::fs::File;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use log::Level;

use super::command::{Cli, DecodeArgs};
use crate::input::InputReader;
use crate::wav::WavWriter;
use rla::process::decode::Decoder;

pub fn cmd_decode(args: &DecodeArgs, cli: &Cli, multi: Option<&MultiProgress>) -> Result<()> {
    log::info!(
        "Decoding RLA stream: {} (strict mode: {})",
        args.input.display(),
        cli.strict
    );

    let mut input_reader = InputReader::new(&args.input)?;
    let data = input_reader.read_all()?;

    let mut decoder = Decoder::default();
    if cli.strict {
        decoder.set_fail_level(Level::Warn);
    }

    let pb = multi.map(|multi| {
        let pb = multi.add(ProgressBar::new_spinner());
        pb.set_style(
            ProgressStyle::with_template("{spinner:.green} {msg} | elapsed: {elapsed_precise}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.enable_steady_tick(Duration::from_millis(100));
        pb.set_message(format!("decoding {}", args.input.display()));
        pb
    });

    let start = Instant::now();
    let pcm = decoder.decode(&data)?;
    let elapsed = start.elapsed();

    if let Some(pb) = pb {
        pb.finish_and_clear();
    }

    let mut writer = WavWriter::new(File::create(&args.output).context("creating output file")?);
    writer.configure_audio_format(pcm.sample_rate(), u32::from(pcm.channels()))?;
    writer.write_header()?;
    writer.write_pcm_16bit(pcm.samples())?;
    writer.finish()?;

    let duration_secs = if pcm.sample_rate() > 0 {
        pcm.frame_count() as f64 / f64::from(pcm.sample_rate())
    } else {
        0.0
    };
    log::info!(
        "Decoded {} frames ({} Hz, {} channel(s), {duration_secs:.3}s of audio) in {:.3}s",
        pcm.frame_count(),
        pcm.sample_rate(),
        pcm.channels(),
        elapsed.as_secs_f64()
    );

    Ok(())
}

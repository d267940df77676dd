use std::path::PathBuf;

use clap::{Args, Parser as ClapParser, Subcommand, ValueEnum};

#[derive(Debug, ClapParser)]
#[command(
    name       = env!("CARGO_PKG_NAME"),
    version    = env!("CARGO_PKG_VERSION"),
    author     = env!("CARGO_PKG_AUTHORS"),
    about      = "Tools for inspecting, encoding and decoding RLA lossless audio streams",
    long_about = None,
)]
pub struct Cli {
    /// Set the log level
    #[arg(long, global = true, value_enum, default_value_t = LogLevel::Info)]
    pub loglevel: LogLevel,

    /// Treat warnings as fatal errors (fail on first warning).
    #[arg(long, global = true)]
    pub strict: bool,

    /// Log output format.
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,

    /// Show progress bars during operations.
    #[arg(long, global = true)]
    pub progress: bool,

    /// Choose an operation to perform.
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Encode a 16-bit PCM WAV file into an RLA stream.
    Encode(EncodeArgs),

    /// Decode an RLA stream back into a WAV file.
    Decode(DecodeArgs),

    /// Print stream information
    Info(InfoArgs),
}

#[derive(Debug, Args)]
pub struct EncodeArgs {
    /// Input WAV file, mono or stereo PCM 16 (use "-" for stdin).
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Output RLA file.
    #[arg(value_name = "OUTPUT")]
    pub output: PathBuf,

    /// Frames per block.
    #[arg(short = 'b', long, value_name = "FRAMES", default_value_t = rla::process::DEFAULT_BLOCK_SIZE)]
    pub block_size: u16,

    /// Predictor order: how many history samples feed the prediction (0-3).
    #[arg(short = 'p', long, value_name = "ORDER", default_value_t = 1)]
    pub predictor_order: u8,

    /// How signed residuals map onto the unsigned Golomb domain.
    #[arg(short = 'm', long, value_enum, default_value_t = Method::Zigzag)]
    pub method: Method,

    /// Re-estimate the Golomb parameter for every block (default).
    #[arg(long = "gd", conflicts_with = "static_m")]
    pub dynamic: bool,

    /// Use one fixed Golomb parameter for the whole file.
    #[arg(long = "gs", value_name = "M")]
    pub static_m: Option<u32>,
}

#[derive(Debug, Args)]
pub struct DecodeArgs {
    /// Input RLA stream (use "-" for stdin).
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Output WAV file.
    #[arg(value_name = "OUTPUT")]
    pub output: PathBuf,
}

#[derive(Debug, Args)]
pub struct InfoArgs {
    /// Input RLA stream.
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Emit machine-readable YAML instead of the text summary.
    #[arg(long)]
    pub yaml: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq)]
#[value(rename_all = "snake_case")]
pub enum Method {
    /// Interleave negative values onto the unsigned range.
    Zigzag,
    /// Code the magnitude, then one sign bit for nonzero values.
    SignMagnitude,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogLevel {
    /// Disable logging output.
    Off,
    /// No output except errors.
    Error,
    /// Show warnings and errors.
    Warn,
    /// Show info, warnings and errors (default).
    Info,
    /// Show debug, info, warnings and errors.
    Debug,
    /// Show all log messages including trace.
    Trace,
}

impl LogLevel {
    /// Convert LogLevel to log::LevelFilter
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Off => log::LevelFilter::Off,
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogFormat {
    /// Colorized human-readable text.
    Plain,
    /// Structured JSON per log record.
    Json,
}

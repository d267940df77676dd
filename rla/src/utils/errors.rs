#[macro_export]
macro_rules! log_or_err {
    ($state:expr, $level:expr, $err:expr $(,)?) => {{
        if $level <= $state.fail_level {
            return Err($err);
        } else {
            match $level {
                ::log::Level::Error => ::log::error!("{}", $err),
                ::log::Level::Warn => ::log::warn!("{}", $err),
                ::log::Level::Info => ::log::info!("{}", $err),
                ::log::Level::Debug => ::log::debug!("{}", $err),
                ::log::Level::Trace => ::log::trace!("{}", $err),
            }
        }
    }};
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("Golomb parameter m must be ≥ 1")]
    InvalidGolombParameter,

    #[error("Predictor order must be between 0 and 3. Got {0}")]
    InvalidPredictorOrder(u8),

    #[error("Channel count must be 1 (mono) or 2 (stereo). Got {0}")]
    InvalidChannelCount(u8),

    #[error("Block size must be ≥ 1")]
    InvalidBlockSize,

    #[error("Interleaved sample count {samples} is not a multiple of the channel count {channels}")]
    UnalignedSampleCount { samples: usize, channels: u8 },

    #[error("Frame count {0} exceeds the 32-bit header field")]
    FrameCountTooLarge(usize),
}

#[derive(thiserror::Error, Debug)]
pub enum HeaderError {
    #[error("Channel count must be 1 or 2. Read {0}")]
    InvalidChannelCount(u8),

    #[error("Predictor order must be ≤ 3. Read {0}")]
    InvalidPredictorOrder(u8),

    #[error("Block size must be ≥ 1")]
    InvalidBlockSize,

    #[error("Unknown negative-handling code {0}")]
    InvalidNegativeHandling(u8),

    #[error("Static Golomb parameter must be ≥ 1")]
    InvalidStaticParameter,
}

#[derive(thiserror::Error, Debug)]
pub enum BlockError {
    #[error("Block {block}: decoded Golomb parameter must be ≥ 1")]
    InvalidParameter { block: usize },

    #[error("Block {block}: bitstream ended mid-block")]
    Truncated { block: usize },

    #[error("Block {block}: reconstructed sample {value} exceeds the 16-bit range")]
    SampleOutOfRange { block: usize, value: i32 },
}

#[derive(thiserror::Error, Debug)]
pub enum StreamError {
    #[error("{bytes} trailing bytes after the final block")]
    TrailingData { bytes: u64 },
}

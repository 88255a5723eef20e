use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("unknown sound mode '{0}'")]
    UnknownMode(String),

    #[error("invalid engine config: {0}")]
    InvalidConfig(String),

    #[error("failed to parse engine config: {0}")]
    Config(#[from] serde_json::Error),

    #[error("convolution failed: {0}")]
    Fft(#[from] realfft::FftError),

    #[error("no tokio runtime is running on this thread")]
    NoRuntime,

    #[error("audio device error: {0}")]
    Device(String),
}

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SpectrumError {
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    #[error("Invalid crop region: width={width}, height={height}")]
    InvalidCrop { width: f64, height: f64 },

    #[error("Invalid display geometry: {0}")]
    InvalidGeometry(String),

    #[error("Invalid image dimensions: width={0}, height={1}")]
    InvalidDimensions(usize, usize),

    #[error("External service failed: {0}")]
    ExternalService(String),

    #[error("Failed to decode image: {0}")]
    DecodeError(String),

    #[error("Failed to encode image: {0}")]
    EncodeError(String),

    #[error("Failed to read input file: {0}")]
    InputReadError(String),

    #[error("Failed to write output file: {0}")]
    OutputWriteError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl SpectrumError {
    /// Whether re-issuing the same request later can succeed, e.g. on the
    /// next live-mode tick.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, SpectrumError::ExternalService(_))
    }
}

pub type Result<T> = std::result::Result<T, SpectrumError>;

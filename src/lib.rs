pub mod spectrum_pipeline;
pub mod logger;

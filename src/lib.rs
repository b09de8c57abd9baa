// Sentiment Stream - Real-time social media sentiment analyzer
// Consumes post records from the input channel, scores sentiment,
// detects rapid shifts over a sliding window, republishes enriched posts

pub mod bus;
pub mod config;
pub mod detector;
pub mod error;
pub mod pipeline;
pub mod scorer;
pub mod types;
pub mod window;

pub use pipeline::StreamPipeline;

use clap::{Parser, ValueEnum};
use std::net::SocketAddr;

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelFormat {
    /// JSON `{ "intercept": .., "coefficients": [..] }`
    Linear,
    /// TorchScript module (requires the `torch` feature)
    Torchscript,
}

/// Rental price prediction API
#[derive(Parser, Debug, Clone)]
#[command(name = "price_predictor")]
#[command(about = "Serves per-day rental price predictions for a car description")]
pub struct Args {
    /// Trained regression model artifact
    #[arg(long, env = "MODEL_PATH")]
    pub model_path: String,

    /// Fitted feature preprocessor artifact (JSON)
    #[arg(long, env = "PREPROCESSOR_PATH")]
    pub preprocessor_path: String,

    #[arg(long, env = "MODEL_FORMAT", value_enum, default_value = "linear")]
    pub model_format: ModelFormat,

    /// Address to listen on
    #[arg(long, env = "LISTEN", default_value = "0.0.0.0:8080")]
    pub listen: SocketAddr,

    /// Log every transformed feature vector
    #[arg(long, env = "LOG_PRED", value_parser = clap::builder::BoolishValueParser::new())]
    pub log_features: bool,

    /// Log level used when RUST_LOG is unset
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

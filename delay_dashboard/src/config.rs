use clap::{Args as ClapArgs, Parser, Subcommand};
use std::net::SocketAddr;

use crate::sweep::{LadderError, ThresholdLadder, DEFAULT_THRESHOLDS};

pub const DEFAULT_RENTALS_SOURCE: &str =
    "https://full-stack-assets.s3.eu-west-3.amazonaws.com/Deployment/get_around_delay_analysis.xlsx";
pub const DEFAULT_PRICING_SOURCE: &str =
    "https://full-stack-assets.s3.eu-west-3.amazonaws.com/Deployment/get_around_pricing_project.csv";

/// Checkout delay analysis dashboard
#[derive(Parser, Debug, Clone)]
#[command(name = "delay_dashboard")]
#[command(about = "Rental delay analysis and minimum-gap threshold sweep")]
pub struct Args {
    #[command(flatten)]
    pub data: DataArgs,

    /// Log level used when RUST_LOG is unset
    #[arg(long, env = "LOG_LEVEL", default_value = "info", global = true)]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct DataArgs {
    /// Rentals table (URL or path, .xlsx or .csv)
    #[arg(long, env = "RENTALS_SOURCE", default_value = DEFAULT_RENTALS_SOURCE, global = true)]
    pub rentals_source: String,

    /// Per-car pricing table (URL or path, .xlsx or .csv)
    #[arg(long, env = "PRICING_SOURCE", default_value = DEFAULT_PRICING_SOURCE, global = true)]
    pub pricing_source: String,

    /// Candidate minimum gaps between rentals, in minutes, comma separated
    #[arg(long, env = "THRESHOLDS", value_delimiter = ',', global = true)]
    pub thresholds: Vec<u32>,
}

impl DataArgs {
    pub fn ladder(&self) -> Result<ThresholdLadder, LadderError> {
        if self.thresholds.is_empty() {
            ThresholdLadder::new(DEFAULT_THRESHOLDS.to_vec())
        } else {
            ThresholdLadder::new(self.thresholds.clone())
        }
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Serve the dashboard views over HTTP
    Serve {
        /// Address to listen on
        #[arg(long, env = "LISTEN", default_value = "0.0.0.0:8081")]
        listen: SocketAddr,

        /// Base URL of the price prediction API
        #[arg(long, env = "PREDICTOR_URL", default_value = "http://localhost:8080")]
        predictor_url: String,
    },
    /// Print every view as one JSON document and exit
    Report,
}

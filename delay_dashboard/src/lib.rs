//! Checkout delay analysis for a car rental platform.
//!
//! Loads the rentals and pricing tables once, removes delay outliers,
//! buckets checkout delays, finds scheduling conflicts between consecutive
//! rentals of a car, and sweeps candidate minimum-gap thresholds to show what
//! each would cost and solve. Every view is a pure function of the loaded
//! [`Dataset`].

pub mod cleaning;
pub mod config;
pub mod conflicts;
pub mod dataset;
pub mod distribution;
pub mod error;
pub mod loader;
pub mod model;
pub mod predictor;
pub mod server;
pub mod sweep;

pub use dataset::Dataset;
pub use server::{create_router, AppState};

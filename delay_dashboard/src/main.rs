use anyhow::Context;
use clap::Parser;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use delay_dashboard::{
    config::{Args, Command},
    create_router,
    predictor::PredictorClient,
    AppState, Dataset,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("delay_dashboard={},tower_http=info", args.log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let ladder = args.data.ladder().context("invalid threshold ladder")?;
    let client = reqwest::Client::new();

    tracing::info!("loading data...");
    let dataset = Dataset::load(
        &client,
        &args.data.rentals_source,
        &args.data.pricing_source,
        ladder,
    )
    .await
    .context("failed to load analysis data")?;
    tracing::info!(
        rentals = dataset.rentals().len(),
        mean_price_per_day = dataset.mean_price_per_day(),
        thresholds = ?dataset.ladder().as_slice(),
        "data ready"
    );

    match args.command {
        Command::Report => {
            let report = serde_json::to_string_pretty(&dataset.report())?;
            println!("{}", report);
        }
        Command::Serve { listen, predictor_url } => {
            let predictor = PredictorClient::new(client, &predictor_url);
            tracing::info!("price predictor at {}", predictor.predict_url());
            let state = AppState {
                dataset: Arc::new(dataset),
                predictor: Arc::new(predictor),
            };
            let app = create_router(state);

            tracing::info!("listening on {}", listen);
            let listener = tokio::net::TcpListener::bind(listen).await?;
            axum::serve(listener, app).await?;
        }
    }
    Ok(())
}

use clap::Parser;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use price_predictor::{config::Args, load_predictor, router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("price_predictor={},tower_http=info", args.log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let predictor = load_predictor(&args)?;
    tracing::info!(
        "loaded model; features[{}]: {:?}",
        predictor.feature_count(),
        predictor.feature_names()
    );

    let state = AppState {
        predictor: Arc::new(predictor),
        log_features: args.log_features,
    };
    let app = router(state);

    tracing::info!("listening on {}", args.listen);
    let listener = tokio::net::TcpListener::bind(args.listen).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

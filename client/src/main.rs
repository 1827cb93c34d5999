//! Optimist demo - lists users from the configured API.
//!
//! Usage: `optimist-demo [search text]`

use optimist_client::{ApiClient, ClientConfig, Endpoints, RestRemote, SyncStore};
use optimist_engine::{QueryParams, User};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "optimist_client=debug,optimist_demo=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = ClientConfig::from_env()?;
    tracing::info!("Using API at {}", config.api_url);

    let client = ApiClient::from_config(&config)?;
    let store = SyncStore::new(RestRemote::<User>::new(client, Endpoints::USERS));

    let query = std::env::args().skip(1).collect::<Vec<_>>().join(" ");
    if query.is_empty() {
        store.fetch_list(Some(QueryParams::page(1, 10))).await;
    } else {
        store.search(&query).await;
    }

    let state = store.snapshot();
    if let Some(error) = &state.errors().general {
        tracing::error!("Request failed: {}", error);
        return Err(error.clone().into());
    }

    let pagination = state.pagination();
    tracing::info!(
        "{} users (page {} of {})",
        state.records().len(),
        pagination.page,
        pagination.total_pages.max(1)
    );
    for user in state.records() {
        println!("{:<8} {:<24} {:<32} {:?}", user.id, user.name, user.email, user.role);
    }

    Ok(())
}

use std::net::SocketAddr;
use std::sync::Arc;

use mongodb::Client;

use pricewatch::{config, rate_limit, routes, services, AppState};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let settings = config::load();

    // Mongo connection
    let client = Client::with_uri_str(&settings.mongodb_uri)
        .await
        .expect("Failed to connect to MongoDB");
    let db = client.database(&settings.mongodb_db);

    if let Err(e) = services::db_init::ensure_indexes(&db).await {
        tracing::warn!("index bootstrap failed: {e}");
    }

    let state = AppState {
        db,
        settings: settings.clone(),
        finnhub: services::finnhub::FinnhubClient::new(settings.finnhub_api_key.clone()),
        mailer: services::mailer::HttpMailer::new(&settings),
        limits: Arc::new(rate_limit::RateLimits::new()),
    };

    services::alert_monitor::spawn_price_alert_monitor(state.clone());

    let app = routes::app(state);

    let addr = SocketAddr::from((
        settings.host.parse::<std::net::IpAddr>().unwrap(),
        settings.port,
    ));
    tracing::info!("listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}

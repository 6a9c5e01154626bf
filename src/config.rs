use std::env;

#[derive(Debug, Clone)]
pub struct Settings {
    pub mongodb_uri: String,
    pub mongodb_db: String,
    pub host: String,
    pub port: u16,

    pub jwt_secret: String,

    pub finnhub_api_key: String,

    pub mail_api_url: String,
    pub mail_api_key: String,
    pub mail_from: String,

    // seconds between alert-monitor cycles
    pub alert_poll_secs: u64,
}

pub fn load() -> Settings {
    // Loads .env if present (no crash if missing)
    dotenvy::dotenv().ok();

    let mongodb_uri = env::var("MONGODB_URI")
        .unwrap_or_else(|_| "mongodb://localhost:27017".to_string());

    let mongodb_db = env::var("MONGODB_DB")
        .unwrap_or_else(|_| "pricewatch".to_string());

    let host = env::var("HOST")
        .unwrap_or_else(|_| "127.0.0.1".to_string());

    let port = env::var("PORT")
        .ok()
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(3000);

    let jwt_secret = env::var("JWT_SECRET").unwrap_or_else(|_| "change-me-dev-secret".to_string());

    let finnhub_api_key = env::var("FINNHUB_API_KEY").unwrap_or_default();

    let mail_api_url = env::var("MAIL_API_URL").unwrap_or_default();
    let mail_api_key = env::var("MAIL_API_KEY").unwrap_or_default();
    let mail_from = env::var("MAIL_FROM")
        .unwrap_or_else(|_| "alerts@pricewatch.local".to_string());

    let alert_poll_secs = env::var("ALERT_POLL_SECS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(300);

    Settings {
        mongodb_uri,
        mongodb_db,
        host,
        port,
        jwt_secret,
        finnhub_api_key,
        mail_api_url,
        mail_api_key,
        mail_from,
        alert_poll_secs,
    }
}

pub mod finnhub;
pub mod mailer;
pub mod db_init;
pub mod alert_monitor;

pub mod alerts_service;
pub mod stats_service;
pub mod stocks_service;

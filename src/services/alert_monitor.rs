use std::collections::HashMap;
use std::time::Duration;

use mongodb::bson::doc;
use tokio::time;

use crate::{
    error::ApiError,
    models::{Alert, User},
    services::{alerts_service, mailer::Mailer},
    AppState,
};

/// Price lookup seam for the monitor; the production impl is the Finnhub
/// client, tests use a fixed price table.
pub trait PriceSource {
    async fn current_price(&self, symbol: &str) -> Result<f64, ApiError>;
}

impl PriceSource for crate::services::finnhub::FinnhubClient {
    async fn current_price(&self, symbol: &str) -> Result<f64, ApiError> {
        Ok(self.quote(symbol).await?.c)
    }
}

/// Store seam for the monitor: the untriggered scan, the one-way latch, and
/// the owner-email lookup.
pub trait AlertStore {
    async fn list_untriggered(&self) -> Result<Vec<Alert>, ApiError>;
    async fn mark_triggered(&self, alert: &Alert) -> Result<bool, ApiError>;
    async fn owner_email(&self, user_id: &str) -> Result<Option<String>, ApiError>;
}

pub struct MongoAlertStore<'a> {
    pub state: &'a AppState,
}

impl AlertStore for MongoAlertStore<'_> {
    async fn list_untriggered(&self) -> Result<Vec<Alert>, ApiError> {
        alerts_service::list_untriggered(self.state).await
    }

    async fn mark_triggered(&self, alert: &Alert) -> Result<bool, ApiError> {
        alerts_service::mark_triggered(self.state, alert.id).await
    }

    async fn owner_email(&self, user_id: &str) -> Result<Option<String>, ApiError> {
        let users = self.state.db.collection::<User>("users");
        let found = users.find_one(doc! { "_id": user_id }, None).await?;
        Ok(found.map(|u| u.email))
    }
}

/// What one batch cycle did, for the log line.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub triggered: usize,
    pub pending: usize,
    pub skipped: usize,
    pub failed: usize,
}

pub fn spawn_price_alert_monitor(state: AppState) {
    let period = Duration::from_secs(state.settings.alert_poll_secs);

    tokio::spawn(async move {
        let mut interval = time::interval(period);

        loop {
            interval.tick().await;

            let store = MongoAlertStore { state: &state };
            match run_cycle(&store, &state.finnhub, &state.mailer).await {
                Ok(report) => tracing::info!(
                    triggered = report.triggered,
                    pending = report.pending,
                    skipped = report.skipped,
                    failed = report.failed,
                    "alert cycle complete"
                ),
                Err(e) => tracing::error!("alert cycle failed: {e}"),
            }
        }
    });
}

/// One batch cycle: scan the untriggered set, quote each symbol once, and
/// evaluate every alert in isolation. Per-alert failures are logged and
/// counted; they never abort the rest of the batch.
pub async fn run_cycle<S, P, M>(store: &S, feed: &P, mailer: &M) -> Result<CycleReport, ApiError>
where
    S: AlertStore,
    P: PriceSource,
    M: Mailer,
{
    let alerts = store.list_untriggered().await?;

    let mut report = CycleReport::default();
    if alerts.is_empty() {
        tracing::debug!("no active alerts");
        return Ok(report);
    }

    // One quote request per symbol per cycle.
    let mut by_symbol: HashMap<String, Vec<Alert>> = HashMap::new();
    for a in alerts {
        by_symbol.entry(a.symbol.clone()).or_default().push(a);
    }

    for (symbol, group) in by_symbol {
        let price = match feed.current_price(&symbol).await {
            Ok(p) if p.is_finite() && p > 0.0 => p,
            Ok(p) => {
                tracing::warn!("unusable quote for {symbol}: {p}");
                report.skipped += group.len();
                continue;
            }
            Err(e) => {
                // Alerts for this symbol stay untriggered and are retried
                // next cycle.
                tracing::warn!("quote fetch failed for {symbol}: {e}");
                report.skipped += group.len();
                continue;
            }
        };

        for alert in group {
            match evaluate_alert(store, mailer, &alert, price).await {
                Ok(true) => report.triggered += 1,
                Ok(false) => {
                    tracing::debug!(
                        symbol = %alert.symbol,
                        price,
                        target = alert.target_price,
                        "target not reached"
                    );
                    report.pending += 1;
                }
                Err(e) => {
                    tracing::error!("evaluation failed for alert {}: {e}", alert.id.to_hex());
                    report.failed += 1;
                }
            }
        }
    }

    Ok(report)
}

/// Evaluates one alert at the given price. A met predicate notifies the
/// owner and flips the latch; the notification and the state transition are
/// separable, so a failed send never blocks the latch.
async fn evaluate_alert<S, M>(
    store: &S,
    mailer: &M,
    alert: &Alert,
    price: f64,
) -> Result<bool, ApiError>
where
    S: AlertStore,
    M: Mailer,
{
    if !alert.direction.is_met(price, alert.target_price) {
        return Ok(false);
    }

    match store.owner_email(&alert.user_id).await {
        Ok(Some(email)) => {
            let subject = format!("Price alert: {}", alert.symbol);
            let body = format!(
                "Your alert \"{}\" fired: {} moved {} your target of {:.2} (current price {:.2}).",
                alert.alert_name,
                alert.symbol,
                alert.direction.as_str(),
                alert.target_price,
                price,
            );

            if let Err(e) = mailer.send(&email, &subject, &body).await {
                tracing::warn!("notification failed for alert {}: {e}", alert.id.to_hex());
            }
        }
        Ok(None) => {
            tracing::warn!("no email on file for user {}", alert.user_id);
        }
        Err(e) => {
            tracing::warn!("email lookup failed for user {}: {e}", alert.user_id);
        }
    }

    store.mark_triggered(alert).await?;
    Ok(true)
}

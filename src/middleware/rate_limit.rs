use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use axum::{
    extract::State,
    http::{HeaderMap, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::{error::ApiError, models::CurrentUser, AppState};

pub const GLOBAL_MAX_REQUESTS: u32 = 100;
pub const GLOBAL_WINDOW: Duration = Duration::from_secs(15 * 60);

pub const ALERT_MAX_REQUESTS: u32 = 10;
pub const ALERT_WINDOW: Duration = Duration::from_secs(60 * 60);

const GLOBAL_MESSAGE: &str = "Too many requests, please try again later.";
const ALERT_MESSAGE: &str = "Too many alerts created, please try again after an hour.";

/// Fixed-window request counter, one window per client key.
pub struct FixedWindow {
    max: u32,
    window: Duration,
    hits: Mutex<HashMap<String, (Instant, u32)>>,
}

impl FixedWindow {
    pub fn new(max: u32, window: Duration) -> Self {
        Self {
            max,
            window,
            hits: Mutex::new(HashMap::new()),
        }
    }

    /// Counts a hit for `key`; false means the window is saturated.
    pub fn allow(&self, key: &str) -> bool {
        self.allow_at(key, Instant::now())
    }

    fn allow_at(&self, key: &str, now: Instant) -> bool {
        let mut hits = self.hits.lock().unwrap_or_else(|e| e.into_inner());

        // Drop every elapsed window, not just the caller's: the global
        // limiter keys on a client-supplied header, so one-shot keys must
        // not stay resident forever.
        hits.retain(|_, (start, _)| now.duration_since(*start) < self.window);

        let entry = hits.entry(key.to_string()).or_insert((now, 0));
        entry.1 += 1;
        entry.1 <= self.max
    }
}

pub struct RateLimits {
    pub global: FixedWindow,
    pub alert_create: FixedWindow,
}

impl RateLimits {
    pub fn new() -> Self {
        Self {
            global: FixedWindow::new(GLOBAL_MAX_REQUESTS, GLOBAL_WINDOW),
            alert_create: FixedWindow::new(ALERT_MAX_REQUESTS, ALERT_WINDOW),
        }
    }
}

impl Default for RateLimits {
    fn default() -> Self {
        Self::new()
    }
}

/// Client key for the pre-auth global limiter: first forwarded hop, or a
/// shared fallback when no proxy header is present.
fn client_key(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Outermost admission gate: caps total request volume per client.
pub async fn global(
    State(state): State<AppState>,
    req: Request<axum::body::Body>,
    next: Next,
) -> Response {
    let key = client_key(req.headers());

    if !state.limits.global.allow(&key) {
        return ApiError::RateLimited(GLOBAL_MESSAGE.to_string()).into_response();
    }

    next.run(req).await
}

/// Per-user cap on alert creation; layered inside the auth gate so the key
/// is the verified uid.
pub async fn alert_create(
    State(state): State<AppState>,
    req: Request<axum::body::Body>,
    next: Next,
) -> Response {
    // The auth gate runs first; a missing identity here is a wiring bug.
    let Some(user) = req.extensions().get::<CurrentUser>() else {
        return ApiError::Unauthorized.into_response();
    };

    if !state.limits.alert_create.allow(&user.uid) {
        return ApiError::RateLimited(ALERT_MESSAGE.to_string()).into_response();
    }

    next.run(req).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn denies_once_window_is_saturated() {
        let limiter = FixedWindow::new(3, Duration::from_secs(60));
        let now = Instant::now();

        assert!(limiter.allow_at("a", now));
        assert!(limiter.allow_at("a", now));
        assert!(limiter.allow_at("a", now));
        assert!(!limiter.allow_at("a", now));
    }

    #[test]
    fn keys_are_counted_independently() {
        let limiter = FixedWindow::new(1, Duration::from_secs(60));
        let now = Instant::now();

        assert!(limiter.allow_at("a", now));
        assert!(!limiter.allow_at("a", now));
        assert!(limiter.allow_at("b", now));
    }

    #[test]
    fn window_resets_after_it_elapses() {
        let limiter = FixedWindow::new(1, Duration::from_secs(60));
        let start = Instant::now();

        assert!(limiter.allow_at("a", start));
        assert!(!limiter.allow_at("a", start + Duration::from_secs(59)));
        assert!(limiter.allow_at("a", start + Duration::from_secs(60)));
    }

    #[test]
    fn stale_keys_are_evicted_once_their_window_elapses() {
        let limiter = FixedWindow::new(1, Duration::from_secs(60));
        let start = Instant::now();

        for i in 0..10_000 {
            assert!(limiter.allow_at(&format!("client-{i}"), start));
        }
        assert_eq!(limiter.hits.lock().unwrap().len(), 10_000);

        // One live hit an hour later sweeps every stale window out.
        assert!(limiter.allow_at("late-client", start + Duration::from_secs(3600)));
        assert_eq!(limiter.hits.lock().unwrap().len(), 1);
    }

    #[test]
    fn policy_values_match_the_documented_limits() {
        assert_eq!(GLOBAL_MAX_REQUESTS, 100);
        assert_eq!(GLOBAL_WINDOW, Duration::from_secs(900));
        assert_eq!(ALERT_MAX_REQUESTS, 10);
        assert_eq!(ALERT_WINDOW, Duration::from_secs(3600));
    }
}

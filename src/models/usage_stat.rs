use serde::{Deserialize, Serialize};

/// Per (route, user) request counter, upserted on every authenticated hit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageStat {
    pub user_id: String,

    #[serde(default)]
    pub email: Option<String>,

    // sanitized route identifier, path separators replaced with '_'
    pub route: String,

    pub count: i64,
    pub last_request: i64,
}

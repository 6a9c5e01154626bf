use serde::{Deserialize, Serialize};

/// A user record as provisioned by the identity provider. Read-only here;
/// the monitor uses it to resolve an owner's email address.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id")]
    pub uid: String,

    pub email: String,
}

/// Verified identity attached to a request by the auth middleware.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub uid: String,
    pub email: Option<String>,
}

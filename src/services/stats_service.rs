use chrono::Utc;
use futures_util::StreamExt;
use mongodb::bson::doc;
use mongodb::options::{FindOptions, UpdateOptions};

use crate::{error::ApiError, models::CurrentUser, models::UsageStat, AppState};

/// Best-effort wrapper run as a detached task by the auth middleware: a
/// stats failure is logged and swallowed, never surfaced to the request.
pub async fn record_request(state: AppState, route: String, user: CurrentUser) {
    if let Err(e) = bump_usage(&state, &route, &user).await {
        tracing::warn!("usage-stat update failed for {route}/{}: {e}", user.uid);
    }
}

/// Upserts the (route, user) counter. The `$inc` is atomic at the store, so
/// concurrent hits from the same user never lose updates.
async fn bump_usage(state: &AppState, route: &str, user: &CurrentUser) -> Result<(), ApiError> {
    let stats = state.db.collection::<UsageStat>("usage_stats");
    let now = Utc::now().timestamp();

    let update_opts = UpdateOptions::builder().upsert(true).build();

    stats
        .update_one(
            doc! { "user_id": &user.uid, "route": route },
            doc! {
                "$inc": { "count": 1 },
                "$set": {
                    "email": user.email.as_deref(),
                    "last_request": now,
                },
            },
            update_opts,
        )
        .await?;

    Ok(())
}

pub async fn list_stats(state: &AppState) -> Result<Vec<UsageStat>, ApiError> {
    let stats = state.db.collection::<UsageStat>("usage_stats");

    let find_opts = FindOptions::builder().sort(doc! { "count": -1 }).build();

    let mut cursor = stats.find(None, find_opts).await?;

    let mut items: Vec<UsageStat> = Vec::new();
    while let Some(res) = cursor.next().await {
        items.push(res?);
    }

    Ok(items)
}

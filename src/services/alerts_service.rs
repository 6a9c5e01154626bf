use chrono::Utc;
use futures_util::StreamExt;
use mongodb::bson::{doc, oid::ObjectId, Document};
use mongodb::options::FindOptions;

use crate::{
    error::ApiError,
    models::{Alert, Direction},
    AppState,
};

/// Validated alert-creation payload. Built from the raw request fields so
/// missing/malformed input surfaces as a 400, not a deserialization error.
#[derive(Debug)]
pub struct NewAlert {
    pub symbol: String,
    pub alert_name: String,
    pub target_price: f64,
    pub direction: Direction,
}

impl NewAlert {
    pub fn validate(
        symbol: Option<&str>,
        alert_name: Option<&str>,
        target_price: Option<f64>,
        direction: Option<&str>,
    ) -> Result<NewAlert, ApiError> {
        let symbol = symbol
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ApiError::validation("symbol is required"))?;

        let alert_name = alert_name
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ApiError::validation("alertName is required"))?;

        let target_price =
            target_price.ok_or_else(|| ApiError::validation("targetPrice is required"))?;
        if !target_price.is_finite() || target_price <= 0.0 {
            return Err(ApiError::validation("targetPrice must be a positive number"));
        }

        let direction = direction
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ApiError::validation("direction is required"))?;
        let direction = Direction::parse(direction)
            .ok_or_else(|| ApiError::validation("direction must be \"above\" or \"below\""))?;

        Ok(NewAlert {
            symbol: symbol.to_uppercase(),
            alert_name: alert_name.to_string(),
            target_price,
            direction,
        })
    }
}

pub async fn create_alert(
    state: &AppState,
    user_id: &str,
    new: NewAlert,
) -> Result<Alert, ApiError> {
    let alerts = state.db.collection::<Alert>("alerts");
    let now = Utc::now().timestamp();

    let alert = Alert {
        id: ObjectId::new(),
        user_id: user_id.to_string(),
        symbol: new.symbol,
        alert_name: new.alert_name,
        direction: new.direction,
        target_price: new.target_price,
        created_at: now,
        triggered: false,
        triggered_at: None,
    };

    alerts.insert_one(&alert, None).await?;

    Ok(alert)
}

/// Equality filter scoping a query to one owner; every per-user read goes
/// through this so no listing can cross owners.
fn owner_filter(user_id: &str) -> Document {
    doc! { "user_id": user_id }
}

pub async fn list_user_alerts(state: &AppState, user_id: &str) -> Result<Vec<Alert>, ApiError> {
    let alerts = state.db.collection::<Alert>("alerts");

    let find_opts = FindOptions::builder()
        .sort(doc! { "created_at": -1 })
        .build();

    let mut cursor = alerts.find(owner_filter(user_id), find_opts).await?;

    let mut items: Vec<Alert> = Vec::new();
    while let Some(res) = cursor.next().await {
        items.push(res?);
    }

    Ok(items)
}

/// Existence is checked before ownership: deleting a missing id is a 404
/// even when the caller owns nothing.
pub fn delete_outcome(alert: Option<&Alert>, user_id: &str) -> Result<(), ApiError> {
    match alert {
        None => Err(ApiError::NotFound("Alert not found".to_string())),
        Some(a) if a.user_id != user_id => Err(ApiError::Forbidden),
        Some(_) => Ok(()),
    }
}

pub async fn delete_alert(
    state: &AppState,
    user_id: &str,
    alert_id: ObjectId,
) -> Result<(), ApiError> {
    let alerts = state.db.collection::<Alert>("alerts");

    let found = alerts.find_one(doc! { "_id": alert_id }, None).await?;
    delete_outcome(found.as_ref(), user_id)?;

    alerts.delete_one(doc! { "_id": alert_id }, None).await?;

    Ok(())
}

/// All untriggered alerts across all owners; monitor use only.
pub async fn list_untriggered(state: &AppState) -> Result<Vec<Alert>, ApiError> {
    let alerts = state.db.collection::<Alert>("alerts");

    let mut cursor = alerts.find(doc! { "triggered": false }, None).await?;

    let mut items: Vec<Alert> = Vec::new();
    while let Some(res) = cursor.next().await {
        items.push(res?);
    }

    Ok(items)
}

/// Flips the one-way latch. The filter on `triggered: false` makes the
/// write a no-op on an already-triggered alert; returns whether this call
/// newly flipped it.
pub async fn mark_triggered(state: &AppState, alert_id: ObjectId) -> Result<bool, ApiError> {
    let alerts = state.db.collection::<Alert>("alerts");
    let now = Utc::now().timestamp();

    let res = alerts
        .update_one(
            doc! { "_id": alert_id, "triggered": false },
            doc! { "$set": { "triggered": true, "triggered_at": now } },
            None,
        )
        .await?;

    Ok(res.modified_count > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_alert(user_id: &str) -> Alert {
        Alert {
            id: ObjectId::new(),
            user_id: user_id.to_string(),
            symbol: "AAPL".to_string(),
            alert_name: "apple breakout".to_string(),
            direction: Direction::Above,
            target_price: 150.0,
            created_at: 0,
            triggered: false,
            triggered_at: None,
        }
    }

    #[test]
    fn validate_rejects_missing_fields() {
        for (symbol, name, price, dir) in [
            (None, Some("n"), Some(1.0), Some("above")),
            (Some("AAPL"), None, Some(1.0), Some("above")),
            (Some("AAPL"), Some("n"), None, Some("above")),
            (Some("AAPL"), Some("n"), Some(1.0), None),
        ] {
            let res = NewAlert::validate(symbol, name, price, dir);
            assert!(matches!(res, Err(ApiError::Validation(_))), "{symbol:?} {name:?} {price:?} {dir:?}");
        }
    }

    #[test]
    fn validate_rejects_unknown_direction() {
        let res = NewAlert::validate(Some("AAPL"), Some("n"), Some(150.0), Some("sideways"));
        assert!(matches!(res, Err(ApiError::Validation(_))));
    }

    #[test]
    fn validate_rejects_non_positive_target() {
        for bad in [0.0, -3.0, f64::NAN, f64::INFINITY] {
            let res = NewAlert::validate(Some("AAPL"), Some("n"), Some(bad), Some("above"));
            assert!(matches!(res, Err(ApiError::Validation(_))), "{bad}");
        }
    }

    #[test]
    fn validate_uppercases_symbol_and_parses_direction() {
        let new = NewAlert::validate(Some("aapl"), Some("n"), Some(150.0), Some("Below")).unwrap();
        assert_eq!(new.symbol, "AAPL");
        assert_eq!(new.direction, Direction::Below);
    }

    #[test]
    fn owner_filter_scopes_listing_to_exactly_one_owner() {
        assert_eq!(owner_filter("user-a"), doc! { "user_id": "user-a" });
        assert_ne!(owner_filter("user-a"), owner_filter("user-b"));
    }

    #[test]
    fn owner_filter_matches_only_the_owners_stored_documents() {
        let filter = owner_filter("user-a");
        let own = mongodb::bson::to_document(&sample_alert("user-a")).unwrap();
        let foreign = mongodb::bson::to_document(&sample_alert("user-b")).unwrap();

        // The filter keys on the same field the documents are stored with,
        // and a foreign owner's document can never satisfy it.
        assert_eq!(own.get_str("user_id").unwrap(), filter.get_str("user_id").unwrap());
        assert_ne!(foreign.get_str("user_id").unwrap(), filter.get_str("user_id").unwrap());
    }

    #[test]
    fn delete_outcome_checks_existence_before_ownership() {
        assert!(matches!(
            delete_outcome(None, "user-a"),
            Err(ApiError::NotFound(_))
        ));

        let foreign = sample_alert("user-b");
        assert!(matches!(
            delete_outcome(Some(&foreign), "user-a"),
            Err(ApiError::Forbidden)
        ));

        let owned = sample_alert("user-a");
        assert!(delete_outcome(Some(&owned), "user-a").is_ok());
    }
}

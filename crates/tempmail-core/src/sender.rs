/// Outbound send permission updates
use serde::{Deserialize, Deserializer};
use serde_json::{Number, Value};
use tracing::{info, warn};

use crate::error::{AdminError, Result};
use crate::notify::{Notifier, SenderPermissionChanged};
use crate::store::{Database, RunOutcome, Statement};
use crate::utils::redact_address;

/// Requested change to an address's send permission
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SenderUpdate {
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub address_id: Option<i64>,
    #[serde(default = "zero_balance", deserialize_with = "deserialize_balance")]
    pub balance: Number,
    #[serde(default, deserialize_with = "deserialize_truthy")]
    pub enabled: bool,
}

/// JSON truthiness: `null`, `false`, `0` and `""` are false
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Deserialize any JSON value by its truthiness
pub fn deserialize_truthy<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().is_some_and(is_truthy))
}

fn zero_balance() -> Number {
    Number::from(0)
}

/// Any JSON number is kept as sent; `null` counts as zero
fn deserialize_balance<'de, D>(deserializer: D) -> std::result::Result<Number, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Number>::deserialize(deserializer)?.unwrap_or_else(zero_balance))
}

pub struct SenderPermission<'a> {
    db: &'a dyn Database,
    notifier: &'a dyn Notifier,
}

impl<'a> SenderPermission<'a> {
    pub fn new(db: &'a dyn Database, notifier: &'a dyn Notifier) -> Self {
        Self { db, notifier }
    }

    /// Apply `update` with a single statement, then notify the address.
    ///
    /// The result reflects the statement only; a failed notification is logged.
    pub async fn update(&self, update: &SenderUpdate) -> Result<RunOutcome> {
        let address_id = update
            .address_id
            .filter(|id| *id != 0)
            .ok_or_else(|| AdminError::Validation("Invalid address_id".to_string()))?;

        let outcome = self
            .db
            .run(
                &Statement::new(
                    "UPDATE address_sender SET enabled = ?, balance = ?, \
                     updated_at = datetime('now') WHERE id = ? ",
                )
                .bind(update.enabled)
                .bind(&update.balance)
                .bind(address_id),
            )
            .await?;

        info!(
            address_id,
            enabled = update.enabled,
            balance = %update.balance,
            rows_affected = outcome.rows_affected,
            "Send permission updated"
        );

        match update.address.as_deref().filter(|a| !a.is_empty()) {
            Some(address) => {
                let event = SenderPermissionChanged {
                    address: address.to_string(),
                    enabled: update.enabled,
                    balance: update.balance.clone(),
                };
                if let Err(e) = self.notifier.sender_permission_changed(&event).await {
                    warn!(
                        address = %redact_address(address),
                        error = %e,
                        "Send permission notification failed"
                    );
                }
            }
            None => warn!(address_id, "No address given, skipping notification"),
        }

        Ok(outcome)
    }
}

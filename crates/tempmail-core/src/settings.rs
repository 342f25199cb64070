/// JSON-encoded named settings
///
/// A setting that was never saved reads as `None`, which is distinct from a
/// saved empty list.
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tracing::{info, warn};

use crate::constants::{ADDRESS_BLOCK_LIST_KEY, SEND_BLOCK_LIST_KEY};
use crate::error::{AdminError, Result};
use crate::store::{Database, Statement, column_str};

pub struct SettingsStore<'a> {
    db: &'a dyn Database,
}

impl<'a> SettingsStore<'a> {
    pub fn new(db: &'a dyn Database) -> Self {
        Self { db }
    }

    /// Raw stored text for `key`
    pub async fn get_raw(&self, key: &str) -> Result<Option<String>> {
        let row = self
            .db
            .first(&Statement::new("SELECT value FROM settings where key = ?").bind(key))
            .await?;
        Ok(row.as_ref().and_then(|r| column_str(r, "value")).map(str::to_string))
    }

    /// Stored value for `key`, or `None` when absent or not valid JSON for `T`
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let Some(text) = self.get_raw(key).await? else {
            return Ok(None);
        };

        match serde_json::from_str(&text) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                warn!(key, error = %e, "Ignoring undecodable setting");
                Ok(None)
            }
        }
    }

    /// Upsert the JSON text for `key`
    pub async fn save(&self, key: &str, json_text: &str) -> Result<()> {
        self.db
            .run(
                &Statement::new(
                    "INSERT INTO settings (key, value) VALUES (?, ?) \
                     ON CONFLICT(key) DO UPDATE SET value = excluded.value, \
                     updated_at = datetime('now')",
                )
                .bind(key)
                .bind(json_text),
            )
            .await?;

        info!(key, "Setting saved");
        Ok(())
    }

    pub async fn save_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let text = serde_json::to_string(value)?;
        self.save(key, &text).await
    }
}

/// The two moderation block-lists, managed together
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountSettings {
    pub block_list: Vec<String>,
    pub send_block_list: Vec<String>,
}

impl AccountSettings {
    /// Load both lists; lists never configured read as empty
    pub async fn load(store: &SettingsStore<'_>) -> Result<Self> {
        let block_list = store.get::<Vec<String>>(ADDRESS_BLOCK_LIST_KEY).await?;
        let send_block_list = store.get::<Vec<String>>(SEND_BLOCK_LIST_KEY).await?;

        Ok(Self {
            block_list: block_list.unwrap_or_default(),
            send_block_list: send_block_list.unwrap_or_default(),
        })
    }

    /// Validate and save both lists. Either list missing is a validation error.
    pub async fn save(
        store: &SettingsStore<'_>,
        block_list: Option<Vec<String>>,
        send_block_list: Option<Vec<String>>,
    ) -> Result<Self> {
        let (Some(block_list), Some(send_block_list)) = (block_list, send_block_list) else {
            return Err(AdminError::Validation(
                "Invalid blockList or sendBlockList".to_string(),
            ));
        };

        store.save_json(ADDRESS_BLOCK_LIST_KEY, &block_list).await?;
        store.save_json(SEND_BLOCK_LIST_KEY, &send_block_list).await?;

        Ok(Self {
            block_list,
            send_block_list,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MockDatabase, Param, SqliteDatabase};
    use serde_json::json;

    #[tokio::test]
    async fn test_round_trip() {
        let db = SqliteDatabase::in_memory().await.unwrap();
        let store = SettingsStore::new(&db);

        let saved = vec!["spam".to_string(), "*.bad.example".to_string()];
        store.save_json("k", &saved).await.unwrap();
        assert_eq!(store.get::<Vec<String>>("k").await.unwrap(), Some(saved));

        store.save_json("k", &Vec::<String>::new()).await.unwrap();
        assert_eq!(store.get::<Vec<String>>("k").await.unwrap(), Some(vec![]));
    }

    #[tokio::test]
    async fn test_absent_is_not_empty() {
        let db = SqliteDatabase::in_memory().await.unwrap();
        let store = SettingsStore::new(&db);

        assert_eq!(store.get::<Vec<String>>("never-set").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_undecodable_value_reads_as_absent() {
        let db = SqliteDatabase::in_memory().await.unwrap();
        let store = SettingsStore::new(&db);

        store.save("k", "not json").await.unwrap();
        assert_eq!(store.get::<Vec<String>>("k").await.unwrap(), None);
        assert_eq!(store.get_raw("k").await.unwrap().as_deref(), Some("not json"));
    }

    #[tokio::test]
    async fn test_save_requires_both_lists() {
        let mut db = MockDatabase::new();
        db.expect_run().times(0);
        let store = SettingsStore::new(&db);

        let result = AccountSettings::save(&store, Some(vec![]), None).await;
        assert!(matches!(result, Err(AdminError::Validation(_))));
    }

    #[tokio::test]
    async fn test_save_failure_is_storage_error() {
        let mut db = MockDatabase::new();
        db.expect_run()
            .returning(|_| Err(AdminError::Storage("database is locked".to_string())));
        let store = SettingsStore::new(&db);

        let result = store.save("k", "[]").await;
        assert!(matches!(result, Err(AdminError::Storage(_))));
    }

    #[tokio::test]
    async fn test_load_defaults_to_empty_lists() {
        let mut db = MockDatabase::new();
        db.expect_first()
            .withf(|stmt| stmt.params == vec![Param::from(ADDRESS_BLOCK_LIST_KEY)])
            .returning(|_| Ok(json!({"value": "[\"a\"]"}).as_object().cloned()));
        db.expect_first()
            .withf(|stmt| stmt.params == vec![Param::from(SEND_BLOCK_LIST_KEY)])
            .returning(|_| Ok(None));
        let store = SettingsStore::new(&db);

        let settings = AccountSettings::load(&store).await.unwrap();
        assert_eq!(settings.block_list, vec!["a".to_string()]);
        assert!(settings.send_block_list.is_empty());
    }
}

//! Settings repository implementation

use crate::error::Result;
use crate::models::{Setting, SettingValue};
use libsql::Connection;

/// Trait for preference storage operations (async)
#[allow(async_fn_in_trait)]
pub trait SettingsRepository {
    /// Look up a value; `None` when the key was never written
    async fn get(&self, key: &str) -> Result<Option<SettingValue>>;

    /// Insert or replace a value
    async fn put(&self, key: &str, value: &SettingValue) -> Result<()>;

    /// List every stored setting ordered by key
    async fn list(&self) -> Result<Vec<Setting>>;
}

/// libSQL implementation of `SettingsRepository`
pub struct LibSqlSettingsRepository<'a> {
    conn: &'a Connection,
}

impl<'a> LibSqlSettingsRepository<'a> {
    /// Create a new repository with the given connection
    pub const fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }
}

impl SettingsRepository for LibSqlSettingsRepository<'_> {
    async fn get(&self, key: &str) -> Result<Option<SettingValue>> {
        let mut rows = self
            .conn
            .query("SELECT value FROM settings WHERE key = ?", [key])
            .await?;

        if let Some(row) = rows.next().await? {
            let raw: String = row.get(0)?;
            Ok(Some(serde_json::from_str(&raw)?))
        } else {
            Ok(None)
        }
    }

    async fn put(&self, key: &str, value: &SettingValue) -> Result<()> {
        let raw = serde_json::to_string(value)?;
        self.conn
            .execute(
                "INSERT OR REPLACE INTO settings (key, value) VALUES (?, ?)",
                [key, raw.as_str()],
            )
            .await?;
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Setting>> {
        let mut rows = self
            .conn
            .query("SELECT key, value FROM settings ORDER BY key", ())
            .await?;

        let mut settings = Vec::new();
        while let Some(row) = rows.next().await? {
            let key: String = row.get(0)?;
            let raw: String = row.get(1)?;
            settings.push(Setting {
                key,
                value: serde_json::from_str(&raw)?,
            });
        }
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::models::THEME_KEY;

    async fn setup() -> Database {
        Database::open_in_memory().await.unwrap()
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_missing_setting_is_none() {
        let db = setup().await;
        let repo = LibSqlSettingsRepository::new(db.connection());

        assert_eq!(repo.get(THEME_KEY).await.unwrap(), None);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_put_and_get_keeps_variant() {
        let db = setup().await;
        let repo = LibSqlSettingsRepository::new(db.connection());

        repo.put(THEME_KEY, &SettingValue::Text("dark".into()))
            .await
            .unwrap();
        repo.put("notifications", &SettingValue::Bool(true))
            .await
            .unwrap();
        repo.put(THEME_KEY, &SettingValue::Text("light".into()))
            .await
            .unwrap();

        assert_eq!(
            repo.get(THEME_KEY).await.unwrap(),
            Some(SettingValue::Text("light".into()))
        );
        assert_eq!(
            repo.get("notifications").await.unwrap(),
            Some(SettingValue::Bool(true))
        );
        assert_eq!(repo.list().await.unwrap().len(), 2);
    }
}

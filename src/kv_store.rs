use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::db::{self, SqlitePool};
use crate::error::{MedAssistError, Result};
use crate::interfaces::storage::KeyValueStore;

diesel::table! {
    kv_store (key) {
        key -> Text,
        value -> Text,
        updated_at -> BigInt,
    }
}

#[derive(Insertable)]
#[diesel(table_name = kv_store)]
struct KvRow<'a> {
    key: &'a str,
    value: &'a str,
    updated_at: i64,
}

pub struct SqliteKvStore {
    pool: SqlitePool,
}

impl SqliteKvStore {
    pub async fn open(sqlite_path: impl AsRef<str>) -> Result<Self> {
        let pool = db::open_pool(sqlite_path.as_ref()).await?;
        Ok(Self::new(pool))
    }

    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl KeyValueStore for SqliteKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = db::conn(&self.pool).await?;
        kv_store::table
            .filter(kv_store::key.eq(key))
            .select(kv_store::value)
            .first::<String>(&mut conn)
            .await
            .optional()
            .map_err(|e| MedAssistError::Storage(e.to_string()))
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut conn = db::conn(&self.pool).await?;
        diesel::replace_into(kv_store::table)
            .values(&KvRow {
                key,
                value,
                updated_at: db::now_ts(),
            })
            .execute(&mut conn)
            .await
            .map_err(|e| MedAssistError::Storage(e.to_string()))?;
        Ok(())
    }
}

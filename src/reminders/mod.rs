use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::db::{self, SqlitePool, SqlitePooledConn};
use crate::domains::reminder::{parse_weekday, Reminder};
use crate::error::{MedAssistError, Result};
use crate::interfaces::services::ReminderStoreService;

mod schema;
use schema::medicine_reminders;

#[derive(Queryable)]
struct ReminderRow {
    #[allow(dead_code)]
    id: i32,
    medicine: String,
    times: String,
    days: String,
    number_of_days: Option<i32>,
    #[allow(dead_code)]
    created_at: i64,
}

#[derive(Insertable)]
#[diesel(table_name = medicine_reminders)]
struct NewReminder<'a> {
    medicine: &'a str,
    times: String,
    days: String,
    number_of_days: Option<i32>,
    created_at: i64,
}

/// Medicine reminders persisted in SQLite. Times and weekdays are stored as
/// JSON arrays (RFC 3339 instants, full weekday names).
pub struct SqliteReminderStore {
    pool: SqlitePool,
}

impl SqliteReminderStore {
    pub async fn open(sqlite_path: impl AsRef<str>) -> Result<Self> {
        let pool = db::open_pool(sqlite_path.as_ref()).await?;
        Ok(Self::new(pool))
    }

    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn count(&self) -> Result<i64> {
        let mut conn = self.conn().await?;
        medicine_reminders::table
            .count()
            .get_result(&mut conn)
            .await
            .map_err(|e| MedAssistError::Storage(e.to_string()))
    }

    async fn conn(&self) -> Result<SqlitePooledConn<'_>> {
        db::conn(&self.pool).await
    }
}

#[async_trait]
impl ReminderStoreService for SqliteReminderStore {
    async fn save(&self, reminder: &Reminder) -> Result<()> {
        let number_of_days = reminder
            .number_of_days()
            .map(i32::try_from)
            .transpose()
            .map_err(|_| MedAssistError::Validation("number of days is too large".to_string()))?;
        let new = NewReminder {
            medicine: reminder.medicine_name(),
            times: serde_json::to_string(reminder.times())?,
            days: serde_json::to_string(&reminder.day_names())?,
            number_of_days,
            created_at: db::now_ts(),
        };

        let mut conn = self.conn().await?;
        diesel::insert_into(medicine_reminders::table)
            .values(&new)
            .execute(&mut conn)
            .await
            .map_err(|e| MedAssistError::Storage(e.to_string()))?;
        tracing::info!(medicine = reminder.medicine_name(), "saved medicine reminder");
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Reminder>> {
        let mut conn = self.conn().await?;
        let rows: Vec<ReminderRow> = medicine_reminders::table
            .order(medicine_reminders::id.asc())
            .load(&mut conn)
            .await
            .map_err(|e| MedAssistError::Storage(e.to_string()))?;
        rows.into_iter().map(map_row).collect()
    }
}

fn map_row(row: ReminderRow) -> Result<Reminder> {
    let times: Vec<DateTime<Utc>> = serde_json::from_str(&row.times)?;
    let day_names: Vec<String> = serde_json::from_str(&row.days)?;
    let days = day_names
        .iter()
        .map(|name| parse_weekday(name))
        .collect::<Result<Vec<_>>>()?;
    let number_of_days = row
        .number_of_days
        .map(u32::try_from)
        .transpose()
        .map_err(|_| MedAssistError::Storage("negative number_of_days".to_string()))?;
    Reminder::new(row.medicine, times, days, number_of_days)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Weekday};

    #[tokio::test]
    async fn saves_and_lists_both_schedule_modes() {
        let dir = tempfile::tempdir().expect("temp dir");
        let db_path = dir.path().join("reminders.db");
        let db_path = db_path.to_string_lossy().to_string();
        let store = SqliteReminderStore::open(&db_path).await.expect("store");

        let at = Utc.with_ymd_and_hms(2026, 3, 2, 8, 30, 0).unwrap();
        let weekly = Reminder::new(
            "Vitamin D",
            vec![at],
            vec![Weekday::Mon, Weekday::Thu],
            None,
        )
        .unwrap();
        let counted = Reminder::new("Amoxicillin", vec![at], Vec::new(), Some(7)).unwrap();

        store.save(&weekly).await.expect("save weekly");
        store.save(&counted).await.expect("save counted");

        let listed = store.list().await.expect("list");
        assert_eq!(listed, vec![weekly, counted]);
        assert_eq!(store.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn resubmission_creates_a_new_row() {
        let dir = tempfile::tempdir().expect("temp dir");
        let db_path = dir.path().join("nested").join("reminders.db");
        let store = SqliteReminderStore::open(db_path.to_string_lossy())
            .await
            .expect("store");

        let at = Utc.with_ymd_and_hms(2026, 3, 2, 8, 30, 0).unwrap();
        let reminder = Reminder::new("Aspirin", vec![at], Vec::new(), Some(3)).unwrap();
        store.save(&reminder).await.unwrap();
        store.save(&reminder).await.unwrap();
        assert_eq!(store.count().await.unwrap(), 2);
    }
}

use super::Database;
use sqlx::Error as SqlxError;

/// Persisted reminder configuration for one guild scheduled event.
///
/// Each `noti_*` column holds the absolute unix timestamp at which that
/// reminder fires (event start minus the offset), or NULL when unarmed.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct EventNotification {
    pub event_id: i64,
    pub guild_id: i64,
    pub event_name: String,
    /// Unix timestamp of the event start
    pub event_time: i64,
    pub channel_id: i64,
    /// Role to mention; the guild id itself means everyone, NULL none
    pub role_id: Option<i64>,
    pub noti_5m: Option<i64>,
    pub noti_15m: Option<i64>,
    pub noti_30m: Option<i64>,
    pub noti_1h: Option<i64>,
    pub noti_custom: Option<i64>,
}

impl EventNotification {
    /// All armed reminder timestamps
    pub fn armed(&self) -> Vec<i64> {
        [
            self.noti_5m,
            self.noti_15m,
            self.noti_30m,
            self.noti_1h,
            self.noti_custom,
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    /// The armed timestamp closest to `now`, with its distance
    pub fn closest_armed(&self, now: i64) -> Option<(i64, i64)> {
        self.armed()
            .into_iter()
            .map(|ts| (ts, (now - ts).abs()))
            .min_by_key(|(_, diff)| *diff)
    }
}

/// Recurrence rule attached to a guild scheduled event
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct EventRecurrence {
    pub event_id: i64,
    /// Interval string in `1w 2d 3h 4m` form
    pub recurrence_rule: String,
}

impl Database {
    /// Insert or replace the reminder row of an event
    pub async fn upsert_notification(
        &self,
        notification: &EventNotification,
    ) -> Result<(), SqlxError> {
        sqlx::query(
            r#"
            INSERT INTO event_notifications
                (event_id, guild_id, event_name, event_time, channel_id,
                 role_id, noti_5m, noti_15m, noti_30m, noti_1h, noti_custom)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(event_id) DO UPDATE SET
                guild_id = excluded.guild_id,
                event_name = excluded.event_name,
                event_time = excluded.event_time,
                channel_id = excluded.channel_id,
                role_id = excluded.role_id,
                noti_5m = excluded.noti_5m,
                noti_15m = excluded.noti_15m,
                noti_30m = excluded.noti_30m,
                noti_1h = excluded.noti_1h,
                noti_custom = excluded.noti_custom
            "#,
        )
        .bind(notification.event_id)
        .bind(notification.guild_id)
        .bind(&notification.event_name)
        .bind(notification.event_time)
        .bind(notification.channel_id)
        .bind(notification.role_id)
        .bind(notification.noti_5m)
        .bind(notification.noti_15m)
        .bind(notification.noti_30m)
        .bind(notification.noti_1h)
        .bind(notification.noti_custom)
        .execute(self.pool())
        .await?;

        Ok(())
    }

    pub async fn get_notification(
        &self,
        event_id: i64,
    ) -> Result<Option<EventNotification>, SqlxError> {
        sqlx::query_as("SELECT * FROM event_notifications WHERE event_id = ?")
            .bind(event_id)
            .fetch_optional(self.pool())
            .await
    }

    /// Every reminder row across all guilds (read by the reminder loop)
    pub async fn all_notifications(&self) -> Result<Vec<EventNotification>, SqlxError> {
        sqlx::query_as("SELECT * FROM event_notifications ORDER BY event_id")
            .fetch_all(self.pool())
            .await
    }

    /// Remove both the reminder and recurrence rows of an event
    pub async fn delete_event_rows(&self, event_id: i64) -> Result<(), SqlxError> {
        sqlx::query("DELETE FROM event_notifications WHERE event_id = ?")
            .bind(event_id)
            .execute(self.pool())
            .await?;
        sqlx::query("DELETE FROM event_recurrences WHERE event_id = ?")
            .bind(event_id)
            .execute(self.pool())
            .await?;

        Ok(())
    }

    /// Clear whichever reminder column holds `timestamp`, so a fired
    /// reminder cannot fire again on the next tick
    pub async fn disarm_timestamp(&self, event_id: i64, timestamp: i64) -> Result<(), SqlxError> {
        sqlx::query(
            r#"
            UPDATE event_notifications SET
                noti_5m = CASE WHEN noti_5m = ?2 THEN NULL ELSE noti_5m END,
                noti_15m = CASE WHEN noti_15m = ?2 THEN NULL ELSE noti_15m END,
                noti_30m = CASE WHEN noti_30m = ?2 THEN NULL ELSE noti_30m END,
                noti_1h = CASE WHEN noti_1h = ?2 THEN NULL ELSE noti_1h END,
                noti_custom = CASE WHEN noti_custom = ?2 THEN NULL ELSE noti_custom END
            WHERE event_id = ?1
            "#,
        )
        .bind(event_id)
        .bind(timestamp)
        .execute(self.pool())
        .await?;

        Ok(())
    }

    /// Drop reminder rows whose event start lies before `cutoff`
    pub async fn prune_stale_notifications(&self, cutoff: i64) -> Result<u64, SqlxError> {
        let result = sqlx::query("DELETE FROM event_notifications WHERE event_time < ?")
            .bind(cutoff)
            .execute(self.pool())
            .await?;

        Ok(result.rows_affected())
    }

    pub async fn get_recurrence(
        &self,
        event_id: i64,
    ) -> Result<Option<EventRecurrence>, SqlxError> {
        sqlx::query_as("SELECT * FROM event_recurrences WHERE event_id = ?")
            .bind(event_id)
            .fetch_optional(self.pool())
            .await
    }

    pub async fn all_recurrences(&self) -> Result<Vec<EventRecurrence>, SqlxError> {
        sqlx::query_as("SELECT * FROM event_recurrences ORDER BY event_id")
            .fetch_all(self.pool())
            .await
    }

    /// Set the recurrence rule of an event; returns the replaced rule when
    /// the event already had one
    pub async fn upsert_recurrence(
        &self,
        event_id: i64,
        rule: &str,
    ) -> Result<Option<String>, SqlxError> {
        let old = self
            .get_recurrence(event_id)
            .await?
            .map(|r| r.recurrence_rule);

        sqlx::query(
            r#"
            INSERT INTO event_recurrences (event_id, recurrence_rule)
            VALUES (?, ?)
            ON CONFLICT(event_id) DO UPDATE SET recurrence_rule = excluded.recurrence_rule
            "#,
        )
        .bind(event_id)
        .bind(rule)
        .execute(self.pool())
        .await?;

        Ok(old)
    }

    /// Re-point a recurrence row at a freshly created follow-up event
    pub async fn repoint_recurrence(
        &self,
        old_event_id: i64,
        new_event_id: i64,
    ) -> Result<(), SqlxError> {
        sqlx::query("UPDATE event_recurrences SET event_id = ? WHERE event_id = ?")
            .bind(new_event_id)
            .bind(old_event_id)
            .execute(self.pool())
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_db() -> Database {
        Database::new("sqlite::memory:").await.expect("in-memory db")
    }

    fn sample(event_id: i64, event_time: i64) -> EventNotification {
        EventNotification {
            event_id,
            guild_id: 1,
            event_name: "Foundry battle".to_string(),
            event_time,
            channel_id: 100,
            role_id: None,
            noti_5m: Some(event_time - 300),
            noti_15m: None,
            noti_30m: Some(event_time - 1_800),
            noti_1h: None,
            noti_custom: None,
        }
    }

    #[test]
    fn test_armed_skips_null_offsets() {
        let notification = sample(1, 10_000);
        assert_eq!(notification.armed(), vec![9_700, 8_200]);
    }

    #[test]
    fn test_closest_armed_picks_minimum_distance() {
        let notification = sample(1, 10_000);
        assert_eq!(notification.closest_armed(9_690), Some((9_700, 10)));
        assert_eq!(notification.closest_armed(8_000), Some((8_200, 200)));
    }

    #[test]
    fn test_closest_armed_empty_when_nothing_armed() {
        let mut notification = sample(1, 10_000);
        notification.noti_5m = None;
        notification.noti_30m = None;
        assert_eq!(notification.closest_armed(9_000), None);
    }

    #[tokio::test]
    async fn test_upsert_notification_replaces_existing_row() {
        let db = test_db().await;
        db.upsert_notification(&sample(7, 10_000)).await.unwrap();

        let mut updated = sample(7, 10_000);
        updated.channel_id = 200;
        updated.noti_5m = None;
        db.upsert_notification(&updated).await.unwrap();

        let row = db.get_notification(7).await.unwrap().unwrap();
        assert_eq!(row.channel_id, 200);
        assert_eq!(row.noti_5m, None);
        assert_eq!(db.all_notifications().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_event_rows_clears_both_tables() {
        let db = test_db().await;
        db.upsert_notification(&sample(7, 10_000)).await.unwrap();
        db.upsert_recurrence(7, "1w").await.unwrap();

        db.delete_event_rows(7).await.unwrap();

        assert!(db.get_notification(7).await.unwrap().is_none());
        assert!(db.get_recurrence(7).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_disarm_timestamp_clears_only_the_fired_column() {
        let db = test_db().await;
        db.upsert_notification(&sample(7, 10_000)).await.unwrap();

        db.disarm_timestamp(7, 9_700).await.unwrap();

        let row = db.get_notification(7).await.unwrap().unwrap();
        assert_eq!(row.noti_5m, None);
        assert_eq!(row.noti_30m, Some(8_200));
    }

    #[tokio::test]
    async fn test_prune_stale_notifications() {
        let db = test_db().await;
        db.upsert_notification(&sample(1, 1_000)).await.unwrap();
        db.upsert_notification(&sample(2, 50_000)).await.unwrap();

        let pruned = db.prune_stale_notifications(10_000).await.unwrap();
        assert_eq!(pruned, 1);
        assert!(db.get_notification(1).await.unwrap().is_none());
        assert!(db.get_notification(2).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_upsert_recurrence_reports_old_rule() {
        let db = test_db().await;
        assert_eq!(db.upsert_recurrence(7, "1w").await.unwrap(), None);
        assert_eq!(
            db.upsert_recurrence(7, "2d").await.unwrap(),
            Some("1w".to_string())
        );

        let row = db.get_recurrence(7).await.unwrap().unwrap();
        assert_eq!(row.recurrence_rule, "2d");
    }

    #[tokio::test]
    async fn test_repoint_recurrence() {
        let db = test_db().await;
        db.upsert_recurrence(7, "1w").await.unwrap();

        db.repoint_recurrence(7, 8).await.unwrap();

        assert!(db.get_recurrence(7).await.unwrap().is_none());
        assert_eq!(
            db.get_recurrence(8).await.unwrap().unwrap().recurrence_rule,
            "1w"
        );
    }
}

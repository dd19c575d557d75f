use super::Database;
use sqlx::Error as SqlxError;

/// Persisted scheduled announcement row
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ScheduledMessage {
    pub id: i64,
    pub guild_id: i64,
    pub title: String,
    pub content: Option<String>,
    pub image: Option<String>,
    /// Role id to mention; -1 means everyone, NULL means no mention
    pub mention: Option<i64>,
    pub channel_id: i64,
    /// Seconds between posts
    pub interval: i64,
    pub initial_datetime: i64,
    /// Unix timestamp of the next fire
    pub next_post: i64,
    pub is_active: bool,
}

/// Fields of a new scheduled announcement
#[derive(Debug, Clone)]
pub struct NewScheduledMessage {
    pub guild_id: i64,
    pub title: String,
    pub content: Option<String>,
    pub image: Option<String>,
    pub mention: Option<i64>,
    pub channel_id: i64,
    pub interval: i64,
    pub initial_datetime: i64,
    pub next_post: i64,
}

impl Database {
    /// Insert a new scheduled announcement, returning its row id
    pub async fn create_message(&self, message: &NewScheduledMessage) -> Result<i64, SqlxError> {
        let result = sqlx::query(
            r#"
            INSERT INTO messages
                (guild_id, title, content, image, mention, channel_id,
                 interval, initial_datetime, next_post, is_active)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, 1)
            "#,
        )
        .bind(message.guild_id)
        .bind(&message.title)
        .bind(&message.content)
        .bind(&message.image)
        .bind(message.mention)
        .bind(message.channel_id)
        .bind(message.interval)
        .bind(message.initial_datetime)
        .bind(message.next_post)
        .execute(self.pool())
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// All scheduled announcements of a guild, oldest first
    pub async fn guild_messages(&self, guild_id: i64) -> Result<Vec<ScheduledMessage>, SqlxError> {
        sqlx::query_as("SELECT * FROM messages WHERE guild_id = ? ORDER BY id")
            .bind(guild_id)
            .fetch_all(self.pool())
            .await
    }

    /// One announcement by id, scoped to its guild
    pub async fn get_message(
        &self,
        id: i64,
        guild_id: i64,
    ) -> Result<Option<ScheduledMessage>, SqlxError> {
        sqlx::query_as("SELECT * FROM messages WHERE id = ? AND guild_id = ?")
            .bind(id)
            .bind(guild_id)
            .fetch_optional(self.pool())
            .await
    }

    /// Flip the active flag; returns the new state, or None for unknown ids
    pub async fn toggle_message(
        &self,
        id: i64,
        guild_id: i64,
    ) -> Result<Option<bool>, SqlxError> {
        let Some(message) = self.get_message(id, guild_id).await? else {
            return Ok(None);
        };

        let new_state = !message.is_active;
        sqlx::query("UPDATE messages SET is_active = ? WHERE id = ? AND guild_id = ?")
            .bind(new_state)
            .bind(id)
            .bind(guild_id)
            .execute(self.pool())
            .await?;

        Ok(Some(new_state))
    }

    /// Delete an announcement; returns whether a row was removed
    pub async fn delete_message(&self, id: i64, guild_id: i64) -> Result<bool, SqlxError> {
        let result = sqlx::query("DELETE FROM messages WHERE id = ? AND guild_id = ?")
            .bind(id)
            .bind(guild_id)
            .execute(self.pool())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Active announcements whose next fire lies at or before `now`
    pub async fn due_messages(&self, now: i64) -> Result<Vec<ScheduledMessage>, SqlxError> {
        sqlx::query_as("SELECT * FROM messages WHERE is_active = 1 AND next_post <= ? ORDER BY id")
            .bind(now)
            .fetch_all(self.pool())
            .await
    }

    /// Advance an announcement's next fire by exactly one interval.
    ///
    /// The new instant is derived from the stored timestamp, never from
    /// the wall clock, so delayed ticks do not drift the schedule.
    pub async fn advance_next_post(&self, id: i64) -> Result<(), SqlxError> {
        sqlx::query("UPDATE messages SET next_post = next_post + interval WHERE id = ?")
            .bind(id)
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

    fn sample(guild_id: i64, next_post: i64, interval: i64) -> NewScheduledMessage {
        NewScheduledMessage {
            guild_id,
            title: "Bear trap".to_string(),
            content: Some("Rally at the trap".to_string()),
            image: None,
            mention: Some(-1),
            channel_id: 100,
            interval,
            initial_datetime: next_post,
            next_post,
        }
    }

    #[tokio::test]
    async fn test_create_and_list_messages() {
        let db = test_db().await;
        let id = db.create_message(&sample(1, 1_000, 600)).await.unwrap();
        assert!(id > 0);

        let rows = db.guild_messages(1).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].title, "Bear trap");
        assert_eq!(rows[0].mention, Some(-1));
        assert!(rows[0].is_active);

        assert!(db.guild_messages(2).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_due_selection_honors_next_post_and_active_flag() {
        let db = test_db().await;
        let due = db.create_message(&sample(1, 1_000, 600)).await.unwrap();
        db.create_message(&sample(1, 5_000, 600)).await.unwrap();
        let toggled = db.create_message(&sample(1, 900, 600)).await.unwrap();
        db.toggle_message(toggled, 1).await.unwrap();

        let rows = db.due_messages(1_000).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, due);
    }

    #[tokio::test]
    async fn test_advance_adds_interval_to_stored_timestamp() {
        let db = test_db().await;
        let id = db.create_message(&sample(1, 1_000, 600)).await.unwrap();

        // Simulates a tick observed late, at t=1900: the next fire must be
        // 1600 (T + I), not 2500 (now + I)
        db.advance_next_post(id).await.unwrap();
        let row = db.get_message(id, 1).await.unwrap().unwrap();
        assert_eq!(row.next_post, 1_600);

        db.advance_next_post(id).await.unwrap();
        let row = db.get_message(id, 1).await.unwrap().unwrap();
        assert_eq!(row.next_post, 2_200);
    }

    #[tokio::test]
    async fn test_toggle_flips_and_reports_state() {
        let db = test_db().await;
        let id = db.create_message(&sample(1, 1_000, 600)).await.unwrap();

        assert_eq!(db.toggle_message(id, 1).await.unwrap(), Some(false));
        assert_eq!(db.toggle_message(id, 1).await.unwrap(), Some(true));
        assert_eq!(db.toggle_message(999, 1).await.unwrap(), None);
        // Wrong guild never touches the row
        assert_eq!(db.toggle_message(id, 2).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_delete_is_guild_scoped() {
        let db = test_db().await;
        let id = db.create_message(&sample(1, 1_000, 600)).await.unwrap();

        assert!(!db.delete_message(id, 2).await.unwrap());
        assert!(db.delete_message(id, 1).await.unwrap());
        assert!(!db.delete_message(id, 1).await.unwrap());
    }
}

use super::Database;
use sqlx::Error as SqlxError;

impl Database {
    /// Run database migrations to create tables
    pub(super) async fn run_migrations(&self) -> Result<(), SqlxError> {
        self.create_messages_table().await?;
        self.create_event_tables().await?;
        Ok(())
    }

    async fn create_messages_table(&self) -> Result<(), SqlxError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS messages (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                guild_id INTEGER NOT NULL,
                title TEXT NOT NULL,
                content TEXT,
                image TEXT,
                mention INTEGER,
                channel_id INTEGER NOT NULL,
                interval INTEGER NOT NULL,
                initial_datetime INTEGER NOT NULL,
                next_post INTEGER NOT NULL,
                is_active INTEGER NOT NULL DEFAULT 1
            )
            "#,
        )
        .execute(self.pool())
        .await?;

        Ok(())
    }

    async fn create_event_tables(&self) -> Result<(), SqlxError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS event_notifications (
                event_id INTEGER PRIMARY KEY,
                guild_id INTEGER NOT NULL,
                event_name TEXT NOT NULL,
                event_time INTEGER NOT NULL,
                channel_id INTEGER NOT NULL,
                role_id INTEGER,
                noti_5m INTEGER,
                noti_15m INTEGER,
                noti_30m INTEGER,
                noti_1h INTEGER,
                noti_custom INTEGER
            )
            "#,
        )
        .execute(self.pool())
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS event_recurrences (
                event_id INTEGER PRIMARY KEY,
                recurrence_rule TEXT NOT NULL
            )
            "#,
        )
        .execute(self.pool())
        .await?;

        Ok(())
    }
}

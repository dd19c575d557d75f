use std::sync::Arc;

use poise::serenity_prelude::{ChannelId, CreateMessage, Http};
use tokio::time::{interval, Duration};
use tracing::{error, info, warn};

use crate::{
    constants::{REMINDER_RETENTION_SECS, REMINDER_WINDOW_SECS, SCHEDULE_TICK_SECS},
    database::EventNotification,
    models::{Data, Error},
    utils::datetime::unix_now,
    utils::interval::interval_to_words,
};

/// Reminder loop: every tick, fire reminders whose armed timestamp falls
/// inside the firing window and prune rows of long-past events
pub async fn run(http: Arc<Http>, data: Data) {
    let mut ticker = interval(Duration::from_secs(SCHEDULE_TICK_SECS));
    loop {
        ticker.tick().await;
        if let Err(e) = fire_due_reminders(&http, &data).await {
            error!("Reminder tick failed: {}", e);
        }
    }
}

async fn fire_due_reminders(http: &Arc<Http>, data: &Data) -> Result<(), Error> {
    let now = unix_now();

    for row in data.db.all_notifications().await? {
        let Some((timestamp, distance)) = row.closest_armed(now) else {
            continue;
        };
        if distance > REMINDER_WINDOW_SECS {
            continue;
        }

        let channel = ChannelId::new(row.channel_id as u64);
        let content = reminder_message(&row, timestamp);
        match channel.send_message(http, CreateMessage::new().content(content)).await {
            Ok(_) => info!(
                "Fired reminder for event {} in channel {}",
                row.event_id, channel
            ),
            Err(e) => warn!(
                "Skipping reminder for event {}: channel {} unavailable ({})",
                row.event_id, channel, e
            ),
        }

        data.db.disarm_timestamp(row.event_id, timestamp).await?;
    }

    let pruned = data
        .db
        .prune_stale_notifications(now - REMINDER_RETENTION_SECS)
        .await?;
    if pruned > 0 {
        info!("Pruned {} stale reminder rows", pruned);
    }

    Ok(())
}

/// Reminder text: optional mention line, then "name starts in offset"
fn reminder_message(row: &EventNotification, fired_timestamp: i64) -> String {
    let offset = interval_to_words(row.event_time - fired_timestamp);
    let mention = match row.role_id {
        Some(id) if id == row.guild_id => Some("@everyone".to_string()),
        Some(id) => Some(format!("<@&{}>", id)),
        None => None,
    };

    match mention {
        Some(line) => format!("{}\n**{}** starts in {}", line, row.event_name, offset),
        None => format!("**{}** starts in {}", row.event_name, offset),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(role_id: Option<i64>) -> EventNotification {
        EventNotification {
            event_id: 7,
            guild_id: 1,
            event_name: "Bear trap".to_string(),
            event_time: 10_000,
            channel_id: 100,
            role_id,
            noti_5m: Some(9_700),
            noti_15m: None,
            noti_30m: None,
            noti_1h: None,
            noti_custom: None,
        }
    }

    #[test]
    fn test_reminder_message_with_role() {
        assert_eq!(
            reminder_message(&row(Some(42)), 9_700),
            "<@&42>\n**Bear trap** starts in 5 minutes"
        );
    }

    #[test]
    fn test_reminder_message_guild_role_means_everyone() {
        assert_eq!(
            reminder_message(&row(Some(1)), 9_700),
            "@everyone\n**Bear trap** starts in 5 minutes"
        );
    }

    #[test]
    fn test_reminder_message_without_role() {
        assert_eq!(
            reminder_message(&row(None), 9_700),
            "**Bear trap** starts in 5 minutes"
        );
    }
}

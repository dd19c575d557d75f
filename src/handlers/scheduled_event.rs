use poise::serenity_prelude::{
    self as serenity, CreateAttachment, CreateScheduledEvent, ScheduledEvent,
    ScheduledEventStatus, ScheduledEventType, Timestamp,
};
use tracing::{error, info, warn};

use crate::{
    database::EventNotification,
    models::{Data, Error},
    utils::datetime::unix_now,
    utils::interval::parse_interval,
};

/// A scheduled event was deleted: drop its reminder and recurrence rows
pub async fn handle_scheduled_event_delete(event: &ScheduledEvent, data: &Data) {
    let event_id = event.id.get() as i64;
    match data.db.delete_event_rows(event_id).await {
        Ok(()) => info!("Cleaned up rows for deleted event {}", event_id),
        Err(e) => error!("Failed to clean up rows for deleted event {}: {}", event_id, e),
    }
}

/// A scheduled event changed: when it completed and carries a recurrence
/// rule, re-create it shifted by the rule and move the reminders along
pub async fn handle_scheduled_event_update(
    ctx: &serenity::Context,
    event: &ScheduledEvent,
    data: &Data,
) {
    if event.status != ScheduledEventStatus::Completed {
        return;
    }

    if let Err(e) = recreate_recurring_event(ctx, event, data).await {
        error!("Failed to recreate recurring event {}: {}", event.id, e);
    }
}

async fn recreate_recurring_event(
    ctx: &serenity::Context,
    event: &ScheduledEvent,
    data: &Data,
) -> Result<(), Error> {
    let old_id = event.id.get() as i64;
    let Some(recurrence) = data.db.get_recurrence(old_id).await? else {
        return Ok(());
    };
    let shift = match parse_interval(&recurrence.recurrence_rule) {
        Ok(shift) => shift,
        Err(_) => {
            warn!(
                "Event {} has unparseable recurrence rule {:?}",
                old_id, recurrence.recurrence_rule
            );
            return Ok(());
        }
    };

    let old_start = event.start_time.unix_timestamp();
    let new_start = roll_forward(old_start, shift, unix_now());
    let delta = new_start - old_start;

    let mut builder = CreateScheduledEvent::new(
        event.kind,
        &event.name,
        Timestamp::from_unix_timestamp(new_start)?,
    );
    if let Some(description) = &event.description {
        builder = builder.description(description);
    }
    match event.kind {
        ScheduledEventType::External => {
            if let Some(location) = event.metadata.as_ref().and_then(|m| m.location.clone()) {
                builder = builder.location(location);
            }
            let end = event
                .end_time
                .map(|t| t.unix_timestamp() + delta)
                .unwrap_or(new_start + 3_600);
            builder = builder.end_time(Timestamp::from_unix_timestamp(end)?);
        }
        _ => {
            if let Some(channel_id) = event.channel_id {
                builder = builder.channel_id(channel_id);
            }
        }
    }
    // Cover image carries over when the CDN asset is still fetchable
    if let Some(hash) = &event.image {
        let url = format!(
            "https://cdn.discordapp.com/guild-events/{}/{}.png",
            event.id, hash
        );
        match CreateAttachment::url(ctx, &url).await {
            Ok(attachment) => builder = builder.image(&attachment),
            Err(e) => warn!("Could not fetch cover image of event {}: {}", old_id, e),
        }
    }

    let new_event = event
        .guild_id
        .create_scheduled_event(ctx, builder)
        .await?;
    let new_id = new_event.id.get() as i64;
    info!(
        "Recreated recurring event {} as {} (+{}s)",
        old_id, new_id, delta
    );

    data.db.repoint_recurrence(old_id, new_id).await?;

    if let Some(row) = data.db.get_notification(old_id).await? {
        data.db
            .upsert_notification(&shifted_row(&row, new_id, delta))
            .await?;
    }
    data.db.delete_event_rows(old_id).await?;

    Ok(())
}

/// First occurrence after `now`, stepping by `shift` from `start`
fn roll_forward(start: i64, shift: i64, now: i64) -> i64 {
    let mut next = start + shift;
    while next <= now {
        next += shift;
    }
    next
}

/// Move a reminder row onto a re-created event: new id, every armed
/// timestamp shifted with the start time
fn shifted_row(row: &EventNotification, new_event_id: i64, delta: i64) -> EventNotification {
    EventNotification {
        event_id: new_event_id,
        guild_id: row.guild_id,
        event_name: row.event_name.clone(),
        event_time: row.event_time + delta,
        channel_id: row.channel_id,
        role_id: row.role_id,
        noti_5m: row.noti_5m.map(|ts| ts + delta),
        noti_15m: row.noti_15m.map(|ts| ts + delta),
        noti_30m: row.noti_30m.map(|ts| ts + delta),
        noti_1h: row.noti_1h.map(|ts| ts + delta),
        noti_custom: row.noti_custom.map(|ts| ts + delta),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roll_forward_single_step() {
        assert_eq!(roll_forward(1_000, 600, 1_100), 1_600);
    }

    #[test]
    fn test_roll_forward_skips_past_occurrences() {
        // Event completed long after its start; the next occurrence must
        // land in the future, not in the past
        assert_eq!(roll_forward(1_000, 600, 3_000), 3_400);
    }

    #[test]
    fn test_shifted_row_moves_armed_timestamps_only() {
        let row = EventNotification {
            event_id: 7,
            guild_id: 1,
            event_name: "Foundry battle".to_string(),
            event_time: 10_000,
            channel_id: 100,
            role_id: Some(42),
            noti_5m: Some(9_700),
            noti_15m: None,
            noti_30m: Some(8_200),
            noti_1h: None,
            noti_custom: None,
        };

        let shifted = shifted_row(&row, 8, 600);
        assert_eq!(shifted.event_id, 8);
        assert_eq!(shifted.event_time, 10_600);
        assert_eq!(shifted.noti_5m, Some(10_300));
        assert_eq!(shifted.noti_15m, None);
        assert_eq!(shifted.noti_30m, Some(8_800));
        assert_eq!(shifted.role_id, Some(42));
    }
}

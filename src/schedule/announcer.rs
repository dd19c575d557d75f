use std::sync::Arc;

use poise::serenity_prelude::{ChannelId, CreateMessage, Http};
use tokio::time::{interval, Duration};
use tracing::{error, info, warn};

use crate::{
    constants::SCHEDULE_TICK_SECS,
    models::{Data, Error},
    utils::datetime::unix_now,
    utils::embeds::{announcement_embed, mention_line},
};

/// Announcement loop: every tick, post all due scheduled messages and
/// advance their next fire by one interval
pub async fn run(http: Arc<Http>, data: Data) {
    let mut ticker = interval(Duration::from_secs(SCHEDULE_TICK_SECS));
    loop {
        ticker.tick().await;
        if let Err(e) = post_due_messages(&http, &data).await {
            error!("Announcer tick failed: {}", e);
        }
    }
}

async fn post_due_messages(http: &Arc<Http>, data: &Data) -> Result<(), Error> {
    let due = data.db.due_messages(unix_now()).await?;
    if due.is_empty() {
        return Ok(());
    }

    let bot = http.get_current_user().await?;
    let author_icon = bot.face();

    for message in due {
        let embed = announcement_embed(
            &message.title,
            message.content.as_deref(),
            message.image.as_deref(),
            &bot.name,
            &author_icon,
            message.next_post,
        );
        let mut builder = CreateMessage::new().embed(embed);
        if let Some(line) = mention_line(message.mention) {
            builder = builder.content(line);
        }

        let channel = ChannelId::new(message.channel_id as u64);
        match channel.send_message(http, builder).await {
            Ok(_) => info!(
                "Posted scheduled message {} to channel {}",
                message.id, channel
            ),
            // The channel may have been deleted; the row keeps its cadence
            Err(e) => warn!(
                "Skipping scheduled message {}: channel {} unavailable ({})",
                message.id, channel, e
            ),
        }

        // Always T + I from the stored timestamp, never now + I
        data.db.advance_next_post(message.id).await?;
    }

    Ok(())
}

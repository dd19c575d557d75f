use chrono::Utc;
use poise::serenity_prelude::{Colour, CreateEmbed, GuildChannel, Role};
use poise::CreateReply;
use tracing::{error, info};

use crate::{
    constants::PAGE_SIZE,
    database::{NewScheduledMessage, ScheduledMessage},
    models::{Context, Error},
    utils::datetime::{discord_timestamp, parse_datetime},
    utils::interval::{format_interval, parse_interval},
    utils::messages::{format_error, format_info, format_success},
    utils::pagination::{page_count, Pager, PagerPage},
    utils::translator::{Localize, Translator, DEFAULT_LOCALE},
};

/// Manage recurring announcement messages
#[poise::command(
    slash_command,
    guild_only,
    required_permissions = "MANAGE_MESSAGES",
    subcommands("plan", "list", "toggle", "delete"),
    subcommand_required
)]
pub async fn schedule(_ctx: Context<'_>) -> Result<(), Error> {
    Ok(())
}

/// Plan a recurring announcement
#[poise::command(slash_command)]
pub async fn plan(
    ctx: Context<'_>,
    #[description = "Title of the announcement embed"] title: String,
    #[description = "Repeat interval, e.g. 1w 2d 3h 4m"] interval: String,
    #[description = "Body text of the announcement"] content: Option<String>,
    #[description = "Channel to post in (default: this channel)"]
    #[channel_types("Text")]
    channel: Option<GuildChannel>,
    #[description = "First post, DD/MM HH:MM or HH:MM in UTC (default: now + interval)"]
    start: Option<String>,
    #[description = "Image URL shown in the embed"] image: Option<String>,
    #[description = "Role to ping (pick @everyone to ping everyone)"] mention: Option<Role>,
) -> Result<(), Error> {
    let Some(guild_id) = ctx.guild_id() else {
        ctx.say(format_error(&ctx.tr("This command must be used in a server")))
            .await?;
        return Ok(());
    };

    let interval_secs = match parse_interval(&interval) {
        Ok(secs) => secs,
        Err(e) => {
            ctx.say(format_error(&ctx.tr(&e.to_string()))).await?;
            return Ok(());
        }
    };

    let now = Utc::now();
    let initial = match &start {
        Some(raw) => {
            let parsed = match parse_datetime(raw, now) {
                Ok(parsed) => parsed,
                Err(e) => {
                    ctx.say(format_error(&ctx.tr(&e.to_string()))).await?;
                    return Ok(());
                }
            };
            if parsed < now {
                ctx.say(format_error(&ctx.tr("The start date must not be in the past.")))
                    .await?;
                return Ok(());
            }
            parsed.timestamp()
        }
        None => now.timestamp(),
    };

    // An explicit future start fires at that instant; without one the first
    // post lands one interval from now
    let next_post = if start.is_some() {
        initial
    } else {
        initial + interval_secs
    };

    // The @everyone role shares its id with the guild; stored as -1
    let mention_value = mention.as_ref().map(|role| {
        if role.id.get() == guild_id.get() {
            -1
        } else {
            role.id.get() as i64
        }
    });

    let channel_id = channel
        .as_ref()
        .map(|c| c.id)
        .unwrap_or_else(|| ctx.channel_id());

    let new_message = NewScheduledMessage {
        guild_id: guild_id.get() as i64,
        title: title.clone(),
        content,
        image,
        mention: mention_value,
        channel_id: channel_id.get() as i64,
        interval: interval_secs,
        initial_datetime: initial,
        next_post,
    };

    let id = match ctx.data().db.create_message(&new_message).await {
        Ok(id) => id,
        Err(e) => {
            error!("Failed to store scheduled message: {}", e);
            ctx.say(format_error(&ctx.tr("A database error occurred. Please try again later.")))
                .await?;
            return Ok(());
        }
    };

    info!(
        "Planned scheduled message {} in guild {} every {}",
        id,
        guild_id,
        format_interval(interval_secs)
    );

    let summary = ctx.tr_with(
        "Announcement **{title}** planned in {channel}",
        &[
            ("title", title),
            ("channel", format!("<#{}>", channel_id)),
        ],
    );
    let embed = CreateEmbed::new()
        .title(format!("#{}", id))
        .description(format!(
            "{}\n\nNext post:\n{}\nRepeats every {}",
            summary,
            discord_timestamp(next_post),
            format_interval(interval_secs)
        ))
        .colour(Colour::BLUE);
    ctx.send(CreateReply::default().embed(embed)).await?;

    Ok(())
}

/// List this server's scheduled announcements
#[poise::command(slash_command)]
pub async fn list(ctx: Context<'_>) -> Result<(), Error> {
    let Some(guild_id) = ctx.guild_id() else {
        ctx.say(format_error(&ctx.tr("This command must be used in a server")))
            .await?;
        return Ok(());
    };

    let messages = match ctx.data().db.guild_messages(guild_id.get() as i64).await {
        Ok(messages) => messages,
        Err(e) => {
            error!("Failed to list scheduled messages: {}", e);
            ctx.say(format_error(&ctx.tr("A database error occurred. Please try again later.")))
                .await?;
            return Ok(());
        }
    };

    if messages.is_empty() {
        ctx.say(format_info(&ctx.tr("No scheduled announcements in this server yet.")))
            .await?;
        return Ok(());
    }

    let locale = ctx.locale().unwrap_or(DEFAULT_LOCALE);
    let pager = Pager::new(schedule_pages(&messages, &ctx.data().translator, locale));
    let reply = ctx
        .send(
            CreateReply::default()
                .embed(pager.current_page().embed.clone())
                .components(pager.rows()),
        )
        .await?;
    let message = reply.message().await?;
    ctx.data().park_pager(message.id, pager);

    Ok(())
}

/// Pause or resume a scheduled announcement
#[poise::command(slash_command)]
pub async fn toggle(
    ctx: Context<'_>,
    #[description = "Id shown by /schedule list"] id: i64,
) -> Result<(), Error> {
    let Some(guild_id) = ctx.guild_id() else {
        ctx.say(format_error(&ctx.tr("This command must be used in a server")))
            .await?;
        return Ok(());
    };

    let id_arg = [("id", id.to_string())];
    match ctx.data().db.toggle_message(id, guild_id.get() as i64).await {
        Ok(Some(true)) => {
            ctx.say(format_success(&ctx.tr_with("Announcement #{id} resumed", &id_arg)))
                .await?;
        }
        Ok(Some(false)) => {
            ctx.say(format_success(&ctx.tr_with("Announcement #{id} paused", &id_arg)))
                .await?;
        }
        Ok(None) => {
            ctx.say(format_error(&ctx.tr_with("No announcement #{id} in this server", &id_arg)))
                .await?;
        }
        Err(e) => {
            error!("Failed to toggle scheduled message {}: {}", id, e);
            ctx.say(format_error(&ctx.tr("A database error occurred. Please try again later.")))
                .await?;
        }
    }

    Ok(())
}

/// Delete a scheduled announcement
#[poise::command(slash_command)]
pub async fn delete(
    ctx: Context<'_>,
    #[description = "Id shown by /schedule list"] id: i64,
) -> Result<(), Error> {
    let Some(guild_id) = ctx.guild_id() else {
        ctx.say(format_error(&ctx.tr("This command must be used in a server")))
            .await?;
        return Ok(());
    };

    let id_arg = [("id", id.to_string())];
    match ctx.data().db.delete_message(id, guild_id.get() as i64).await {
        Ok(true) => {
            ctx.say(format_success(&ctx.tr_with("Announcement #{id} deleted", &id_arg)))
                .await?;
        }
        Ok(false) => {
            ctx.say(format_error(&ctx.tr_with("No announcement #{id} in this server", &id_arg)))
                .await?;
        }
        Err(e) => {
            error!("Failed to delete scheduled message {}: {}", id, e);
            ctx.say(format_error(&ctx.tr("A database error occurred. Please try again later.")))
                .await?;
        }
    }

    Ok(())
}

/// Build the paginated list embeds, PAGE_SIZE rows per page
fn schedule_pages(
    messages: &[ScheduledMessage],
    translator: &Translator,
    locale: &str,
) -> Vec<PagerPage> {
    let pages = page_count(messages.len(), PAGE_SIZE);
    (0..pages)
        .map(|page| {
            let mut embed = CreateEmbed::new()
                .title(translator.translate(locale, "Scheduled announcements"))
                .colour(Colour::BLUE);
            for message in messages.iter().skip(page * PAGE_SIZE).take(PAGE_SIZE) {
                let state = if message.is_active { "Active" } else { "Paused" };
                embed = embed.field(
                    format!("#{} — {}", message.id, message.title),
                    translator.translate_with(
                        locale,
                        "{state} · {channel}\nNext: {next}\nEvery {interval}",
                        &[
                            ("state", translator.translate(locale, state)),
                            ("channel", format!("<#{}>", message.channel_id)),
                            ("next", format!("<t:{}:f>", message.next_post)),
                            ("interval", format_interval(message.interval)),
                        ],
                    ),
                    false,
                );
            }
            PagerPage {
                embed,
                extra_row: None,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(id: i64) -> ScheduledMessage {
        ScheduledMessage {
            id,
            guild_id: 1,
            title: format!("Message {}", id),
            content: None,
            image: None,
            mention: None,
            channel_id: 100,
            interval: 3_600,
            initial_datetime: 1_000,
            next_post: 4_600,
            is_active: true,
        }
    }

    #[test]
    fn test_schedule_pages_split_at_page_size() {
        let translator = Translator::from_tables(Default::default());

        let messages: Vec<_> = (1..=PAGE_SIZE as i64 + 2).map(sample).collect();
        assert_eq!(schedule_pages(&messages, &translator, DEFAULT_LOCALE).len(), 2);

        let messages: Vec<_> = (1..=PAGE_SIZE as i64).map(sample).collect();
        assert_eq!(schedule_pages(&messages, &translator, DEFAULT_LOCALE).len(), 1);
    }

    #[test]
    fn test_schedule_pages_use_the_locale_table() {
        let tables = serde_json::from_str(
            r#"{"pl": {"Scheduled announcements": "Zaplanowane ogłoszenia"}}"#,
        )
        .unwrap();
        let translator = Translator::from_tables(tables);

        let pages = schedule_pages(&[sample(1)], &translator, "pl");
        let raw = serde_json::to_value(&pages[0].embed).unwrap();
        assert_eq!(raw["title"], "Zaplanowane ogłoszenia");
    }
}

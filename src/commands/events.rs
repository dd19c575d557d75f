use poise::serenity_prelude::{
    Colour, CreateActionRow, CreateEmbed, CreateSelectMenu, CreateSelectMenuKind,
    CreateSelectMenuOption, ScheduledEvent, ScheduledEventStatus,
};
use poise::CreateReply;
use tracing::error;

use crate::{
    constants::PAGE_SIZE,
    models::{Context, Error},
    utils::datetime::unix_now,
    utils::messages::{format_error, format_info},
    utils::pagination::{page_count, Pager, PagerPage},
    utils::translator::{Localize, Translator, DEFAULT_LOCALE},
};

/// Custom id of the event select on the `/event notification` list
pub const PICK_EVENT_NOTIFICATION: &str = "pick_event_notification";
/// Custom id of the event select on the `/event recurrence` list
pub const PICK_EVENT_RECURRENCE: &str = "pick_event_recurrence";

/// Configure reminders and recurrence for server scheduled events
#[poise::command(
    slash_command,
    guild_only,
    required_permissions = "MANAGE_EVENTS",
    subcommands("notification", "recurrence"),
    subcommand_required
)]
pub async fn event(_ctx: Context<'_>) -> Result<(), Error> {
    Ok(())
}

/// Set up reminder notifications for a scheduled event
#[poise::command(slash_command)]
pub async fn notification(ctx: Context<'_>) -> Result<(), Error> {
    send_event_picker(ctx, PICK_EVENT_NOTIFICATION).await
}

/// Make a scheduled event repeat after it completes
#[poise::command(slash_command)]
pub async fn recurrence(ctx: Context<'_>) -> Result<(), Error> {
    send_event_picker(ctx, PICK_EVENT_RECURRENCE).await
}

/// Post the paginated event list with a per-page select menu
async fn send_event_picker(ctx: Context<'_>, select_id: &str) -> Result<(), Error> {
    let Some(guild_id) = ctx.guild_id() else {
        ctx.say(format_error(&ctx.tr("This command must be used in a server")))
            .await?;
        return Ok(());
    };

    let events = match guild_id.scheduled_events(ctx.http(), false).await {
        Ok(events) => events,
        Err(e) => {
            error!("Failed to fetch scheduled events for {}: {}", guild_id, e);
            ctx.say(format_error(&ctx.tr("Could not fetch this server's scheduled events")))
                .await?;
            return Ok(());
        }
    };

    let now = unix_now();
    let upcoming: Vec<_> = events
        .into_iter()
        .filter(|event| {
            event.status == ScheduledEventStatus::Active
                || event.start_time.unix_timestamp() > now
        })
        .collect();

    if upcoming.is_empty() {
        ctx.say(format_info(&ctx.tr("No upcoming scheduled events in this server.")))
            .await?;
        return Ok(());
    }

    let locale = ctx.locale().unwrap_or(DEFAULT_LOCALE);
    let pager = Pager::new(event_pages(&upcoming, select_id, &ctx.data().translator, locale));
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

/// Build the event list pages; each page carries a select over its events
fn event_pages(
    events: &[ScheduledEvent],
    select_id: &str,
    translator: &Translator,
    locale: &str,
) -> Vec<PagerPage> {
    let pages = page_count(events.len(), PAGE_SIZE);
    (0..pages)
        .map(|page| {
            let slice = &events[page * PAGE_SIZE..(page * PAGE_SIZE + PAGE_SIZE).min(events.len())];

            let mut embed = CreateEmbed::new()
                .title(translator.translate(locale, "Scheduled events"))
                .description(translator.translate(locale, "Pick an event below to configure it."))
                .colour(Colour::BLUE);
            let mut options = Vec::new();
            for event in slice {
                embed = embed.field(
                    event.name.clone(),
                    format!("<t:{}:f>", event.start_time.unix_timestamp()),
                    false,
                );
                options.push(CreateSelectMenuOption::new(
                    event.name.clone(),
                    event.id.get().to_string(),
                ));
            }

            let select = CreateSelectMenu::new(
                select_id,
                CreateSelectMenuKind::String { options },
            )
            .placeholder(translator.translate(locale, "Select an event"));

            PagerPage {
                embed,
                extra_row: Some(CreateActionRow::SelectMenu(select)),
            }
        })
        .collect()
}

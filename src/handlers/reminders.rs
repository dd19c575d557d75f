use poise::serenity_prelude::{
    self as serenity, ActionRowComponent, ButtonStyle, ChannelType, Colour,
    ComponentInteractionDataKind, CreateActionRow, CreateButton, CreateEmbed, CreateInputText,
    CreateInteractionResponse, CreateInteractionResponseMessage, CreateModal, CreateSelectMenu,
    CreateSelectMenuKind, InputTextStyle, ScheduledEventId,
};
use tracing::{error, info};

use crate::{
    database::EventNotification,
    models::{Data, Error, ReminderSession},
    utils::interval::{format_interval, interval_to_words, parse_interval},
    utils::messages::{format_error, format_success},
};

/// Custom ids of the reminder configurator components
pub const REMINDER_CHANNEL: &str = "reminder_channel";
pub const REMINDER_ROLE: &str = "reminder_role";
pub const REMINDER_OFFSET_5M: &str = "reminder_offset_5m";
pub const REMINDER_OFFSET_15M: &str = "reminder_offset_15m";
pub const REMINDER_OFFSET_30M: &str = "reminder_offset_30m";
pub const REMINDER_OFFSET_1H: &str = "reminder_offset_1h";
pub const REMINDER_OFFSET_CUSTOM: &str = "reminder_offset_custom";
pub const REMINDER_CONFIRM: &str = "reminder_confirm";
pub const REMINDER_CANCEL: &str = "reminder_cancel";
pub const REMINDER_CUSTOM_MODAL: &str = "reminder_custom_modal";
/// Recurrence modals carry the event id after this prefix
pub const RECURRENCE_MODAL_PREFIX: &str = "recurrence_modal__";

const OFFSET_5M: i64 = 300;
const OFFSET_15M: i64 = 900;
const OFFSET_30M: i64 = 1_800;
const OFFSET_1H: i64 = 3_600;

/// An event was picked on the `/event notification` list: morph the list
/// message into the reminder configurator
pub async fn handle_event_picked(
    ctx: &serenity::Context,
    interaction: &serenity::ComponentInteraction,
    data: &Data,
) -> Result<(), Error> {
    let Some(event_id) = selected_value(interaction) else {
        return Ok(());
    };
    let Some(guild_id) = interaction.guild_id else {
        return Ok(());
    };

    let event = guild_id
        .scheduled_event(ctx, ScheduledEventId::new(event_id), false)
        .await?;

    let mut session = ReminderSession::new(
        guild_id,
        event_id,
        event.name.clone(),
        event.start_time.unix_timestamp(),
    );

    // Pre-populate from an existing reminder row
    match data.db.get_notification(event_id as i64).await {
        Ok(Some(row)) => {
            session.channel_id = Some(serenity::ChannelId::new(row.channel_id as u64));
            session.role_id = row.role_id.map(|id| serenity::RoleId::new(id as u64));
            session.offsets.five_m = row.noti_5m.is_some();
            session.offsets.fifteen_m = row.noti_15m.is_some();
            session.offsets.thirty_m = row.noti_30m.is_some();
            session.offsets.one_h = row.noti_1h.is_some();
            session.offsets.custom_secs = row.noti_custom.map(|ts| row.event_time - ts);
        }
        Ok(None) => {}
        Err(e) => {
            error!("Failed to load reminder row for event {}: {}", event_id, e);
        }
    }

    let response = CreateInteractionResponse::UpdateMessage(render_configurator(&session));
    interaction.create_response(ctx, response).await?;

    data.pagers.remove(&interaction.message.id);
    data.park_reminder_session(interaction.message.id, session);

    Ok(())
}

/// Channel picked in the configurator
pub async fn handle_channel_select(
    ctx: &serenity::Context,
    interaction: &serenity::ComponentInteraction,
    data: &Data,
) -> Result<(), Error> {
    let channel_id = match &interaction.data.kind {
        ComponentInteractionDataKind::ChannelSelect { values } => values.first().copied(),
        _ => None,
    };

    update_session(ctx, interaction, data, |session| {
        session.channel_id = channel_id;
    })
    .await
}

/// Role picked in the configurator
pub async fn handle_role_select(
    ctx: &serenity::Context,
    interaction: &serenity::ComponentInteraction,
    data: &Data,
) -> Result<(), Error> {
    let role_id = match &interaction.data.kind {
        ComponentInteractionDataKind::RoleSelect { values } => values.first().copied(),
        _ => None,
    };

    update_session(ctx, interaction, data, |session| {
        session.role_id = role_id;
    })
    .await
}

/// One of the fixed offset toggle buttons was pressed
pub async fn handle_offset_toggle(
    ctx: &serenity::Context,
    interaction: &serenity::ComponentInteraction,
    data: &Data,
) -> Result<(), Error> {
    let custom_id = interaction.data.custom_id.clone();
    update_session(ctx, interaction, data, |session| {
        match custom_id.as_str() {
            REMINDER_OFFSET_5M => session.offsets.five_m = !session.offsets.five_m,
            REMINDER_OFFSET_15M => session.offsets.fifteen_m = !session.offsets.fifteen_m,
            REMINDER_OFFSET_30M => session.offsets.thirty_m = !session.offsets.thirty_m,
            REMINDER_OFFSET_1H => session.offsets.one_h = !session.offsets.one_h,
            _ => {}
        }
    })
    .await
}

/// The Custom offset button opens a modal asking for an interval string
pub async fn handle_custom_offset_button(
    ctx: &serenity::Context,
    interaction: &serenity::ComponentInteraction,
    data: &Data,
) -> Result<(), Error> {
    if !data.reminder_sessions.contains_key(&interaction.message.id) {
        return respond_expired(ctx, interaction, data).await;
    }

    let modal = CreateModal::new(REMINDER_CUSTOM_MODAL, "Custom reminder offset").components(vec![
        CreateActionRow::InputText(
            CreateInputText::new(InputTextStyle::Short, "Before the event", "offset")
                .placeholder("1w 2d 3h 4m")
                .required(true),
        ),
    ]);
    interaction
        .create_response(ctx, CreateInteractionResponse::Modal(modal))
        .await?;

    Ok(())
}

/// Submit of the custom offset modal
pub async fn handle_custom_offset_modal(
    ctx: &serenity::Context,
    interaction: &serenity::ModalInteraction,
    data: &Data,
) -> Result<(), Error> {
    let Some(message) = &interaction.message else {
        return Ok(());
    };

    let raw = first_input_value(&interaction.data).unwrap_or_default();
    let secs = match parse_interval(&raw) {
        Ok(secs) => secs,
        Err(e) => {
            interaction
                .create_response(
                    ctx,
                    CreateInteractionResponse::Message(
                        CreateInteractionResponseMessage::new()
                            .content(format_error(&e.to_string()))
                            .ephemeral(true),
                    ),
                )
                .await?;
            return Ok(());
        }
    };

    let snapshot = {
        let Some(mut session) = data.reminder_sessions.get_mut(&message.id) else {
            return Ok(());
        };
        session.offsets.custom_secs = Some(secs);
        session.clone()
    };

    interaction
        .create_response(
            ctx,
            CreateInteractionResponse::UpdateMessage(render_configurator(&snapshot)),
        )
        .await?;

    Ok(())
}

/// Confirm: persist the configured reminders
pub async fn handle_confirm(
    ctx: &serenity::Context,
    interaction: &serenity::ComponentInteraction,
    data: &Data,
) -> Result<(), Error> {
    let Some(session) = data
        .reminder_sessions
        .get(&interaction.message.id)
        .map(|s| s.value().clone())
    else {
        return respond_expired(ctx, interaction, data).await;
    };

    if session.channel_id.is_none() {
        let message = data
            .translator
            .translate(&interaction.locale, "Pick a channel for the reminders first.");
        interaction
            .create_response(
                ctx,
                CreateInteractionResponse::Message(
                    CreateInteractionResponseMessage::new()
                        .content(format_error(&message))
                        .ephemeral(true),
                ),
            )
            .await?;
        return Ok(());
    }

    let row = notification_row(&session);
    if let Err(e) = data.db.upsert_notification(&row).await {
        error!("Failed to store reminder row for event {}: {}", row.event_id, e);
        interaction
            .create_response(
                ctx,
                CreateInteractionResponse::Message(
                    CreateInteractionResponseMessage::new()
                        .content(format_error(&data.translator.translate(
                            &interaction.locale,
                            "A database error occurred. Please try again later.",
                        )))
                        .ephemeral(true),
                ),
            )
            .await?;
        return Ok(());
    }

    data.reminder_sessions.remove(&interaction.message.id);
    info!(
        "Reminders configured for event {} ({} armed)",
        row.event_id,
        row.armed().len()
    );

    let embed = CreateEmbed::new()
        .title(data.translator.translate(&interaction.locale, "Reminders saved"))
        .description(format_success(&data.translator.translate_with(
            &interaction.locale,
            "**{event}** will be announced in {channel}.",
            &[
                ("event", session.event_name.clone()),
                ("channel", format!("<#{}>", row.channel_id)),
            ],
        )))
        .colour(Colour::DARK_GREEN);
    interaction
        .create_response(
            ctx,
            CreateInteractionResponse::UpdateMessage(
                CreateInteractionResponseMessage::new()
                    .embed(embed)
                    .components(vec![]),
            ),
        )
        .await?;

    Ok(())
}

/// Cancel: drop the configurator without saving
pub async fn handle_cancel(
    ctx: &serenity::Context,
    interaction: &serenity::ComponentInteraction,
    data: &Data,
) -> Result<(), Error> {
    data.reminder_sessions.remove(&interaction.message.id);

    let embed = CreateEmbed::new()
        .title(data.translator.translate(&interaction.locale, "Reminder setup cancelled"))
        .colour(Colour::RED);
    interaction
        .create_response(
            ctx,
            CreateInteractionResponse::UpdateMessage(
                CreateInteractionResponseMessage::new()
                    .embed(embed)
                    .components(vec![]),
            ),
        )
        .await?;

    Ok(())
}

/// An event was picked on the `/event recurrence` list: ask for the rule
pub async fn handle_recurrence_picked(
    ctx: &serenity::Context,
    interaction: &serenity::ComponentInteraction,
    _data: &Data,
) -> Result<(), Error> {
    let Some(event_id) = selected_value(interaction) else {
        return Ok(());
    };

    let modal = CreateModal::new(
        format!("{}{}", RECURRENCE_MODAL_PREFIX, event_id),
        "Event recurrence",
    )
    .components(vec![CreateActionRow::InputText(
        CreateInputText::new(InputTextStyle::Short, "Repeat every", "rule")
            .placeholder("1w 2d 3h 4m")
            .required(true),
    )]);
    interaction
        .create_response(ctx, CreateInteractionResponse::Modal(modal))
        .await?;

    Ok(())
}

/// Submit of the recurrence modal
pub async fn handle_recurrence_modal(
    ctx: &serenity::Context,
    interaction: &serenity::ModalInteraction,
    data: &Data,
) -> Result<(), Error> {
    let Some(event_id) = interaction
        .data
        .custom_id
        .strip_prefix(RECURRENCE_MODAL_PREFIX)
        .and_then(|raw| raw.parse::<i64>().ok())
    else {
        return Ok(());
    };

    let raw = first_input_value(&interaction.data).unwrap_or_default();
    let (content, ephemeral) = match parse_interval(&raw) {
        Ok(secs) => {
            let rule = format_interval(secs);
            match data.db.upsert_recurrence(event_id, &rule).await {
                Ok(None) => {
                    info!("Recurrence set for event {}: every {}", event_id, rule);
                    (
                        format_success(&data.translator.translate_with(
                            &interaction.locale,
                            "Recurrence set: repeats every {interval}.",
                            &[("interval", interval_to_words(secs))],
                        )),
                        false,
                    )
                }
                Ok(Some(old)) => {
                    info!(
                        "Recurrence updated for event {}: every {} (was {})",
                        event_id, rule, old
                    );
                    (
                        format_success(&data.translator.translate_with(
                            &interaction.locale,
                            "Recurrence updated: repeats every {interval} (was every {old}).",
                            &[("interval", interval_to_words(secs)), ("old", old)],
                        )),
                        false,
                    )
                }
                Err(e) => {
                    error!("Failed to store recurrence for event {}: {}", event_id, e);
                    (
                        format_error(&data.translator.translate(
                            &interaction.locale,
                            "A database error occurred. Please try again later.",
                        )),
                        true,
                    )
                }
            }
        }
        Err(e) => (
            format_error(&data.translator.translate(&interaction.locale, &e.to_string())),
            true,
        ),
    };

    interaction
        .create_response(
            ctx,
            CreateInteractionResponse::Message(
                CreateInteractionResponseMessage::new()
                    .content(content)
                    .ephemeral(ephemeral),
            ),
        )
        .await?;

    Ok(())
}

/// Mutate the parked session and re-render the configurator message
async fn update_session<F>(
    ctx: &serenity::Context,
    interaction: &serenity::ComponentInteraction,
    data: &Data,
    mutate: F,
) -> Result<(), Error>
where
    F: FnOnce(&mut ReminderSession),
{
    let snapshot = {
        let Some(mut session) = data.reminder_sessions.get_mut(&interaction.message.id) else {
            return respond_expired(ctx, interaction, data).await;
        };
        mutate(&mut session);
        session.clone()
    };

    interaction
        .create_response(
            ctx,
            CreateInteractionResponse::UpdateMessage(render_configurator(&snapshot)),
        )
        .await?;

    Ok(())
}

/// Build the reminder row persisted on Confirm: each armed toggle becomes
/// an absolute timestamp, event start minus the offset
fn notification_row(session: &ReminderSession) -> EventNotification {
    let start = session.event_time;
    let offsets = &session.offsets;
    EventNotification {
        event_id: session.event_id as i64,
        guild_id: session.guild_id.get() as i64,
        event_name: session.event_name.clone(),
        event_time: start,
        channel_id: session.channel_id.map(|c| c.get() as i64).unwrap_or_default(),
        role_id: session.role_id.map(|r| r.get() as i64),
        noti_5m: offsets.five_m.then(|| start - OFFSET_5M),
        noti_15m: offsets.fifteen_m.then(|| start - OFFSET_15M),
        noti_30m: offsets.thirty_m.then(|| start - OFFSET_30M),
        noti_1h: offsets.one_h.then(|| start - OFFSET_1H),
        noti_custom: offsets.custom_secs.map(|secs| start - secs),
    }
}

/// Render the configurator embed and component rows from a session
fn render_configurator(session: &ReminderSession) -> CreateInteractionResponseMessage {
    let mut armed = Vec::new();
    if session.offsets.five_m {
        armed.push("5 minutes".to_string());
    }
    if session.offsets.fifteen_m {
        armed.push("15 minutes".to_string());
    }
    if session.offsets.thirty_m {
        armed.push("30 minutes".to_string());
    }
    if session.offsets.one_h {
        armed.push("1 hour".to_string());
    }
    if let Some(secs) = session.offsets.custom_secs {
        armed.push(interval_to_words(secs));
    }

    let channel_line = match session.channel_id {
        Some(id) => format!("<#{}>", id),
        None => "*not set*".to_string(),
    };
    let role_line = match session.role_id {
        Some(id) if id.get() == session.guild_id.get() => "@everyone".to_string(),
        Some(id) => format!("<@&{}>", id),
        None => "*none*".to_string(),
    };
    let armed_line = if armed.is_empty() {
        "*none*".to_string()
    } else {
        armed.join(", ")
    };

    let embed = CreateEmbed::new()
        .title(format!("Reminders — {}", session.event_name))
        .description(format!("Starts <t:{}:f>", session.event_time))
        .field("Channel", channel_line, true)
        .field("Ping", role_line, true)
        .field("Remind before", armed_line, false)
        .colour(Colour::BLUE);

    let channel_select = CreateSelectMenu::new(
        REMINDER_CHANNEL,
        CreateSelectMenuKind::Channel {
            channel_types: Some(vec![ChannelType::Text]),
            default_channels: session.channel_id.map(|id| vec![id]),
        },
    )
    .placeholder("Reminder channel");
    let role_select = CreateSelectMenu::new(
        REMINDER_ROLE,
        CreateSelectMenuKind::Role {
            default_roles: session.role_id.map(|id| vec![id]),
        },
    )
    .placeholder("Role to ping");

    let toggle_style = |on: bool| {
        if on {
            ButtonStyle::Primary
        } else {
            ButtonStyle::Secondary
        }
    };
    let offsets = CreateActionRow::Buttons(vec![
        CreateButton::new(REMINDER_OFFSET_5M)
            .label("5m")
            .style(toggle_style(session.offsets.five_m)),
        CreateButton::new(REMINDER_OFFSET_15M)
            .label("15m")
            .style(toggle_style(session.offsets.fifteen_m)),
        CreateButton::new(REMINDER_OFFSET_30M)
            .label("30m")
            .style(toggle_style(session.offsets.thirty_m)),
        CreateButton::new(REMINDER_OFFSET_1H)
            .label("1h")
            .style(toggle_style(session.offsets.one_h)),
        CreateButton::new(REMINDER_OFFSET_CUSTOM)
            .label("Custom")
            .style(toggle_style(session.offsets.custom_secs.is_some())),
    ]);
    let actions = CreateActionRow::Buttons(vec![
        CreateButton::new(REMINDER_CONFIRM)
            .label("Confirm")
            .style(ButtonStyle::Success),
        CreateButton::new(REMINDER_CANCEL)
            .label("Cancel")
            .style(ButtonStyle::Danger),
    ]);

    CreateInteractionResponseMessage::new().embed(embed).components(vec![
        CreateActionRow::SelectMenu(channel_select),
        CreateActionRow::SelectMenu(role_select),
        offsets,
        actions,
    ])
}

/// The numeric value picked in a string select, if any
fn selected_value(interaction: &serenity::ComponentInteraction) -> Option<u64> {
    match &interaction.data.kind {
        ComponentInteractionDataKind::StringSelect { values } => {
            values.first().and_then(|raw| raw.parse().ok())
        }
        _ => None,
    }
}

/// First text input of a modal submission
fn first_input_value(data: &serenity::ModalInteractionData) -> Option<String> {
    for row in &data.components {
        for component in &row.components {
            if let ActionRowComponent::InputText(input) = component {
                return input.value.clone();
            }
        }
    }
    None
}

async fn respond_expired(
    ctx: &serenity::Context,
    interaction: &serenity::ComponentInteraction,
    data: &Data,
) -> Result<(), Error> {
    let message = data
        .translator
        .translate(&interaction.locale, "This session has expired. Run the command again.");
    interaction
        .create_response(
            ctx,
            CreateInteractionResponse::Message(
                CreateInteractionResponseMessage::new()
                    .content(format_error(&message))
                    .ephemeral(true),
            ),
        )
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use poise::serenity_prelude::{ChannelId, GuildId, RoleId};

    fn session() -> ReminderSession {
        let mut session = ReminderSession::new(GuildId::new(1), 7, "Bear trap".to_string(), 10_000);
        session.channel_id = Some(ChannelId::new(100));
        session.role_id = Some(RoleId::new(42));
        session
    }

    #[test]
    fn test_notification_row_arms_selected_offsets() {
        let mut session = session();
        session.offsets.five_m = true;
        session.offsets.one_h = true;
        session.offsets.custom_secs = Some(7_200);

        let row = notification_row(&session);
        assert_eq!(row.noti_5m, Some(10_000 - 300));
        assert_eq!(row.noti_15m, None);
        assert_eq!(row.noti_30m, None);
        assert_eq!(row.noti_1h, Some(10_000 - 3_600));
        assert_eq!(row.noti_custom, Some(10_000 - 7_200));
        assert_eq!(row.channel_id, 100);
        assert_eq!(row.role_id, Some(42));
    }

    #[test]
    fn test_notification_row_with_nothing_armed() {
        let row = notification_row(&session());
        assert!(row.armed().is_empty());
    }
}

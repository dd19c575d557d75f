use poise::serenity_prelude::{self as serenity, CreateInteractionResponse, CreateInteractionResponseMessage};
use tracing::error;

use crate::{
    commands::{
        MASS_REDEEM_CANCEL, MASS_REDEEM_RETRY, MASS_REDEEM_START, PICK_EVENT_NOTIFICATION,
        PICK_EVENT_RECURRENCE,
    },
    models::{Data, Error},
    utils::pagination::{PAGER_NEXT, PAGER_PREV},
};

use super::giftcode;
use super::reminders;

/// Handle component interactions (buttons and selects) by custom id
pub async fn handle_component(
    ctx: &serenity::Context,
    interaction: serenity::ComponentInteraction,
    data: &Data,
) {
    let result = match interaction.data.custom_id.as_str() {
        MASS_REDEEM_START => giftcode::handle_start(ctx, &interaction, data).await,
        MASS_REDEEM_CANCEL => giftcode::handle_cancel(ctx, &interaction, data).await,
        MASS_REDEEM_RETRY => giftcode::handle_retry(ctx, &interaction, data).await,
        PAGER_PREV | PAGER_NEXT => handle_pager_nav(ctx, &interaction, data).await,
        PICK_EVENT_NOTIFICATION => reminders::handle_event_picked(ctx, &interaction, data).await,
        PICK_EVENT_RECURRENCE => reminders::handle_recurrence_picked(ctx, &interaction, data).await,
        reminders::REMINDER_CHANNEL => {
            reminders::handle_channel_select(ctx, &interaction, data).await
        }
        reminders::REMINDER_ROLE => reminders::handle_role_select(ctx, &interaction, data).await,
        reminders::REMINDER_OFFSET_5M
        | reminders::REMINDER_OFFSET_15M
        | reminders::REMINDER_OFFSET_30M
        | reminders::REMINDER_OFFSET_1H => {
            reminders::handle_offset_toggle(ctx, &interaction, data).await
        }
        reminders::REMINDER_OFFSET_CUSTOM => {
            reminders::handle_custom_offset_button(ctx, &interaction, data).await
        }
        reminders::REMINDER_CONFIRM => reminders::handle_confirm(ctx, &interaction, data).await,
        reminders::REMINDER_CANCEL => reminders::handle_cancel(ctx, &interaction, data).await,
        _ => Ok(()),
    };

    if let Err(e) = result {
        error!(
            "Failed to handle component {}: {}",
            interaction.data.custom_id, e
        );
    }
}

/// Handle modal submissions by custom id
pub async fn handle_modal(
    ctx: &serenity::Context,
    interaction: serenity::ModalInteraction,
    data: &Data,
) {
    let custom_id = interaction.data.custom_id.clone();
    let result = if custom_id == reminders::REMINDER_CUSTOM_MODAL {
        reminders::handle_custom_offset_modal(ctx, &interaction, data).await
    } else if custom_id.starts_with(reminders::RECURRENCE_MODAL_PREFIX) {
        reminders::handle_recurrence_modal(ctx, &interaction, data).await
    } else {
        Ok(())
    };

    if let Err(e) = result {
        error!("Failed to handle modal {}: {}", custom_id, e);
    }
}

/// Flip a parked pager one page and update the message
async fn handle_pager_nav(
    ctx: &serenity::Context,
    interaction: &serenity::ComponentInteraction,
    data: &Data,
) -> Result<(), Error> {
    let update = {
        let Some(mut session) = data.pagers.get_mut(&interaction.message.id) else {
            // The pager aged out; just acknowledge the click
            interaction
                .create_response(ctx, CreateInteractionResponse::Acknowledge)
                .await?;
            return Ok(());
        };

        let moved = if interaction.data.custom_id == PAGER_NEXT {
            session.pager.next()
        } else {
            session.pager.prev()
        };
        moved.then(|| {
            CreateInteractionResponseMessage::new()
                .embed(session.pager.current_page().embed.clone())
                .components(session.pager.rows())
        })
    };

    let response = match update {
        Some(message) => CreateInteractionResponse::UpdateMessage(message),
        None => CreateInteractionResponse::Acknowledge,
    };
    interaction.create_response(ctx, response).await?;

    Ok(())
}

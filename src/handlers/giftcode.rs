use std::sync::Arc;

use poise::serenity_prelude::{
    self as serenity, ButtonStyle, CreateActionRow, CreateButton, CreateInteractionResponse,
    CreateInteractionResponseMessage, CreateMessage, EditMessage, Http, Message,
};
use tokio::sync::mpsc;
use tokio::time::Duration;
use tracing::{error, info};

use crate::{
    commands::MASS_REDEEM_RETRY,
    constants::REDEEM_DELAY_SECS,
    giftcode::{run_batch, BatchOutcome, GiftCodeRedeemer},
    models::{Data, Error},
    utils::embeds::redeem_embed,
    utils::messages::format_error,
};

/// Handle the Start button on a mass-redeem confirmation prompt
pub async fn handle_start(
    ctx: &serenity::Context,
    interaction: &serenity::ComponentInteraction,
    data: &Data,
) -> Result<(), Error> {
    let Some((_, prompt)) = data.redeem_prompts.remove(&interaction.message.id) else {
        respond_expired(ctx, interaction, data).await?;
        return Ok(());
    };

    interaction
        .create_response(ctx, CreateInteractionResponse::Acknowledge)
        .await?;
    interaction.message.delete(ctx).await?;

    let phase = data.translator.translate(&prompt.locale, "Running");
    let embed = redeem_embed(&phase, &prompt.code, prompt.ids.len(), 0, 0, 0, None);
    let progress = interaction
        .channel_id
        .send_message(ctx, CreateMessage::new().embed(embed))
        .await?;

    info!(
        "Mass redeem started: code {} over {} accounts",
        prompt.code,
        prompt.ids.len()
    );

    let http = ctx.http.clone();
    let data = data.clone();
    tokio::spawn(async move {
        run_and_report(http, data, progress, prompt.code, prompt.ids, prompt.locale).await;
    });

    Ok(())
}

/// Handle the Cancel button on a mass-redeem confirmation prompt
pub async fn handle_cancel(
    ctx: &serenity::Context,
    interaction: &serenity::ComponentInteraction,
    data: &Data,
) -> Result<(), Error> {
    if data.redeem_prompts.remove(&interaction.message.id).is_none() {
        respond_expired(ctx, interaction, data).await?;
        return Ok(());
    }

    interaction
        .create_response(ctx, CreateInteractionResponse::Acknowledge)
        .await?;
    interaction.message.delete(ctx).await?;
    info!("Mass redeem prompt cancelled");

    Ok(())
}

/// Handle the Retry button on a finished run that still has failures
pub async fn handle_retry(
    ctx: &serenity::Context,
    interaction: &serenity::ComponentInteraction,
    data: &Data,
) -> Result<(), Error> {
    let Some((_, bucket)) = data.retry_buckets.remove(&interaction.message.id) else {
        respond_expired(ctx, interaction, data).await?;
        return Ok(());
    };

    interaction
        .create_response(ctx, CreateInteractionResponse::Acknowledge)
        .await?;

    info!(
        "Mass redeem retry: code {} over {} failed accounts",
        bucket.code,
        bucket.failed.len()
    );

    let http = ctx.http.clone();
    let data = data.clone();
    let message = (*interaction.message).clone();
    tokio::spawn(async move {
        run_and_report(http, data, message, bucket.code, bucket.failed, bucket.locale).await;
    });

    Ok(())
}

/// Drive one batch run, editing the progress message after every account.
///
/// When failures remain the final embed carries a Retry button and the
/// failed bucket is parked under the progress message id.
async fn run_and_report(
    http: Arc<Http>,
    data: Data,
    mut message: Message,
    code: String,
    ids: Vec<u64>,
    locale: String,
) {
    let Some(model) = data.captcha_model.clone() else {
        error!("Mass redeem run without a loaded captcha model");
        return;
    };

    let total = ids.len();
    let backend = GiftCodeRedeemer::new(model);
    let (tx, mut rx) = mpsc::unbounded_channel::<BatchOutcome>();

    let code_for_run = code.clone();
    let runner = tokio::spawn(async move {
        run_batch(
            &backend,
            &ids,
            &code_for_run,
            Duration::from_secs(REDEEM_DELAY_SECS),
            &tx,
        )
        .await
    });

    let running = data.translator.translate(&locale, "Running");
    while let Some(snapshot) = rx.recv().await {
        let embed = redeem_embed(
            &running,
            &code,
            total,
            snapshot.success.len(),
            snapshot.already_redeemed.len(),
            snapshot.failed.len(),
            None,
        );
        if let Err(e) = message
            .edit(&http, EditMessage::new().embed(embed).components(vec![]))
            .await
        {
            error!("Failed to edit mass redeem progress message: {}", e);
        }
    }

    let outcome = match runner.await {
        Ok(outcome) => outcome,
        Err(e) => {
            error!("Mass redeem batch task failed: {}", e);
            return;
        }
    };

    let (note, components) = if outcome.failed.is_empty() {
        (None, vec![])
    } else {
        (
            Some(
                data.translator
                    .translate(&locale, "Some accounts failed; press Retry to run them again."),
            ),
            vec![CreateActionRow::Buttons(vec![
                CreateButton::new(MASS_REDEEM_RETRY)
                    .label("Retry")
                    .style(ButtonStyle::Primary),
            ])],
        )
    };

    let finished = data.translator.translate(&locale, "Finished");
    let embed = redeem_embed(
        &finished,
        &code,
        total,
        outcome.success.len(),
        outcome.already_redeemed.len(),
        outcome.failed.len(),
        note.as_deref(),
    );
    if let Err(e) = message
        .edit(&http, EditMessage::new().embed(embed).components(components))
        .await
    {
        error!("Failed to edit mass redeem final message: {}", e);
    }

    if outcome.failed.is_empty() {
        info!("Mass redeem finished: code {} fully redeemed", code);
    } else {
        info!(
            "Mass redeem finished: code {} with {} failures parked for retry",
            code,
            outcome.failed.len()
        );
        data.park_retry_bucket(message.id, code, outcome.failed, locale);
    }
}

/// Ephemeral reply for clicks on sessions that already expired
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

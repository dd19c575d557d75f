use poise::serenity_prelude::{ButtonStyle, CreateActionRow, CreateButton};
use poise::CreateReply;
use tracing::{error, info};

use crate::{
    models::{Context, Error},
    utils::embeds::redeem_embed,
    utils::messages::{format_error, format_warning},
    utils::translator::{Localize, DEFAULT_LOCALE},
};

/// Custom id of the Start button on the confirmation prompt
pub const MASS_REDEEM_START: &str = "mass_redeem_start";
/// Custom id of the Cancel button on the confirmation prompt
pub const MASS_REDEEM_CANCEL: &str = "mass_redeem_cancel";
/// Custom id of the Retry button on a finished run with failures
pub const MASS_REDEEM_RETRY: &str = "mass_redeem_retry";

/// Redeem a gift code for every account on the alliance list
#[poise::command(slash_command, guild_only, required_permissions = "MANAGE_GUILD")]
pub async fn mass_redeem(
    ctx: Context<'_>,
    #[description = "Gift code to redeem"] code: String,
    #[description = "Slice of the account list, e.g. 0-100"] ids_range: Option<String>,
) -> Result<(), Error> {
    if ctx.data().captcha_model.is_none() {
        ctx.say(format_warning(&ctx.tr(
            "The captcha model is not loaded; mass redemption is unavailable.",
        )))
        .await?;
        return Ok(());
    }

    let ids = match load_account_ids(&ctx.data().ids_file) {
        Ok(ids) => ids,
        Err(e) => {
            error!("Failed to read account id list: {}", e);
            ctx.say(format_error(&ctx.tr("Could not read the alliance account list.")))
                .await?;
            return Ok(());
        }
    };

    let range = ids_range.as_deref().unwrap_or("0-100");
    let slice = match slice_range(&ids, range) {
        Ok(slice) => slice,
        Err(reason) => {
            ctx.say(format_error(&ctx.tr(&reason))).await?;
            return Ok(());
        }
    };

    if slice.is_empty() {
        ctx.say(format_error(&ctx.tr("The selected range contains no accounts.")))
            .await?;
        return Ok(());
    }

    info!(
        "Mass redeem prompt for code {} over {} accounts (range {})",
        code,
        slice.len(),
        range
    );

    let note = ctx.tr("Press Start to begin redeeming.");
    let embed = redeem_embed(
        &ctx.tr("Confirmation"),
        &code,
        slice.len(),
        0,
        0,
        0,
        Some(&note),
    );
    let buttons = CreateActionRow::Buttons(vec![
        CreateButton::new(MASS_REDEEM_START)
            .label("Start")
            .style(ButtonStyle::Success),
        CreateButton::new(MASS_REDEEM_CANCEL)
            .label("Cancel")
            .style(ButtonStyle::Danger),
    ]);

    let reply = ctx
        .send(CreateReply::default().embed(embed).components(vec![buttons]))
        .await?;
    let message = reply.message().await?;

    let locale = ctx.locale().unwrap_or(DEFAULT_LOCALE).to_string();
    ctx.data()
        .park_redeem_prompt(message.id, code, slice.to_vec(), locale);

    Ok(())
}

/// Load the account id list from the configured JSON file
fn load_account_ids(path: &std::path::Path) -> Result<Vec<u64>, Error> {
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

/// Slice `[start, end)` out of the account list from an `a-b` range string.
/// The end is clamped to the list length.
fn slice_range<'a>(ids: &'a [u64], range: &str) -> Result<&'a [u64], String> {
    let Some((start, end)) = range.split_once('-') else {
        return Err("Give a range like 0-100.".to_string());
    };
    let start: usize = start
        .trim()
        .parse()
        .map_err(|_| "Give a range like 0-100.".to_string())?;
    let end: usize = end
        .trim()
        .parse()
        .map_err(|_| "Give a range like 0-100.".to_string())?;

    if start > end {
        return Err("The range start must not be after its end.".to_string());
    }

    let start = start.min(ids.len());
    let end = end.min(ids.len());
    Ok(&ids[start..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    const IDS: &[u64] = &[10, 11, 12, 13, 14];

    #[test]
    fn test_slice_range_is_half_open() {
        assert_eq!(slice_range(IDS, "0-2").unwrap(), &[10, 11]);
        assert_eq!(slice_range(IDS, "1-3").unwrap(), &[11, 12]);
    }

    #[test]
    fn test_slice_range_clamps_to_list_length() {
        assert_eq!(slice_range(IDS, "0-100").unwrap(), IDS);
        assert_eq!(slice_range(IDS, "3-100").unwrap(), &[13, 14]);
        assert!(slice_range(IDS, "9-100").unwrap().is_empty());
    }

    #[test]
    fn test_slice_range_rejects_malformed_input() {
        assert!(slice_range(IDS, "all").is_err());
        assert!(slice_range(IDS, "5-2").is_err());
        assert!(slice_range(IDS, "a-b").is_err());
        assert!(slice_range(IDS, "-3-5").is_err());
    }
}

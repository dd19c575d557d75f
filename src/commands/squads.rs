use poise::serenity_prelude::{Colour, CreateEmbed, CreateEmbedAuthor};
use poise::CreateReply;

use crate::{
    models::{Context, Error},
    utils::messages::format_error,
    utils::squad_math::{joiner_squad_split, own_squad_split, JoinerMarchRule, OwnMarchRule, SquadSplit},
    utils::translator::Localize,
};

/// Calculate squad compositions for rallies
#[poise::command(slash_command)]
pub async fn squads(
    ctx: Context<'_>,
    #[description = "Total infantry available"]
    #[min = 0]
    infantry: i64,
    #[description = "Total lancers available"]
    #[min = 0]
    lancer: i64,
    #[description = "Total marksmen available"]
    #[min = 0]
    marksman: i64,
    #[description = "Size of your own rally squad"]
    #[min = 1]
    own_squad_size: i64,
    #[description = "Size of squads joining other rallies"]
    #[min = 1]
    joiner_squad_size: i64,
    #[description = "How many joiner marches you run"]
    #[min = 1]
    march_count: i64,
    #[description = "Ratio rule for your own squad (default: 10:20:70)"]
    own_rule: Option<OwnMarchRule>,
    #[description = "Fill rule for joiner squads (default: 1k:fill:max)"]
    joiner_rule: Option<JoinerMarchRule>,
) -> Result<(), Error> {
    if own_squad_size <= 0 || joiner_squad_size <= 0 || march_count <= 0 {
        ctx.say(format_error(&ctx.tr("Squad sizes and march count must be positive.")))
            .await?;
        return Ok(());
    }

    let own_rule = own_rule.unwrap_or_default();
    let joiner_rule = joiner_rule.unwrap_or_default();

    let own = own_squad_split(own_rule, own_squad_size as f64);
    let marksman_left = (marksman as f64 - own.marksman).max(0.0);
    let joiner = joiner_squad_split(
        joiner_rule,
        joiner_squad_size as f64,
        marksman_left,
        march_count as f64,
    );

    let author = CreateEmbedAuthor::new(ctx.author().name.clone())
        .icon_url(ctx.author().face());
    let embed = CreateEmbed::new()
        .title(ctx.tr("Squad composition"))
        .colour(Colour::BLUE)
        .author(author)
        .field(ctx.tr("Own squad"), split_lines(&own), true)
        .field(
            ctx.tr_with("Joiner squads (×{count})", &[("count", march_count.to_string())]),
            split_lines(&joiner),
            true,
        )
        .field(
            ctx.tr("Available troops"),
            format!(
                "🛡️ Infantry: {}\n🐎 Lancer: {}\n🏹 Marksman: {}",
                infantry, lancer, marksman
            ),
            false,
        );

    ctx.send(CreateReply::default().embed(embed)).await?;
    Ok(())
}

fn split_lines(split: &SquadSplit) -> String {
    let (infantry, lancer, marksman) = split.rounded();
    format!(
        "🛡️ Infantry: {}\n🐎 Lancer: {}\n🏹 Marksman: {}",
        infantry, lancer, marksman
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_lines_uses_rounded_counts() {
        let lines = split_lines(&SquadSplit {
            infantry: 100.4,
            lancer: 200.5,
            marksman: 699.1,
        });
        assert!(lines.contains("Infantry: 100"));
        assert!(lines.contains("Lancer: 201"));
        assert!(lines.contains("Marksman: 699"));
    }
}

mod commands;
mod constants;
mod database;
mod giftcode;
mod handlers;
mod models;
mod schedule;
mod utils;

use std::path::PathBuf;
use std::sync::Arc;

use poise::serenity_prelude as serenity;
use poise::CreateReply;
use tracing::{error, info, warn};

use crate::{
    constants::LOG_DIRECTIVE,
    database::Database,
    giftcode::CaptchaModel,
    handlers::{
        handle_component, handle_modal, handle_scheduled_event_delete,
        handle_scheduled_event_update,
    },
    models::{Data, Error},
    schedule::spawn_background_tasks,
    utils::embeds::error_embed,
    utils::translator::{Translator, DEFAULT_LOCALE},
};

#[tokio::main]
async fn main() {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    // Initialize logging
    initialize_logging();

    // Load configuration from environment
    let config = match load_configuration() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    // Connect to database
    let db = match Database::new(&config.database_url).await {
        Ok(db) => db,
        Err(e) => {
            error!("Failed to connect to database: {}", e);
            std::process::exit(1);
        }
    };

    // Load the locale tables and the captcha model
    let translator = Translator::load(&config.resources_dir.join("langs.json"));
    let captcha_model = match CaptchaModel::load(&config.resources_dir) {
        Ok(model) => Some(Arc::new(model)),
        Err(e) => {
            warn!("Captcha model unavailable, /mass_redeem disabled: {}", e);
            None
        }
    };

    let data = Data::new(db, translator, captcha_model, config.ids_file.clone());

    // Create and start the bot
    if let Err(e) = start_bot(config, data).await {
        error!("Bot error: {}", e);
        std::process::exit(1);
    }
}

/// Configuration loaded from environment variables
struct Config {
    discord_token: String,
    database_url: String,
    dev_guild_id: Option<u64>,
    resources_dir: PathBuf,
    ids_file: PathBuf,
}

/// Initialize the logging system
fn initialize_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(LOG_DIRECTIVE.parse().expect("valid log directive")),
        )
        .init();
}

/// Load configuration from environment variables
fn load_configuration() -> Result<Config, Box<dyn std::error::Error>> {
    let discord_token = std::env::var("DISCORD_TOKEN").map_err(|_| {
        "DISCORD_TOKEN environment variable not set. Set it with: export DISCORD_TOKEN=your_bot_token"
    })?;

    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://whitebot.db".to_string());

    // Optional: development guild ID for faster command registration
    let dev_guild_id = std::env::var("DEV_GUILD_ID")
        .ok()
        .and_then(|id| id.parse::<u64>().ok());
    if dev_guild_id.is_some() {
        info!("Development mode: Commands will be registered to guild only");
    }

    let resources_dir = std::env::var("WHITEBOT_RESOURCES")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("resources"));
    let ids_file = std::env::var("WHITEBOT_IDS_FILE")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("data/ids.json"));

    Ok(Config {
        discord_token,
        database_url,
        dev_guild_id,
        resources_dir,
        ids_file,
    })
}

/// Reply with a translated error embed when a command fails
async fn on_error(error: poise::FrameworkError<'_, Data, Error>) {
    match error {
        poise::FrameworkError::Command { error, ctx, .. } => {
            error!("Command /{} failed: {}", ctx.command().name, error);
            let locale = ctx.locale().unwrap_or(DEFAULT_LOCALE);
            let description = ctx
                .data()
                .translator
                .translate(locale, "Something went wrong while running this command.");
            let reply = CreateReply::default()
                .embed(error_embed(&description))
                .ephemeral(true);
            if let Err(e) = ctx.send(reply).await {
                error!("Failed to send error reply: {}", e);
            }
        }
        other => {
            if let Err(e) = poise::builtins::on_error(other).await {
                error!("Error handler failed: {}", e);
            }
        }
    }
}

/// Create and start the Discord bot
async fn start_bot(config: Config, data: Data) -> Result<(), Error> {
    let data_for_framework = Arc::new(data);
    let dev_guild_id = config.dev_guild_id;

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: vec![
                commands::schedule(),
                commands::event(),
                commands::squads(),
                commands::mass_redeem(),
                commands::help(),
            ],
            on_error: |error| Box::pin(on_error(error)),
            event_handler: |ctx, event, _framework, data| {
                Box::pin(async move {
                    match event {
                        serenity::FullEvent::InteractionCreate { interaction } => {
                            match interaction {
                                serenity::Interaction::Component(component) => {
                                    handle_component(ctx, component.clone(), data).await;
                                }
                                serenity::Interaction::Modal(modal) => {
                                    handle_modal(ctx, modal.clone(), data).await;
                                }
                                _ => {}
                            }
                        }
                        serenity::FullEvent::GuildScheduledEventUpdate { event } => {
                            handle_scheduled_event_update(ctx, event, data).await;
                        }
                        serenity::FullEvent::GuildScheduledEventDelete { event } => {
                            handle_scheduled_event_delete(event, data).await;
                        }
                        _ => {}
                    }
                    Ok(())
                })
            },
            ..Default::default()
        })
        .setup(move |ctx, _ready, framework| {
            // Start the announcement, reminder and presence loops
            spawn_background_tasks(ctx, &data_for_framework);

            Box::pin(async move {
                // Register commands based on dev_guild_id
                if let Some(guild_id) = dev_guild_id {
                    let guild = serenity::GuildId::new(guild_id);
                    info!("Registering commands in development guild: {}", guild_id);
                    poise::builtins::register_in_guild(ctx, &framework.options().commands, guild)
                        .await?;
                } else {
                    info!("Registering commands globally (may take up to 1 hour)");
                    poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                }

                info!("Bot is ready!");
                Ok((*data_for_framework).clone())
            })
        })
        .build();

    let intents = serenity::GatewayIntents::non_privileged();
    let mut client = serenity::ClientBuilder::new(config.discord_token, intents)
        .framework(framework)
        .await?;

    info!("Starting bot...");
    client.start().await?;

    Ok(())
}

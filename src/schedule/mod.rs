// Background loops started from framework setup
mod announcer;
mod reminders;
mod status;

use poise::serenity_prelude as serenity;
use tracing::info;

use crate::models::Data;

/// Spawn the announcement, reminder and presence rotation loops
pub fn spawn_background_tasks(ctx: &serenity::Context, data: &Data) {
    tokio::spawn(announcer::run(ctx.http.clone(), data.clone()));
    tokio::spawn(reminders::run(ctx.http.clone(), data.clone()));
    tokio::spawn(status::run(ctx.clone()));
    info!("Background tasks started");
}

use std::str::FromStr;

use chrono::Utc;
use cron::Schedule;
use poise::serenity_prelude::{self as serenity, ActivityData, OnlineStatus};
use rand::seq::IndexedRandom;
use tokio::time::{sleep, Duration};
use tracing::{error, info};

use crate::constants::{STATUS_LINES, STATUS_ROTATION_CRON};

/// Presence rotation: set an idle custom status now and swap it for a
/// random one every midnight UTC
pub async fn run(ctx: serenity::Context) {
    let schedule = match Schedule::from_str(STATUS_ROTATION_CRON) {
        Ok(schedule) => schedule,
        Err(e) => {
            error!("Invalid status rotation cron: {}", e);
            return;
        }
    };

    set_random_status(&ctx);

    loop {
        let Some(next) = schedule.upcoming(Utc).next() else {
            return;
        };
        let wait = (next - Utc::now())
            .to_std()
            .unwrap_or(Duration::from_secs(0));
        sleep(wait).await;

        set_random_status(&ctx);
    }
}

fn set_random_status(ctx: &serenity::Context) {
    let Some(line) = STATUS_LINES.choose(&mut rand::rng()) else {
        return;
    };
    ctx.set_presence(Some(ActivityData::custom(*line)), OnlineStatus::Idle);
    info!("Presence set to {:?}", line);
}

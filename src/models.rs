use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use poise::serenity_prelude::{ChannelId, GuildId, MessageId, RoleId};

use crate::constants::SESSION_TTL_SECS;
use crate::database::Database;
use crate::giftcode::CaptchaModel;
use crate::utils::pagination::Pager;
use crate::utils::translator::Translator;

/// A `/mass_redeem` invocation waiting for its Start/Cancel decision,
/// parked keyed by the prompt message id
#[derive(Clone)]
pub struct RedeemPrompt {
    pub code: String,
    pub ids: Vec<u64>,
    pub locale: String,
    created_at: Instant,
}

/// Failed bucket of a finished batch run, parked keyed by the progress
/// message id so the Retry button can re-run it
#[derive(Clone)]
pub struct RetryBucket {
    pub code: String,
    pub failed: Vec<u64>,
    pub locale: String,
    created_at: Instant,
}

/// Offset toggles of the reminder configurator
#[derive(Clone, Default)]
pub struct ReminderOffsets {
    pub five_m: bool,
    pub fifteen_m: bool,
    pub thirty_m: bool,
    pub one_h: bool,
    /// Custom offset in seconds, entered through the modal
    pub custom_secs: Option<i64>,
}

/// In-flight reminder configurator state, keyed by the configurator
/// message id
#[derive(Clone)]
pub struct ReminderSession {
    pub guild_id: GuildId,
    pub event_id: u64,
    pub event_name: String,
    /// Unix timestamp of the event start
    pub event_time: i64,
    pub channel_id: Option<ChannelId>,
    pub role_id: Option<RoleId>,
    pub offsets: ReminderOffsets,
    created_at: Instant,
}

impl ReminderSession {
    pub fn new(guild_id: GuildId, event_id: u64, event_name: String, event_time: i64) -> Self {
        Self {
            guild_id,
            event_id,
            event_name,
            event_time,
            channel_id: None,
            role_id: None,
            offsets: ReminderOffsets::default(),
            created_at: Instant::now(),
        }
    }
}

/// Paginated message state
#[derive(Clone)]
pub struct PagerSession {
    pub pager: Pager,
    created_at: Instant,
}

trait Expirable {
    fn created_at(&self) -> Instant;
}

impl Expirable for RedeemPrompt {
    fn created_at(&self) -> Instant {
        self.created_at
    }
}

impl Expirable for RetryBucket {
    fn created_at(&self) -> Instant {
        self.created_at
    }
}

impl Expirable for ReminderSession {
    fn created_at(&self) -> Instant {
        self.created_at
    }
}

impl Expirable for PagerSession {
    fn created_at(&self) -> Instant {
        self.created_at
    }
}

/// Evict sessions nobody came back to
fn prune_expired<V: Expirable>(map: &DashMap<MessageId, V>) {
    let ttl = Duration::from_secs(SESSION_TTL_SECS);
    map.retain(|_, session| session.created_at().elapsed() < ttl);
}

/// Bot state shared across all handlers
#[derive(Clone)]
pub struct Data {
    /// Database connection
    pub db: Database,
    /// Locale tables for user-facing strings
    pub translator: Translator,
    /// Captcha OCR model; None when the model files are missing, in which
    /// case `/mass_redeem` refuses to run
    pub captcha_model: Option<Arc<CaptchaModel>>,
    /// JSON file holding the alliance's account id list
    pub ids_file: PathBuf,
    /// Pending `/mass_redeem` confirmations
    pub redeem_prompts: DashMap<MessageId, RedeemPrompt>,
    /// Failed buckets awaiting a retry click
    pub retry_buckets: DashMap<MessageId, RetryBucket>,
    /// Open reminder configurators
    pub reminder_sessions: DashMap<MessageId, ReminderSession>,
    /// Paginated list messages
    pub pagers: DashMap<MessageId, PagerSession>,
}

impl Data {
    pub fn new(
        db: Database,
        translator: Translator,
        captcha_model: Option<Arc<CaptchaModel>>,
        ids_file: PathBuf,
    ) -> Self {
        Self {
            db,
            translator,
            captcha_model,
            ids_file,
            redeem_prompts: DashMap::new(),
            retry_buckets: DashMap::new(),
            reminder_sessions: DashMap::new(),
            pagers: DashMap::new(),
        }
    }

    pub fn park_redeem_prompt(&self, message_id: MessageId, code: String, ids: Vec<u64>, locale: String) {
        prune_expired(&self.redeem_prompts);
        self.redeem_prompts.insert(
            message_id,
            RedeemPrompt {
                code,
                ids,
                locale,
                created_at: Instant::now(),
            },
        );
    }

    pub fn park_retry_bucket(&self, message_id: MessageId, code: String, failed: Vec<u64>, locale: String) {
        prune_expired(&self.retry_buckets);
        self.retry_buckets.insert(
            message_id,
            RetryBucket {
                code,
                failed,
                locale,
                created_at: Instant::now(),
            },
        );
    }

    pub fn park_reminder_session(&self, message_id: MessageId, session: ReminderSession) {
        prune_expired(&self.reminder_sessions);
        self.reminder_sessions.insert(message_id, session);
    }

    pub fn park_pager(&self, message_id: MessageId, pager: Pager) {
        prune_expired(&self.pagers);
        self.pagers.insert(
            message_id,
            PagerSession {
                pager,
                created_at: Instant::now(),
            },
        );
    }
}

pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Context<'a> = poise::Context<'a, Data, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_park_and_take_redeem_prompt() {
        let map: DashMap<MessageId, RedeemPrompt> = DashMap::new();
        map.insert(
            MessageId::new(1),
            RedeemPrompt {
                code: "CODE".to_string(),
                ids: vec![1, 2],
                locale: "en-US".to_string(),
                created_at: Instant::now(),
            },
        );

        prune_expired(&map);
        assert!(map.contains_key(&MessageId::new(1)));
    }

    #[test]
    fn test_prune_drops_expired_sessions() {
        let Some(expired) = Instant::now().checked_sub(Duration::from_secs(SESSION_TTL_SECS + 1))
        else {
            return;
        };

        let map: DashMap<MessageId, RedeemPrompt> = DashMap::new();
        map.insert(
            MessageId::new(1),
            RedeemPrompt {
                code: "CODE".to_string(),
                ids: vec![],
                locale: "en-US".to_string(),
                created_at: expired,
            },
        );

        prune_expired(&map);
        assert!(map.is_empty());
    }
}

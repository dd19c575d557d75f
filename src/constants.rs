/// Log directive for the application
pub const LOG_DIRECTIVE: &str = "whitebot=info";

/// Player account lookup endpoint of the gift-code API
pub const WOS_PLAYER_INFO_URL: &str = "https://wos-giftcode-api.centurygame.com/api/player";

/// Captcha challenge endpoint of the gift-code API
pub const WOS_CAPTCHA_URL: &str = "https://wos-giftcode-api.centurygame.com/api/captcha";

/// Gift-code redemption endpoint
pub const WOS_GIFTCODE_URL: &str = "https://wos-giftcode-api.centurygame.com/api/gift_code";

/// Origin header expected by the gift-code API
pub const WOS_ORIGIN: &str = "https://wos-giftcode.centurygame.com";

/// Shared secret appended to the canonical payload before hashing
pub const WOS_SIGNING_SECRET: &str = "tB87#kPtkxqOS2";

/// Pause between accounts during a mass redeem run
pub const REDEEM_DELAY_SECS: u64 = 2;

/// Tick size of the announcement and reminder loops
pub const SCHEDULE_TICK_SECS: u64 = 60;

/// A reminder fires when its armed timestamp is closer to now than this window
pub const REMINDER_WINDOW_SECS: i64 = 50;

/// Reminder rows whose event start lies this far in the past are pruned
pub const REMINDER_RETENTION_SECS: i64 = 86_400;

/// Interactive sessions (redeem prompts, reminder configurators, pagers)
/// are evicted after this many seconds without being confirmed
pub const SESSION_TTL_SECS: u64 = 3_600;

/// Rows per page in paginated list embeds
pub const PAGE_SIZE: usize = 5;

/// Cron expression for the daily presence rotation (midnight UTC)
pub const STATUS_ROTATION_CRON: &str = "0 0 0 * * *";

/// Status lines picked at random by the presence rotation
pub const STATUS_LINES: &[&str] = &[
    "ONE for all",
    "Keeping the furnace warm",
    "Counting marksmen",
    "Watching the ice melt",
    "Redeeming gift codes",
];

// Command modules
mod events;
mod giftcode;
mod help;
mod schedule;
mod squads;

// Re-export all commands
pub use events::{event, PICK_EVENT_NOTIFICATION, PICK_EVENT_RECURRENCE};
pub use giftcode::{mass_redeem, MASS_REDEEM_CANCEL, MASS_REDEEM_RETRY, MASS_REDEEM_START};
pub use help::help;
pub use schedule::schedule;
pub use squads::squads;

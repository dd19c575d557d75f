// Event and interaction handlers
mod giftcode;
mod interaction;
mod reminders;
mod scheduled_event;

pub use interaction::{handle_component, handle_modal};
pub use scheduled_event::{handle_scheduled_event_delete, handle_scheduled_event_update};

/// Utility modules for common functionality
pub mod datetime;
pub mod embeds;
pub mod interval;
pub mod messages;
pub mod pagination;
pub mod squad_math;
pub mod translator;

pub mod config;
pub(crate) mod identity;
pub(crate) mod kot;
pub(crate) mod reference;
pub mod summary;

pub(crate) type TicketNumber = i32;
pub(crate) type UserId = i32;
pub(crate) type LineId = i64;

/// Ticket desk commands (panel setup, announcements, closing)
pub mod ticket;

pub use ticket::*;

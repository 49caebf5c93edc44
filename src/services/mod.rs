pub mod ticketing;

pub use ticketing::{RawResponse, TicketingConnector};

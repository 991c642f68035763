pub mod settlement;

pub use settlement::{poll_until_settled, PollingPolicy};

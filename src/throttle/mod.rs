pub mod refill_scheduler;
pub mod throttled_client;
pub mod token_bucket;

pub use refill_scheduler::{refill_pass, RefillScheduler};
pub use throttled_client::ThrottledClient;
pub use token_bucket::{Permit, TokenBucket};

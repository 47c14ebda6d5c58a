//! Request-rate limiting for HTTP clients.
//!
//! [`ThrottledClient`] wraps anything implementing [`HttpClientTrait`] (a
//! `reqwest::Client` by default) behind a token bucket: up to `capacity`
//! requests may go out back to back, and a background task restores the
//! allowance every `period`. Results and errors of the wrapped client are
//! returned unchanged.

pub mod config;
pub mod error;
pub mod loggers;
pub mod observers;
pub mod throttle;
pub mod transport;

pub use config::ThrottleConfig;
pub use error::ThrottleError;
pub use throttle::ThrottledClient;
pub use transport::HttpClientTrait;

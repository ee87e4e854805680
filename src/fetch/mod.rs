//! Profile fetch module
//!
//! This module retrieves public profiles from the REST API, including:
//! - The profile record and its normalization from the API payload
//! - A throttle enforcing a fixed delay between requests
//! - The batcher that walks a username list one request at a time

mod batcher;
mod client;
mod profile;
mod throttle;

pub use batcher::FetchBatcher;
pub use client::{fetch_profile, profile_url};
pub use profile::{ApiUser, ProfileRecord};
pub use throttle::Throttle;

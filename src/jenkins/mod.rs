mod client;
pub mod types;

pub use client::JenkinsClient;
pub use types::{Job, Slot};

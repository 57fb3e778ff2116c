//! Service Module
//!
//! Business logic layer for the server.

pub mod fetch;
pub mod job;

pub use job::{JobController, JobError};

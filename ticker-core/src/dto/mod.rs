//! Data Transfer Objects
//!
//! Request and response bodies exchanged over the Ticker HTTP API.

pub mod job;

//! Core domain types
//!
//! These types describe polling jobs and are shared between the server
//! (which schedules them) and the client/CLI (which display them).

pub mod job;

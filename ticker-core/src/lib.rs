//! Ticker Core
//!
//! Core types shared by the Ticker polling service, its client and CLI.
//!
//! This crate contains:
//! - Domain types: job specifications and scheduled jobs
//! - DTOs: request/response bodies of the HTTP API

pub mod domain;
pub mod dto;

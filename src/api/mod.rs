//! Typed client for the notas processing API.

pub mod client;
pub mod dto;
pub mod error;

//! # Service Layer
//!
//! Caller-side policy built on top of [`crate::protocol::Session`].

pub mod flow;

pub use flow::{run, FlowReport};

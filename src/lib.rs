//! # submission-protocol
//!
//! Client for a small binary protocol: log in, send one submission, log out.
//! Every message has a fixed little-endian layout behind a common header and
//! carries a 16-bit one's-complement checksum.
//!
//! ## Layers
//! - [`core`]: checksum engine, wire layout and the MsgLen frame codec
//! - [`protocol`]: typed messages and the [`protocol::Session`] state machine
//! - [`transport`]: the [`transport::Transport`] trait and its TCP implementation
//! - [`service`]: the complete login/submit/logout flow
//! - [`config`], [`utils`]: configuration, logging, metrics and time
//!
//! ## Example
//! ```no_run
//! use submission_protocol::config::Config;
//! use submission_protocol::protocol::{LoginRequest, Session, SubmissionRequest};
//! use submission_protocol::service;
//!
//! # async fn demo() -> submission_protocol::error::Result<()> {
//! let config = Config::default();
//! let mut session = Session::connect(&config.client, config.retry.clone()).await?;
//! let report = service::run(
//!     &mut session,
//!     LoginRequest::new("alice@example.com", "secret"),
//!     SubmissionRequest::new("Alice", "alice@example.com", "https://example.com/repo"),
//! )
//! .await;
//! println!("token: {:?}", report.token);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod core;
pub mod error;
pub mod protocol;
pub mod service;
pub mod transport;
pub mod utils;

pub use error::{ProtocolError, Result};
pub use protocol::{Exchange, Session, SessionState};

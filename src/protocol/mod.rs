//! # Protocol
//!
//! Typed messages with their fixed encodings, and the session state machine
//! that sequences Login, Submission and Logout over a [`crate::transport::Transport`].

pub mod message;
pub mod session;


pub use message::{
    Exchange, LoginRequest, LoginResponse, LogoutResponse, Request, Response, SubmissionRequest,
    SubmissionResponse,
};
pub use session::{FailureCause, Session, SessionState};

//! Client session state machine.
//!
//! A [`Session`] owns the connection and runs one exchange at a time. Each
//! exchange encodes its request with a fresh timestamp, sends it, and waits
//! for the matching response:
//!
//! - a message with a bad checksum is dropped and the session keeps waiting
//!   on the same attempt; the request is *not* resent
//! - a send or receive failure, or a checksum-valid response of the wrong
//!   shape, costs one attempt; the request is re-encoded and resent after a
//!   fixed delay until the attempt budget runs out
//! - an exhausted budget during login fails the session; during submission
//!   or logout the session falls back to where it was, so the caller can
//!   still log out
//! - a zero-length receive means the server closed the connection
//! - a `G` notice ends the session whatever exchange was in flight, except
//!   during logout where `G` is the logout response itself
//!
//! ```text
//! Disconnected -> LoggingIn -> LoggedIn -> Submitting -> Submitted -> LoggingOut -> LoggedOut
//!                        any state --G--> Terminated(reason)
//!                        any state --fatal error--> Failed(cause)
//! ```

use std::fmt;

use tokio::time::sleep;
use tracing::{debug, info, instrument, warn};

use crate::config::{ClientConfig, RetryConfig};
use crate::core::checksum;
use crate::core::packet::MAX_MESSAGE_LEN;
use crate::error::{constants, ProtocolError, Result};
use crate::protocol::message::{
    Exchange, LoginRequest, LoginResponse, LogoutResponse, Request, Response, SubmissionRequest,
    SubmissionResponse,
};
use crate::transport::{TcpTransport, Transport};
use crate::utils::metrics::{Metrics, Timer};
use crate::utils::time::now_nanos;

/// Why a session ended in [`SessionState::Failed`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureCause {
    /// The server closed the connection.
    ConnectionClosed,
    /// An exchange used up its attempt budget.
    RetriesExhausted {
        exchange: Exchange,
        last_error: String,
    },
    /// Any other error the session cannot continue from.
    Fatal(String),
}

impl fmt::Display for FailureCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureCause::ConnectionClosed => f.write_str("connection closed"),
            FailureCause::RetriesExhausted {
                exchange,
                last_error,
            } => write!(f, "{exchange} retries exhausted ({last_error})"),
            FailureCause::Fatal(msg) => f.write_str(msg),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// Connected, nothing authenticated yet.
    Disconnected,
    LoggingIn,
    LoggedIn,
    Submitting,
    Submitted,
    LoggingOut,
    LoggedOut,
    /// The server sent a termination notice with this reason.
    Terminated(String),
    Failed(FailureCause),
}

impl SessionState {
    /// No further exchange is possible.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SessionState::LoggedOut | SessionState::Terminated(_) | SessionState::Failed(_)
        )
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionState::LoggedIn | SessionState::Submitted)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Disconnected => f.write_str("disconnected"),
            SessionState::LoggingIn => f.write_str("logging in"),
            SessionState::LoggedIn => f.write_str("logged in"),
            SessionState::Submitting => f.write_str("submitting"),
            SessionState::Submitted => f.write_str("submitted"),
            SessionState::LoggingOut => f.write_str("logging out"),
            SessionState::LoggedOut => f.write_str("logged out"),
            SessionState::Terminated(reason) => write!(f, "terminated ({reason})"),
            SessionState::Failed(cause) => write!(f, "failed ({cause})"),
        }
    }
}

/// One authenticated conversation over one connection.
pub struct Session<T: Transport> {
    transport: T,
    state: SessionState,
    retry: RetryConfig,
    metrics: Metrics,
}

impl Session<TcpTransport> {
    /// Open a TCP connection and start a session on it.
    pub async fn connect(client: &ClientConfig, retry: RetryConfig) -> Result<Self> {
        let transport = TcpTransport::connect(client).await?;
        Ok(Self::new(transport, retry))
    }
}

impl<T: Transport> Session<T> {
    pub fn new(transport: T, retry: RetryConfig) -> Self {
        Self {
            transport,
            state: SessionState::Disconnected,
            retry,
            metrics: Metrics::new(),
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn into_transport(self) -> T {
        self.transport
    }

    /// Close the underlying connection.
    pub async fn close(&mut self) -> Result<()> {
        self.transport.close().await
    }

    /// Authenticate. Allowed only before any successful login.
    ///
    /// A refused login (`Code != 'Y'`) returns [`ProtocolError::Rejected`]
    /// and puts the session back in `Disconnected`.
    #[instrument(skip(self, request), fields(user = %request.user))]
    pub async fn login(&mut self, request: LoginRequest) -> Result<LoginResponse> {
        let previous = self.begin(Exchange::Login)?;
        let _timer = Timer::start("login");

        let response = match self.exchange(&Request::Login(request)).await {
            Ok(Response::Login(r)) => r,
            Ok(other) => return Err(self.unexpected(Exchange::Login, &other)),
            Err(e) => return Err(self.fail(Exchange::Login, e, None)),
        };

        if response.is_accepted() {
            self.succeed(SessionState::LoggedIn);
            Ok(response)
        } else {
            let reason = if response.reason.is_empty() {
                format!("code {:?}", char::from(response.code))
            } else {
                response.reason.clone()
            };
            Err(self.reject(Exchange::Login, previous, reason))
        }
    }

    /// Send the submission. Requires an accepted login.
    ///
    /// An empty token returns [`ProtocolError::Rejected`] and an exhausted
    /// budget returns [`ProtocolError::RetriesExhausted`]; both leave the
    /// session where it was, so the caller can still log out.
    #[instrument(skip(self, request), fields(name = %request.name, repo = %request.repo))]
    pub async fn submit(&mut self, request: SubmissionRequest) -> Result<SubmissionResponse> {
        let previous = self.begin(Exchange::Submission)?;
        let _timer = Timer::start("submission");

        let response = match self.exchange(&Request::Submission(request)).await {
            Ok(Response::Submission(r)) => r,
            Ok(other) => return Err(self.unexpected(Exchange::Submission, &other)),
            Err(e) => return Err(self.fail(Exchange::Submission, e, Some(previous))),
        };

        if response.is_success() {
            info!(token = %response.token, "Submission accepted");
            self.succeed(SessionState::Submitted);
            Ok(response)
        } else {
            Err(self.reject(Exchange::Submission, previous, "empty token".into()))
        }
    }

    /// End the session. Requires an accepted login.
    #[instrument(skip(self))]
    pub async fn logout(&mut self) -> Result<LogoutResponse> {
        let previous = self.begin(Exchange::Logout)?;
        let _timer = Timer::start("logout");

        let response = match self.exchange(&Request::Logout).await {
            Ok(Response::Logout(r)) => r,
            Ok(other) => return Err(self.unexpected(Exchange::Logout, &other)),
            Err(e) => return Err(self.fail(Exchange::Logout, e, Some(previous))),
        };

        if response.is_success() {
            info!(reason = %response.reason, "Logged out");
            self.succeed(SessionState::LoggedOut);
            Ok(response)
        } else {
            Err(self.reject(Exchange::Logout, previous, "empty reason".into()))
        }
    }

    /// Check ordering and move into the exchange's in-flight state.
    /// Returns the state to fall back to on a refusal.
    fn begin(&mut self, exchange: Exchange) -> Result<SessionState> {
        let (allowed, in_flight) = match exchange {
            Exchange::Login => (
                self.state == SessionState::Disconnected,
                SessionState::LoggingIn,
            ),
            Exchange::Submission => (self.state.is_authenticated(), SessionState::Submitting),
            Exchange::Logout => (self.state.is_authenticated(), SessionState::LoggingOut),
        };

        if !allowed {
            return Err(ProtocolError::InvalidState {
                exchange,
                state: self.state.to_string(),
            });
        }

        self.metrics.exchange_started();
        Ok(self.transition(in_flight))
    }

    /// Run one exchange under the retry policy.
    async fn exchange(&mut self, request: &Request) -> Result<Response> {
        let exchange = request.exchange();
        let attempts = self.retry.max_attempts.max(1);
        let mut last_error = String::new();

        for attempt in 1..=attempts {
            if attempt > 1 {
                self.metrics.retry();
                sleep(self.retry.retry_delay).await;
            }

            match self.attempt(request).await {
                Ok(response) => return Ok(response),
                Err(e) if e.is_retryable() => {
                    warn!(%exchange, attempt, attempts, error = %e, "Exchange attempt failed");
                    last_error = e.to_string();
                }
                Err(e) => return Err(e),
            }
        }

        Err(ProtocolError::RetriesExhausted {
            exchange,
            attempts,
            last_error,
        })
    }

    /// Send once, then wait until a checksum-valid message arrives.
    async fn attempt(&mut self, request: &Request) -> Result<Response> {
        let exchange = request.exchange();
        let bytes = request.to_bytes(now_nanos()?);

        if let Err(e) = self.transport.send(&bytes).await {
            self.metrics.transport_error();
            return Err(e);
        }
        self.metrics.message_sent(bytes.len() as u64);
        debug!(%exchange, len = bytes.len(), "Request sent");

        loop {
            let mut frame = match self.transport.recv(MAX_MESSAGE_LEN).await {
                Ok(frame) => frame,
                Err(e) => {
                    self.metrics.transport_error();
                    return Err(e);
                }
            };

            if frame.is_empty() {
                return Err(ProtocolError::ConnectionClosed);
            }
            self.metrics.message_received(frame.len() as u64);

            if !checksum::verify(&mut frame) {
                self.metrics.checksum_failure();
                debug!(
                    %exchange,
                    len = frame.len(),
                    received = ?checksum::received(&frame),
                    "Dropping message with bad checksum"
                );
                continue;
            }

            return match Response::decode(&mut frame, exchange) {
                Ok(Response::Terminated(notice)) => {
                    self.metrics.termination();
                    Err(ProtocolError::ServerTerminated(notice.reason))
                }
                Ok(response) => Ok(response),
                Err(e) => {
                    self.metrics.protocol_error();
                    Err(e)
                }
            };
        }
    }

    fn transition(&mut self, next: SessionState) -> SessionState {
        info!(from = %self.state, to = %next, "State transition");
        std::mem::replace(&mut self.state, next)
    }

    fn succeed(&mut self, next: SessionState) {
        self.metrics.exchange_succeeded();
        let _ = self.transition(next);
    }

    fn reject(
        &mut self,
        exchange: Exchange,
        previous: SessionState,
        reason: String,
    ) -> ProtocolError {
        self.metrics.exchange_failed();
        warn!(%exchange, %reason, "Exchange refused by server");
        let _ = self.transition(previous);
        ProtocolError::Rejected { exchange, reason }
    }

    fn unexpected(&mut self, exchange: Exchange, response: &Response) -> ProtocolError {
        let err = ProtocolError::UnexpectedMessage(response.header().msg_type);
        self.fail(exchange, err, None)
    }

    /// Move to the state matching `err` and hand the error back.
    ///
    /// An exhausted budget returns to `fallback` when one is given; every
    /// other failure is terminal.
    fn fail(
        &mut self,
        exchange: Exchange,
        err: ProtocolError,
        fallback: Option<SessionState>,
    ) -> ProtocolError {
        self.metrics.exchange_failed();

        let next = match &err {
            ProtocolError::ServerTerminated(reason) => {
                warn!(%exchange, %reason, "Session terminated by server");
                SessionState::Terminated(reason.clone())
            }
            ProtocolError::ConnectionClosed => {
                warn!(%exchange, "{}", constants::ERR_CONNECTION_CLOSED);
                SessionState::Failed(FailureCause::ConnectionClosed)
            }
            ProtocolError::RetriesExhausted { last_error, .. } => {
                warn!(%exchange, %last_error, "Giving up on exchange");
                fallback.unwrap_or_else(|| {
                    SessionState::Failed(FailureCause::RetriesExhausted {
                        exchange,
                        last_error: last_error.clone(),
                    })
                })
            }
            other => {
                warn!(%exchange, error = %other, "Exchange failed");
                SessionState::Failed(FailureCause::Fatal(other.to_string()))
            }
        };

        let _ = self.transition(next);
        err
    }
}

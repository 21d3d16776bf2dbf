//! Typed messages and their fixed binary encodings.
//!
//! Requests are encoded immediately before each send with a fresh timestamp;
//! responses are decoded from a buffer whose length, and then checksum, have
//! been validated before any field is read.

use std::fmt;

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::core::checksum;
use crate::core::packet::{
    get_text, msg_type, put_text, Header, CODE_ACCEPTED, LOGIN_REQUEST_LEN, LOGIN_RESPONSE_LEN,
    LOGOUT_REQUEST_LEN, LOGOUT_RESPONSE_LEN, PASSWORD_LEN, PREFIX_LEN, REASON_LEN,
    SUBMISSION_FIELD_LEN, SUBMISSION_REQUEST_LEN, SUBMISSION_RESPONSE_LEN, TOKEN_LEN, USER_LEN,
};
use crate::error::{ProtocolError, Result};

/// The three request/response rounds of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Exchange {
    Login,
    Submission,
    Logout,
}

impl Exchange {
    pub fn name(self) -> &'static str {
        match self {
            Exchange::Login => "login",
            Exchange::Submission => "submission",
            Exchange::Logout => "logout",
        }
    }

    /// Encoded size of the response this exchange waits for.
    pub fn response_len(self) -> usize {
        match self {
            Exchange::Login => LOGIN_RESPONSE_LEN,
            Exchange::Submission => SUBMISSION_RESPONSE_LEN,
            Exchange::Logout => LOGOUT_RESPONSE_LEN,
        }
    }
}

impl fmt::Display for Exchange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Credentials for the login exchange.
#[derive(Clone, PartialEq, Eq)]
pub struct LoginRequest {
    pub user: String,
    pub password: String,
}

impl LoginRequest {
    pub fn new(user: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            password: password.into(),
        }
    }
}

// Keep passwords out of logs
impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Payload of the submission exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionRequest {
    pub name: String,
    pub email: String,
    pub repo: String,
}

impl SubmissionRequest {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        repo: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            repo: repo.into(),
        }
    }
}

/// Every message the client sends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Login(LoginRequest),
    Submission(SubmissionRequest),
    Logout,
}

impl Request {
    pub fn exchange(&self) -> Exchange {
        match self {
            Request::Login(_) => Exchange::Login,
            Request::Submission(_) => Exchange::Submission,
            Request::Logout => Exchange::Logout,
        }
    }

    pub fn msg_type(&self) -> u8 {
        match self {
            Request::Login(_) => msg_type::LOGIN,
            Request::Submission(_) => msg_type::SUBMISSION,
            Request::Logout => msg_type::LOGOUT,
        }
    }

    /// Exact encoded length, which is also the MsgLen header value.
    pub fn wire_len(&self) -> usize {
        match self {
            Request::Login(_) => LOGIN_REQUEST_LEN,
            Request::Submission(_) => SUBMISSION_REQUEST_LEN,
            Request::Logout => LOGOUT_REQUEST_LEN,
        }
    }

    /// Encode with the given timestamp and stamp the checksum.
    ///
    /// Every byte of every field is written; text longer than its field is
    /// truncated to leave room for the terminator.
    pub fn to_bytes(&self, timestamp: u64) -> Bytes {
        let len = self.wire_len();
        let mut buf = BytesMut::with_capacity(len);
        Header::new(self.msg_type(), len, timestamp).put(&mut buf);

        match self {
            Request::Login(login) => {
                put_text(&mut buf, &login.user, USER_LEN);
                put_text(&mut buf, &login.password, PASSWORD_LEN);
            }
            Request::Submission(sub) => {
                put_text(&mut buf, &sub.name, SUBMISSION_FIELD_LEN);
                put_text(&mut buf, &sub.email, SUBMISSION_FIELD_LEN);
                put_text(&mut buf, &sub.repo, SUBMISSION_FIELD_LEN);
            }
            Request::Logout => {}
        }

        debug_assert_eq!(buf.len(), len);
        let _ = checksum::stamp(&mut buf);
        buf.freeze()
    }

    /// Decode a request as the server sees it.
    ///
    /// The MsgType byte selects the layout; length and checksum are checked
    /// before any field is read.
    pub fn from_bytes(buf: &mut [u8]) -> Result<(Header, Request)> {
        let kind = *buf.first().ok_or(ProtocolError::InvalidHeader)?;
        let expected = match kind {
            msg_type::LOGIN => LOGIN_REQUEST_LEN,
            msg_type::SUBMISSION => SUBMISSION_REQUEST_LEN,
            msg_type::LOGOUT => LOGOUT_REQUEST_LEN,
            other => return Err(ProtocolError::UnexpectedMessage(other)),
        };
        check_len(buf, expected)?;
        check_checksum(buf)?;

        let mut src: &[u8] = &buf[..];
        let header = Header::parse(&mut src)?;
        let request = match kind {
            msg_type::LOGIN => Request::Login(LoginRequest {
                user: get_text(&mut src, USER_LEN)?,
                password: get_text(&mut src, PASSWORD_LEN)?,
            }),
            msg_type::SUBMISSION => Request::Submission(SubmissionRequest {
                name: get_text(&mut src, SUBMISSION_FIELD_LEN)?,
                email: get_text(&mut src, SUBMISSION_FIELD_LEN)?,
                repo: get_text(&mut src, SUBMISSION_FIELD_LEN)?,
            }),
            _ => Request::Logout,
        };
        Ok((header, request))
    }
}

/// Server answer to a login request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginResponse {
    pub header: Header,
    pub code: u8,
    /// Only populated when the login was refused.
    pub reason: String,
}

impl LoginResponse {
    pub fn new(code: u8, reason: impl Into<String>, timestamp: u64) -> Self {
        Self {
            header: Header::new(msg_type::LOGIN_RESPONSE, LOGIN_RESPONSE_LEN, timestamp),
            code,
            reason: reason.into(),
        }
    }

    pub fn is_accepted(&self) -> bool {
        self.code == CODE_ACCEPTED
    }
}

/// Server answer to a submission request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionResponse {
    pub header: Header,
    /// Empty when the submission failed.
    pub token: String,
}

impl SubmissionResponse {
    pub fn new(token: impl Into<String>, timestamp: u64) -> Self {
        Self {
            header: Header::new(
                msg_type::SUBMISSION_RESPONSE,
                SUBMISSION_RESPONSE_LEN,
                timestamp,
            ),
            token: token.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        !self.token.is_empty()
    }
}

/// Logout response, also used as the layout of the termination notice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogoutResponse {
    pub header: Header,
    pub reason: String,
}

impl LogoutResponse {
    pub fn new(reason: impl Into<String>, timestamp: u64) -> Self {
        Self {
            header: Header::new(msg_type::TERMINATION, LOGOUT_RESPONSE_LEN, timestamp),
            reason: reason.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        !self.reason.is_empty()
    }
}

/// Every message the client can receive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    Login(LoginResponse),
    Submission(SubmissionResponse),
    Logout(LogoutResponse),
    /// Unsolicited `G` notice; ends the session whatever was in flight.
    Terminated(LogoutResponse),
}

impl Response {
    /// Build a server-initiated termination notice.
    pub fn termination(reason: impl Into<String>, timestamp: u64) -> Self {
        Response::Terminated(LogoutResponse::new(reason, timestamp))
    }

    pub fn header(&self) -> &Header {
        match self {
            Response::Login(r) => &r.header,
            Response::Submission(r) => &r.header,
            Response::Logout(r) | Response::Terminated(r) => &r.header,
        }
    }

    pub fn wire_len(&self) -> usize {
        match self {
            Response::Login(_) => LOGIN_RESPONSE_LEN,
            Response::Submission(_) => SUBMISSION_RESPONSE_LEN,
            Response::Logout(_) | Response::Terminated(_) => LOGOUT_RESPONSE_LEN,
        }
    }

    /// Encode as the server would, stamping a fresh checksum.
    ///
    /// MsgType and Timestamp come from the header; MsgLen is always the
    /// layout's exact size.
    pub fn to_bytes(&self) -> Bytes {
        let len = self.wire_len();
        let header = self.header();
        let mut buf = BytesMut::with_capacity(len);
        Header::new(header.msg_type, len, header.timestamp).put(&mut buf);

        match self {
            Response::Login(r) => {
                buf.put_u8(r.code);
                put_text(&mut buf, &r.reason, REASON_LEN);
            }
            Response::Submission(r) => put_text(&mut buf, &r.token, TOKEN_LEN),
            Response::Logout(r) | Response::Terminated(r) => {
                put_text(&mut buf, &r.reason, REASON_LEN)
            }
        }

        let _ = checksum::stamp(&mut buf);
        buf.freeze()
    }

    /// Decode the response awaited by `expected`.
    ///
    /// A `G` message is a termination notice unless the logout exchange is
    /// the one waiting, in which case it is the expected logout response.
    /// The buffer must be exactly the awaited size and carry a valid
    /// checksum before any field is read.
    pub fn decode(buf: &mut [u8], expected: Exchange) -> Result<Response> {
        let is_notice =
            buf.first() == Some(&msg_type::TERMINATION) && expected != Exchange::Logout;
        let expected_len = if is_notice {
            LOGOUT_RESPONSE_LEN
        } else {
            expected.response_len()
        };

        check_len(buf, expected_len)?;
        check_checksum(buf)?;

        let mut src: &[u8] = &buf[..];
        let header = Header::parse(&mut src)?;

        if is_notice {
            let reason = get_text(&mut src, REASON_LEN)?;
            return Ok(Response::Terminated(LogoutResponse { header, reason }));
        }

        let response = match expected {
            Exchange::Login => Response::Login(LoginResponse {
                header,
                code: src.get_u8(),
                reason: get_text(&mut src, REASON_LEN)?,
            }),
            Exchange::Submission => Response::Submission(SubmissionResponse {
                header,
                token: get_text(&mut src, TOKEN_LEN)?,
            }),
            Exchange::Logout => Response::Logout(LogoutResponse {
                header,
                reason: get_text(&mut src, REASON_LEN)?,
            }),
        };
        Ok(response)
    }
}

/// Buffer length, and the MsgLen it declares, must both be `expected`.
fn check_len(buf: &[u8], expected: usize) -> Result<()> {
    if buf.len() != expected {
        return Err(ProtocolError::LengthMismatch {
            expected,
            actual: buf.len(),
        });
    }

    match Header::peek_len(buf) {
        Some(declared) if declared == expected => Ok(()),
        Some(declared) => Err(ProtocolError::LengthMismatch {
            expected,
            actual: declared,
        }),
        None => Err(ProtocolError::InvalidHeader),
    }
}

fn check_checksum(buf: &mut [u8]) -> Result<()> {
    match checksum::recompute(buf) {
        Some((received, computed)) if received == computed => Ok(()),
        Some((received, computed)) => Err(ProtocolError::ChecksumMismatch { received, computed }),
        None => Err(ProtocolError::LengthMismatch {
            expected: PREFIX_LEN,
            actual: buf.len(),
        }),
    }
}

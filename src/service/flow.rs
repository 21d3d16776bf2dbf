//! The complete client conversation: log in, submit if the login was
//! accepted, then log out unless the server already ended the session.

use tracing::{info, instrument, warn};

use crate::error::ProtocolError;
use crate::protocol::{LoginRequest, Session, SessionState, SubmissionRequest};
use crate::transport::Transport;

/// What happened during one run of the flow.
#[derive(Debug)]
pub struct FlowReport {
    /// Token issued for the submission, if one was accepted.
    pub token: Option<String>,
    /// Reason carried by the logout response.
    pub logout_reason: Option<String>,
    /// First error that stopped or degraded the flow.
    pub error: Option<ProtocolError>,
    /// Where the session ended up.
    pub final_state: SessionState,
}

impl FlowReport {
    /// The submission was accepted and the session closed cleanly.
    pub fn is_success(&self) -> bool {
        self.token.is_some() && self.final_state == SessionState::LoggedOut
    }

    /// Reason from a server termination notice, if one arrived.
    pub fn termination_reason(&self) -> Option<&str> {
        match &self.final_state {
            SessionState::Terminated(reason) => Some(reason),
            _ => None,
        }
    }
}

/// Run Login, Submission and Logout in order.
///
/// A refused or failed login skips everything else. A failed submission
/// still logs out when the session is open; a termination notice ends the
/// flow immediately.
#[instrument(skip_all)]
pub async fn run<T: Transport>(
    session: &mut Session<T>,
    login: LoginRequest,
    submission: SubmissionRequest,
) -> FlowReport {
    let mut report = FlowReport {
        token: None,
        logout_reason: None,
        error: None,
        final_state: SessionState::Disconnected,
    };

    if let Err(e) = session.login(login).await {
        warn!(error = %e, "Login failed, skipping submission");
        report.error = Some(e);
        report.final_state = session.state().clone();
        return report;
    }

    match session.submit(submission).await {
        Ok(response) => report.token = Some(response.token),
        Err(e) => {
            warn!(error = %e, "Submission failed");
            report.error = Some(e);
        }
    }

    if session.state().is_authenticated() {
        match session.logout().await {
            Ok(response) => report.logout_reason = Some(response.reason),
            Err(e) => {
                warn!(error = %e, "Logout failed");
                report.error.get_or_insert(e);
            }
        }
    }

    report.final_state = session.state().clone();
    info!(
        success = report.is_success(),
        state = %report.final_state,
        "Flow finished"
    );
    report
}

//! submit-client: log in, send one submission, log out.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use tracing::{debug, error, info, Instrument, Level};

use submission_protocol::config::Config;
use submission_protocol::protocol::{LoginRequest, Session, SubmissionRequest};
use submission_protocol::{service, utils, Result};

/// Send a submission to the server and report the token it issues.
#[derive(Debug, Parser)]
#[command(name = "submit-client", version, about)]
struct Args {
    /// Server host (overrides the config file)
    #[arg(long, help_heading("Connection"))]
    host: Option<String>,

    /// Server port (overrides the config file)
    #[arg(long, help_heading("Connection"))]
    port: Option<u16>,

    /// Email address; also used as the login user name
    #[arg(long, help_heading("Submission"))]
    email: String,

    /// Login password
    #[arg(long, help_heading("Submission"))]
    password: String,

    /// Full name to submit
    #[arg(long, help_heading("Submission"))]
    name: String,

    /// Repository URL to submit
    #[arg(long, help_heading("Submission"))]
    repo: String,

    /// TOML configuration file
    #[arg(long, value_name("FILE"), help_heading("Configuration"))]
    config: Option<PathBuf>,

    /// Attempts per exchange, including the first
    #[arg(long, help_heading("Configuration"))]
    attempts: Option<u32>,

    /// Pause between attempts, in milliseconds
    #[arg(long, value_name("MS"), help_heading("Configuration"))]
    retry_delay_ms: Option<u64>,

    /// Log level used when RUST_LOG is not set
    #[arg(long, value_name("LEVEL"), help_heading("Debug"))]
    log_level: Option<Level>,
}

impl Args {
    /// Config file (or defaults), then `SUBMIT_CLIENT_*`, then flags.
    fn load_config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::from_file(path)?,
            None => Config::default(),
        };
        config.apply_env()?;

        if let Some(host) = &self.host {
            config.client.host = host.clone();
        }
        if let Some(port) = self.port {
            config.client.port = port;
        }
        if let Some(attempts) = self.attempts {
            config.retry.max_attempts = attempts;
        }
        if let Some(ms) = self.retry_delay_ms {
            config.retry.retry_delay = Duration::from_millis(ms);
        }
        if let Some(level) = self.log_level {
            config.logging.log_level = level;
        }

        config.validate_strict()?;
        Ok(config)
    }
}

async fn submit(args: Args, config: Config) -> Result<bool> {
    let mut session = Session::connect(&config.client, config.retry.clone()).await?;

    let login = LoginRequest::new(args.email.clone(), args.password);
    let submission = SubmissionRequest::new(args.name, args.email, args.repo);
    let report = service::run(&mut session, login, submission).await;

    session.metrics().log_metrics();
    if let Err(e) = session.close().await {
        debug!(error = %e, "Failed to shut down connection");
    }

    if let Some(reason) = report.termination_reason() {
        println!("Session terminated by server: {reason}");
        return Ok(false);
    }
    if let Some(token) = &report.token {
        println!("Submission token: {token}");
    }
    if let Some(e) = &report.error {
        error!(error = %e, "Submission did not complete");
    }
    Ok(report.is_success())
}

fn main() -> ExitCode {
    let args = Args::parse();

    let config = match args.load_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = utils::logging::init(&config.logging) {
        eprintln!("{e}");
        return ExitCode::FAILURE;
    }

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!(error = %e, "Failed to start runtime");
            return ExitCode::FAILURE;
        }
    };

    let span = utils::logging::app_span(&config.logging);
    span.in_scope(|| info!(server = %config.client.address(), "Starting submission"));
    match runtime.block_on(submit(args, config).instrument(span)) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!(error = %e, "Submission failed");
            ExitCode::FAILURE
        }
    }
}

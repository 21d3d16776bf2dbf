//! Default timing values shared by the config layer and the transport.

use std::time::Duration;

/// How long to wait for the TCP connection to be established.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// How long a single receive may block before it counts as a transport failure.
pub const RESPONSE_TIMEOUT: Duration = Duration::from_secs(30);

/// Pause between retry attempts of a failed exchange.
pub const RETRY_DELAY: Duration = Duration::from_millis(500);

/// Attempts per exchange, the first one included.
pub const MAX_ATTEMPTS: u32 = 3;

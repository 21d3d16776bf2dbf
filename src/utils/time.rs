//! Wall-clock timestamps for message headers.

use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::{constants, ProtocolError, Result};

/// Nanoseconds since the Unix epoch, as carried in the Timestamp field.
///
/// # Errors
/// Returns `ProtocolError::Custom` if the system clock is before the epoch.
pub fn now_nanos() -> Result<u64> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .map_err(|_| ProtocolError::Custom(constants::ERR_SYSTEM_TIME.into()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_now_is_monotonic_enough() {
        let a = now_nanos().unwrap();
        let b = now_nanos().unwrap();
        assert!(a > 0);
        assert!(b >= a);
    }
}

/// Milliseconds since the UNIX epoch, used to stamp events.
#[cfg(feature = "std")]
pub fn current_timestamp() -> u64 {
    use std::time::SystemTime;
    // A clock set before the epoch is reported as the epoch itself
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

/// Devices without a wall clock stamp events with the epoch.
#[cfg(not(feature = "std"))]
pub fn current_timestamp() -> u64 {
    0
}

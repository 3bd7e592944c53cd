//! Geolocation acquisition. Device reads are blocking, so they run on the
//! blocking pool under a bounded wait; callers apply the result to a session
//! by id so a stale fix can never land on a session the user has left.

use std::time::Duration;

use anyhow::{anyhow, Result};

/// Bounded wait for one position fix.
pub const LOCATION_TIMEOUT: Duration = Duration::from_secs(10);

/// A source of device coordinates. Implementations block; the store drives
/// them through `acquire_location`.
pub trait LocationProvider: Send + 'static {
    fn current_location(&self) -> Result<(f64, f64)>;
}

/// Runs the provider on the blocking pool with a 10-second timeout. Returns
/// the fix or an error the caller surfaces as a status flag; it never blocks
/// other user actions.
pub async fn acquire_location<P: LocationProvider>(provider: P) -> Result<(f64, f64)> {
    let fix = tokio::time::timeout(
        LOCATION_TIMEOUT,
        tokio::task::spawn_blocking(move || provider.current_location()),
    )
    .await
    .map_err(|_| anyhow!("geolocation timed out after {:?}", LOCATION_TIMEOUT))?
    .map_err(|e| anyhow!("geolocation task failed: {}", e))??;

    Ok(fix)
}

/// Provider backed by an external helper command (typically a gpsd wrapper)
/// that prints "latitude longitude" on stdout.
pub struct CommandLocationProvider {
    command: String,
}

impl CommandLocationProvider {
    pub fn new(command: String) -> Self {
        Self { command }
    }

    /// Reads the helper command from `SKYLARK_LOCATION_CMD`.
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        let command = std::env::var("SKYLARK_LOCATION_CMD")
            .map_err(|_| anyhow!("SKYLARK_LOCATION_CMD environment variable is required"))?;
        Ok(Self::new(command))
    }
}

impl LocationProvider for CommandLocationProvider {
    fn current_location(&self) -> Result<(f64, f64)> {
        let output = std::process::Command::new("sh")
            .arg("-c")
            .arg(&self.command)
            .output()?;
        if !output.status.success() {
            return Err(anyhow!(
                "location command exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr)
            ));
        }
        parse_fix(&String::from_utf8_lossy(&output.stdout))
    }
}

fn parse_fix(output: &str) -> Result<(f64, f64)> {
    let mut parts = output.split_whitespace();
    let latitude: f64 = parts
        .next()
        .ok_or_else(|| anyhow!("location output is empty"))?
        .parse()
        .map_err(|e| anyhow!("invalid latitude in location output: {}", e))?;
    let longitude: f64 = parts
        .next()
        .ok_or_else(|| anyhow!("location output has no longitude"))?
        .parse()
        .map_err(|e| anyhow!("invalid longitude in location output: {}", e))?;

    if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
        return Err(anyhow!(
            "coordinates out of range: {} {}",
            latitude,
            longitude
        ));
    }
    Ok((latitude, longitude))
}

use crate::error::{KerberosError, KerberosResult};
use std::fs;
use std::path::Path;
use std::time::SystemTime;

/// Returns the current unix timestamp (seconds elapsed since 1970-01-01)
#[inline]
pub fn timestamp_secs() -> u64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .expect("Closed timelike curve, reality compromised")
        .as_secs()
}

/// The shared wall-clock origin every principal measures `TSn` against.
/// Read once at process start from `epoch.txt` (or overridden via
/// `--initial-wall-clock`), never mutated afterwards.
#[derive(Debug, Clone, Copy)]
pub struct Epoch(u64);

impl Epoch {
    pub fn new(unix_seconds: u64) -> Epoch {
        Epoch(unix_seconds)
    }

    /// Loads the epoch from a file containing a single decimal integer of
    /// UNIX seconds. Missing or malformed epoch files are a configuration
    /// failure: every principal in the system must agree on minute zero.
    pub fn load(path: &Path) -> KerberosResult<Epoch> {
        let raw = fs::read_to_string(path).map_err(|err| {
            KerberosError::ConfigurationFailure(format!(
                "could not read epoch file {}: {}",
                path.display(),
                err
            ))
        })?;
        let unix_seconds: u64 = raw.trim().parse().map_err(|_| {
            KerberosError::ConfigurationFailure(format!(
                "epoch file {} does not contain a decimal integer",
                path.display()
            ))
        })?;
        Ok(Epoch::new(unix_seconds))
    }

    pub fn write(&self, path: &Path) -> KerberosResult<()> {
        fs::write(path, self.0.to_string())
            .map_err(|err| KerberosError::ConfigurationFailure(err.to_string()))
    }

    /// Minutes elapsed since this epoch, at the current wall-clock instant.
    /// Monotonic within a process as long as the system clock does not move
    /// backwards.
    pub fn now_minutes(&self) -> u64 {
        timestamp_secs().saturating_sub(self.0) / 60
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn now_minutes_is_zero_at_epoch() {
        let epoch = Epoch::new(timestamp_secs());
        assert_eq!(epoch.now_minutes(), 0);
    }

    #[test]
    fn now_minutes_advances_with_elapsed_seconds() {
        let epoch = Epoch::new(timestamp_secs().saturating_sub(125));
        assert_eq!(epoch.now_minutes(), 2);
    }

    #[test]
    fn load_rejects_missing_file() {
        let result = Epoch::load(Path::new("/nonexistent/epoch.txt"));
        assert!(matches!(result, Err(KerberosError::ConfigurationFailure(_))));
    }
}

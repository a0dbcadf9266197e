//! Cycle parameters and fixed defaults.
//!
//! Interval fields come in as raw user text. Anything that is not a positive
//! whole number of seconds silently becomes the default for that field, so a
//! typo never blocks a start.

use std::fmt;
use std::time::Duration;
use tracing::warn;

/// Default seconds between target activations.
pub const DEFAULT_CYCLE_SECS: u64 = 20;

/// Default seconds the target is held in front.
pub const DEFAULT_DWELL_SECS: u64 = 2;

/// How often the window registry rescans the process list.
pub const SCAN_INTERVAL: Duration = Duration::from_secs(3);

/// Default chord that toggles the cycle on and off.
pub const DEFAULT_TOGGLE_HOTKEY: &str = "ctrl+alt+g";

/// User-supplied cycle parameters. Both intervals are at least one second.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OscillatorConfig {
    cycle: Duration,
    dwell: Duration,
}

impl Default for OscillatorConfig {
    fn default() -> Self {
        Self {
            cycle: Duration::from_secs(DEFAULT_CYCLE_SECS),
            dwell: Duration::from_secs(DEFAULT_DWELL_SECS),
        }
    }
}

impl OscillatorConfig {
    /// Build from whole seconds, substituting the default for any zero field.
    pub fn from_secs(cycle_secs: u64, dwell_secs: u64) -> Self {
        let cycle_secs = if cycle_secs == 0 {
            DEFAULT_CYCLE_SECS
        } else {
            cycle_secs
        };
        let dwell_secs = if dwell_secs == 0 {
            DEFAULT_DWELL_SECS
        } else {
            dwell_secs
        };

        Self {
            cycle: Duration::from_secs(cycle_secs),
            dwell: Duration::from_secs(dwell_secs),
        }
    }

    /// Build from raw text fields; each unparsable field falls back on its own.
    pub fn from_inputs(cycle: &str, dwell: &str) -> Self {
        let cycle_secs = parse_interval_secs(cycle).unwrap_or_else(|| {
            warn!(
                event = "config.cycle_fallback",
                input = cycle,
                default = DEFAULT_CYCLE_SECS
            );
            DEFAULT_CYCLE_SECS
        });
        let dwell_secs = parse_interval_secs(dwell).unwrap_or_else(|| {
            warn!(
                event = "config.dwell_fallback",
                input = dwell,
                default = DEFAULT_DWELL_SECS
            );
            DEFAULT_DWELL_SECS
        });

        Self::from_secs(cycle_secs, dwell_secs)
    }

    pub fn cycle(&self) -> Duration {
        self.cycle
    }

    pub fn dwell(&self) -> Duration {
        self.dwell
    }

    /// True when the dwell does not finish before the next activation is due.
    ///
    /// Not rejected: the caller decides whether that is what they want.
    pub fn overlaps(&self) -> bool {
        self.dwell >= self.cycle
    }
}

impl fmt::Display for OscillatorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "every {}s, hold {}s",
            self.cycle.as_secs(),
            self.dwell.as_secs()
        )
    }
}

/// Parse a positive whole number of seconds. Returns `None` for anything else.
pub fn parse_interval_secs(input: &str) -> Option<u64> {
    match input.trim().parse::<u64>() {
        Ok(0) | Err(_) => None,
        Ok(secs) => Some(secs),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_interval_secs() {
        assert_eq!(parse_interval_secs("5"), Some(5));
        assert_eq!(parse_interval_secs(" 23 "), Some(23));
        assert_eq!(parse_interval_secs("0"), None);
        assert_eq!(parse_interval_secs("-3"), None);
        assert_eq!(parse_interval_secs("abc"), None);
        assert_eq!(parse_interval_secs(""), None);
        assert_eq!(parse_interval_secs("2.5"), None);
    }

    #[test]
    fn test_from_inputs_falls_back_per_field() {
        let config = OscillatorConfig::from_inputs("abc", "4");
        assert_eq!(config.cycle(), Duration::from_secs(DEFAULT_CYCLE_SECS));
        assert_eq!(config.dwell(), Duration::from_secs(4));

        let config = OscillatorConfig::from_inputs("30", "");
        assert_eq!(config.cycle(), Duration::from_secs(30));
        assert_eq!(config.dwell(), Duration::from_secs(DEFAULT_DWELL_SECS));
    }

    #[test]
    fn test_zero_seconds_use_defaults() {
        assert_eq!(OscillatorConfig::from_secs(0, 0), OscillatorConfig::default());
    }

    #[test]
    fn test_overlap_detection() {
        assert!(!OscillatorConfig::from_secs(5, 2).overlaps());
        assert!(OscillatorConfig::from_secs(3, 3).overlaps());
        assert!(OscillatorConfig::from_secs(2, 5).overlaps());
    }

    #[test]
    fn test_display() {
        assert_eq!(
            OscillatorConfig::from_secs(5, 2).to_string(),
            "every 5s, hold 2s"
        );
    }
}

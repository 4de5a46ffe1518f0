//! Configuration for the depth cache and its update processor.
//!
//! This module provides the [`Config`] struct. Settings can be built in code
//! or loaded from environment variables:
//!
//! - `MARKET_DEPTH_WINDOW_SIZE` - depth retained per side before the first
//!   initial paint announces one
//! - `MARKET_DEPTH_RESUBSCRIBE` - `true`/`false`, whether sequence gaps
//!   trigger a resync request
//! - `MARKET_DEPTH_DISCIPLINE` - `MBO` or `MBL`, latch a discipline up front

use crate::error::Error;
use crate::types::Discipline;

/// Default depth retained per side
pub const DEFAULT_WINDOW_SIZE: usize = 10;

/// Configuration for depth processing
///
/// # Example
///
/// ```rust
/// use market_depth::Config;
/// use market_depth::types::Discipline;
///
/// let config = Config::new()
///     .with_window_size(20)
///     .with_discipline(Some(Discipline::ByOrder));
///
/// assert_eq!(config.window_size(), 20);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Window size applied until an initial paint sets one
    window_size: usize,

    /// Request a resync on sequence gaps
    resubscribe_on_gap: bool,

    /// Discipline fixed up front instead of learned from the feed
    discipline: Option<Discipline>,
}

impl Config {
    /// Create a configuration with default settings
    pub fn new() -> Self {
        Self {
            window_size: DEFAULT_WINDOW_SIZE,
            resubscribe_on_gap: true,
            discipline: None,
        }
    }

    /// Load settings from environment variables, falling back to defaults
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if a variable is set but cannot be parsed,
    /// or if the resulting configuration is invalid.
    pub fn from_env() -> Result<Self, Error> {
        let mut config = Self::new();

        if let Some(raw) = non_empty_var("MARKET_DEPTH_WINDOW_SIZE") {
            let window_size = raw.parse::<usize>().map_err(|e| {
                Error::Config(format!("MARKET_DEPTH_WINDOW_SIZE={raw:?}: {e}"))
            })?;
            config = config.with_window_size(window_size);
        }

        if let Some(raw) = non_empty_var("MARKET_DEPTH_RESUBSCRIBE") {
            let resubscribe = raw.parse::<bool>().map_err(|e| {
                Error::Config(format!("MARKET_DEPTH_RESUBSCRIBE={raw:?}: {e}"))
            })?;
            config = config.with_resubscribe_on_gap(resubscribe);
        }

        if let Some(raw) = non_empty_var("MARKET_DEPTH_DISCIPLINE") {
            let discipline = Discipline::parse(&raw).ok_or_else(|| {
                Error::Config(format!("MARKET_DEPTH_DISCIPLINE={raw:?}: expected MBO or MBL"))
            })?;
            config = config.with_discipline(Some(discipline));
        }

        config.validate()?;
        Ok(config)
    }

    /// Set the window size used before an initial paint
    #[must_use]
    pub fn with_window_size(mut self, window_size: usize) -> Self {
        self.window_size = window_size;
        self
    }

    /// Enable or disable resync requests on sequence gaps
    #[must_use]
    pub fn with_resubscribe_on_gap(mut self, resubscribe_on_gap: bool) -> Self {
        self.resubscribe_on_gap = resubscribe_on_gap;
        self
    }

    /// Fix the discipline up front (`None` to learn it from the feed)
    #[must_use]
    pub fn with_discipline(mut self, discipline: Option<Discipline>) -> Self {
        self.discipline = discipline;
        self
    }

    /// Check the configuration for invalid values
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for a zero window size.
    pub fn validate(&self) -> Result<(), Error> {
        if self.window_size == 0 {
            return Err(Error::Config("window size must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Get the window size
    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// Whether gaps trigger a resync request
    pub fn resubscribe_on_gap(&self) -> bool {
        self.resubscribe_on_gap
    }

    /// Get the fixed discipline, if any
    pub fn discipline(&self) -> Option<Discipline> {
        self.discipline
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

/// Returns the value of an environment variable if it exists and is non-empty.
fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::new();
        assert_eq!(config.window_size(), DEFAULT_WINDOW_SIZE);
        assert!(config.resubscribe_on_gap());
        assert_eq!(config.discipline(), None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_pattern() {
        let config = Config::new()
            .with_window_size(5)
            .with_resubscribe_on_gap(false)
            .with_discipline(Some(Discipline::ByLevel));

        assert_eq!(config.window_size(), 5);
        assert!(!config.resubscribe_on_gap());
        assert_eq!(config.discipline(), Some(Discipline::ByLevel));
    }

    #[test]
    fn test_zero_window_rejected() {
        let config = Config::new().with_window_size(0);
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }
}

// Tuning constants for the reelview gesture and scroll engine.
// Defaults match what felt right on phones; every value can be overridden
// from the environment for on-device tuning:
// - REELVIEW_VERTICAL_NOISE_PX: perpendicular motion that engages the scroll lock
// - REELVIEW_MIN_SWIPE_PX: shortest horizontal travel that counts as a swipe
// - REELVIEW_DIRECTION_RATIO: horizontal/vertical ratio a swipe must exceed
// - REELVIEW_SETTLE_MS: index recomputation cooldown after a horizontal gesture
// - REELVIEW_PREFETCH_RADIUS: neighbours handed to the image provider

use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;

/// Vertical motion (px) that commits a touch to native scrolling.
pub const DEFAULT_VERTICAL_NOISE_PX: f64 = 10.0;
/// Minimum horizontal travel (px) for a swipe.
pub const DEFAULT_MIN_SWIPE_PX: f64 = 50.0;
/// Horizontal travel must exceed this multiple of vertical travel.
pub const DEFAULT_DIRECTION_RATIO: f64 = 2.0;
/// Cooldown after a horizontal gesture before scroll tracking resumes.
pub const DEFAULT_SETTLE_MS: u64 = 100;
pub const DEFAULT_PREFETCH_RADIUS: usize = 2;

const ENV_VERTICAL_NOISE: &str = "REELVIEW_VERTICAL_NOISE_PX";
const ENV_MIN_SWIPE: &str = "REELVIEW_MIN_SWIPE_PX";
const ENV_DIRECTION_RATIO: &str = "REELVIEW_DIRECTION_RATIO";
const ENV_SETTLE_MS: &str = "REELVIEW_SETTLE_MS";
const ENV_PREFETCH_RADIUS: &str = "REELVIEW_PREFETCH_RADIUS";

/// Thresholds used by [`crate::gesture::GestureClassifier`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureThresholds {
    /// Vertical displacement that latches the scroll lock (default: 10)
    pub vertical_noise_px: f64,
    /// Minimum horizontal displacement for a swipe (default: 50)
    pub min_swipe_px: f64,
    /// Required horizontal:vertical dominance (default: 2.0)
    pub direction_ratio: f64,
}

impl Default for GestureThresholds {
    fn default() -> Self {
        Self {
            vertical_noise_px: DEFAULT_VERTICAL_NOISE_PX,
            min_swipe_px: DEFAULT_MIN_SWIPE_PX,
            direction_ratio: DEFAULT_DIRECTION_RATIO,
        }
    }
}

impl GestureThresholds {
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("vertical_noise_px", self.vertical_noise_px)?;
        positive("min_swipe_px", self.min_swipe_px)?;
        if !self.direction_ratio.is_finite() || self.direction_ratio < 1.0 {
            return Err(ConfigError::RatioBelowOne {
                ratio: self.direction_ratio,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ViewerConfig {
    pub gesture: GestureThresholds,
    /// Scroll tracking stays suppressed this long after a horizontal gesture ends.
    pub settle_delay: Duration,
    /// Items on each side of the active one offered for prefetch.
    pub prefetch_radius: usize,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            gesture: GestureThresholds::default(),
            settle_delay: Duration::from_millis(DEFAULT_SETTLE_MS),
            prefetch_radius: DEFAULT_PREFETCH_RADIUS,
        }
    }
}

impl ViewerConfig {
    /// Defaults overridden by any `REELVIEW_*` variables that are set.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`Self::from_env`] with an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(v) = parse_key(&lookup, ENV_VERTICAL_NOISE)? {
            config.gesture.vertical_noise_px = v;
        }
        if let Some(v) = parse_key(&lookup, ENV_MIN_SWIPE)? {
            config.gesture.min_swipe_px = v;
        }
        if let Some(v) = parse_key(&lookup, ENV_DIRECTION_RATIO)? {
            config.gesture.direction_ratio = v;
        }
        if let Some(ms) = parse_key::<u64, _>(&lookup, ENV_SETTLE_MS)? {
            config.settle_delay = Duration::from_millis(ms);
        }
        if let Some(radius) = parse_key(&lookup, ENV_PREFETCH_RADIUS)? {
            config.prefetch_radius = radius;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.gesture.validate()
    }
}

fn positive(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { name })
    }
}

fn parse_key<T, F>(lookup: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(key) else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse::<T>()
        .map(Some)
        .map_err(|_| ConfigError::InvalidEnv { key, value: raw })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ViewerConfig::default();
        assert_eq!(config.gesture.vertical_noise_px, 10.0);
        assert_eq!(config.gesture.min_swipe_px, 50.0);
        assert_eq!(config.gesture.direction_ratio, 2.0);
        assert_eq!(config.settle_delay, Duration::from_millis(100));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_overrides_from_lookup() {
        let config = ViewerConfig::from_lookup(lookup_from(&[
            (ENV_MIN_SWIPE, "80"),
            (ENV_SETTLE_MS, " 250 "),
            (ENV_PREFETCH_RADIUS, "4"),
        ]))
        .unwrap();
        assert_eq!(config.gesture.min_swipe_px, 80.0);
        assert_eq!(config.gesture.vertical_noise_px, 10.0);
        assert_eq!(config.settle_delay, Duration::from_millis(250));
        assert_eq!(config.prefetch_radius, 4);
    }

    #[test]
    fn test_empty_value_keeps_default() {
        let config = ViewerConfig::from_lookup(lookup_from(&[(ENV_MIN_SWIPE, "")])).unwrap();
        assert_eq!(config.gesture.min_swipe_px, DEFAULT_MIN_SWIPE_PX);
    }

    #[test]
    fn test_unparsable_value_rejected() {
        let err = ViewerConfig::from_lookup(lookup_from(&[(ENV_SETTLE_MS, "soon")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnv { key: ENV_SETTLE_MS, .. }));
    }

    #[test]
    fn test_validation() {
        let mut thresholds = GestureThresholds::default();
        thresholds.min_swipe_px = 0.0;
        assert_eq!(
            thresholds.validate(),
            Err(ConfigError::NonPositive {
                name: "min_swipe_px"
            })
        );

        let mut thresholds = GestureThresholds::default();
        thresholds.direction_ratio = 0.5;
        assert!(matches!(
            thresholds.validate(),
            Err(ConfigError::RatioBelowOne { .. })
        ));

        let mut thresholds = GestureThresholds::default();
        thresholds.vertical_noise_px = f64::NAN;
        assert!(thresholds.validate().is_err());
    }
}

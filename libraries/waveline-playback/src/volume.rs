//! Volume control
//!
//! Linear 0.0-1.0 gain, shared by every track loaded after it is set.
//! The icon tier is derived from the level.

use serde::{Deserialize, Serialize};

/// Volume used before the user touches the slider
pub const DEFAULT_VOLUME: f32 = 0.1;

/// Volume icon tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VolumeTier {
    /// Level is exactly 0
    Muted,

    /// 0 < level < 0.5
    Low,

    /// level >= 0.5
    High,
}

impl VolumeTier {
    pub fn for_level(level: f32) -> Self {
        if level <= 0.0 {
            VolumeTier::Muted
        } else if level < 0.5 {
            VolumeTier::Low
        } else {
            VolumeTier::High
        }
    }
}

/// Volume controller
#[derive(Debug, Clone, PartialEq)]
pub struct Volume {
    /// Volume level (0.0-1.0)
    level: f32,
}

impl Volume {
    /// Create a volume controller, clamping `level` into 0.0-1.0
    pub fn new(level: f32) -> Self {
        Self {
            level: Self::sanitize(level),
        }
    }

    pub fn set_level(&mut self, level: f32) {
        self.level = Self::sanitize(level);
    }

    pub fn level(&self) -> f32 {
        self.level
    }

    pub fn tier(&self) -> VolumeTier {
        VolumeTier::for_level(self.level)
    }

    pub fn is_muted(&self) -> bool {
        self.tier() == VolumeTier::Muted
    }

    /// Apply volume to an audio buffer (in-place)
    pub fn apply(&self, buffer: &mut [f32]) {
        let gain = self.level;

        if gain == 0.0 {
            buffer.fill(0.0);
        } else if gain != 1.0 {
            for sample in buffer.iter_mut() {
                *sample *= gain;
            }
        }
    }

    fn sanitize(level: f32) -> f32 {
        if level.is_nan() {
            0.0
        } else {
            level.clamp(0.0, 1.0)
        }
    }
}

impl Default for Volume {
    fn default() -> Self {
        Self::new(DEFAULT_VOLUME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_boundaries() {
        assert_eq!(VolumeTier::for_level(0.0), VolumeTier::Muted);
        assert_eq!(VolumeTier::for_level(0.49), VolumeTier::Low);
        assert_eq!(VolumeTier::for_level(0.5), VolumeTier::High);
        assert_eq!(VolumeTier::for_level(1.0), VolumeTier::High);
    }

    #[test]
    fn level_is_clamped() {
        let mut vol = Volume::new(1.5);
        assert_eq!(vol.level(), 1.0);

        vol.set_level(-0.2);
        assert_eq!(vol.level(), 0.0);
        assert!(vol.is_muted());

        vol.set_level(f32::NAN);
        assert_eq!(vol.level(), 0.0);
    }

    #[test]
    fn default_is_quiet() {
        let vol = Volume::default();
        assert_eq!(vol.level(), 0.1);
        assert_eq!(vol.tier(), VolumeTier::Low);
    }

    #[test]
    fn apply_to_buffer() {
        let vol = Volume::new(0.5);
        let mut buffer = vec![0.5, -1.0, 0.8];

        vol.apply(&mut buffer);

        assert_eq!(buffer, vec![0.25, -0.5, 0.4]);
    }

    #[test]
    fn apply_at_zero_silences() {
        let vol = Volume::new(0.0);
        let mut buffer = vec![0.5, 0.8, -0.3];

        vol.apply(&mut buffer);

        assert_eq!(buffer, vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn apply_at_unity_is_passthrough() {
        let vol = Volume::new(1.0);
        let mut buffer = vec![0.5, 0.8, -0.3];

        vol.apply(&mut buffer);

        assert_eq!(buffer, vec![0.5, 0.8, -0.3]);
    }
}

//! Auto-ranging policy, overflow detection and lux conversion.

use crate::settings::{Gain, IntegrationTime, Resolution};

/// Lux per count at gain 2x and 800 ms integration time
pub const BASE_RESOLUTION: f32 = 0.0036;

/// Read/adjust cycles the auto-ranging loop may spend before giving up
pub const MAX_RETRIES: u8 = 25;

/// Raw readings at or below this value lack resolution and trigger a more sensitive setting
pub const LOW_THRESHOLD: u16 = 100;

/// Raw count at which a reading is considered saturated.
///
/// Rows follow [`Gain::ALL`] (1/8, 1/4, 1x, 2x), columns follow
/// [`IntegrationTime::ALL`] (25 ms .. 800 ms).
const OVERFLOW_THRESHOLDS: [[u32; 6]; 4] = [
    [120_796, 60_398, 30_199, 15_099, 7_550, 3_775],
    [60_398, 30_199, 15_099, 7_550, 3_775, 1_887],
    [15_099, 7_550, 3_775, 1_887, 944, 472],
    [7_550, 3_775, 1_887, 944, 472, 236],
];

/// Saturation threshold for a gain and integration time pair
pub fn overflow_threshold(resolution: Resolution) -> u32 {
    OVERFLOW_THRESHOLDS[resolution.gain.index()][resolution.integration_time.index()]
}

/// `true` if `raw` is at or above the saturation threshold for `resolution`
pub fn is_overflow(resolution: Resolution, raw: u16) -> bool {
    u32::from(raw) >= overflow_threshold(resolution)
}

/// Lux scaling factor for a gain code. Not the gain multiplier.
pub const fn gain_factor(gain: Gain) -> f32 {
    match gain {
        Gain::X2 => 1.0,
        Gain::X1 => 2.0,
        Gain::X1_4 => 8.0,
        Gain::X1_8 => 16.0,
    }
}

/// Lux scaling factor for an integration time code
pub const fn integration_factor(integration_time: IntegrationTime) -> f32 {
    match integration_time {
        IntegrationTime::Ms800 => 1.0,
        IntegrationTime::Ms400 => 2.0,
        IntegrationTime::Ms200 => 4.0,
        IntegrationTime::Ms100 => 8.0,
        IntegrationTime::Ms50 => 16.0,
        IntegrationTime::Ms25 => 32.0,
    }
}

/// Convert a raw ALS count to lux
pub fn lux(resolution: Resolution, raw: u16) -> f32 {
    f32::from(raw)
        * BASE_RESOLUTION
        * gain_factor(resolution.gain)
        * integration_factor(resolution.integration_time)
}

/// Decision taken after one raw reading in the auto-ranging loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub enum Step {
    /// Reading is resolved and not saturated
    Accept,
    /// Reading too low, continue with this more sensitive setting
    Increase(Resolution),
    /// Reading saturated, continue with this less sensitive setting
    Decrease(Resolution),
}

/// Classify `raw` taken at `resolution`
pub fn next_step(resolution: Resolution, raw: u16) -> Step {
    if raw <= LOW_THRESHOLD {
        Step::Increase(resolution.increased())
    } else if is_overflow(resolution, raw) {
        Step::Decrease(resolution.decreased())
    } else {
        Step::Accept
    }
}

impl Resolution {
    /// Starting point of the auto-ranging loop
    pub const AUTO_RANGE_START: Resolution = Resolution {
        gain: Gain::X1_8,
        integration_time: IntegrationTime::Ms100,
    };

    /// One step towards more sensitivity.
    ///
    /// Gain is raised first. Integration time only grows once gain is at 2x.
    /// At 2x / 800 ms the setting is returned unchanged.
    pub fn increased(self) -> Self {
        let gain = self.gain.index();
        if let Some(&next) = Gain::ALL.get(gain + 1) {
            return Resolution { gain: next, ..self };
        }

        let it = self.integration_time.index();
        if let Some(&next) = IntegrationTime::ALL.get(it + 1) {
            return Resolution {
                integration_time: next,
                ..self
            };
        }

        self
    }

    /// One step towards less sensitivity.
    ///
    /// Integration time is shortened first. Gain only drops once integration time is
    /// at 25 ms. At 1/8 / 25 ms the setting is returned unchanged.
    pub fn decreased(self) -> Self {
        let it = self.integration_time.index();
        if it > 0 {
            return Resolution {
                integration_time: IntegrationTime::ALL[it - 1],
                ..self
            };
        }

        let gain = self.gain.index();
        if gain > 0 {
            return Resolution {
                gain: Gain::ALL[gain - 1],
                ..self
            };
        }

        self
    }
}

use crate::error::{PowerError, Result};
use serde::{Deserialize, Serialize};

pub const DEFAULT_CAPACITY_MAH: f64 = 1000.;
pub const DEFAULT_VOLTAGE: f64 = 3.7;

/// Battery used for the runtime estimates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BatteryConfig {
    pub capacity_mah: f64,
    /// nominal cell voltage
    pub voltage: f64,
}

impl Default for BatteryConfig {
    fn default() -> Self {
        BatteryConfig {
            capacity_mah: DEFAULT_CAPACITY_MAH,
            voltage: DEFAULT_VOLTAGE,
        }
    }
}

impl BatteryConfig {
    pub fn new(capacity_mah: f64, voltage: f64) -> Result<BatteryConfig> {
        let config = BatteryConfig {
            capacity_mah,
            voltage,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.capacity_mah.is_finite() && self.capacity_mah > 0.) {
            return Err(PowerError::InvalidBattery(format!(
                "capacity must be > 0 mAh, got {}",
                self.capacity_mah
            )));
        }
        if !(self.voltage.is_finite() && self.voltage > 0.) {
            return Err(PowerError::InvalidBattery(format!(
                "voltage must be > 0 V, got {}",
                self.voltage
            )));
        }
        Ok(())
    }

    /// Stored energy in joules, mAh * V * 3.6.
    pub fn energy_j(&self) -> f64 {
        self.capacity_mah * self.voltage * 3.6
    }
}

/// Serde adapter for runtimes, an unlimited (infinite) runtime is stored as null.
pub mod unlimited {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(hours: &f64, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if hours.is_finite() {
            serializer.serialize_some(hours)
        } else {
            serializer.serialize_none()
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<f64, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::INFINITY))
    }
}

/// Expected runtime of the battery for one recording.
/// Infinite when the measured draw is not positive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BatteryEstimate {
    pub capacity_mah: f64,
    pub voltage: f64,
    pub avg_current_a: f64,
    pub avg_power_w: f64,
    /// capacity over the average current
    #[serde(with = "unlimited")]
    pub hours: f64,
    /// stored energy over the average power
    #[serde(with = "unlimited")]
    pub hours_by_energy: f64,
    #[serde(with = "unlimited")]
    pub days: f64,
}

impl BatteryEstimate {
    pub fn estimate(config: &BatteryConfig, avg_current_a: f64, avg_power_w: f64) -> Self {
        let hours = if avg_current_a > 0. {
            config.capacity_mah / (avg_current_a * 1000.)
        } else {
            f64::INFINITY
        };
        let hours_by_energy = if avg_power_w > 0. {
            config.energy_j() / (avg_power_w * 3600.)
        } else {
            f64::INFINITY
        };
        BatteryEstimate {
            capacity_mah: config.capacity_mah,
            voltage: config.voltage,
            avg_current_a,
            avg_power_w,
            hours,
            hours_by_energy,
            days: hours / 24.,
        }
    }
}

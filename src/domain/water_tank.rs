// Water tank telemetry derived from an ultrasonic distance reading
use serde::{Deserialize, Serialize};

use super::device::Device;

/// Fallback geometry for tanks that were never configured
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct TankDefaults {
    pub height_cm: f64,
    pub max_level_cm: f64,
    pub volume_m3: f64,
}

impl Default for TankDefaults {
    fn default() -> Self {
        Self {
            height_cm: 200.0,
            max_level_cm: 180.0,
            volume_m3: 4.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TankConfig {
    pub height_cm: f64,
    pub max_level_cm: f64,
    pub volume_m3: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TankLevel {
    pub distance_cm: f64,
    pub water_height_cm: f64,
    pub percentage: f64,
    pub volume_m3: f64,
}

impl TankLevel {
    pub fn compute(distance_cm: f64, config: &TankConfig) -> Self {
        let water_height_cm = (config.height_cm - distance_cm).max(0.0);
        let percentage = if config.max_level_cm > 0.0 {
            (water_height_cm / config.max_level_cm * 100.0).clamp(0.0, 100.0)
        } else {
            0.0
        };
        let volume_m3 = percentage / 100.0 * config.volume_m3;

        Self {
            distance_cm,
            water_height_cm,
            percentage,
            volume_m3,
        }
    }

    /// Tank card figures, filling unset geometry from the defaults
    pub fn for_device(device: &Device, defaults: &TankDefaults) -> Self {
        let distance = device
            .val
            .as_deref()
            .and_then(|v| v.trim().parse::<f64>().ok())
            .unwrap_or(0.0);
        let config = TankConfig {
            height_cm: device.tank_height.unwrap_or(defaults.height_cm),
            max_level_cm: device.max_water_level.unwrap_or(defaults.max_level_cm),
            volume_m3: device.tank_volume.unwrap_or(defaults.volume_m3),
        };
        Self::compute(distance, &config)
    }

    pub fn whole_percent(&self) -> i64 {
        self.percentage as i64
    }

    pub fn volume_label(&self) -> String {
        format!("{:.1} m³", self.volume_m3)
    }
}

/// Integer fill percentage shown in the device status line.
///
/// Returns 0 when the reading or geometry is missing, or the max level is
/// not positive.
pub fn status_percentage(val: Option<&str>, tank_height: Option<f64>, max_level: Option<f64>) -> i64 {
    let (Some(distance), Some(height), Some(max_level)) = (
        val.and_then(|v| v.trim().parse::<f64>().ok()),
        tank_height,
        max_level,
    ) else {
        return 0;
    };
    if max_level <= 0.0 {
        return 0;
    }

    let percentage = (height - distance) / max_level * 100.0;
    (percentage as i64).clamp(0, 100)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::device::DeviceKind;

    #[test]
    fn test_status_percentage() {
        assert_eq!(status_percentage(Some("20"), Some(200.0), Some(180.0)), 100);
        assert_eq!(status_percentage(Some("110"), Some(200.0), Some(180.0)), 50);
        assert_eq!(status_percentage(Some("250"), Some(200.0), Some(180.0)), 0);
        assert_eq!(status_percentage(Some("abc"), Some(200.0), Some(180.0)), 0);
        assert_eq!(status_percentage(Some("20"), Some(200.0), Some(0.0)), 0);
        assert_eq!(status_percentage(None, Some(200.0), Some(180.0)), 0);
    }

    #[test]
    fn test_level_uses_defaults() {
        let mut device = Device::new("t", "Tank", DeviceKind::WaterSensor);
        device.val = Some("110".to_string());

        let level = TankLevel::for_device(&device, &TankDefaults::default());
        assert_eq!(level.water_height_cm, 90.0);
        assert_eq!(level.whole_percent(), 50);
        assert_eq!(level.volume_label(), "2.0 m³");
    }

    #[test]
    fn test_level_floors_and_clamps() {
        let config = TankConfig {
            height_cm: 100.0,
            max_level_cm: 80.0,
            volume_m3: 2.0,
        };

        let empty = TankLevel::compute(150.0, &config);
        assert_eq!(empty.water_height_cm, 0.0);
        assert_eq!(empty.percentage, 0.0);

        let full = TankLevel::compute(0.0, &config);
        assert_eq!(full.percentage, 100.0);
        assert_eq!(full.volume_m3, 2.0);
    }
}

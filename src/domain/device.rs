// Device domain model
use serde::{Deserialize, Serialize};

use super::layout::{CardSize, DeviceCard, Placeable};
use super::water_tank::status_percentage;

const UNASSIGNED_ROOM: &str = "Unassigned";
const UNKNOWN_MAC: &str = "00:00:00:00:00:00";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceKind {
    Light,
    Fan,
    Ac,
    Tv,
    WaterSensor,
    Sensor,
    #[serde(other)]
    Plug,
}

impl DeviceKind {
    /// Card size used when the device has never been resized
    pub fn default_size(self) -> CardSize {
        match self {
            DeviceKind::Light | DeviceKind::WaterSensor => CardSize::Small,
            DeviceKind::Fan | DeviceKind::Ac => CardSize::Wide,
            DeviceKind::Tv => CardSize::Tall,
            DeviceKind::Sensor | DeviceKind::Plug => CardSize::Small,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: DeviceKind,
    #[serde(default)]
    pub room: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub home_id: Option<String>,
    #[serde(default)]
    pub owner_email: Option<String>,
    #[serde(default)]
    pub show_on_dashboard: Option<bool>,
    #[serde(default)]
    pub size: Option<CardSize>,
    #[serde(default)]
    pub mac_address: Option<String>,
    /// Raw sensor reading. For water sensors this is the distance in cm.
    #[serde(default)]
    pub val: Option<String>,
    #[serde(default)]
    pub tank_height: Option<f64>,
    #[serde(default)]
    pub max_water_level: Option<f64>,
    #[serde(default)]
    pub tank_volume: Option<f64>,
    /// Asks the hardware to factory reset before the document is removed
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub reset_command: bool,
}

impl Device {
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: DeviceKind) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            room: String::new(),
            status: "Off".to_string(),
            is_active: false,
            home_id: None,
            owner_email: None,
            show_on_dashboard: None,
            size: None,
            mac_address: None,
            val: None,
            tank_height: None,
            max_water_level: None,
            tank_volume: None,
            reset_command: false,
        }
    }

    pub fn effective_size(&self) -> CardSize {
        self.size.unwrap_or_else(|| self.kind.default_size())
    }

    pub fn is_visible(&self) -> bool {
        self.show_on_dashboard.unwrap_or(true)
    }

    pub fn room_label(&self) -> &str {
        if self.room.is_empty() {
            UNASSIGNED_ROOM
        } else {
            &self.room
        }
    }

    pub fn mac_label(&self) -> &str {
        self.mac_address.as_deref().unwrap_or(UNKNOWN_MAC)
    }

    pub fn has_tank_config(&self) -> bool {
        self.tank_height.is_some() && self.max_water_level.is_some()
    }

    pub fn icon(&self) -> &'static str {
        match self.kind {
            DeviceKind::Light if self.is_active => "lightbulb.fill",
            DeviceKind::Light => "lightbulb",
            DeviceKind::Fan => "fanblades.fill",
            DeviceKind::Ac => "snowflake",
            DeviceKind::Tv => "tv.fill",
            DeviceKind::WaterSensor => "drop.fill",
            DeviceKind::Sensor => "sensor.tag.radiowaves.forward.fill",
            DeviceKind::Plug => "powerplug",
        }
    }

    /// Human readable status line shown under the device name
    pub fn status_text(&self) -> String {
        match self.kind {
            DeviceKind::Sensor if self.is_active => "Motion Detected".to_string(),
            DeviceKind::Sensor => "Clear".to_string(),
            DeviceKind::WaterSensor if self.has_tank_config() => {
                let percentage = status_percentage(
                    self.val.as_deref(),
                    self.tank_height,
                    self.max_water_level,
                );
                format!("{}%", percentage)
            }
            DeviceKind::WaterSensor => self.val.clone().unwrap_or_else(|| "--".to_string()),
            _ if self.is_active => "On".to_string(),
            _ => "Off".to_string(),
        }
    }

    pub fn to_card(&self) -> DeviceCard {
        DeviceCard {
            id: self.id.clone(),
            size: self.effective_size(),
            visible: self.is_visible(),
        }
    }
}

impl Placeable for Device {
    fn card_size(&self) -> CardSize {
        self.effective_size()
    }
}

/// Distinct, sorted room names, ignoring empty and unassigned rooms
pub fn available_rooms(devices: &[Device]) -> Vec<String> {
    let mut rooms: Vec<String> = devices
        .iter()
        .map(|d| d.room.as_str())
        .filter(|r| !r.is_empty() && *r != UNASSIGNED_ROOM)
        .map(str::to_string)
        .collect();
    rooms.sort();
    rooms.dedup();
    rooms
}

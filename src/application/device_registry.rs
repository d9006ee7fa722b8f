// Repository trait for the device registry
use crate::domain::device::Device;
use crate::domain::layout::CardSize;
use crate::domain::water_tank::TankConfig;
use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::broadcast;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("device not found: {0}")]
    NotFound(String),

    #[error("device already exists: {0}")]
    Duplicate(String),

    #[error("device registry unavailable: {0}")]
    Unavailable(String),
}

/// Partial update applied to a single device document
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceUpdate {
    Size(CardSize),
    Visibility(bool),
    Active { is_active: bool, status: Option<String> },
    Name(String),
    Room(String),
    Tank(TankConfig),
    ResetCommand,
}

impl DeviceUpdate {
    pub fn apply(&self, device: &mut Device) {
        match self {
            DeviceUpdate::Size(size) => device.size = Some(*size),
            DeviceUpdate::Visibility(show) => device.show_on_dashboard = Some(*show),
            DeviceUpdate::Active { is_active, status } => {
                device.is_active = *is_active;
                if let Some(status) = status {
                    device.status = status.clone();
                }
            }
            DeviceUpdate::Name(name) => device.name = name.clone(),
            DeviceUpdate::Room(room) => device.room = room.clone(),
            DeviceUpdate::Tank(tank) => {
                device.tank_height = Some(tank.height_cm);
                device.max_water_level = Some(tank.max_level_cm);
                device.tank_volume = Some(tank.volume_m3);
            }
            DeviceUpdate::ResetCommand => device.reset_command = true,
        }
    }
}

/// Emitted whenever devices of a home change
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryEvent {
    pub home_id: String,
}

#[async_trait]
pub trait DeviceRegistry: Send + Sync {
    /// Devices of a household, in registry order
    async fn list_devices(&self, home_id: &str) -> Result<Vec<Device>, RegistryError>;

    async fn get_device(&self, id: &str) -> Result<Device, RegistryError>;

    async fn add_device(&self, device: Device) -> Result<Device, RegistryError>;

    async fn update_device(&self, id: &str, update: DeviceUpdate) -> Result<Device, RegistryError>;

    async fn delete_device(&self, id: &str) -> Result<(), RegistryError>;

    /// Change notifications, used to push fresh layouts
    fn subscribe(&self) -> broadcast::Receiver<RegistryEvent>;
}

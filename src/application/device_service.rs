// Device service - Use cases for managing household devices
use crate::application::device_registry::{DeviceRegistry, DeviceUpdate, RegistryError};
use crate::domain::device::{available_rooms, Device, DeviceKind};
use crate::domain::layout::CardSize;
use crate::domain::water_tank::{TankConfig, TankDefaults, TankLevel};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

#[derive(Clone)]
pub struct DeviceService {
    registry: Arc<dyn DeviceRegistry>,
    reset_grace: Duration,
}

impl DeviceService {
    pub fn new(registry: Arc<dyn DeviceRegistry>, reset_grace: Duration) -> Self {
        Self {
            registry,
            reset_grace,
        }
    }

    /// Devices of a home with dashboard cards ahead of hidden ones
    pub async fn list_devices(&self, home_id: &str) -> Result<Vec<Device>, RegistryError> {
        let mut devices = self.registry.list_devices(home_id).await?;
        devices.sort_by_key(|d| !d.is_visible());
        Ok(devices)
    }

    pub async fn add_device(&self, home_id: &str, mut device: Device) -> Result<Device, RegistryError> {
        device.home_id = Some(home_id.to_string());
        if device.id.is_empty() {
            device.id = uuid::Uuid::new_v4().to_string();
        }
        tracing::info!("Adding device {} ({:?}) to home {}", device.id, device.kind, home_id);
        self.registry.add_device(device).await
    }

    pub async fn toggle(&self, id: &str) -> Result<Device, RegistryError> {
        let device = self.registry.get_device(id).await?;
        let is_active = !device.is_active;
        // water sensors report their reading through the status field
        let status = match device.kind {
            DeviceKind::WaterSensor => None,
            _ => Some(if is_active { "On" } else { "Off" }.to_string()),
        };
        self.registry
            .update_device(id, DeviceUpdate::Active { is_active, status })
            .await
    }

    pub async fn set_size(&self, id: &str, size: CardSize) -> Result<Device, RegistryError> {
        self.registry.update_device(id, DeviceUpdate::Size(size)).await
    }

    pub async fn cycle_size(&self, id: &str) -> Result<Device, RegistryError> {
        let device = self.registry.get_device(id).await?;
        self.set_size(id, device.effective_size().next()).await
    }

    pub async fn set_visibility(&self, id: &str, visible: bool) -> Result<Device, RegistryError> {
        self.registry
            .update_device(id, DeviceUpdate::Visibility(visible))
            .await
    }

    pub async fn rename(&self, id: &str, name: &str) -> Result<Device, RegistryError> {
        self.registry
            .update_device(id, DeviceUpdate::Name(name.to_string()))
            .await
    }

    pub async fn move_to_room(&self, id: &str, room: &str) -> Result<Device, RegistryError> {
        self.registry
            .update_device(id, DeviceUpdate::Room(room.to_string()))
            .await
    }

    pub async fn rooms(&self, home_id: &str) -> Result<Vec<String>, RegistryError> {
        let devices = self.registry.list_devices(home_id).await?;
        Ok(available_rooms(&devices))
    }

    pub async fn configure_tank(&self, id: &str, tank: TankConfig) -> Result<Device, RegistryError> {
        self.registry.update_device(id, DeviceUpdate::Tank(tank)).await
    }

    pub async fn tank_level(&self, id: &str, defaults: &TankDefaults) -> Result<TankLevel, RegistryError> {
        let device = self.registry.get_device(id).await?;
        Ok(TankLevel::for_device(&device, defaults))
    }

    /// Flag the device for a factory reset and drop it after the grace
    /// period. Removal runs in the background; the handle resolves once the
    /// device is gone.
    pub async fn delete(&self, id: &str) -> Result<JoinHandle<()>, RegistryError> {
        self.registry
            .update_device(id, DeviceUpdate::ResetCommand)
            .await?;

        let registry = self.registry.clone();
        let grace = self.reset_grace;
        let id = id.to_string();
        Ok(tokio::spawn(async move {
            tokio::time::sleep(grace).await;
            match registry.delete_device(&id).await {
                Ok(()) => tracing::info!("Deleted device {}", id),
                Err(e) => tracing::warn!("Failed to delete device {} after reset: {}", id, e),
            }
        }))
    }
}

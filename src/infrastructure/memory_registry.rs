// In-memory device registry
use crate::application::device_registry::{DeviceRegistry, DeviceUpdate, RegistryError, RegistryEvent};
use crate::domain::device::Device;
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::{broadcast, RwLock};

const EVENT_CAPACITY: usize = 64;

/// Keeps devices in insertion order and broadcasts every change
pub struct InMemoryDeviceRegistry {
    devices: RwLock<Vec<Device>>,
    events: broadcast::Sender<RegistryEvent>,
    unavailable: AtomicBool,
    writes_failing: AtomicBool,
}

impl Default for InMemoryDeviceRegistry {
    fn default() -> Self {
        Self::with_devices(Vec::new())
    }
}

impl InMemoryDeviceRegistry {
    pub fn with_devices(devices: Vec<Device>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            devices: RwLock::new(devices),
            events,
            unavailable: AtomicBool::new(false),
            writes_failing: AtomicBool::new(false),
        }
    }

    /// Make every call fail, simulating a lost backend
    #[cfg(test)]
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Keep reads working but fail every write
    #[cfg(test)]
    pub fn set_writes_failing(&self, failing: bool) {
        self.writes_failing.store(failing, Ordering::SeqCst);
    }

    fn check_writable(&self) -> Result<(), RegistryError> {
        self.check_available()?;
        if self.writes_failing.load(Ordering::SeqCst) {
            Err(RegistryError::Unavailable("registry is read-only".to_string()))
        } else {
            Ok(())
        }
    }

    fn check_available(&self) -> Result<(), RegistryError> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(RegistryError::Unavailable("registry offline".to_string()))
        } else {
            Ok(())
        }
    }

    fn notify(&self, device: &Device) {
        if let Some(home_id) = &device.home_id {
            // no subscribers is fine
            let _ = self.events.send(RegistryEvent {
                home_id: home_id.clone(),
            });
        }
    }
}

#[async_trait]
impl DeviceRegistry for InMemoryDeviceRegistry {
    async fn list_devices(&self, home_id: &str) -> Result<Vec<Device>, RegistryError> {
        self.check_available()?;
        let devices = self.devices.read().await;
        Ok(devices
            .iter()
            .filter(|d| d.home_id.as_deref() == Some(home_id))
            .cloned()
            .collect())
    }

    async fn get_device(&self, id: &str) -> Result<Device, RegistryError> {
        self.check_available()?;
        let devices = self.devices.read().await;
        devices
            .iter()
            .find(|d| d.id == id)
            .cloned()
            .ok_or_else(|| RegistryError::NotFound(id.to_string()))
    }

    async fn add_device(&self, device: Device) -> Result<Device, RegistryError> {
        self.check_writable()?;
        let mut devices = self.devices.write().await;
        if devices.iter().any(|d| d.id == device.id) {
            return Err(RegistryError::Duplicate(device.id));
        }
        devices.push(device.clone());
        drop(devices);

        self.notify(&device);
        Ok(device)
    }

    async fn update_device(&self, id: &str, update: DeviceUpdate) -> Result<Device, RegistryError> {
        self.check_writable()?;
        let mut devices = self.devices.write().await;
        let device = devices
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or_else(|| RegistryError::NotFound(id.to_string()))?;
        update.apply(device);
        let updated = device.clone();
        drop(devices);

        tracing::debug!("Updated device {}: {:?}", id, update);
        self.notify(&updated);
        Ok(updated)
    }

    async fn delete_device(&self, id: &str) -> Result<(), RegistryError> {
        self.check_writable()?;
        let mut devices = self.devices.write().await;
        let index = devices
            .iter()
            .position(|d| d.id == id)
            .ok_or_else(|| RegistryError::NotFound(id.to_string()))?;
        let removed = devices.remove(index);
        drop(devices);

        self.notify(&removed);
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<RegistryEvent> {
        self.events.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::device::DeviceKind;
    use crate::domain::layout::CardSize;

    fn lamp(id: &str, home: &str) -> Device {
        let mut d = Device::new(id, "Lamp", DeviceKind::Light);
        d.home_id = Some(home.to_string());
        d
    }

    #[tokio::test]
    async fn test_list_filters_by_home() {
        let registry = InMemoryDeviceRegistry::with_devices(vec![
            lamp("a", "h1"),
            lamp("b", "h2"),
            lamp("c", "h1"),
        ]);
        let ids: Vec<String> = registry
            .list_devices("h1")
            .await
            .unwrap()
            .into_iter()
            .map(|d| d.id)
            .collect();
        assert_eq!(ids, vec!["a", "c"]);
    }

    #[tokio::test]
    async fn test_update_notifies_home() {
        let registry = InMemoryDeviceRegistry::with_devices(vec![lamp("a", "h1")]);
        let mut events = registry.subscribe();

        let updated = registry
            .update_device("a", DeviceUpdate::Size(CardSize::Tall))
            .await
            .unwrap();
        assert_eq!(updated.size, Some(CardSize::Tall));
        assert_eq!(events.recv().await.unwrap().home_id, "h1");
    }

    #[tokio::test]
    async fn test_duplicate_and_missing() {
        let registry = InMemoryDeviceRegistry::with_devices(vec![lamp("a", "h1")]);
        assert!(matches!(
            registry.add_device(lamp("a", "h1")).await,
            Err(RegistryError::Duplicate(_))
        ));
        assert!(matches!(
            registry.update_device("zz", DeviceUpdate::Name("x".into())).await,
            Err(RegistryError::NotFound(_))
        ));
        assert!(matches!(
            registry.delete_device("zz").await,
            Err(RegistryError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_unavailable() {
        let registry = InMemoryDeviceRegistry::with_devices(vec![lamp("a", "h1")]);
        registry.set_unavailable(true);
        assert!(matches!(
            registry.get_device("a").await,
            Err(RegistryError::Unavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_failing_writes_keep_reads() {
        let registry = InMemoryDeviceRegistry::with_devices(vec![lamp("a", "h1")]);
        registry.set_writes_failing(true);
        assert!(registry.get_device("a").await.is_ok());
        assert!(matches!(
            registry.update_device("a", DeviceUpdate::Size(CardSize::Big)).await,
            Err(RegistryError::Unavailable(_))
        ));
        assert_eq!(registry.get_device("a").await.unwrap().size, None);
    }
}

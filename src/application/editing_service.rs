// Editing service - Drag-to-resize sessions with optimistic commits
use crate::application::device_registry::{DeviceRegistry, DeviceUpdate, RegistryError};
use crate::domain::device::Device;
use crate::domain::layout::{active_row, partition, CardSize, DeviceCard, Row};
use crate::domain::resize::{Displacement, ResizeGesture, ResizePredictor};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("dashboard of home {0} is not in editing mode")]
    NotEditing(String),

    #[error("card {0} is not on the dashboard")]
    UnknownCard(String),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Result of releasing a resize handle
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DragOutcome {
    pub committed: Option<CardSize>,
    /// Set when the registry write failed; the local size is kept regardless
    #[serde(skip_serializing_if = "Option::is_none")]
    pub write_error: Option<String>,
    pub rows: Vec<Row<DeviceCard>>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DragPreview {
    pub predicted: Option<CardSize>,
    pub active_row: Option<usize>,
}

/// Local state of one home's dashboard while it is being rearranged.
///
/// Cards are read from the registry on every call. Only committed sizes the
/// registry has not confirmed are kept here, on top of the fresh list.
#[derive(Default)]
struct DashboardSession {
    pending_sizes: HashMap<String, CardSize>,
    gestures: HashMap<String, ResizeGesture>,
}

impl DashboardSession {
    /// Forget cards that left the dashboard and sizes the registry already reports
    fn reconcile(&mut self, devices: &[Device]) {
        self.gestures
            .retain(|id, _| devices.iter().any(|d| d.id == *id && d.is_visible()));
        self.pending_sizes
            .retain(|id, size| devices.iter().any(|d| d.id == *id && d.size != Some(*size)));
    }

    fn cards(&self, devices: &[Device]) -> Vec<DeviceCard> {
        devices
            .iter()
            .filter(|d| d.is_visible())
            .map(|d| {
                let mut card = d.to_card();
                if let Some(size) = self.pending_sizes.get(&d.id) {
                    card.size = *size;
                }
                card
            })
            .collect()
    }

    fn rows(&self, devices: &[Device]) -> Vec<Row<DeviceCard>> {
        partition(self.cards(devices))
    }

    fn preview(&self, devices: &[Device], card_id: &str, predicted: Option<CardSize>) -> DragPreview {
        DragPreview {
            predicted,
            active_row: active_row(&self.rows(devices), |c| c.id == card_id),
        }
    }
}

fn ensure_card(devices: &[Device], card_id: &str) -> Result<(), SessionError> {
    if devices.iter().any(|d| d.id == card_id && d.is_visible()) {
        Ok(())
    } else {
        Err(SessionError::UnknownCard(card_id.to_string()))
    }
}

pub struct EditingService {
    registry: Arc<dyn DeviceRegistry>,
    predictor: ResizePredictor,
    sessions: Mutex<HashMap<String, DashboardSession>>,
}

impl EditingService {
    pub fn new(registry: Arc<dyn DeviceRegistry>, predictor: ResizePredictor) -> Self {
        Self {
            registry,
            predictor,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    pub fn predictor(&self) -> &ResizePredictor {
        &self.predictor
    }

    /// Enter or leave editing mode. Leaving drops every in-flight drag uncommitted.
    pub async fn set_editing(&self, home_id: &str, editing: bool) -> Result<Vec<Row<DeviceCard>>, SessionError> {
        let devices = self.registry.list_devices(home_id).await?;
        let mut sessions = self.sessions.lock().await;

        if editing {
            let session = sessions.entry(home_id.to_string()).or_default();
            session.reconcile(&devices);
            tracing::info!("Home {} entered editing mode", home_id);
            return Ok(session.rows(&devices));
        }

        match sessions.remove(home_id) {
            Some(session) => {
                let dropped = session.gestures.values().filter(|g| g.is_dragging()).count();
                if dropped > 0 {
                    tracing::debug!("Discarded {} in-flight drags for home {}", dropped, home_id);
                }
                Ok(session.rows(&devices))
            }
            None => Ok(DashboardSession::default().rows(&devices)),
        }
    }

    /// Current rows of a home in editing mode, local sizes included
    pub async fn layout(&self, home_id: &str) -> Result<Vec<Row<DeviceCard>>, SessionError> {
        let devices = self.registry.list_devices(home_id).await?;
        let mut sessions = self.sessions.lock().await;
        let session = sessions
            .get_mut(home_id)
            .ok_or_else(|| SessionError::NotEditing(home_id.to_string()))?;
        session.reconcile(&devices);
        Ok(session.rows(&devices))
    }

    /// Run `f` on the home's session against a fresh device list. The
    /// registry is read before the session lock is taken.
    async fn with_session<R>(
        &self,
        home_id: &str,
        card_id: &str,
        f: impl FnOnce(&mut DashboardSession, &[Device]) -> R,
    ) -> Result<R, SessionError> {
        let devices = self.registry.list_devices(home_id).await?;
        let mut sessions = self.sessions.lock().await;
        let session = sessions
            .get_mut(home_id)
            .ok_or_else(|| SessionError::NotEditing(home_id.to_string()))?;
        session.reconcile(&devices);
        ensure_card(&devices, card_id)?;
        Ok(f(session, &devices))
    }

    pub async fn drag_start(&self, home_id: &str, card_id: &str) -> Result<DragPreview, SessionError> {
        self.with_session(home_id, card_id, |session, devices| {
            session.gestures.entry(card_id.to_string()).or_default().begin();
            session.preview(devices, card_id, None)
        })
        .await
    }

    pub async fn drag_move(
        &self,
        home_id: &str,
        card_id: &str,
        displacement: Displacement,
    ) -> Result<DragPreview, SessionError> {
        let predictor = &self.predictor;
        self.with_session(home_id, card_id, |session, devices| {
            let predicted = session
                .gestures
                .entry(card_id.to_string())
                .or_default()
                .update(predictor, displacement);
            session.preview(devices, card_id, predicted)
        })
        .await
    }

    /// Release the handle. A predicted size is applied locally first and then
    /// written to the registry with the session lock released; a failed write
    /// does not undo the local size.
    pub async fn drag_end(&self, home_id: &str, card_id: &str) -> Result<DragOutcome, SessionError> {
        let (committed, rows) = self
            .with_session(home_id, card_id, |session, devices| {
                let committed = session.gestures.get_mut(card_id).and_then(ResizeGesture::end);
                if let Some(size) = committed {
                    session.pending_sizes.insert(card_id.to_string(), size);
                }
                (committed, session.rows(devices))
            })
            .await?;

        let mut write_error = None;
        if let Some(size) = committed {
            match self
                .registry
                .update_device(card_id, DeviceUpdate::Size(size))
                .await
            {
                Ok(_) => self.confirm_size(home_id, card_id, size).await,
                Err(e) => {
                    tracing::warn!("Failed to persist size {:?} for card {}: {}", size, card_id, e);
                    write_error = Some(e.to_string());
                }
            }
        }

        Ok(DragOutcome {
            committed,
            write_error,
            rows,
        })
    }

    /// Drop the local size once the registry holds it
    async fn confirm_size(&self, home_id: &str, card_id: &str, size: CardSize) {
        let mut sessions = self.sessions.lock().await;
        if let Some(session) = sessions.get_mut(home_id) {
            if session.pending_sizes.get(card_id) == Some(&size) {
                session.pending_sizes.remove(card_id);
            }
        }
    }

    pub async fn drag_cancel(&self, home_id: &str, card_id: &str) -> Result<(), SessionError> {
        let mut sessions = self.sessions.lock().await;
        let session = sessions
            .get_mut(home_id)
            .ok_or_else(|| SessionError::NotEditing(home_id.to_string()))?;
        if let Some(gesture) = session.gestures.get_mut(card_id) {
            gesture.cancel();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::device_registry::RegistryEvent;
    use crate::domain::device::DeviceKind;
    use crate::infrastructure::memory_registry::InMemoryDeviceRegistry;
    use async_trait::async_trait;
    use std::time::Duration;
    use tokio::sync::{broadcast, Notify};
    use tokio::time::timeout;

    fn registry() -> Arc<InMemoryDeviceRegistry> {
        let devices = ["a", "b", "c"]
            .iter()
            .map(|id| {
                let mut d = Device::new(*id, *id, DeviceKind::Light);
                d.home_id = Some("h1".to_string());
                d
            })
            .collect();
        Arc::new(InMemoryDeviceRegistry::with_devices(devices))
    }

    #[tokio::test]
    async fn test_drag_requires_editing_mode() {
        let service = EditingService::new(registry(), ResizePredictor::default());
        let result = service.drag_start("h1", "a").await;
        assert!(matches!(result, Err(SessionError::NotEditing(_))));
    }

    #[tokio::test]
    async fn test_drag_commits_prediction() {
        let registry = registry();
        let service = EditingService::new(registry.clone(), ResizePredictor::default());
        service.set_editing("h1", true).await.unwrap();

        service.drag_start("h1", "b").await.unwrap();
        let preview = service
            .drag_move("h1", "b", Displacement::new(50.0, 2.0))
            .await
            .unwrap();
        assert_eq!(preview.predicted, Some(CardSize::Wide));
        assert_eq!(preview.active_row, Some(0));

        let outcome = service.drag_end("h1", "b").await.unwrap();
        assert_eq!(outcome.committed, Some(CardSize::Wide));
        assert!(outcome.write_error.is_none());
        // a | b(wide) | c
        assert_eq!(outcome.rows.len(), 3);

        let stored = registry.get_device("b").await.unwrap();
        assert_eq!(stored.size, Some(CardSize::Wide));
    }

    #[tokio::test]
    async fn test_release_without_prediction_keeps_size() {
        let registry = registry();
        let service = EditingService::new(registry.clone(), ResizePredictor::default());
        service.set_editing("h1", true).await.unwrap();

        service.drag_start("h1", "a").await.unwrap();
        service
            .drag_move("h1", "a", Displacement::new(4.0, 4.0))
            .await
            .unwrap();
        let outcome = service.drag_end("h1", "a").await.unwrap();

        assert_eq!(outcome.committed, None);
        assert_eq!(registry.get_device("a").await.unwrap().size, None);
    }

    #[tokio::test]
    async fn test_failed_write_keeps_local_size() {
        let registry = registry();
        let service = EditingService::new(registry.clone(), ResizePredictor::default());
        service.set_editing("h1", true).await.unwrap();
        registry.set_writes_failing(true);

        service.drag_start("h1", "c").await.unwrap();
        service
            .drag_move("h1", "c", Displacement::new(60.0, 60.0))
            .await
            .unwrap();
        let outcome = service.drag_end("h1", "c").await.unwrap();

        assert_eq!(outcome.committed, Some(CardSize::Big));
        assert!(outcome.write_error.is_some());
        let local_big = outcome
            .rows
            .iter()
            .any(|r| matches!(r, Row::FullWidth { item } if item.id == "c" && item.size == CardSize::Big));
        assert!(local_big);

        // the local size outlives the failed write
        let rows = service.layout("h1").await.unwrap();
        assert!(rows
            .iter()
            .any(|r| matches!(r, Row::FullWidth { item } if item.id == "c" && item.size == CardSize::Big)));
        assert_eq!(registry.get_device("c").await.unwrap().size, None);
    }

    #[tokio::test]
    async fn test_session_follows_registry_changes() {
        let registry = registry();
        let service = EditingService::new(registry.clone(), ResizePredictor::default());
        service.set_editing("h1", true).await.unwrap();

        registry
            .update_device("a", DeviceUpdate::Visibility(false))
            .await
            .unwrap();
        registry
            .update_device("b", DeviceUpdate::Size(CardSize::Big))
            .await
            .unwrap();
        let mut porch = Device::new("d", "d", DeviceKind::Light);
        porch.home_id = Some("h1".to_string());
        registry.add_device(porch).await.unwrap();

        assert!(matches!(
            service.drag_start("h1", "a").await,
            Err(SessionError::UnknownCard(_))
        ));

        service.drag_start("h1", "d").await.unwrap();
        let outcome = service.drag_end("h1", "d").await.unwrap();
        let cards: Vec<(String, CardSize)> = outcome
            .rows
            .iter()
            .flat_map(|r| r.items())
            .map(|c| (c.id.clone(), c.size))
            .collect();
        assert_eq!(
            cards,
            vec![
                ("b".to_string(), CardSize::Big),
                ("c".to_string(), CardSize::Small),
                ("d".to_string(), CardSize::Small),
            ]
        );
    }

    #[tokio::test]
    async fn test_hiding_card_drops_its_drag() {
        let registry = registry();
        let service = EditingService::new(registry.clone(), ResizePredictor::default());
        service.set_editing("h1", true).await.unwrap();

        service.drag_start("h1", "a").await.unwrap();
        service
            .drag_move("h1", "a", Displacement::new(80.0, 80.0))
            .await
            .unwrap();
        registry
            .update_device("a", DeviceUpdate::Visibility(false))
            .await
            .unwrap();
        // the gesture goes away while the card is hidden
        service.layout("h1").await.unwrap();
        registry
            .update_device("a", DeviceUpdate::Visibility(true))
            .await
            .unwrap();
        assert_eq!(service.drag_end("h1", "a").await.unwrap().committed, None);
        assert_eq!(registry.get_device("a").await.unwrap().size, None);
    }

    /// Registry whose size writes wait until the test lets them through
    struct GatedRegistry {
        inner: InMemoryDeviceRegistry,
        write_started: Notify,
        release: Notify,
    }

    #[async_trait]
    impl DeviceRegistry for GatedRegistry {
        async fn list_devices(&self, home_id: &str) -> Result<Vec<Device>, RegistryError> {
            self.inner.list_devices(home_id).await
        }

        async fn get_device(&self, id: &str) -> Result<Device, RegistryError> {
            self.inner.get_device(id).await
        }

        async fn add_device(&self, device: Device) -> Result<Device, RegistryError> {
            self.inner.add_device(device).await
        }

        async fn update_device(&self, id: &str, update: DeviceUpdate) -> Result<Device, RegistryError> {
            self.write_started.notify_one();
            self.release.notified().await;
            self.inner.update_device(id, update).await
        }

        async fn delete_device(&self, id: &str) -> Result<(), RegistryError> {
            self.inner.delete_device(id).await
        }

        fn subscribe(&self) -> broadcast::Receiver<RegistryEvent> {
            self.inner.subscribe()
        }
    }

    #[tokio::test]
    async fn test_slow_write_does_not_block_sessions() {
        let devices = [("a", "h1"), ("b", "h1"), ("x", "h2")]
            .into_iter()
            .map(|(id, home)| {
                let mut d = Device::new(id, id, DeviceKind::Light);
                d.home_id = Some(home.to_string());
                d
            })
            .collect();
        let registry = Arc::new(GatedRegistry {
            inner: InMemoryDeviceRegistry::with_devices(devices),
            write_started: Notify::new(),
            release: Notify::new(),
        });
        let service = Arc::new(EditingService::new(registry.clone(), ResizePredictor::default()));
        service.set_editing("h1", true).await.unwrap();
        service.set_editing("h2", true).await.unwrap();

        service.drag_start("h1", "a").await.unwrap();
        service
            .drag_move("h1", "a", Displacement::new(50.0, 0.0))
            .await
            .unwrap();
        let pending = {
            let service = service.clone();
            tokio::spawn(async move { service.drag_end("h1", "a").await })
        };
        registry.write_started.notified().await;

        // h1's write is still in flight
        let other_home = async {
            service.drag_start("h2", "x").await.unwrap();
            service
                .drag_move("h2", "x", Displacement::new(0.0, 50.0))
                .await
                .unwrap()
        };
        let preview = timeout(Duration::from_millis(500), other_home)
            .await
            .expect("other home blocked by registry write");
        assert_eq!(preview.predicted, Some(CardSize::Tall));

        let local = timeout(Duration::from_millis(500), service.layout("h1"))
            .await
            .expect("own home blocked by registry write")
            .unwrap();
        assert!(matches!(&local[0], Row::FullWidth { item } if item.id == "a" && item.size == CardSize::Wide));

        registry.release.notify_one();
        let outcome = pending.await.unwrap().unwrap();
        assert_eq!(outcome.committed, Some(CardSize::Wide));
        assert!(outcome.write_error.is_none());
        assert_eq!(registry.get_device("a").await.unwrap().size, Some(CardSize::Wide));
    }

    #[tokio::test]
    async fn test_cancel_and_leaving_edit_mode_discard() {
        let registry = registry();
        let service = EditingService::new(registry.clone(), ResizePredictor::default());
        service.set_editing("h1", true).await.unwrap();

        service.drag_start("h1", "a").await.unwrap();
        service
            .drag_move("h1", "a", Displacement::new(0.0, 90.0))
            .await
            .unwrap();
        service.drag_cancel("h1", "a").await.unwrap();
        assert_eq!(service.drag_end("h1", "a").await.unwrap().committed, None);

        service.drag_start("h1", "b").await.unwrap();
        service
            .drag_move("h1", "b", Displacement::new(0.0, 90.0))
            .await
            .unwrap();
        service.set_editing("h1", false).await.unwrap();
        assert!(matches!(
            service.drag_end("h1", "b").await,
            Err(SessionError::NotEditing(_))
        ));
        assert_eq!(registry.get_device("b").await.unwrap().size, None);
    }

    #[tokio::test]
    async fn test_unknown_card() {
        let service = EditingService::new(registry(), ResizePredictor::default());
        service.set_editing("h1", true).await.unwrap();
        assert!(matches!(
            service.drag_start("h1", "nope").await,
            Err(SessionError::UnknownCard(_))
        ));
    }
}

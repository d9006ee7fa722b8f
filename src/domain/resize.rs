// Drag-to-resize prediction and per-card gesture state
use serde::{Deserialize, Serialize};

use super::layout::CardSize;

pub const DEFAULT_SENSITIVITY: f64 = 30.0;

/// Drag displacement from the resize handle's starting point
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct Displacement {
    pub width: f64,
    pub height: f64,
}

impl Displacement {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizePredictor {
    threshold: f64,
}

impl Default for ResizePredictor {
    fn default() -> Self {
        Self::new(DEFAULT_SENSITIVITY)
    }
}

impl ResizePredictor {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    /// Size the user is dragging towards. Width is checked before height.
    pub fn predict(&self, displacement: Displacement) -> Option<CardSize> {
        let t = self.threshold;
        let Displacement { width, height } = displacement;

        if width > t && height > t {
            Some(CardSize::Big)
        } else if width > t {
            Some(CardSize::Wide)
        } else if height > t {
            Some(CardSize::Tall)
        } else if width < -t || height < -t {
            Some(CardSize::Small)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum ResizeGesture {
    #[default]
    Idle,
    Dragging { predicted: Option<CardSize> },
}

impl ResizeGesture {
    pub fn begin(&mut self) {
        *self = ResizeGesture::Dragging { predicted: None };
    }

    /// Feed one movement sample and return the preview size, if any.
    ///
    /// A sample inside the dead zone keeps the previous prediction. Samples
    /// received while idle are ignored.
    pub fn update(&mut self, predictor: &ResizePredictor, displacement: Displacement) -> Option<CardSize> {
        match self {
            ResizeGesture::Idle => None,
            ResizeGesture::Dragging { predicted } => {
                if let Some(size) = predictor.predict(displacement) {
                    *predicted = Some(size);
                }
                *predicted
            }
        }
    }

    /// Finish the drag, returning the size to commit
    pub fn end(&mut self) -> Option<CardSize> {
        match std::mem::take(self) {
            ResizeGesture::Idle => None,
            ResizeGesture::Dragging { predicted } => predicted,
        }
    }

    pub fn cancel(&mut self) {
        *self = ResizeGesture::Idle;
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self, ResizeGesture::Dragging { .. })
    }
}

//! Pointer input for drawing and erasing planes
//!
//! Pointer positions arrive already projected into arena space. The tool only
//! talks to the registry through its public operations and reports whether the
//! set of colliders changed, so the caller can refresh the guideline.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::sim::{PlaneId, PlaneRegistry};

/// How close (arena units) a pointer must be to erase a plane
pub const PICK_TOLERANCE: f32 = 0.05;

/// What pointer gestures do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum InputMode {
    /// Press-drag-release draws a plane
    #[default]
    Draw,
    /// Pressing on a frozen plane removes it
    Erase,
    /// Pointer belongs to the camera; planes are untouched
    Camera,
}

impl InputMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            InputMode::Draw => "Draw",
            InputMode::Erase => "Erase",
            InputMode::Camera => "Camera",
        }
    }
}

/// Pointer gesture state machine
#[derive(Debug, Clone, Default)]
pub struct DrawTool {
    mode: InputMode,
    /// Plane following the pointer, if a drag is in progress
    drawing: Option<PlaneId>,
}

impl DrawTool {
    #[inline]
    pub fn mode(&self) -> InputMode {
        self.mode
    }

    #[inline]
    pub fn drawing(&self) -> Option<PlaneId> {
        self.drawing
    }

    /// Switch modes, finishing any plane being drawn
    pub fn set_mode(&mut self, mode: InputMode, planes: &mut PlaneRegistry) {
        self.finish(planes);
        self.mode = mode;
        log::debug!("Input mode: {}", mode.as_str());
    }

    /// Returns true if the colliders changed
    pub fn pointer_down(&mut self, point: Vec2, planes: &mut PlaneRegistry) -> bool {
        match self.mode {
            InputMode::Draw => {
                self.finish(planes);
                self.drawing = Some(planes.begin_plane(point));
                false
            }
            InputMode::Erase => match planes.pick(point, PICK_TOLERANCE) {
                Some(id) => {
                    planes.disable(id);
                    true
                }
                None => false,
            },
            InputMode::Camera => false,
        }
    }

    /// Returns true if the colliders changed
    pub fn pointer_move(&mut self, point: Vec2, planes: &mut PlaneRegistry) -> bool {
        match self.drawing {
            Some(id) => planes.update_end_point(id, point),
            None => false,
        }
    }

    pub fn pointer_up(&mut self, planes: &mut PlaneRegistry) {
        self.finish(planes);
    }

    /// Freeze the plane being drawn, or drop it if it was never dragged
    fn finish(&mut self, planes: &mut PlaneRegistry) {
        if let Some(id) = self.drawing.take()
            && !planes.discard(id)
        {
            planes.freeze(id);
        }
    }
}

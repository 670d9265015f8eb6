//! Vertex types for drawing planes, the guideline and the arena border

use bytemuck::{Pod, Zeroable};
use glam::Vec2;

use crate::settings::Settings;
use crate::sim::{Guideline, PlaneRegistry};

/// Simple 2D vertex with position and color
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex {
    pub const fn new(x: f32, y: f32, color: [f32; 4]) -> Self {
        Self {
            position: [x, y],
            color,
        }
    }
}

/// Line-list vertices for every active plane, tinted by its hit color
pub fn plane_lines(planes: &PlaneRegistry) -> Vec<Vertex> {
    planes
        .active()
        .flat_map(|plane| {
            let c = plane.hit_color;
            let color = [c.x, c.y, c.z, 1.0];
            let (a, b) = (plane.start(), plane.end());
            [Vertex::new(a.x, a.y, color), Vertex::new(b.x, b.y, color)]
        })
        .collect()
}

/// Line strip along the simulated part of the guideline
pub fn guideline_strip(guideline: &Guideline) -> Vec<Vertex> {
    guideline.points()[..guideline.simulated_len()]
        .iter()
        .map(|p| Vertex::new(p.x, p.y, colors::GUIDELINE))
        .collect()
}

/// Closed line strip around the visible arena
pub fn arena_border(settings: &Settings) -> [Vertex; 5] {
    let h = settings.half_extents();
    let corner = |x: f32, y: f32| {
        let p = Vec2::new(x, y) * h;
        Vertex::new(p.x, p.y, colors::ARENA_BORDER)
    };
    [
        corner(-1.0, 1.0),
        corner(1.0, 1.0),
        corner(1.0, -1.0),
        corner(-1.0, -1.0),
        corner(-1.0, 1.0),
    ]
}

/// Colors for scene elements
pub mod colors {
    pub const ARENA_BORDER: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
    pub const GUIDELINE: [f32; 4] = [1.0, 1.0, 1.0, 0.1];
}

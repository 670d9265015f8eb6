//! Rendering seam
//!
//! GPU upload and drawing belong to the host. The simulation hands over the
//! ball instance buffers as raw bytes, and only the ones that changed.

pub mod vertex;

pub use vertex::{Vertex, arena_border, guideline_strip, plane_lines};

use crate::sim::InstanceBuffers;

/// Host-side receiver for instance buffer uploads
pub trait InstanceSink {
    /// Ball positions, `[x, y]` per ball as `f32`
    fn upload_positions(&mut self, bytes: &[u8], instance_count: usize);
    /// Ball colors, `[r, g, b, a]` per ball as `f32`
    fn upload_colors(&mut self, bytes: &[u8], instance_count: usize);
}

/// Which buffers a flush re-uploaded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FlushReport {
    pub positions: bool,
    pub colors: bool,
}

/// Upload dirty buffers and clear their flags
pub fn flush_instances(
    buffers: &mut InstanceBuffers,
    instance_count: usize,
    sink: &mut dyn InstanceSink,
) -> FlushReport {
    let mut report = FlushReport::default();
    if buffers.take_positions_dirty() {
        sink.upload_positions(bytemuck::cast_slice(buffers.positions()), instance_count);
        report.positions = true;
    }
    if buffers.take_colors_dirty() {
        sink.upload_colors(bytemuck::cast_slice(buffers.colors()), instance_count);
        report.colors = true;
    }
    report
}

/// Sink that discards uploads but counts them
#[derive(Debug, Default)]
pub struct CountingSink {
    pub position_uploads: u64,
    pub color_uploads: u64,
    pub bytes: u64,
}

impl InstanceSink for CountingSink {
    fn upload_positions(&mut self, bytes: &[u8], _instance_count: usize) {
        self.position_uploads += 1;
        self.bytes += bytes.len() as u64;
    }

    fn upload_colors(&mut self, bytes: &[u8], _instance_count: usize) {
        self.color_uploads += 1;
        self.bytes += bytes.len() as u64;
    }
}

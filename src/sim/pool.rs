//! Fixed-capacity ball pool and its shared instance buffers
//!
//! Every ball owns one slot in a flat position buffer and one in a flat color
//! buffer. Slots are assigned at construction and never move, so the renderer
//! can draw the whole pool with one instanced call and re-upload a buffer only
//! when its dirty flag is set.

use glam::{Vec2, Vec3};

use super::body::{BallPhysics, CollisionEvent, PhysicsParams, SegmentBody};
use super::plane::PlaneRegistry;

/// Floats per ball in the position buffer (x, y)
pub const POSITION_STRIDE: usize = 2;
/// Floats per ball in the color buffer (r, g, b, a)
pub const COLOR_STRIDE: usize = 4;

/// Saturation and value of ball colors
const BALL_SATURATION: f32 = 0.75;
const BALL_VALUE: f32 = 1.0;

/// Handle of the audio voice a ball plays through
pub type VoiceId = usize;

/// A bounce attributed to the ball that made it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BallCollision {
    pub ball: usize,
    pub event: CollisionEvent,
}

/// Flat per-instance data handed to the renderer
#[derive(Debug, Clone)]
pub struct InstanceBuffers {
    positions: Vec<f32>,
    colors: Vec<f32>,
    positions_dirty: bool,
    colors_dirty: bool,
}

impl InstanceBuffers {
    fn new(capacity: usize) -> Self {
        Self {
            positions: vec![0.0; capacity * POSITION_STRIDE],
            colors: vec![0.0; capacity * COLOR_STRIDE],
            positions_dirty: true,
            colors_dirty: true,
        }
    }

    #[inline]
    pub fn positions(&self) -> &[f32] {
        &self.positions
    }

    #[inline]
    pub fn colors(&self) -> &[f32] {
        &self.colors
    }

    #[inline]
    pub fn positions_dirty(&self) -> bool {
        self.positions_dirty
    }

    #[inline]
    pub fn colors_dirty(&self) -> bool {
        self.colors_dirty
    }

    /// Clear the position flag, returning whether it was set
    pub fn take_positions_dirty(&mut self) -> bool {
        std::mem::take(&mut self.positions_dirty)
    }

    /// Clear the color flag, returning whether it was set
    pub fn take_colors_dirty(&mut self) -> bool {
        std::mem::take(&mut self.colors_dirty)
    }
}

/// A pooled ball: physics plus its fixed render identity
#[derive(Debug, Clone)]
pub struct Ball<B> {
    index: usize,
    color: Vec3,
    visible: bool,
    pub body: B,
}

impl<B: BallPhysics> Ball<B> {
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    #[inline]
    pub fn color(&self) -> Vec3 {
        self.color
    }

    #[inline]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    #[inline]
    pub fn voice(&self) -> VoiceId {
        self.index
    }

    #[inline]
    pub fn position(&self) -> Vec2 {
        self.body.position()
    }

    fn write_position(&self, slot: &mut [f32]) {
        let p = self.body.position();
        slot.copy_from_slice(&[p.x, p.y]);
    }

    fn write_color(&self, slot: &mut [f32]) {
        let alpha = if self.visible { 1.0 } else { 0.0 };
        slot.copy_from_slice(&[self.color.x, self.color.y, self.color.z, alpha]);
    }
}

/// Ring of reusable balls
#[derive(Debug, Clone)]
pub struct BallPool<B = SegmentBody> {
    balls: Vec<Ball<B>>,
    buffers: InstanceBuffers,
    /// Next ball to drop
    cursor: usize,
}

impl BallPool<SegmentBody> {
    /// Pool of balls using the segment physics kernel
    pub fn with_segment_physics(capacity: usize, params: PhysicsParams) -> Self {
        Self::new(capacity, |_| SegmentBody::new(params))
    }
}

impl<B: BallPhysics> BallPool<B> {
    /// Allocate `capacity` balls (at least one), building each body with `make_body`
    pub fn new(capacity: usize, mut make_body: impl FnMut(usize) -> B) -> Self {
        let capacity = capacity.max(1);
        let hue_step = 360.0 / capacity as f32;
        let balls: Vec<Ball<B>> = (0..capacity)
            .map(|index| Ball {
                index,
                color: hsv_to_rgb(index as f32 * hue_step, BALL_SATURATION, BALL_VALUE),
                visible: false,
                body: make_body(index),
            })
            .collect();

        let mut buffers = InstanceBuffers::new(capacity);
        for ((ball, pos), color) in balls
            .iter()
            .zip(buffers.positions.chunks_exact_mut(POSITION_STRIDE))
            .zip(buffers.colors.chunks_exact_mut(COLOR_STRIDE))
        {
            ball.write_position(pos);
            ball.write_color(color);
        }

        log::info!("Ball pool ready with {} balls", capacity);
        Self {
            balls,
            buffers,
            cursor: 0,
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.balls.len()
    }

    /// Index the next `drop` will use
    #[inline]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn balls(&self) -> &[Ball<B>] {
        &self.balls
    }

    pub fn buffers(&self) -> &InstanceBuffers {
        &self.buffers
    }

    pub fn buffers_mut(&mut self) -> &mut InstanceBuffers {
        &mut self.buffers
    }

    pub fn visible_count(&self) -> usize {
        self.balls.iter().filter(|b| b.visible).count()
    }

    /// Recycle the oldest ball at the drop point; returns its index
    pub fn drop_next(&mut self) -> usize {
        let index = self.cursor;
        self.cursor = (self.cursor + 1) % self.balls.len();

        let ball = &mut self.balls[index];
        ball.body.drop();
        let pos_range = index * POSITION_STRIDE..(index + 1) * POSITION_STRIDE;
        ball.write_position(&mut self.buffers.positions[pos_range]);
        self.buffers.positions_dirty = true;

        if !ball.visible {
            ball.visible = true;
            let color_range = index * COLOR_STRIDE..(index + 1) * COLOR_STRIDE;
            ball.write_color(&mut self.buffers.colors[color_range]);
            self.buffers.colors_dirty = true;
        }

        log::debug!("Dropped ball {}", index);
        index
    }

    /// Advance every visible ball one tick, appending bounces to `collisions`
    pub fn tick(&mut self, planes: &PlaneRegistry, collisions: &mut Vec<BallCollision>) {
        let mut moved = false;
        for (ball, slot) in self
            .balls
            .iter_mut()
            .zip(self.buffers.positions.chunks_exact_mut(POSITION_STRIDE))
        {
            if !ball.visible {
                continue;
            }
            let index = ball.index;
            ball.body.tick(planes, &mut |event| {
                collisions.push(BallCollision { ball: index, event })
            });
            ball.write_position(slot);
            moved = true;
        }
        if moved {
            self.buffers.positions_dirty = true;
        }
    }

    /// Hide every ball and rewind the cursor
    pub fn reset(&mut self) {
        self.cursor = 0;
        for (ball, color) in self
            .balls
            .iter_mut()
            .zip(self.buffers.colors.chunks_exact_mut(COLOR_STRIDE))
        {
            if ball.visible {
                ball.visible = false;
                ball.write_color(color);
                self.buffers.colors_dirty = true;
            }
        }
    }
}

/// HSV (hue in degrees) to RGB
pub fn hsv_to_rgb(hue: f32, saturation: f32, value: f32) -> Vec3 {
    let h = hue.rem_euclid(360.0) / 60.0;
    let chroma = value * saturation;
    let x = chroma * (1.0 - (h % 2.0 - 1.0).abs());
    let (r, g, b) = match h as u32 {
        0 => (chroma, x, 0.0),
        1 => (x, chroma, 0.0),
        2 => (0.0, chroma, x),
        3 => (0.0, x, chroma),
        4 => (x, 0.0, chroma),
        _ => (chroma, 0.0, x),
    };
    let m = value - chroma;
    Vec3::new(r + m, g + m, b + m)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use crate::sim::body::{InertBody, PARKED_POSITION};

    fn pool(capacity: usize) -> BallPool {
        BallPool::with_segment_physics(capacity, PhysicsParams::default())
    }

    #[test]
    fn test_buffers_sized_by_capacity() {
        let pool = pool(5);
        assert_eq!(pool.buffers().positions().len(), 10);
        assert_eq!(pool.buffers().colors().len(), 20);
        assert!(pool.buffers().positions_dirty());
        assert!(pool.buffers().colors_dirty());
        assert_eq!(&pool.buffers().positions()[0..2], &[PARKED_POSITION.x, PARKED_POSITION.y]);
        // Hidden balls are fully transparent
        assert!(pool.buffers().colors().chunks(4).all(|c| c[3] == 0.0));
    }

    #[test]
    fn test_zero_capacity_becomes_one() {
        let pool = pool(0);
        assert_eq!(pool.capacity(), 1);
    }

    #[test]
    fn test_pool_wraparound_reuses_first_ball() {
        let capacity = 4;
        let mut pool = pool(capacity);
        let dropped: Vec<usize> = (0..=capacity).map(|_| pool.drop_next()).collect();
        assert_eq!(dropped, vec![0, 1, 2, 3, 0]);
        assert_eq!(pool.cursor(), 1);
        assert_eq!(pool.visible_count(), capacity);
    }

    #[test]
    fn test_drop_marks_dirty_and_visible() {
        let mut pool = pool(3);
        pool.buffers_mut().take_positions_dirty();
        pool.buffers_mut().take_colors_dirty();

        let index = pool.drop_next();
        assert!(pool.balls()[index].is_visible());
        assert!(pool.buffers_mut().take_positions_dirty());
        assert!(pool.buffers_mut().take_colors_dirty());
        assert_eq!(&pool.buffers().positions()[0..2], &[-1.875, 1.875]);
        assert_eq!(pool.buffers().colors()[3], 1.0);

        // Re-dropping a visible ball leaves colors alone
        for _ in 0..3 {
            pool.drop_next();
        }
        pool.buffers_mut().take_colors_dirty();
        pool.drop_next();
        assert!(!pool.buffers().colors_dirty());
    }

    #[test]
    fn test_tick_moves_only_visible_balls() {
        let planes = PlaneRegistry::new(&Settings::default());
        let mut pool = pool(3);
        pool.drop_next();
        pool.buffers_mut().take_positions_dirty();

        let mut collisions = Vec::new();
        for _ in 0..10 {
            pool.tick(&planes, &mut collisions);
        }
        assert!(collisions.is_empty());
        assert!(pool.buffers().positions_dirty());
        assert!(pool.buffers().positions()[1] < 1.875);
        assert_eq!(pool.buffers().positions()[3], PARKED_POSITION.y);
    }

    #[test]
    fn test_tick_without_visible_balls_stays_clean() {
        let planes = PlaneRegistry::new(&Settings::default());
        let mut pool = pool(2);
        pool.buffers_mut().take_positions_dirty();
        pool.tick(&planes, &mut Vec::new());
        assert!(!pool.buffers().positions_dirty());
    }

    #[test]
    fn test_collisions_name_their_ball() {
        let mut planes = PlaneRegistry::new(&Settings::default());
        let id = planes.begin_plane(glam::Vec2::new(-2.5, 1.0));
        planes.update_end_point(id, glam::Vec2::new(0.0, 1.0));

        let mut pool = pool(3);
        pool.drop_next();
        pool.drop_next();
        let mut collisions = Vec::new();
        for _ in 0..500 {
            pool.tick(&planes, &mut collisions);
        }
        assert!(collisions.iter().any(|c| c.ball == 0));
        assert!(collisions.iter().any(|c| c.ball == 1));
        assert!(collisions.iter().all(|c| c.event.plane == id));
    }

    #[test]
    fn test_reset_hides_all() {
        let mut pool = pool(3);
        pool.drop_next();
        pool.drop_next();
        pool.reset();
        assert_eq!(pool.visible_count(), 0);
        assert_eq!(pool.cursor(), 0);
        assert!(pool.buffers().colors().chunks(4).all(|c| c[3] == 0.0));
    }

    #[test]
    fn test_colors_spread_around_the_wheel() {
        let pool = pool(4);
        let colors: Vec<Vec3> = pool.balls().iter().map(|b| b.color()).collect();
        assert!((colors[0] - Vec3::new(1.0, 0.25, 0.25)).length() < 1e-6);
        assert!((colors[2] - Vec3::new(0.25, 1.0, 1.0)).length() < 1e-6);
    }

    #[test]
    fn test_generic_over_backend() {
        let mut pool = BallPool::new(2, |_| InertBody::new(PhysicsParams::default()));
        pool.drop_next();
        let planes = PlaneRegistry::new(&Settings::default());
        pool.tick(&planes, &mut Vec::new());
        assert_eq!(pool.balls()[0].position(), glam::Vec2::new(-1.875, 1.875));
    }

    #[test]
    fn test_hsv_primary_colors() {
        assert!((hsv_to_rgb(0.0, 1.0, 1.0) - Vec3::X).length() < 1e-6);
        assert!((hsv_to_rgb(120.0, 1.0, 1.0) - Vec3::Y).length() < 1e-6);
        assert!((hsv_to_rgb(240.0, 1.0, 1.0) - Vec3::Z).length() < 1e-6);
    }
}

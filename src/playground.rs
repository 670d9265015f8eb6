//! The frame loop
//!
//! Owns the plane registry, ball pool, guideline and clocks, and runs one
//! frame in a fixed order: drop timer, physics ticks, collision responses,
//! plane fade, instance flush. Input handlers run between frames and
//! recompute the guideline whenever the colliders change.

use glam::Vec2;

use crate::audio::{AudioManager, CollisionResponse, ToneSink};
use crate::input::{DrawTool, InputMode};
use crate::renderer::{FlushReport, InstanceSink, flush_instances};
use crate::settings::Settings;
use crate::sim::{
    BallCollision, BallPhysics, BallPool, Guideline, PhysicsParams, PlaneId, PlaneRegistry,
    Scheduler, SegmentBody,
};

/// What happened during one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameStats {
    /// Ball dropped this frame, if any
    pub dropped: Option<usize>,
    pub ticks: u32,
    pub bounces: usize,
    pub tones: usize,
    pub flush: FlushReport,
}

/// A complete ball-drop playground
pub struct Playground<B = SegmentBody> {
    settings: Settings,
    planes: PlaneRegistry,
    pool: BallPool<B>,
    guideline: Guideline,
    scheduler: Scheduler,
    tool: DrawTool,
    pub audio: AudioManager,
    /// Reused between frames
    collisions: Vec<BallCollision>,
}

impl Playground<SegmentBody> {
    /// Playground using the segment physics kernel
    pub fn new(settings: Settings) -> Self {
        let settings = settings.sanitized();
        let params = PhysicsParams::from_settings(&settings);
        Self::with_backend(settings, move |_| SegmentBody::new(params))
    }
}

impl<B: BallPhysics> Playground<B> {
    /// Playground whose balls use a custom physics backend
    ///
    /// Settings are sanitized first, so values built by hand cannot stall or panic the loop.
    pub fn with_backend(settings: Settings, make_body: impl FnMut(usize) -> B) -> Self {
        let settings = settings.sanitized();
        let planes = PlaneRegistry::new(&settings);
        let pool = BallPool::new(settings.ball_pool_capacity, make_body);
        let mut guideline = Guideline::new(&settings);
        guideline.recompute(&planes);
        let scheduler = Scheduler::new(&settings);

        log::info!(
            "Playground ready: {} balls, {} ms tick, {} bpm",
            pool.capacity(),
            settings.tick_ms,
            scheduler.tempo.bpm()
        );

        Self {
            settings,
            planes,
            pool,
            guideline,
            scheduler,
            tool: DrawTool::default(),
            audio: AudioManager::default(),
            collisions: Vec::new(),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn planes(&self) -> &PlaneRegistry {
        &self.planes
    }

    pub fn pool(&self) -> &BallPool<B> {
        &self.pool
    }

    pub fn guideline(&self) -> &Guideline {
        &self.guideline
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    // === Tempo ===

    pub fn bpm(&self) -> f32 {
        self.scheduler.tempo.bpm()
    }

    /// Set the drop tempo (clamped to the configured range)
    pub fn set_bpm(&mut self, bpm: f32) {
        self.scheduler.set_bpm(bpm);
    }

    pub fn bpm_up(&mut self) {
        self.set_bpm(self.bpm() + 1.0);
    }

    pub fn bpm_down(&mut self) {
        self.set_bpm(self.bpm() - 1.0);
    }

    // === Plane editing ===

    pub fn begin_plane(&mut self, start: Vec2) -> PlaneId {
        self.planes.begin_plane(start)
    }

    pub fn update_end_point(&mut self, id: PlaneId, end: Vec2) {
        if self.planes.update_end_point(id, end) {
            self.guideline.recompute(&self.planes);
        }
    }

    pub fn freeze(&mut self, id: PlaneId) {
        self.planes.freeze(id);
    }

    pub fn disable(&mut self, id: PlaneId) {
        let before = self.planes.revision();
        self.planes.disable(id);
        if self.planes.revision() != before {
            self.guideline.recompute(&self.planes);
        }
    }

    /// Convenience: draw and freeze a plane in one call
    pub fn add_plane(&mut self, start: Vec2, end: Vec2) -> PlaneId {
        let id = self.begin_plane(start);
        self.update_end_point(id, end);
        self.freeze(id);
        id
    }

    // === Pointer input ===

    pub fn input_mode(&self) -> InputMode {
        self.tool.mode()
    }

    pub fn set_input_mode(&mut self, mode: InputMode) {
        self.tool.set_mode(mode, &mut self.planes);
    }

    pub fn pointer_down(&mut self, point: Vec2) {
        if self.tool.pointer_down(point, &mut self.planes) {
            self.guideline.recompute(&self.planes);
        }
    }

    pub fn pointer_move(&mut self, point: Vec2) {
        if self.tool.pointer_move(point, &mut self.planes) {
            self.guideline.recompute(&self.planes);
        }
    }

    pub fn pointer_up(&mut self) {
        self.tool.pointer_up(&mut self.planes);
    }

    // === Frame ===

    /// Drop the next pooled ball right away
    pub fn drop_ball(&mut self) -> usize {
        self.pool.drop_next()
    }

    /// Run one render frame of `delta_ms` milliseconds
    pub fn frame(
        &mut self,
        delta_ms: f64,
        tones: &mut dyn ToneSink,
        renderer: &mut dyn InstanceSink,
    ) -> FrameStats {
        let mut stats = FrameStats::default();
        let plan = self.scheduler.advance(delta_ms);

        if plan.drop_ball {
            stats.dropped = Some(self.pool.drop_next());
        }

        self.collisions.clear();
        for _ in 0..plan.ticks {
            self.pool.tick(&self.planes, &mut self.collisions);
        }
        stats.ticks = plan.ticks;
        stats.bounces = self.collisions.len();

        for collision in &self.collisions {
            let Some(plane) = self.planes.get(collision.event.plane) else {
                continue;
            };
            let ball = &self.pool.balls()[collision.ball];
            let Some(response) =
                CollisionResponse::for_bounce(&collision.event, plane.playback_rate(), ball.voice())
            else {
                continue;
            };
            self.audio.play(&response.tone, tones);
            self.planes
                .on_collide(collision.event.plane, ball.color(), response.flash_strength);
            stats.tones += 1;
        }

        self.planes.render_tick((delta_ms / 1000.0) as f32);

        let count = self.pool.capacity();
        stats.flush = flush_instances(self.pool.buffers_mut(), count, renderer);
        stats
    }

    /// Hide all balls and clear the clocks; planes and tempo are kept
    pub fn restart(&mut self) {
        self.pool.reset();
        self.scheduler.reset();
        log::info!("Playground restarted");
    }
}

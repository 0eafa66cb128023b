//! Shared fixtures for picking integration tests.
//!
//! [`FakeBackend`] executes view slots on the CPU. Geometry is not
//! rasterized: every mesh declares which texels of its target it covers, and
//! draws paint those texels in the draw's color in submission order.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::ops::Range;

use scenepick::*;

pub const VIEWPORT: UVec2 = UVec2::new(800, 600);

pub fn center() -> Vec2 {
    VIEWPORT.as_vec2() * 0.5
}

struct FakeSurface {
    width: u32,
    height: u32,
    texels: Vec<[u8; 4]>,
}

struct FakeReadback {
    width: u32,
    height: u32,
    texels: Vec<[u8; 4]>,
    ready_frame: Option<u64>,
    written_frame: u64,
}

/// CPU stand-in for a GPU with configurable completion latency.
pub struct FakeBackend {
    pub capabilities: Capabilities,
    /// Frames a submission stays in flight.
    pub latency: u64,
    /// Extra polls after the fence before the texels become available.
    pub map_lag: u32,
    /// Makes every `read_texture` fail.
    pub fail_reads: bool,
    /// Makes every completed read report a lost mapping.
    pub fail_maps: bool,
    /// Reads abandoned through `cancel_read`.
    pub cancelled_reads: usize,
    /// Texels covered by each mesh; unlisted meshes cover everything.
    pub coverage: HashMap<MeshHandle, Range<usize>>,
    /// View names of every submitted frame.
    pub frames: Vec<Vec<String>>,
    surfaces: Vec<FakeSurface>,
    readbacks: Vec<FakeReadback>,
    submitted: u64,
    pending_lag: u32,
}

impl Default for FakeBackend {
    fn default() -> Self {
        Self {
            capabilities: Capabilities {
                texture_blit: true,
                bgra_readback: false,
            },
            latency: 0,
            map_lag: 0,
            fail_reads: false,
            fail_maps: false,
            cancelled_reads: 0,
            coverage: HashMap::new(),
            frames: Vec::new(),
            surfaces: Vec::new(),
            readbacks: Vec::new(),
            submitted: 0,
            pending_lag: 0,
        }
    }
}

impl FakeBackend {
    pub fn with_latency(latency: u64) -> Self {
        Self {
            latency,
            ..Self::default()
        }
    }

    /// Number of submitted frames containing a pass named `name`.
    pub fn frames_with(&self, name: &str) -> usize {
        self.frames
            .iter()
            .filter(|views| views.iter().any(|v| v == name))
            .count()
    }

    /// Frame number in which the last readback copy happened.
    pub fn last_copy_frame(&self, texture: ReadbackHandle) -> u64 {
        self.readbacks[texture.0 as usize].written_frame
    }

    pub fn readback_texels(&self, texture: ReadbackHandle) -> Vec<[u8; 4]> {
        self.readbacks[texture.0 as usize].texels.clone()
    }

    fn execute(&mut self, frame: u64, view: &ViewState) {
        if let Some(handle) = view.target {
            let coverage = &self.coverage;
            if let Some(surface) = self.surfaces.get_mut(handle.0 as usize) {
                if let Some(clear) = view.clear {
                    if clear.flags.contains(ClearFlags::COLOR) {
                        surface.texels.fill(clear.rgba_bytes());
                    }
                }
                let len = surface.texels.len();
                for draw in &view.draws {
                    let range = coverage.get(&draw.mesh).cloned().unwrap_or(0..len);
                    let color = to_rgba8(draw.color);
                    for texel in &mut surface.texels[range.start.min(len)..range.end.min(len)] {
                        *texel = color;
                    }
                }
            }
        }

        for blit in &view.blits {
            let Some(src) = self.surfaces.get(blit.src.0 as usize) else {
                continue;
            };
            let Some(dst) = self.readbacks.get_mut(blit.dst.0 as usize) else {
                continue;
            };
            let swap = self.capabilities.bgra_readback;
            dst.texels = src
                .texels
                .iter()
                .map(|&[r, g, b, a]| if swap { [b, g, r, a] } else { [r, g, b, a] })
                .collect();
            dst.written_frame = frame;
        }
    }
}

fn to_rgba8(color: Vec4) -> [u8; 4] {
    let c = (color * 255.0).round();
    [c.x as u8, c.y as u8, c.z as u8, c.w as u8]
}

impl GpuBackend for FakeBackend {
    fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    fn backbuffer_size(&self) -> (u32, u32) {
        (VIEWPORT.x, VIEWPORT.y)
    }

    fn surface_size(&self, surface: SurfaceHandle) -> Option<(u32, u32)> {
        self.surfaces
            .get(surface.0 as usize)
            .map(|s| (s.width, s.height))
    }

    fn create_surface(&mut self, _label: &str, width: u32, height: u32) -> Result<SurfaceHandle> {
        if width == 0 || height == 0 {
            return Err(PickError::Backend("empty surface".to_string()));
        }
        self.surfaces.push(FakeSurface {
            width,
            height,
            texels: vec![[0, 0, 0, 0]; (width * height) as usize],
        });
        Ok(SurfaceHandle(self.surfaces.len() as u32 - 1))
    }

    fn create_readback_texture(
        &mut self,
        _label: &str,
        width: u32,
        height: u32,
    ) -> Result<ReadbackHandle> {
        self.readbacks.push(FakeReadback {
            width,
            height,
            texels: vec![[0, 0, 0, 0]; (width * height) as usize],
            ready_frame: None,
            written_frame: 0,
        });
        Ok(ReadbackHandle(self.readbacks.len() as u32 - 1))
    }

    fn submit(&mut self, views: &[(ViewSlot, &ViewState)]) -> u64 {
        let frame = self.submitted + 1;
        for (_, view) in views {
            self.execute(frame, view);
        }
        self.frames
            .push(views.iter().map(|(_, view)| view.name.clone()).collect());
        self.submitted = frame;
        frame
    }

    fn completed_frame(&mut self) -> u64 {
        self.submitted.saturating_sub(self.latency)
    }

    fn read_texture(&mut self, texture: ReadbackHandle) -> u64 {
        if self.fail_reads {
            return 0;
        }
        let frame = self.submitted + 1;
        match self.readbacks.get_mut(texture.0 as usize) {
            // Still holding an unconsumed read, like a mapped staging buffer.
            Some(readback) if readback.ready_frame.is_some() => 0,
            Some(readback) => {
                readback.ready_frame = Some(frame);
                self.pending_lag = self.map_lag;
                frame
            }
            None => 0,
        }
    }

    fn take_texture_data(&mut self, texture: ReadbackHandle) -> TextureRead {
        let completed = self.completed_frame();
        let Some(readback) = self.readbacks.get_mut(texture.0 as usize) else {
            return TextureRead::Failed;
        };
        let Some(ready) = readback.ready_frame else {
            return TextureRead::Pending;
        };
        if completed < ready {
            return TextureRead::Pending;
        }
        if self.pending_lag > 0 {
            self.pending_lag -= 1;
            return TextureRead::Pending;
        }
        readback.ready_frame = None;
        if self.fail_maps {
            return TextureRead::Failed;
        }
        TextureRead::Ready(readback.texels.iter().flatten().copied().collect())
    }

    fn cancel_read(&mut self, texture: ReadbackHandle) {
        if let Some(readback) = self.readbacks.get_mut(texture.0 as usize) {
            if readback.ready_frame.take().is_some() {
                self.cancelled_reads += 1;
            }
        }
    }
}

/// Input state for one tick.
#[derive(Debug, Default)]
pub struct TestInput {
    pub pressed: bool,
    pub cursor: Vec2,
    pub gizmo: bool,
}

impl EditorInput for TestInput {
    fn primary_pressed(&self) -> bool {
        self.pressed
    }

    fn cursor_position(&self) -> Vec2 {
        self.cursor
    }

    fn gizmo_claims_click(&self) -> bool {
        self.gizmo
    }
}

pub struct TestScene {
    pub camera: Option<Camera>,
    pub viewport: UVec2,
    pub objects: Vec<Renderable>,
    pub removed: HashSet<u32>,
}

impl Default for TestScene {
    fn default() -> Self {
        let mut camera = Camera::new(VIEWPORT.x as f32 / VIEWPORT.y as f32);
        camera.near = 0.1;
        camera.far = 100.0;
        camera.look_at(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO, Vec3::Y);
        Self {
            camera: Some(camera),
            viewport: VIEWPORT,
            objects: Vec::new(),
            removed: HashSet::new(),
        }
    }
}

impl TestScene {
    /// Adds a unit cube drawn with `mesh` at `position`.
    pub fn add(&mut self, index: u32, mesh: u32, position: Vec3) {
        self.objects.push(Renderable {
            index,
            mesh: MeshHandle(mesh),
            bounds: Aabb::new(Vec3::splat(-0.5), Vec3::splat(0.5)),
            world_transform: Mat4::from_translation(position),
        });
    }
}

impl PickScene for TestScene {
    fn active_camera(&self) -> Option<&Camera> {
        self.camera.as_ref()
    }

    fn viewport_size(&self) -> UVec2 {
        self.viewport
    }

    fn for_each_renderable(&self, f: &mut dyn FnMut(&Renderable)) {
        for object in &self.objects {
            f(object);
        }
    }

    fn is_live(&self, index: u32) -> bool {
        self.objects.iter().any(|o| o.index == index) && !self.removed.contains(&index)
    }
}

#[derive(Debug, Default)]
pub struct RecordingSink {
    pub selected: Option<u32>,
    pub events: Vec<SelectionOutcome>,
}

impl SelectionSink for RecordingSink {
    fn select(&mut self, index: u32) {
        self.selected = Some(index);
        self.events.push(SelectionOutcome::Select(index));
    }

    fn clear_selection(&mut self) {
        self.selected = None;
        self.events.push(SelectionOutcome::Deselect);
    }
}

/// A render context, picking system and editor doubles driven tick by tick.
pub struct Harness {
    pub ctx: RenderContext<FakeBackend>,
    pub picking: PickingSystem,
    pub input: TestInput,
    pub scene: TestScene,
    pub sink: RecordingSink,
}

impl Harness {
    pub fn new(backend: FakeBackend) -> Self {
        init_logging();
        let mut ctx = RenderContext::new(backend);
        let picking = PickingSystem::new(&mut ctx, PickOptions::default())
            .expect("fake backend creates picking resources");
        Self {
            ctx,
            picking,
            input: TestInput::default(),
            scene: TestScene::default(),
            sink: RecordingSink::default(),
        }
    }

    pub fn backend(&self) -> &FakeBackend {
        self.ctx.backend()
    }

    pub fn backend_mut(&mut self) -> &mut FakeBackend {
        self.ctx.backend_mut()
    }

    /// Presses the primary button at `cursor` for the next tick.
    pub fn click(&mut self, cursor: Vec2) {
        self.input.pressed = true;
        self.input.cursor = cursor;
    }

    /// One frame: picking tick, then frame submission.
    pub fn tick(&mut self) -> Option<SelectionOutcome> {
        let outcome = self
            .picking
            .tick(&mut self.ctx, &self.input, &self.scene, &mut self.sink);
        self.input.pressed = false;
        self.ctx.frame();
        outcome
    }

    /// Ticks until an outcome arrives. Returns it with the number of ticks taken.
    pub fn run_until_outcome(&mut self, max_ticks: usize) -> Option<(SelectionOutcome, usize)> {
        (1..=max_ticks).find_map(|n| self.tick().map(|outcome| (outcome, n)))
    }
}

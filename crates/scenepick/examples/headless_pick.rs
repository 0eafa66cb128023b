//! Headless picking demo.
//!
//! Builds a row of cubes, clicks on each of them (and once on empty space)
//! and prints the resulting selections.
//!
//! Run with `RUST_LOG=debug cargo run --example headless_pick` to follow the
//! pick cycle frame by frame.

use std::time::{Duration, Instant};

use scenepick::*;

const VIEWPORT: UVec2 = UVec2::new(1280, 720);

struct DemoScene {
    camera: Camera,
    objects: Vec<Renderable>,
}

impl PickScene for DemoScene {
    fn active_camera(&self) -> Option<&Camera> {
        Some(&self.camera)
    }

    fn viewport_size(&self) -> UVec2 {
        VIEWPORT
    }

    fn for_each_renderable(&self, f: &mut dyn FnMut(&Renderable)) {
        self.objects.iter().for_each(f);
    }

    fn is_live(&self, index: u32) -> bool {
        self.objects.iter().any(|o| o.index == index)
    }
}

struct Click {
    pressed: bool,
    cursor: Vec2,
}

impl EditorInput for Click {
    fn primary_pressed(&self) -> bool {
        self.pressed
    }

    fn cursor_position(&self) -> Vec2 {
        self.cursor
    }

    fn gizmo_claims_click(&self) -> bool {
        false
    }
}

struct PrintSink;

impl SelectionSink for PrintSink {
    fn select(&mut self, index: u32) {
        println!("  selected object {index}");
    }

    fn clear_selection(&mut self) {
        println!("  selection cleared");
    }
}

fn cube() -> (Vec<Vec3>, Vec<u32>) {
    let positions = (0..8)
        .map(|i| {
            Vec3::new(
                if i & 1 == 0 { -0.5 } else { 0.5 },
                if i & 2 == 0 { -0.5 } else { 0.5 },
                if i & 4 == 0 { -0.5 } else { 0.5 },
            )
        })
        .collect();
    let indices = vec![
        0, 1, 3, 0, 3, 2, 4, 6, 7, 4, 7, 5, 0, 4, 5, 0, 5, 1, 2, 3, 7, 2, 7, 6, 0, 2, 6, 0,
        6, 4, 1, 5, 7, 1, 7, 3,
    ];
    (positions, indices)
}

fn main() -> Result<()> {
    init_logging();

    let mut ctx = create_headless_context(VIEWPORT.x, VIEWPORT.y)?;
    let options = match std::env::args().nth(1) {
        Some(path) => PickOptions::load(path)?,
        None => PickOptions::default(),
    };
    let mut picking = PickingSystem::new(&mut ctx, options)?;

    let (positions, indices) = cube();
    let mesh = ctx.backend_mut().upload_mesh(&positions, &indices)?;

    let mut camera = Camera::new(VIEWPORT.x as f32 / VIEWPORT.y as f32);
    camera.look_at(Vec3::new(0.0, 2.0, 12.0), Vec3::ZERO, Vec3::Y);
    let objects = (0..5u32)
        .map(|i| Renderable {
            index: i + 1,
            mesh,
            bounds: Aabb::new(Vec3::splat(-0.5), Vec3::splat(0.5)),
            world_transform: Mat4::from_translation(Vec3::new(i as f32 * 2.0 - 4.0, 0.0, 0.0)),
        })
        .collect::<Vec<_>>();

    let mut targets: Vec<Vec2> = objects
        .iter()
        .filter_map(|o| {
            camera.world_to_viewport(o.world_transform.w_axis.truncate(), VIEWPORT.as_vec2())
        })
        .collect();
    targets.push(Vec2::new(20.0, 20.0));

    let scene = DemoScene { camera, objects };
    let mut sink = PrintSink;

    for cursor in targets {
        println!("click at ({:.0}, {:.0})", cursor.x, cursor.y);
        let mut input = Click {
            pressed: true,
            cursor,
        };
        let start = Instant::now();
        let mut frames = 0;
        loop {
            let outcome = picking.tick(&mut ctx, &input, &scene, &mut sink);
            input.pressed = false;
            ctx.frame();
            frames += 1;

            if outcome.is_some() {
                println!("  resolved after {frames} frames ({:?})", start.elapsed());
                break;
            }
            if !picking.is_enabled() {
                println!("  picking is not supported on this adapter");
                return Ok(());
            }
            if start.elapsed() > Duration::from_secs(5) {
                println!("  timed out in state {:?}", picking.state());
                break;
            }
            std::thread::sleep(Duration::from_millis(1));
        }
    }

    picking.reset(&mut ctx);
    Ok(())
}

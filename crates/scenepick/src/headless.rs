//! Window-less setup for demos, tools and tests.

use pollster::FutureExt;
use scenepick_core::{RenderContext, Result};
use scenepick_render::WgpuBackend;

/// Creates a render context on a headless wgpu device with a
/// `width × height` offscreen back buffer.
pub fn create_headless_context(width: u32, height: u32) -> Result<RenderContext<WgpuBackend>> {
    let backend = WgpuBackend::new_headless(width, height).block_on()?;
    Ok(RenderContext::new(backend))
}

/// Initializes `env_logger` once. Later calls are ignored.
pub fn init_logging() {
    let _ = env_logger::try_init();
}

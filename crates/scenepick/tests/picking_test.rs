//! End-to-end picking through the tick driver, on a CPU fake backend.

mod common;

use common::*;
use scenepick::*;

#[test]
fn test_click_selects_object_after_latency() {
    for latency in [0, 1, 3] {
        let mut h = Harness::new(FakeBackend::with_latency(latency));
        h.scene.add(5, 0, Vec3::ZERO);
        h.click(center());

        assert!(h.tick().is_none());
        assert_eq!(h.picking.state(), ReadbackState::BlitRequested);
        assert!(h.tick().is_none());
        assert!(matches!(
            h.picking.state(),
            ReadbackState::AwaitingFence { .. }
        ));

        let (outcome, ticks) = h.run_until_outcome(20).expect("pick resolves");
        assert_eq!(outcome, SelectionOutcome::Select(5));
        assert_eq!(ticks as u64, latency + 1);
        assert_eq!(h.sink.selected, Some(5));
        assert_eq!(h.picking.state(), ReadbackState::Idle);
    }
}

#[test]
fn test_identity_pass_then_blit_on_next_frame() {
    let mut h = Harness::new(FakeBackend::default());
    h.scene.add(5, 0, Vec3::ZERO);
    h.click(center());
    h.tick();
    h.tick();

    let frames = &h.backend().frames;
    assert_eq!(frames[0], vec![FILL_PASS_NAME.to_string()]);
    assert_eq!(frames[1], vec![BLIT_PASS_NAME.to_string()]);
    assert_eq!(h.backend().last_copy_frame(h.picking.staging_texture()), 2);
}

#[test]
fn test_nothing_in_frustum_deselects() {
    let mut h = Harness::new(FakeBackend::default());
    h.scene.add(5, 0, Vec3::new(50.0, 0.0, 0.0));
    h.sink.selected = Some(9);
    h.click(center());

    let (outcome, _) = h.run_until_outcome(10).expect("pick resolves");
    assert_eq!(outcome, SelectionOutcome::Deselect);
    assert_eq!(h.sink.selected, None);
    // The clear-only identity pass still ran.
    assert_eq!(h.backend().frames_with(FILL_PASS_NAME), 1);
}

#[test]
fn test_only_object_under_cursor_is_drawn() {
    let mut h = Harness::new(FakeBackend::default());
    h.scene.add(5, 0, Vec3::ZERO);
    h.scene.add(6, 1, Vec3::new(3.0, 0.0, 0.0));
    h.click(center());
    h.tick();

    let view = h.ctx.view(h.ctx.last_issued());
    assert_eq!(view.name, FILL_PASS_NAME);
    // Per-frame draws are gone after submission, but the pass configuration stays.
    assert!(view.draws.is_empty());
    assert_eq!(view.target, Some(h.picking.identity_surface()));

    let (outcome, _) = h.run_until_outcome(10).expect("pick resolves");
    assert_eq!(outcome, SelectionOutcome::Select(5));
}

#[test]
fn test_click_while_in_flight_is_dropped() {
    let mut h = Harness::new(FakeBackend::with_latency(3));
    h.scene.add(5, 0, Vec3::ZERO);
    h.click(center());
    h.tick();
    h.tick();
    assert!(matches!(
        h.picking.state(),
        ReadbackState::AwaitingFence { .. }
    ));
    let staged = h.backend().readback_texels(h.picking.staging_texture());

    // A different object now sits under the cursor; the second click must not
    // render anything.
    h.scene.objects.clear();
    h.scene.add(8, 0, Vec3::ZERO);
    h.click(center());
    assert!(h.tick().is_none());

    assert_eq!(h.backend().frames_with(FILL_PASS_NAME), 1);
    assert_eq!(
        h.backend().readback_texels(h.picking.staging_texture()),
        staged
    );
}

#[test]
fn test_missing_blit_capability_disables_picking() {
    let mut backend = FakeBackend::default();
    backend.capabilities.texture_blit = false;
    let mut h = Harness::new(backend);
    h.scene.add(5, 0, Vec3::ZERO);

    h.click(center());
    h.tick();
    assert!(h.tick().is_none());
    assert_eq!(h.picking.state(), ReadbackState::Idle);
    assert!(!h.picking.is_enabled());

    h.click(center());
    assert!(h.run_until_outcome(5).is_none());
    assert_eq!(h.backend().frames_with(FILL_PASS_NAME), 1);
    assert_eq!(h.backend().frames_with(BLIT_PASS_NAME), 0);
    assert!(h.sink.events.is_empty());
}

#[test]
fn test_unschedulable_read_returns_to_idle() {
    let mut backend = FakeBackend::default();
    backend.fail_reads = true;
    let mut h = Harness::new(backend);
    h.scene.add(5, 0, Vec3::ZERO);
    h.click(center());
    h.tick();
    h.tick();

    assert_eq!(h.picking.state(), ReadbackState::Idle);
    assert!(h.picking.is_enabled());
    assert!(h.sink.events.is_empty());
}

#[test]
fn test_late_mapping_keeps_waiting() {
    let mut backend = FakeBackend::with_latency(1);
    backend.map_lag = 2;
    let mut h = Harness::new(backend);
    h.scene.add(5, 0, Vec3::ZERO);
    h.click(center());

    let (outcome, ticks) = h.run_until_outcome(20).expect("pick resolves");
    assert_eq!(outcome, SelectionOutcome::Select(5));
    // fill, blit, one frame of latency, two polls without data, decode
    assert_eq!(ticks, 6);
}

#[test]
fn test_stale_index_deselects() {
    let mut h = Harness::new(FakeBackend::with_latency(1));
    h.scene.add(5, 0, Vec3::ZERO);
    h.click(center());
    h.tick();

    h.scene.removed.insert(5);
    let (outcome, _) = h.run_until_outcome(10).expect("pick resolves");
    assert_eq!(outcome, SelectionOutcome::Deselect);
    assert_eq!(h.sink.events, vec![SelectionOutcome::Deselect]);
}

#[test]
fn test_bgra_readback_is_swapped_back() {
    let mut backend = FakeBackend::default();
    backend.capabilities.bgra_readback = true;
    let mut h = Harness::new(backend);
    let index = 0x01_02_03;
    h.scene.add(index, 0, Vec3::ZERO);
    h.click(center());

    let (outcome, _) = h.run_until_outcome(10).expect("pick resolves");
    assert_eq!(outcome, SelectionOutcome::Select(index));
}

#[test]
fn test_majority_color_wins() {
    let mut backend = FakeBackend::default();
    backend.coverage.insert(MeshHandle(0), 0..40);
    backend.coverage.insert(MeshHandle(1), 40..64);
    let mut h = Harness::new(backend);
    h.scene.add(7, 0, Vec3::ZERO);
    h.scene.add(9, 1, Vec3::new(0.0, 0.0, 0.5));
    h.click(center());

    let (outcome, _) = h.run_until_outcome(10).expect("pick resolves");
    assert_eq!(outcome, SelectionOutcome::Select(7));
}

#[test]
fn test_tie_goes_to_lowest_index() {
    let mut backend = FakeBackend::default();
    backend.coverage.insert(MeshHandle(0), 0..32);
    backend.coverage.insert(MeshHandle(1), 32..64);
    let mut h = Harness::new(backend);
    h.scene.add(12, 0, Vec3::ZERO);
    h.scene.add(4, 1, Vec3::new(0.0, 0.0, 0.5));
    h.click(center());

    let (outcome, _) = h.run_until_outcome(10).expect("pick resolves");
    assert_eq!(outcome, SelectionOutcome::Select(4));
}

#[test]
fn test_index_without_color_is_not_drawn() {
    let mut h = Harness::new(FakeBackend::default());
    h.scene.add(0, 0, Vec3::ZERO);
    h.scene.add(MAX_COLOR_INDEX + 1, 0, Vec3::ZERO);
    h.click(center());

    let (outcome, _) = h.run_until_outcome(10).expect("pick resolves");
    assert_eq!(outcome, SelectionOutcome::Deselect);
}

#[test]
fn test_gizmo_and_missing_camera_ignore_clicks() {
    let mut h = Harness::new(FakeBackend::default());
    h.scene.add(5, 0, Vec3::ZERO);

    h.input.gizmo = true;
    h.click(center());
    h.tick();
    assert_eq!(h.picking.state(), ReadbackState::Idle);

    h.input.gizmo = false;
    h.scene.camera = None;
    h.click(center());
    h.tick();
    assert_eq!(h.picking.state(), ReadbackState::Idle);

    assert_eq!(h.backend().frames_with(FILL_PASS_NAME), 0);
}

#[test]
fn test_degenerate_viewport_ignores_click() {
    let mut h = Harness::new(FakeBackend::default());
    h.scene.add(5, 0, Vec3::ZERO);
    h.scene.viewport = UVec2::ZERO;
    h.click(center());
    h.tick();

    assert_eq!(h.picking.state(), ReadbackState::Idle);
    assert_eq!(h.backend().frames_with(FILL_PASS_NAME), 0);
}

#[test]
fn test_picking_survives_slot_wraparound() {
    let mut h = Harness::new(FakeBackend::default());
    h.scene.add(5, 0, Vec3::ZERO);
    for _ in 0..255 {
        RenderPass::new(&mut h.ctx, "filler");
    }
    assert_eq!(h.ctx.last_issued(), ViewSlot(254));

    h.click(center());
    h.tick();
    assert_eq!(h.ctx.last_issued(), ViewSlot(255));
    h.tick();
    // The blit pass needed a slot after 255: one forced flush, then slot 0.
    assert_eq!(h.ctx.flush_count(), 1);
    assert_eq!(h.ctx.last_issued(), ViewSlot(0));

    let (outcome, _) = h.run_until_outcome(10).expect("pick resolves");
    assert_eq!(outcome, SelectionOutcome::Select(5));
}

#[test]
fn test_reset_abandons_pick_in_flight() {
    for latency in [0, 2] {
        let mut h = Harness::new(FakeBackend::with_latency(latency));
        h.scene.add(5, 0, Vec3::ZERO);
        h.click(center());
        h.tick();
        h.tick();
        assert!(matches!(
            h.picking.state(),
            ReadbackState::AwaitingFence { .. }
        ));
        // The staging texture is held by the outstanding read.
        let staging = h.picking.staging_texture();
        assert_eq!(h.backend_mut().read_texture(staging), 0);

        h.picking.reset(&mut h.ctx);
        assert_eq!(h.picking.state(), ReadbackState::Idle);
        assert_eq!(h.backend().cancelled_reads, 1);
        assert!(h.ctx.view(ViewSlot(0)).name.is_empty());
        assert!(h.run_until_outcome(5).is_none());

        // A fresh click works after the reset.
        h.click(center());
        let (outcome, _) = h.run_until_outcome(10).expect("pick resolves");
        assert_eq!(outcome, SelectionOutcome::Select(5));
        assert_eq!(h.sink.events, vec![SelectionOutcome::Select(5)]);
    }
}

#[test]
fn test_reset_when_idle_cancels_nothing() {
    let mut h = Harness::new(FakeBackend::default());
    h.picking.reset(&mut h.ctx);
    assert_eq!(h.backend().cancelled_reads, 0);
    assert_eq!(h.picking.state(), ReadbackState::Idle);
}

#[test]
fn test_failed_mapping_keeps_selection() {
    let mut backend = FakeBackend::default();
    backend.fail_maps = true;
    let mut h = Harness::new(backend);
    h.scene.add(5, 0, Vec3::ZERO);
    h.sink.selected = Some(9);
    h.click(center());

    assert!(h.run_until_outcome(6).is_none());
    assert_eq!(h.picking.state(), ReadbackState::Idle);
    assert!(h.picking.is_enabled());
    assert!(h.sink.events.is_empty());
    assert_eq!(h.sink.selected, Some(9));

    h.backend_mut().fail_maps = false;
    h.click(center());
    let (outcome, _) = h.run_until_outcome(10).expect("pick resolves");
    assert_eq!(outcome, SelectionOutcome::Select(5));
}

#[test]
fn test_invalid_options_are_rejected() {
    let mut ctx = RenderContext::new(FakeBackend::default());
    let options = PickOptions {
        identity_buffer_dim: 0,
        ..PickOptions::default()
    };
    assert!(matches!(
        PickingSystem::new(&mut ctx, options),
        Err(PickError::InvalidOptions(_))
    ));
}

proptest::proptest! {
    #![proptest_config(proptest::prelude::ProptestConfig::with_cases(64))]

    #[test]
    fn prop_any_index_round_trips_through_a_pick(
        index in 1u32..=MAX_COLOR_INDEX,
        latency in 0u64..4,
    ) {
        let mut h = Harness::new(FakeBackend::with_latency(latency));
        h.scene.add(index, 0, Vec3::ZERO);
        h.click(center());
        let resolved = h.run_until_outcome(16).map(|(outcome, _)| outcome);
        proptest::prop_assert_eq!(resolved, Some(SelectionOutcome::Select(index)));
    }
}

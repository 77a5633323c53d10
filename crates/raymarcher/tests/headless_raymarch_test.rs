//! Headless raymarching integration tests.
//!
//! These need a GPU adapter (real or software fallback). Without one every
//! test prints a message and returns early.

use std::path::PathBuf;

use raymarcher::*;

const SIZE: u32 = 64;

/// Creates a raymarcher, or `None` when no adapter is available.
fn raymarcher() -> Option<Raymarcher> {
    match Raymarcher::new_headless(RaymarcherOptions::default()) {
        Ok(raymarcher) => Some(raymarcher),
        Err(e) => {
            eprintln!("Skipping headless raymarch test: no GPU adapter available ({e})");
            None
        }
    }
}

/// Like [`raymarcher`], but also skips devices too weak to run the march.
fn drawing_raymarcher() -> Option<Raymarcher> {
    let raymarcher = raymarcher()?;
    if raymarcher.feature_tier() < MIN_RAYMARCH_TIER {
        eprintln!(
            "Skipping headless raymarch test: device tier {} is below {}",
            raymarcher.feature_tier().name(),
            MIN_RAYMARCH_TIER.name()
        );
        return None;
    }
    Some(raymarcher)
}

/// Camera far enough back that the whole cube fits in the frame.
fn world(raymarcher: &Raymarcher) -> WorldContext {
    let camera = Camera::new(1.0).with_position(Vec3::new(0.0, 0.0, 6.0));
    WorldContext::new(camera, raymarcher.feature_tier())
}

fn write_raw(name: &str, bytes: &[u8]) -> PathBuf {
    let path = std::env::temp_dir().join(format!(
        "raymarcher-test-{}-{name}.raw",
        std::process::id()
    ));
    std::fs::write(&path, bytes).unwrap();
    path
}

fn center_pixel(pixels: &[u8], width: u32, height: u32) -> [u8; 4] {
    let i = ((height / 2 * width + width / 2) * 4) as usize;
    [pixels[i], pixels[i + 1], pixels[i + 2], pixels[i + 3]]
}

#[test]
fn test_loaded_volume_is_bound_by_draw() {
    let Some(raymarcher) = drawing_raymarcher() else {
        return;
    };
    let target = raymarcher.create_render_target(SIZE, SIZE);
    let path = write_raw("solid", &[255; 8]);

    raymarcher.load_raw_texture_3d(&path, 2, 2, 2);
    raymarcher.initialize_render_resources(Some(&target));
    raymarcher.draw_raymarch_to_render_target(
        &world(&raymarcher),
        Some(&target),
        &Transform::identity(),
    );

    let status = raymarcher.flush_rendering_commands().unwrap();
    assert_eq!(status.volume, Some((VolumeId(1), UVec3::splat(2))));
    assert_eq!(status.last_binding, Some(VolumeBinding::Loaded(VolumeId(1))));
    assert_eq!(status.draws_completed, 1);
    assert_eq!(status.draws_skipped, 0);

    let pixels = raymarcher.read_render_target(&target).unwrap();
    assert_eq!(pixels.len(), (SIZE * SIZE * 4) as usize);
    assert_eq!(center_pixel(&pixels, SIZE, SIZE), [255, 255, 255, 255]);
    // corners lie outside the cube's silhouette
    assert_eq!(&pixels[0..4], &[0, 0, 0, 0]);

    std::fs::remove_file(&path).unwrap();
}

#[test]
fn test_draw_without_volume_uses_fallback() {
    let Some(raymarcher) = drawing_raymarcher() else {
        return;
    };
    let target = raymarcher.create_render_target(SIZE, SIZE);

    raymarcher.initialize_render_resources(Some(&target));
    raymarcher.draw_raymarch_to_render_target(
        &world(&raymarcher),
        Some(&target),
        &Transform::identity(),
    );

    let status = raymarcher.flush_rendering_commands().unwrap();
    assert_eq!(status.volume, None);
    assert_eq!(status.last_binding, Some(VolumeBinding::Fallback));
    assert_eq!(status.draws_completed, 1);

    let pixels = raymarcher.read_render_target(&target).unwrap();
    assert!(pixels.iter().all(|&b| b == 0), "black volume renders nothing");
}

#[test]
fn test_short_file_leaves_volume_untouched() {
    let Some(raymarcher) = raymarcher() else {
        return;
    };
    let good = write_raw("good", &[10; 8]);
    let short = write_raw("short", &[10; 63]);

    raymarcher.load_raw_texture_3d(&good, 2, 2, 2);
    raymarcher.load_raw_texture_3d(&short, 4, 4, 4);

    let status = raymarcher.flush_rendering_commands().unwrap();
    assert_eq!(status.volume, Some((VolumeId(1), UVec3::splat(2))));

    std::fs::remove_file(&good).unwrap();
    std::fs::remove_file(&short).unwrap();
}

#[test]
fn test_long_file_uploads_declared_dimensions() {
    let Some(raymarcher) = raymarcher() else {
        return;
    };
    let long = write_raw("long", &[7; 40]);

    raymarcher.load_raw_texture_3d(&long, 4, 3, 2);

    let status = raymarcher.flush_rendering_commands().unwrap();
    assert_eq!(status.volume, Some((VolumeId(1), UVec3::new(4, 3, 2))));

    std::fs::remove_file(&long).unwrap();
}

#[test]
fn test_missing_file_is_logged_and_ignored() {
    let Some(raymarcher) = raymarcher() else {
        return;
    };
    raymarcher.load_raw_texture_3d("/nonexistent/raymarcher/volume.raw", 2, 2, 2);

    let status = raymarcher.flush_rendering_commands().unwrap();
    assert_eq!(status.volume, None);
}

#[test]
fn test_each_upload_replaces_the_volume() {
    let Some(raymarcher) = raymarcher() else {
        return;
    };
    raymarcher.upload_volume(
        VolumeData::new(VolumeDescriptor::new(1, 1, 1).unwrap(), vec![1]).unwrap(),
    );
    raymarcher.upload_volume(
        VolumeData::new(VolumeDescriptor::new(2, 1, 1).unwrap(), vec![1, 2]).unwrap(),
    );

    let status = raymarcher.flush_rendering_commands().unwrap();
    assert_eq!(status.volume, Some((VolumeId(2), UVec3::new(2, 1, 1))));
}

#[test]
fn test_initialization_builds_cube_and_matching_depth() {
    let Some(raymarcher) = raymarcher() else {
        return;
    };
    let small = raymarcher.create_render_target(32, 16);
    let large = raymarcher.create_render_target(80, 60);

    let status = raymarcher.flush_rendering_commands().unwrap();
    assert!(!status.initialized);
    assert_eq!(status.depth_size, None);

    raymarcher.initialize_render_resources(Some(&small));
    let status = raymarcher.flush_rendering_commands().unwrap();
    assert!(status.initialized);
    assert_eq!(status.depth_size, Some(UVec2::new(32, 16)));
    assert_eq!(status.cube_vertex_count, 8);
    assert_eq!(status.cube_triangle_count, 12);

    raymarcher.initialize_render_resources(Some(&large));
    let status = raymarcher.flush_rendering_commands().unwrap();
    assert_eq!(status.depth_size, Some(UVec2::new(80, 60)));
    assert_eq!(status.cube_vertex_count, 8);
    assert_eq!(status.cube_triangle_count, 12);
}

#[test]
fn test_draw_before_initialization_is_skipped() {
    let Some(raymarcher) = raymarcher() else {
        return;
    };
    let target = raymarcher.create_render_target(SIZE, SIZE);

    raymarcher.draw_raymarch_to_render_target(
        &world(&raymarcher),
        Some(&target),
        &Transform::identity(),
    );

    let status = raymarcher.flush_rendering_commands().unwrap();
    assert_eq!(status.draws_completed, 0);
    assert_eq!(status.draws_skipped, 1);
}

#[test]
fn test_draw_into_resized_target_is_skipped() {
    let Some(raymarcher) = raymarcher() else {
        return;
    };
    let original = raymarcher.create_render_target(SIZE, SIZE);
    let resized = raymarcher.create_render_target(SIZE * 2, SIZE);

    raymarcher.initialize_render_resources(Some(&original));
    raymarcher.draw_raymarch_to_render_target(
        &world(&raymarcher),
        Some(&resized),
        &Transform::identity(),
    );

    let status = raymarcher.flush_rendering_commands().unwrap();
    assert_eq!(status.draws_completed, 0);
    assert_eq!(status.draws_skipped, 1);
}

#[test]
fn test_draw_without_target_or_view_is_not_issued() {
    let Some(raymarcher) = raymarcher() else {
        return;
    };
    let target = raymarcher.create_render_target(SIZE, SIZE);
    raymarcher.initialize_render_resources(Some(&target));

    raymarcher.draw_raymarch_to_render_target(&world(&raymarcher), None, &Transform::identity());
    raymarcher.draw_raymarch_to_render_target(
        &WorldContext::without_camera(raymarcher.feature_tier()),
        Some(&target),
        &Transform::identity(),
    );

    let status = raymarcher.flush_rendering_commands().unwrap();
    assert_eq!(status.draws_completed, 0);
    assert_eq!(status.draws_skipped, 0);
}

#[test]
fn test_unsupported_tier_skips_draw() {
    let Some(raymarcher) = raymarcher() else {
        return;
    };
    let target = raymarcher.create_render_target(SIZE, SIZE);
    raymarcher.initialize_render_resources(Some(&target));

    let es2 = WorldContext::new(Camera::new(1.0), FeatureTier::Es2);
    raymarcher.draw_raymarch_to_render_target(&es2, Some(&target), &Transform::identity());

    let status = raymarcher.flush_rendering_commands().unwrap();
    assert_eq!(status.draws_completed, 0);
    assert_eq!(status.draws_skipped, 1);
}

#[test]
fn test_commands_run_in_enqueue_order() {
    let Some(raymarcher) = drawing_raymarcher() else {
        return;
    };
    let target = raymarcher.create_render_target(SIZE, SIZE);
    let context = world(&raymarcher);

    raymarcher.initialize_render_resources(Some(&target));
    for _ in 0..5 {
        raymarcher.draw_raymarch_to_render_target(&context, Some(&target), &Transform::identity());
    }
    raymarcher.upload_volume(
        VolumeData::new(VolumeDescriptor::new(2, 2, 2).unwrap(), vec![255; 8]).unwrap(),
    );
    raymarcher.draw_raymarch_to_render_target(&context, Some(&target), &Transform::identity());

    let status = raymarcher.flush_rendering_commands().unwrap();
    assert_eq!(status.draws_completed, 6);
    assert_eq!(status.last_binding, Some(VolumeBinding::Loaded(VolumeId(1))));
}

#[test]
fn test_save_render_target_writes_png() {
    let Some(raymarcher) = drawing_raymarcher() else {
        return;
    };
    let target = raymarcher.create_render_target(SIZE, SIZE);
    raymarcher.upload_volume(
        VolumeData::new(VolumeDescriptor::new(2, 2, 2).unwrap(), vec![255; 8]).unwrap(),
    );
    raymarcher.initialize_render_resources(Some(&target));
    raymarcher.draw_raymarch_to_render_target(
        &world(&raymarcher),
        Some(&target),
        &Transform::from_scale(Vec3::splat(0.5)),
    );

    let path = std::env::temp_dir().join(format!(
        "raymarcher-test-{}-capture.png",
        std::process::id()
    ));
    raymarcher.save_render_target(&target, &path).unwrap();
    assert!(std::fs::metadata(&path).unwrap().len() > 0);
    std::fs::remove_file(&path).unwrap();
}

#[test]
fn test_camera_inside_volume_still_renders() {
    let Some(raymarcher) = drawing_raymarcher() else {
        return;
    };
    let target = raymarcher.create_render_target(SIZE, SIZE);
    raymarcher.upload_volume(
        VolumeData::new(VolumeDescriptor::new(2, 2, 2).unwrap(), vec![255; 8]).unwrap(),
    );
    raymarcher.initialize_render_resources(Some(&target));

    let inside = Camera::new(1.0).with_position(Vec3::new(0.0, 0.0, 0.5));
    let context = WorldContext::new(inside, raymarcher.feature_tier());
    raymarcher.draw_raymarch_to_render_target(&context, Some(&target), &Transform::identity());

    let status = raymarcher.flush_rendering_commands().unwrap();
    assert_eq!(status.draws_completed, 1);
    assert_eq!(status.last_binding, Some(VolumeBinding::Loaded(VolumeId(1))));

    let pixels = raymarcher.read_render_target(&target).unwrap();
    assert_eq!(center_pixel(&pixels, SIZE, SIZE), [255, 255, 255, 255]);
}

#[test]
fn test_odd_dimensions_then_oversized_volume() {
    let Some(raymarcher) = raymarcher() else {
        return;
    };
    let odd = write_raw("odd", &[42; 3 * 5 * 7]);
    let oversized = write_raw("oversized", &[42; 5000]);

    raymarcher.load_raw_texture_3d(&odd, 3, 5, 7);
    let status = raymarcher.flush_rendering_commands().unwrap();
    assert_eq!(status.volume, Some((VolumeId(1), UVec3::new(3, 5, 7))));

    // wider than the default 3D texture limit
    raymarcher.load_raw_texture_3d(&oversized, 5000, 1, 1);
    let status = raymarcher.flush_rendering_commands().unwrap();
    assert_eq!(status.volume, Some((VolumeId(1), UVec3::new(3, 5, 7))));

    std::fs::remove_file(&odd).unwrap();
    std::fs::remove_file(&oversized).unwrap();
}

#[test]
fn test_oversized_render_target_is_clamped() {
    let Some(raymarcher) = raymarcher() else {
        return;
    };
    let target = raymarcher.create_render_target(20000, 4);
    let size = target.size();
    assert!(size.x < 20000 && size.x > 0);
    assert_eq!(size.y, 4);

    raymarcher.initialize_render_resources(Some(&target));
    let status = raymarcher.flush_rendering_commands().unwrap();
    assert_eq!(status.depth_size, Some(size));
}

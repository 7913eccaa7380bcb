use crate::{
    Attachment, BoneData, PathAttachmentData, PathPosition, Skeleton, SkeletonData, Skin,
    SlotData, VertexData,
};
use std::sync::Arc;

fn assert_approx(actual: f32, expected: f32) {
    let diff = (actual - expected).abs();
    assert!(
        diff <= 1.0e-3,
        "expected {expected}, got {actual} (diff {diff})"
    );
}

fn assert_position(actual: PathPosition, x: f32, y: f32) {
    assert_approx(actual.x, x);
    assert_approx(actual.y, y);
}

fn path(vertices: Vec<[f32; 2]>, lengths: Vec<f32>, closed: bool, constant_speed: bool) -> Attachment {
    Attachment::Path(PathAttachmentData {
        name: "path".to_string(),
        vertex: VertexData::unweighted(vertices),
        lengths,
        closed,
        constant_speed,
    })
}

fn skeleton_with(attachment: Attachment) -> Skeleton {
    let mut skin = Skin::new("default");
    skin.set_attachment(0, "path", attachment).unwrap();
    let data = SkeletonData::builder()
        .bone(BoneData::new("root", None))
        .slot(SlotData {
            attachment: Some("path".to_string()),
            ..SlotData::new("path", 0)
        })
        .skin(skin)
        .build()
        .unwrap();
    let mut skeleton = Skeleton::new(Arc::new(data));
    skeleton.update_world_transform();
    skeleton
}

/// A 30 unit line along x with handles on the line, so parameter and distance agree.
fn straight_line(constant_speed: bool, length: f32) -> Skeleton {
    skeleton_with(path(
        vec![
            [-10.0, 0.0],
            [0.0, 0.0],
            [10.0, 0.0],
            [20.0, 0.0],
            [30.0, 0.0],
            [40.0, 0.0],
        ],
        vec![length],
        false,
        constant_speed,
    ))
}

/// A closed 30x30 square with straight edges.
fn square() -> Skeleton {
    let corners = [[0.0f32, 0.0], [30.0, 0.0], [30.0, 30.0], [0.0, 30.0]];
    let mut vertices = Vec::new();
    for i in 0..4 {
        let [x, y] = corners[i];
        let [px, py] = corners[(i + 3) % 4];
        let [nx, ny] = corners[(i + 1) % 4];
        vertices.push([x + (px - x) / 3.0, y + (py - y) / 3.0]);
        vertices.push([x, y]);
        vertices.push([x + (nx - x) / 3.0, y + (ny - y) / 3.0]);
    }
    skeleton_with(path(vertices, vec![30.0, 60.0, 90.0, 120.0], true, true))
}

fn sample(skeleton: &Skeleton, distances: &[f32], tangents: bool) -> (Vec<PathPosition>, f32) {
    let mut out = Vec::new();
    let total = skeleton
        .compute_path_positions(0, distances, tangents, &mut out)
        .unwrap();
    (out, total)
}

#[test]
fn open_path_endpoints_are_the_knots() {
    let skeleton = straight_line(true, 30.0);
    let (positions, total) = sample(&skeleton, &[0.0, 15.0, 30.0], true);

    assert_approx(total, 30.0);
    assert_position(positions[0], 0.0, 0.0);
    assert_position(positions[1], 15.0, 0.0);
    assert_position(positions[2], 30.0, 0.0);
    assert_approx(positions[1].rotation, 0.0);
}

#[test]
fn open_path_extends_along_end_tangents() {
    let skeleton = straight_line(true, 30.0);
    let (positions, _) = sample(&skeleton, &[-5.0, 35.0], true);

    assert_position(positions[0], -5.0, 0.0);
    assert_position(positions[1], 35.0, 0.0);
    assert_approx(positions[0].rotation, 0.0);
}

#[test]
fn rotation_is_zero_without_tangents() {
    let mut skeleton = straight_line(true, 30.0);
    skeleton.bones[0].rotation = 90.0;
    skeleton.update_world_transform();

    let (positions, _) = sample(&skeleton, &[10.0], false);
    assert_position(positions[0], 0.0, 10.0);
    assert_eq!(positions[0].rotation, 0.0);

    let (positions, _) = sample(&skeleton, &[10.0], true);
    assert_approx(positions[0].rotation, std::f32::consts::FRAC_PI_2);
}

#[test]
fn closed_path_wraps_around() {
    let skeleton = square();
    let (positions, total) = sample(&skeleton, &[120.0, 45.0, -15.0, 150.0], false);

    assert_approx(total, 120.0);
    assert_position(positions[0], 0.0, 0.0);
    assert_position(positions[1], 30.0, 15.0);
    assert_position(positions[2], 0.0, 15.0);
    assert_position(positions[3], 30.0, 0.0);
}

#[test]
fn constant_speed_samples_are_evenly_spaced() {
    let skeleton = skeleton_with(path(
        vec![
            [-10.0, -20.0],
            [0.0, 0.0],
            [10.0, 20.0],
            [20.0, -20.0],
            [30.0, 0.0],
            [40.0, 20.0],
        ],
        vec![40.0],
        false,
        true,
    ));
    let total = skeleton.path_length(0).unwrap();
    assert!(total > 30.0, "a curved path is longer than its chord, got {total}");

    let steps = 40;
    let distances: Vec<f32> = (0..=steps).map(|i| total * i as f32 / steps as f32).collect();
    let (positions, _) = sample(&skeleton, &distances, false);
    let spacing = total / steps as f32;

    assert_position(positions[0], 0.0, 0.0);
    assert_position(positions[steps], 30.0, 0.0);
    // The handles are evenly spaced in x, so x grows with the curve parameter.
    for pair in positions.windows(2) {
        assert!(pair[1].x > pair[0].x, "{:?} then {:?}", pair[0], pair[1]);
        let step = ((pair[1].x - pair[0].x).powi(2) + (pair[1].y - pair[0].y).powi(2)).sqrt();
        assert!(
            (step - spacing).abs() < spacing * 0.5,
            "step {step} differs from spacing {spacing}"
        );
    }
}

#[test]
fn setup_lengths_drive_non_constant_speed_paths() {
    let skeleton = straight_line(false, 60.0);
    let (positions, total) = sample(&skeleton, &[30.0, 60.0], false);

    assert_approx(total, 60.0);
    assert_position(positions[0], 15.0, 0.0);
    assert_position(positions[1], 30.0, 0.0);
    assert_eq!(skeleton.path_length(0), Some(60.0));
}

#[test]
fn path_follows_the_slot_bone_and_skeleton() {
    let mut skeleton = straight_line(true, 30.0);
    skeleton.bones[0].y = 5.0;
    skeleton.x = 100.0;
    skeleton.update_world_transform();

    let (positions, _) = sample(&skeleton, &[0.0, 30.0], false);
    assert_position(positions[0], 100.0, 5.0);
    assert_position(positions[1], 130.0, 5.0);
}

#[test]
fn measured_length_tracks_bone_scale() {
    let mut skeleton = straight_line(true, 30.0);
    skeleton.bones[0].scale_x = 2.0;
    skeleton.update_world_transform();
    assert_approx(skeleton.path_length(0).unwrap(), 60.0);
}

#[test]
fn slots_without_paths_yield_nothing() {
    let mut skeleton = straight_line(true, 30.0);
    skeleton.slots[0].set_attachment(None);

    let mut out = vec![PathPosition::default()];
    assert_eq!(skeleton.compute_path_positions(0, &[1.0], true, &mut out), None);
    assert!(out.is_empty());
    assert_eq!(skeleton.path_length(0), None);
    assert_eq!(skeleton.path_length(7), None);
}

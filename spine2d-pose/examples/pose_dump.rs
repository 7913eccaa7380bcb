use serde_json::json;
use spine2d_pose::{
    Attachment, BoneData, BoundingBoxAttachmentData, PathAttachmentData, RegionAttachmentData,
    Skeleton, SkeletonBounds, SkeletonData, Skin, SlotData, TransformConstraintData, VertexData,
    VertexWeight,
};
use std::sync::Arc;

/// A two-bone arm with a hand that copies a free-floating "aim" bone's rotation, a weighted
/// hit box spanning the arm, and a path along it.
fn arm_rig() -> Arc<SkeletonData> {
    let mut skin = Skin::new("default");
    skin.set_attachment(
        0,
        "upper",
        Attachment::Region(RegionAttachmentData {
            x: 20.0,
            ..RegionAttachmentData::new("upper", 40.0, 10.0)
        }),
    )
    .expect("upper");
    let weight = |bone: usize, x: f32, y: f32| VertexWeight {
        bone,
        x,
        y,
        weight: 1.0,
    };
    skin.set_attachment(
        1,
        "hitbox",
        Attachment::BoundingBox(BoundingBoxAttachmentData {
            name: "hitbox".to_string(),
            vertex: VertexData::weighted(vec![
                vec![weight(1, 0.0, -5.0)],
                vec![weight(2, 30.0, -5.0)],
                vec![weight(2, 30.0, 5.0)],
                vec![weight(1, 0.0, 5.0)],
            ]),
        }),
    )
    .expect("hitbox");
    skin.set_attachment(
        2,
        "guide",
        Attachment::Path(PathAttachmentData {
            name: "guide".to_string(),
            vertex: VertexData::unweighted(vec![
                [-10.0, 0.0],
                [0.0, 0.0],
                [25.0, 10.0],
                [55.0, 10.0],
                [80.0, 0.0],
                [90.0, 0.0],
            ]),
            lengths: vec![85.0],
            closed: false,
            constant_speed: true,
        }),
    )
    .expect("guide");

    let slot = |name: &str, bone: usize| SlotData {
        attachment: Some(name.to_string()),
        ..SlotData::new(name, bone)
    };
    let data = SkeletonData::builder()
        .bone(BoneData::new("root", None))
        .bone(BoneData {
            length: 40.0,
            ..BoneData::new("upper", Some(0))
        })
        .bone(BoneData {
            x: 40.0,
            length: 30.0,
            ..BoneData::new("lower", Some(1))
        })
        .bone(BoneData {
            x: 30.0,
            ..BoneData::new("hand", Some(2))
        })
        .bone(BoneData {
            x: 100.0,
            rotation: 45.0,
            ..BoneData::new("aim", Some(0))
        })
        .slot(slot("upper", 1))
        .slot(slot("hitbox", 1))
        .slot(slot("guide", 0))
        .skin(skin)
        .transform_constraint(TransformConstraintData {
            translate_mix: 0.0,
            scale_mix: 0.0,
            shear_mix: 0.0,
            ..TransformConstraintData::new("hand-aim", vec![3], 4)
        })
        .build()
        .expect("arm rig");
    Arc::new(data)
}

fn main() {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let upper_rotation: f32 = args.first().and_then(|s| s.parse().ok()).unwrap_or(30.0);
    let lower_rotation: f32 = args.get(1).and_then(|s| s.parse().ok()).unwrap_or(45.0);

    let data = arm_rig();
    let mut skeleton = Skeleton::new(Arc::clone(&data));
    skeleton.x = 50.0;
    skeleton.y = 20.0;
    skeleton.bones[1].rotation = upper_rotation;
    skeleton.bones[2].rotation = lower_rotation;
    skeleton.update_world_transform();

    let bones: Vec<_> = skeleton
        .bones
        .iter()
        .zip(data.bones())
        .enumerate()
        .map(|(i, (bone, bone_data))| {
            json!({
                "i": i,
                "name": bone_data.name,
                "appliedValid": bone.applied_valid(),
                "world": {"a": bone.a, "b": bone.b, "c": bone.c, "d": bone.d, "x": bone.world_x, "y": bone.world_y},
                "rotation": bone.world_rotation_x(),
            })
        })
        .collect();

    let mut world = Vec::new();
    let slots: Vec<_> = data
        .slots()
        .iter()
        .enumerate()
        .map(|(i, slot_data)| {
            let attachment = skeleton.slots[i].attachment().map(|a| a.name().to_string());
            let vertices = skeleton
                .slot_world_vertices(i, &mut world)
                .then(|| world.clone());
            json!({
                "i": i,
                "name": slot_data.name,
                "attachment": attachment,
                "worldVertices": vertices,
            })
        })
        .collect();

    let mut positions = Vec::new();
    let distances: Vec<f32> = (0..=4).map(|i| i as f32 * 25.0).collect();
    let path_length = skeleton.compute_path_positions(2, &distances, true, &mut positions);
    let path: Vec<_> = positions
        .iter()
        .map(|p| json!({"x": p.x, "y": p.y, "rotation": p.rotation.to_degrees()}))
        .collect();

    let mut bounds = SkeletonBounds::new();
    bounds.update(&skeleton, true);
    let hand = skeleton.bones[3].local_to_world(0.0, 0.0);
    let hit = bounds
        .contains_point(hand[0] + skeleton.x, hand[1] + skeleton.y)
        .map(|b| b.name.clone());

    let out = json!({
        "upperRotation": upper_rotation,
        "lowerRotation": lower_rotation,
        "bones": bones,
        "slots": slots,
        "path": {"length": path_length, "positions": path},
        "bounds": {
            "minX": bounds.min_x(),
            "minY": bounds.min_y(),
            "maxX": bounds.max_x(),
            "maxY": bounds.max_y(),
            "handHit": hit,
        },
    });

    println!("{}", serde_json::to_string(&out).expect("json"));
}

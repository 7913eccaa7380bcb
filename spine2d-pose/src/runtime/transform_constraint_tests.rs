use crate::{BoneData, Skeleton, SkeletonData, TransformConstraintData};
use std::sync::Arc;

fn assert_approx(actual: f32, expected: f32) {
    let diff = (actual - expected).abs();
    assert!(
        diff <= 1.0e-4,
        "expected {expected}, got {actual} (diff {diff})"
    );
}

fn bone(name: &str, parent: Option<usize>, x: f32, y: f32, rotation: f32) -> BoneData {
    BoneData {
        x,
        y,
        rotation,
        ..BoneData::new(name, parent)
    }
}

fn constraint(name: &str, bones: Vec<usize>, target: usize) -> TransformConstraintData {
    TransformConstraintData {
        rotate_mix: 0.0,
        translate_mix: 0.0,
        scale_mix: 0.0,
        shear_mix: 0.0,
        ..TransformConstraintData::new(name, bones, target)
    }
}

fn skeleton_of(bones: Vec<BoneData>, constraints: Vec<TransformConstraintData>) -> Skeleton {
    let builder = bones
        .into_iter()
        .fold(SkeletonData::builder(), |builder, b| builder.bone(b));
    let data = constraints
        .into_iter()
        .fold(builder, |builder, c| builder.transform_constraint(c))
        .build()
        .unwrap();
    Skeleton::new(Arc::new(data))
}

#[test]
fn rotate_mix_aligns_bone_with_target() {
    let mut skeleton = skeleton_of(
        vec![
            bone("a", None, 0.0, 0.0, 0.0),
            bone("b", Some(0), 0.0, 0.0, 90.0),
        ],
        vec![TransformConstraintData {
            rotate_mix: 1.0,
            ..constraint("align", vec![1], 0)
        }],
    );
    skeleton.update_world_transform();

    let b = &skeleton.bones[1];
    assert_approx(b.world_rotation_x(), 0.0);
    assert_approx(b.a, 1.0);
    assert_approx(b.b, 0.0);
    assert_approx(b.c, 0.0);
    assert_approx(b.d, 1.0);
    assert!(!b.applied_valid());
    assert!(skeleton.bones[0].applied_valid());
}

#[test]
fn descendants_follow_the_constrained_bone() {
    let mut skeleton = skeleton_of(
        vec![
            bone("a", None, 0.0, 0.0, 0.0),
            bone("b", Some(0), 0.0, 0.0, 90.0),
            bone("c", Some(1), 10.0, 0.0, 0.0),
        ],
        vec![TransformConstraintData {
            rotate_mix: 1.0,
            ..constraint("align", vec![1], 0)
        }],
    );
    skeleton.update_world_transform();

    let c = &skeleton.bones[2];
    assert_approx(c.world_x, 10.0);
    assert_approx(c.world_y, 0.0);
    assert_approx(c.world_rotation_x(), 0.0);
}

#[test]
fn applied_values_reflect_the_constrained_pose_after_update() {
    let mut skeleton = skeleton_of(
        vec![
            bone("a", None, 0.0, 0.0, 30.0),
            bone("b", None, 0.0, 0.0, 0.0),
        ],
        vec![TransformConstraintData {
            rotate_mix: 1.0,
            ..constraint("align", vec![1], 0)
        }],
    );
    skeleton.update_world_transform();
    assert!(!skeleton.bones[1].applied_valid());

    skeleton.update_applied_transform(1);
    assert!(skeleton.bones[1].applied_valid());
    assert_approx(skeleton.bones[1].arotation, 30.0);
    // Local values written by the caller are untouched.
    assert_approx(skeleton.bones[1].rotation, 0.0);
}

#[test]
fn partial_mixes_blend_toward_target() {
    let mut skeleton = skeleton_of(
        vec![
            bone("target", None, 10.0, 0.0, 60.0),
            bone("b", None, 0.0, 0.0, 0.0),
        ],
        vec![TransformConstraintData {
            rotate_mix: 0.5,
            translate_mix: 0.5,
            ..constraint("half", vec![1], 0)
        }],
    );
    skeleton.update_world_transform();

    let b = &skeleton.bones[1];
    assert_approx(b.world_rotation_x(), 30.0);
    assert_approx(b.world_x, 5.0);
    assert_approx(b.world_y, 0.0);
}

#[test]
fn translate_uses_offset_in_target_space() {
    let mut skeleton = skeleton_of(
        vec![
            bone("target", None, 10.0, 0.0, 90.0),
            bone("b", None, 0.0, 0.0, 0.0),
        ],
        vec![TransformConstraintData {
            translate_mix: 1.0,
            offset_x: 5.0,
            ..constraint("offset", vec![1], 0)
        }],
    );
    skeleton.update_world_transform();

    assert_approx(skeleton.bones[1].world_x, 10.0);
    assert_approx(skeleton.bones[1].world_y, 5.0);
}

#[test]
fn scale_skips_collapsed_axis() {
    let mut skeleton = skeleton_of(
        vec![
            BoneData {
                scale_x: 2.0,
                scale_y: 2.0,
                ..bone("target", None, 0.0, 0.0, 0.0)
            },
            BoneData {
                scale_x: 0.0,
                ..bone("b", None, 0.0, 0.0, 0.0)
            },
        ],
        vec![TransformConstraintData {
            scale_mix: 1.0,
            ..constraint("scale", vec![1], 0)
        }],
    );
    skeleton.update_world_transform();

    let b = &skeleton.bones[1];
    assert!(b.a.is_finite() && b.c.is_finite());
    assert_approx(b.a, 0.0);
    assert_approx(b.c, 0.0);
    assert_approx(b.world_scale_y(), 2.0);
}

#[test]
fn constraints_apply_in_ascending_order() {
    let bones = || {
        vec![
            bone("first", None, 0.0, 0.0, 30.0),
            bone("second", None, 0.0, 0.0, 60.0),
            bone("b", None, 0.0, 0.0, 0.0),
        ]
    };
    let pair = |order_first: i32, order_second: i32| {
        vec![
            TransformConstraintData {
                order: order_first,
                rotate_mix: 1.0,
                ..constraint("to-first", vec![2], 0)
            },
            TransformConstraintData {
                order: order_second,
                rotate_mix: 1.0,
                ..constraint("to-second", vec![2], 1)
            },
        ]
    };

    let mut skeleton = skeleton_of(bones(), pair(2, 1));
    skeleton.update_world_transform();
    assert_approx(skeleton.bones[2].world_rotation_x(), 30.0);

    let mut skeleton = skeleton_of(bones(), pair(1, 2));
    skeleton.update_world_transform();
    assert_approx(skeleton.bones[2].world_rotation_x(), 60.0);
}

#[test]
fn equal_order_keeps_declaration_order() {
    let mut skeleton = skeleton_of(
        vec![
            bone("first", None, 0.0, 0.0, 30.0),
            bone("second", None, 0.0, 0.0, 60.0),
            bone("b", None, 0.0, 0.0, 0.0),
        ],
        vec![
            TransformConstraintData {
                rotate_mix: 1.0,
                ..constraint("to-first", vec![2], 0)
            },
            TransformConstraintData {
                rotate_mix: 1.0,
                ..constraint("to-second", vec![2], 1)
            },
        ],
    );
    skeleton.update_world_transform();
    assert_approx(skeleton.bones[2].world_rotation_x(), 60.0);
}

#[test]
fn relative_world_adds_target_rotation() {
    let mut skeleton = skeleton_of(
        vec![
            bone("target", None, 0.0, 0.0, 30.0),
            bone("b", None, 0.0, 0.0, 10.0),
        ],
        vec![TransformConstraintData {
            rotate_mix: 1.0,
            relative: true,
            ..constraint("relative", vec![1], 0)
        }],
    );
    skeleton.update_world_transform();
    assert_approx(skeleton.bones[1].world_rotation_x(), 40.0);
}

#[test]
fn absolute_local_blends_applied_values() {
    let mut skeleton = skeleton_of(
        vec![
            bone("root", None, 0.0, 0.0, 0.0),
            bone("target", Some(0), 8.0, 0.0, 45.0),
            bone("b", Some(0), 0.0, 0.0, 0.0),
            bone("child", Some(2), 10.0, 0.0, 0.0),
        ],
        vec![TransformConstraintData {
            rotate_mix: 0.5,
            translate_mix: 1.0,
            local: true,
            ..constraint("local", vec![2], 1)
        }],
    );
    skeleton.update_world_transform();

    let b = &skeleton.bones[2];
    assert!(b.applied_valid());
    assert_approx(b.arotation, 22.5);
    assert_approx(b.ax, 8.0);
    assert_approx(b.world_rotation_x(), 22.5);
    assert_approx(b.world_x, 8.0);

    let child = &skeleton.bones[3];
    let r = 22.5f32.to_radians();
    assert_approx(child.world_x, 8.0 + 10.0 * r.cos());
    assert_approx(child.world_y, 10.0 * r.sin());
}

#[test]
fn absolute_local_takes_the_short_way_around() {
    let mut skeleton = skeleton_of(
        vec![
            bone("target", None, 0.0, 0.0, 170.0),
            bone("b", None, 0.0, 0.0, -170.0),
        ],
        vec![TransformConstraintData {
            rotate_mix: 0.5,
            local: true,
            ..constraint("local", vec![1], 0)
        }],
    );
    skeleton.update_world_transform();
    assert_approx(skeleton.bones[1].arotation, -180.0);
}

#[test]
fn relative_local_adds_target_values() {
    let mut skeleton = skeleton_of(
        vec![
            BoneData {
                scale_x: 2.0,
                ..bone("target", None, 3.0, 4.0, 20.0)
            },
            bone("b", None, 1.0, 1.0, 10.0),
        ],
        vec![TransformConstraintData {
            rotate_mix: 1.0,
            translate_mix: 1.0,
            scale_mix: 1.0,
            local: true,
            relative: true,
            ..constraint("relative-local", vec![1], 0)
        }],
    );
    skeleton.update_world_transform();

    let b = &skeleton.bones[1];
    assert_approx(b.arotation, 30.0);
    assert_approx(b.ax, 4.0);
    assert_approx(b.ay, 5.0);
    assert_approx(b.ascale_x, 2.0);
    assert_approx(b.ascale_y, 1.0);
    assert_approx(b.world_x, 4.0);
}

#[test]
fn local_mode_reads_target_pose_after_world_constraint() {
    let mut skeleton = skeleton_of(
        vec![
            bone("driver", None, 0.0, 0.0, 40.0),
            bone("target", None, 0.0, 0.0, 0.0),
            bone("b", None, 0.0, 0.0, 0.0),
        ],
        vec![
            TransformConstraintData {
                order: 0,
                rotate_mix: 1.0,
                ..constraint("world", vec![1], 0)
            },
            TransformConstraintData {
                order: 1,
                rotate_mix: 1.0,
                local: true,
                ..constraint("local", vec![2], 1)
            },
        ],
    );
    skeleton.update_world_transform();

    assert!(skeleton.bones[1].applied_valid());
    assert_approx(skeleton.bones[1].arotation, 40.0);
    assert_approx(skeleton.bones[2].world_rotation_x(), 40.0);
}

#[test]
fn inert_constraint_changes_nothing() {
    let mut skeleton = skeleton_of(
        vec![
            bone("target", None, 10.0, 0.0, 45.0),
            bone("b", None, 0.0, 0.0, 0.0),
        ],
        vec![constraint("inert", vec![1], 0)],
    );
    skeleton.update_world_transform();

    let b = &skeleton.bones[1];
    assert!(b.applied_valid());
    assert_approx(b.world_x, 0.0);
    assert_approx(b.world_rotation_x(), 0.0);
    assert!(!skeleton.apply_transform_constraint(0));
}

#[test]
fn setup_pose_restores_mixes() {
    let mut skeleton = skeleton_of(
        vec![
            bone("target", None, 0.0, 0.0, 45.0),
            bone("b", None, 0.0, 0.0, 0.0),
        ],
        vec![TransformConstraintData {
            rotate_mix: 1.0,
            ..constraint("align", vec![1], 0)
        }],
    );
    skeleton.transform_constraints[0].rotate_mix = 0.0;
    skeleton.update_world_transform();
    assert_approx(skeleton.bones[1].world_rotation_x(), 0.0);

    skeleton.set_bones_to_setup_pose();
    skeleton.update_world_transform();
    assert_approx(skeleton.bones[1].world_rotation_x(), 45.0);
}

#[test]
fn shear_mix_copies_target_shear() {
    let target = BoneData {
        shear_y: 20.0,
        ..bone("target", None, 0.0, 0.0, 30.0)
    };
    for relative in [false, true] {
        let mut skeleton = skeleton_of(
            vec![target.clone(), bone("b", None, 0.0, 0.0, 10.0)],
            vec![TransformConstraintData {
                shear_mix: 1.0,
                relative,
                ..constraint("shear", vec![1], 0)
            }],
        );
        skeleton.update_world_transform();

        let t = &skeleton.bones[0];
        assert_approx(t.world_rotation_y() - t.world_rotation_x(), 110.0);
        let b = &skeleton.bones[1];
        assert_approx(b.world_rotation_x(), 10.0);
        assert_approx(b.world_rotation_y() - b.world_rotation_x(), 110.0);
        assert_approx(b.world_scale_y(), 1.0);
    }
}

#[test]
fn rotation_offset_flips_for_mirrored_target() {
    let rotated_by = |target_scale_x: f32| {
        let mut skeleton = skeleton_of(
            vec![
                BoneData {
                    scale_x: target_scale_x,
                    ..bone("target", None, 0.0, 0.0, 0.0)
                },
                bone("b", None, 0.0, 0.0, 0.0),
            ],
            vec![TransformConstraintData {
                rotate_mix: 1.0,
                offset_rotation: 30.0,
                ..constraint("offset", vec![1], 0)
            }],
        );
        skeleton.update_world_transform();
        skeleton.bones[1].world_rotation_x()
    };

    assert_approx(rotated_by(1.0), 30.0);
    // Mirrored: the target's x axis points at 180 and the offset turns the other way.
    assert_approx(rotated_by(-1.0), 150.0);
}

#[test]
fn scale_offsets_add_to_target_scale() {
    let mut skeleton = skeleton_of(
        vec![
            BoneData {
                scale_x: 2.0,
                scale_y: 3.0,
                ..bone("target", None, 0.0, 0.0, 0.0)
            },
            bone("b", None, 0.0, 0.0, 0.0),
        ],
        vec![TransformConstraintData {
            scale_mix: 1.0,
            offset_scale_x: 0.5,
            offset_scale_y: -1.0,
            ..constraint("grow", vec![1], 0)
        }],
    );
    skeleton.update_world_transform();

    let b = &skeleton.bones[1];
    assert_approx(b.world_scale_x(), 2.5);
    assert_approx(b.world_scale_y(), 2.0);
    assert_approx(b.world_rotation_x(), 0.0);
}

#[test]
fn later_bones_see_a_constrained_target() {
    let mut skeleton = skeleton_of(
        vec![
            bone("target", None, 10.0, 0.0, 0.0),
            bone("b", None, 0.0, 0.0, 0.0),
        ],
        vec![TransformConstraintData {
            rotate_mix: 1.0,
            offset_rotation: 45.0,
            ..constraint("chain", vec![0, 1], 0)
        }],
    );
    skeleton.update_world_transform();

    assert_approx(skeleton.bones[0].world_rotation_x(), 45.0);
    assert_approx(skeleton.bones[1].world_rotation_x(), 90.0);
}

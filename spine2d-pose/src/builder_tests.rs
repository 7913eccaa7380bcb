use crate::{
    Attachment, BoneData, BoundingBoxAttachmentData, Error, PathAttachmentData,
    RegionAttachmentData, SkeletonData, Skin, SlotData, TransformConstraintData, VertexData,
    VertexWeight,
};

fn bones(parents: &[Option<usize>]) -> crate::SkeletonDataBuilder {
    parents
        .iter()
        .enumerate()
        .fold(SkeletonData::builder(), |builder, (i, &parent)| {
            builder.bone(BoneData::new(format!("bone{i}"), parent))
        })
}

fn path(knots: usize, closed: bool, lengths: Vec<f32>) -> Attachment {
    Attachment::Path(PathAttachmentData {
        name: "path".to_string(),
        vertex: VertexData::unweighted(vec![[0.0, 0.0]; knots * 3]),
        lengths,
        closed,
        constant_speed: true,
    })
}

fn skin_with(slot: usize, attachment: Attachment) -> Skin {
    let mut skin = Skin::new("skin");
    skin.set_attachment(slot, "a", attachment).unwrap();
    skin
}

#[test]
fn builds_valid_data() {
    let data = bones(&[None, Some(0), Some(1)])
        .slot(SlotData::new("body", 2))
        .transform_constraint(TransformConstraintData::new("follow", vec![2], 0))
        .build()
        .unwrap();

    assert_eq!(data.bones().len(), 3);
    assert_eq!(data.find_bone("bone2"), Some(2));
    assert_eq!(data.find_slot("body"), Some(0));
    assert_eq!(data.find_transform_constraint("follow"), Some(0));
    assert!(data.default_skin().is_none());
}

#[test]
fn rejects_unknown_parent() {
    let err = bones(&[None, Some(5)]).build().unwrap_err();
    assert!(matches!(err, Error::UnknownBoneParent { parent: 5, .. }));
}

#[test]
fn rejects_parent_after_child() {
    let err = bones(&[None, Some(2), Some(0)]).build().unwrap_err();
    assert!(matches!(
        err,
        Error::BoneParentOrder {
            index: 1,
            parent: 2,
            ..
        }
    ));
}

#[test]
fn rejects_cycles() {
    let err = bones(&[Some(1), Some(0)]).build().unwrap_err();
    assert!(matches!(err, Error::CyclicBoneParent { .. }));

    let err = bones(&[Some(0)]).build().unwrap_err();
    assert!(matches!(err, Error::CyclicBoneParent { ref bone } if bone == "bone0"));
}

#[test]
fn rejects_bad_names() {
    let err = SkeletonData::builder()
        .bone(BoneData::new("root", None))
        .bone(BoneData::new("root", Some(0)))
        .build()
        .unwrap_err();
    assert!(matches!(err, Error::DuplicateName { kind: "bone", ref name } if name == "root"));

    let err = bones(&[None])
        .slot(SlotData::new("", 0))
        .build()
        .unwrap_err();
    assert!(matches!(err, Error::EmptyName { kind: "slot" }));

    let err = bones(&[None])
        .skin(Skin::new("default"))
        .skin(Skin::new("default"))
        .build()
        .unwrap_err();
    assert!(matches!(err, Error::DuplicateName { kind: "skin", .. }));
}

#[test]
fn rejects_slot_with_unknown_bone() {
    let err = bones(&[None])
        .slot(SlotData::new("slot", 1))
        .build()
        .unwrap_err();
    assert!(matches!(err, Error::UnknownSlotBone { bone: 1, .. }));
}

#[test]
fn rejects_bad_constraints() {
    let err = bones(&[None, Some(0)])
        .transform_constraint(TransformConstraintData::new("empty", Vec::new(), 0))
        .build()
        .unwrap_err();
    assert!(matches!(err, Error::EmptyConstraintBones { .. }));

    let err = bones(&[None, Some(0)])
        .transform_constraint(TransformConstraintData::new("bad-target", vec![1], 4))
        .build()
        .unwrap_err();
    assert!(matches!(err, Error::UnknownConstraintBone { bone: 4, .. }));

    let err = bones(&[None, Some(0)])
        .transform_constraint(TransformConstraintData {
            rotate_mix: f32::NAN,
            ..TransformConstraintData::new("nan", vec![1], 0)
        })
        .build()
        .unwrap_err();
    assert!(matches!(err, Error::InvalidValue { .. }));
}

#[test]
fn rejects_skin_entry_for_missing_slot() {
    let region = Attachment::Region(RegionAttachmentData::new("r", 1.0, 1.0));
    let err = bones(&[None])
        .slot(SlotData::new("slot", 0))
        .skin(skin_with(3, region))
        .build()
        .unwrap_err();
    assert!(matches!(
        err,
        Error::InvalidSkinSlot {
            slot_index: 3,
            slot_count: 1,
            ..
        }
    ));
}

#[test]
fn rejects_weights_to_unknown_bones() {
    let vertex = VertexData::weighted(vec![vec![VertexWeight {
        bone: 2,
        x: 0.0,
        y: 0.0,
        weight: 1.0,
    }]]);
    let bounding_box = Attachment::BoundingBox(BoundingBoxAttachmentData {
        name: "box".to_string(),
        vertex,
    });
    let err = bones(&[None, Some(0)])
        .slot(SlotData::new("slot", 0))
        .skin(skin_with(0, bounding_box))
        .build()
        .unwrap_err();
    assert!(matches!(err, Error::UnknownWeightBone { bone: 2, .. }));
}

#[test]
fn validates_path_lengths() {
    let build = |attachment: Attachment| {
        bones(&[None])
            .slot(SlotData::new("slot", 0))
            .skin(skin_with(0, attachment))
            .build()
    };

    assert!(build(path(3, false, vec![10.0, 20.0])).is_ok());
    assert!(build(path(3, true, vec![10.0, 20.0, 30.0])).is_ok());

    let err = build(path(3, false, vec![10.0])).unwrap_err();
    assert!(matches!(err, Error::InvalidPathLengths { .. }));

    let err = build(path(3, false, vec![20.0, 10.0])).unwrap_err();
    assert!(matches!(err, Error::InvalidPathLengths { .. }));

    let err = build(path(1, false, Vec::new())).unwrap_err();
    assert!(matches!(err, Error::InvalidPathLengths { .. }));
}

#[test]
fn finds_default_skin_by_name() {
    let data = bones(&[None])
        .skin(Skin::new("red"))
        .skin(Skin::new("default"))
        .build()
        .unwrap();
    assert_eq!(data.default_skin().map(Skin::name), Some("default"));
    assert_eq!(data.skin("red").map(Skin::name), Some("red"));
    assert!(data.skin("blue").is_none());
    assert_eq!(data.skins().len(), 2);
}

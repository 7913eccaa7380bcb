use crate::{
    Attachment, BoneData, Error, MeshVertices, SkeletonData, Skin, SlotData,
    TransformConstraintData,
};
use std::collections::HashSet;

/// Collects setup data and validates it into a [`SkeletonData`].
///
/// Validation happens once, here: bones must reference an earlier bone as parent, every index
/// must be in range and path lengths must be consistent with their vertices.
#[derive(Clone, Debug, Default)]
pub struct SkeletonDataBuilder {
    bones: Vec<BoneData>,
    slots: Vec<SlotData>,
    skins: Vec<Skin>,
    transform_constraints: Vec<TransformConstraintData>,
}

impl SkeletonData {
    pub fn builder() -> SkeletonDataBuilder {
        SkeletonDataBuilder::default()
    }
}

impl SkeletonDataBuilder {
    pub fn bone(mut self, bone: BoneData) -> Self {
        self.bones.push(bone);
        self
    }

    pub fn slot(mut self, slot: SlotData) -> Self {
        self.slots.push(slot);
        self
    }

    pub fn skin(mut self, skin: Skin) -> Self {
        self.skins.push(skin);
        self
    }

    pub fn transform_constraint(mut self, constraint: TransformConstraintData) -> Self {
        self.transform_constraints.push(constraint);
        self
    }

    pub fn build(self) -> Result<SkeletonData, Error> {
        validate_bones(&self.bones)?;
        validate_slots(&self.slots, self.bones.len())?;
        validate_constraints(&self.transform_constraints, self.bones.len())?;
        for skin in &self.skins {
            validate_skin(skin, self.slots.len(), self.bones.len())?;
        }
        check_unique("skin", self.skins.iter().map(Skin::name))?;

        let default_skin = self.skins.iter().position(|s| s.name() == "default");

        log::debug!(
            "built skeleton data: {} bones, {} slots, {} skins, {} transform constraints",
            self.bones.len(),
            self.slots.len(),
            self.skins.len(),
            self.transform_constraints.len()
        );

        Ok(SkeletonData {
            bones: self.bones,
            slots: self.slots,
            skins: self.skins,
            default_skin,
            transform_constraints: self.transform_constraints,
        })
    }
}

fn check_unique<'a>(
    kind: &'static str,
    names: impl Iterator<Item = &'a str>,
) -> Result<(), Error> {
    let mut seen = HashSet::new();
    for name in names {
        if name.is_empty() {
            return Err(Error::EmptyName { kind });
        }
        if !seen.insert(name) {
            return Err(Error::DuplicateName {
                kind,
                name: name.to_string(),
            });
        }
    }
    Ok(())
}

fn validate_bones(bones: &[BoneData]) -> Result<(), Error> {
    check_unique("bone", bones.iter().map(|b| b.name.as_str()))?;

    for (index, bone) in bones.iter().enumerate() {
        let Some(parent) = bone.parent else {
            continue;
        };
        if parent >= bones.len() {
            return Err(Error::UnknownBoneParent {
                bone: bone.name.clone(),
                parent,
            });
        }
        if parent < index {
            continue;
        }

        // A forward reference is either a cycle or an ordering mistake; report which.
        let mut visited = vec![false; bones.len()];
        let mut current = Some(index);
        while let Some(i) = current {
            if visited[i] {
                return Err(Error::CyclicBoneParent {
                    bone: bones[i].name.clone(),
                });
            }
            visited[i] = true;
            current = bones[i].parent.filter(|&p| p < bones.len());
        }
        return Err(Error::BoneParentOrder {
            bone: bone.name.clone(),
            index,
            parent,
        });
    }
    Ok(())
}

fn validate_slots(slots: &[SlotData], bone_count: usize) -> Result<(), Error> {
    check_unique("slot", slots.iter().map(|s| s.name.as_str()))?;
    for slot in slots {
        if slot.bone >= bone_count {
            return Err(Error::UnknownSlotBone {
                slot: slot.name.clone(),
                bone: slot.bone,
            });
        }
    }
    Ok(())
}

fn validate_constraints(
    constraints: &[TransformConstraintData],
    bone_count: usize,
) -> Result<(), Error> {
    check_unique(
        "transform constraint",
        constraints.iter().map(|c| c.name.as_str()),
    )?;
    for c in constraints {
        if c.bones.is_empty() {
            return Err(Error::EmptyConstraintBones {
                constraint: c.name.clone(),
            });
        }
        if let Some(&bone) = c
            .bones
            .iter()
            .chain(std::iter::once(&c.target))
            .find(|&&b| b >= bone_count)
        {
            return Err(Error::UnknownConstraintBone {
                constraint: c.name.clone(),
                bone,
            });
        }
        let mixes = [c.rotate_mix, c.translate_mix, c.scale_mix, c.shear_mix];
        if mixes.iter().any(|m| !m.is_finite()) {
            return Err(Error::InvalidValue {
                message: format!("transform constraint '{}' has a non-finite mix", c.name),
            });
        }
    }
    Ok(())
}

fn validate_skin(skin: &Skin, slot_count: usize, bone_count: usize) -> Result<(), Error> {
    if skin.slot_capacity() > slot_count {
        if let Some((slot_index, _, _)) = skin.iter().find(|(i, _, _)| *i >= slot_count) {
            return Err(Error::InvalidSkinSlot {
                skin: skin.name().to_string(),
                slot_index,
                slot_count,
            });
        }
    }

    for (_, name, attachment) in skin.iter() {
        if let Some(vertex) = attachment.vertex_data() {
            if let MeshVertices::Weighted(vertices) = &vertex.vertices {
                if let Some(w) = vertices.iter().flatten().find(|w| w.bone >= bone_count) {
                    return Err(Error::UnknownWeightBone {
                        skin: skin.name().to_string(),
                        attachment: name.to_string(),
                        bone: w.bone,
                    });
                }
            }
        }
        if let Attachment::Path(path) = attachment.as_ref() {
            validate_path_lengths(name, path)?;
        }
    }
    Ok(())
}

fn validate_path_lengths(name: &str, path: &crate::PathAttachmentData) -> Result<(), Error> {
    let invalid = |message: String| Error::InvalidPathLengths {
        attachment: name.to_string(),
        message,
    };

    let vertex_count = path.vertex.vertices.vertex_count();
    if vertex_count % 3 != 0 || vertex_count < 6 {
        return Err(invalid(format!(
            "expected at least two knots of three vertices, got {vertex_count} vertices"
        )));
    }
    let curves = path.curve_count();
    if path.lengths.len() != curves {
        return Err(invalid(format!(
            "expected {curves} lengths, got {}",
            path.lengths.len()
        )));
    }
    if path.lengths.windows(2).any(|w| w[1] < w[0]) || path.lengths.iter().any(|l| *l < 0.0) {
        return Err(invalid("lengths must be non-negative and non-decreasing".to_string()));
    }
    Ok(())
}

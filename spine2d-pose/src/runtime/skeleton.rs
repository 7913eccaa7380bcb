use super::bone::{
    Bone, ParentTransform, applied_from_world, update_world_transform_child,
    update_world_transform_root,
};
use super::slot::{Deform, Slot};
use super::transform_constraint::TransformConstraint;
use crate::{Error, Inherit, SkeletonData};
use std::sync::Arc;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum UpdateCacheItem {
    Bone(usize),
    Transform(usize),
}

/// A posable instance of [`SkeletonData`].
///
/// Per frame: write local bone values, slot colors, attachments and deforms, then call
/// [`Skeleton::update_world_transform`]. World vertices, path positions and bounds read the
/// resulting pose.
#[derive(Clone, Debug)]
pub struct Skeleton {
    data: Arc<SkeletonData>,
    pub bones: Vec<Bone>,
    pub slots: Vec<Slot>,
    pub transform_constraints: Vec<TransformConstraint>,
    pub(crate) skin: Option<usize>,
    pub color: [f32; 4],
    pub x: f32,
    pub y: f32,
    /// Negative values flip the skeleton on that axis.
    pub scale_x: f32,
    pub scale_y: f32,
    update_cache: Vec<UpdateCacheItem>,
}

impl Skeleton {
    pub fn new(data: Arc<SkeletonData>) -> Self {
        let bones = data
            .bones
            .iter()
            .enumerate()
            .map(|(i, bone)| Bone::new(i, bone))
            .collect();
        let slots = data
            .slots
            .iter()
            .enumerate()
            .map(|(i, slot)| Slot::new(i, slot))
            .collect();
        let transform_constraints = data
            .transform_constraints
            .iter()
            .enumerate()
            .map(|(i, c)| TransformConstraint::new(i, c))
            .collect();

        let mut skeleton = Self {
            data,
            bones,
            slots,
            transform_constraints,
            skin: None,
            color: [1.0, 1.0, 1.0, 1.0],
            x: 0.0,
            y: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            update_cache: Vec::new(),
        };
        skeleton.update_cache();
        skeleton.set_slots_to_setup_pose();
        skeleton
    }

    pub fn data(&self) -> &Arc<SkeletonData> {
        &self.data
    }

    fn update_cache(&mut self) {
        let bone_count = self.bones.len();
        let mut cache: Vec<UpdateCacheItem> = (0..bone_count).map(UpdateCacheItem::Bone).collect();

        let mut order: Vec<usize> = (0..self.transform_constraints.len()).collect();
        order.sort_by_key(|&i| {
            self.data
                .transform_constraints
                .get(self.transform_constraints[i].data_index())
                .map(|c| c.order)
                .unwrap_or(0)
        });

        let mut constrained = vec![false; bone_count];
        let mut in_subtree = vec![false; bone_count];
        for &constraint_index in &order {
            cache.push(UpdateCacheItem::Transform(constraint_index));

            constrained.fill(false);
            for &bone in self.transform_constraints[constraint_index].bones() {
                if let Some(flag) = constrained.get_mut(bone) {
                    *flag = true;
                }
            }
            // Parents precede children, so one forward pass marks whole subtrees.
            for i in 0..bone_count {
                let parent_marked = self.bones[i]
                    .parent_index()
                    .is_some_and(|p| in_subtree.get(p).copied().unwrap_or(false));
                in_subtree[i] = constrained[i] || parent_marked;
                if in_subtree[i] && !constrained[i] {
                    cache.push(UpdateCacheItem::Bone(i));
                }
            }
        }

        if log::log_enabled!(log::Level::Trace) {
            let names: Vec<&str> = order
                .iter()
                .filter_map(|&i| self.data.transform_constraints.get(i))
                .map(|c| c.name.as_str())
                .collect();
            log::trace!("transform constraint order: {names:?}");
        }

        self.update_cache = cache;
    }

    /// Composes every bone from its local pose, then applies transform constraints in
    /// ascending order, recomposing the descendants of each constraint's bones.
    pub fn update_world_transform(&mut self) {
        for bone in &mut self.bones {
            bone.copy_local_to_applied();
        }
        for i in 0..self.update_cache.len() {
            match self.update_cache[i] {
                UpdateCacheItem::Bone(bone_index) => self.update_bone_world_transform(bone_index),
                UpdateCacheItem::Transform(constraint_index) => {
                    self.apply_transform_constraint(constraint_index);
                }
            }
        }
    }

    /// Recomposes one bone from its applied values and its parent's world transform.
    pub(crate) fn update_bone_world_transform(&mut self, bone_index: usize) {
        let (scale_x, scale_y) = (self.scale_x, self.scale_y);
        let Some(parent) = self.bones.get(bone_index).map(Bone::parent_index) else {
            return;
        };
        match parent {
            None => update_world_transform_root(&mut self.bones[bone_index], scale_x, scale_y),
            Some(parent_index) => {
                let Some(parent) = self.bones.get(parent_index).map(ParentTransform::of) else {
                    return;
                };
                update_world_transform_child(&mut self.bones[bone_index], scale_x, scale_y, &parent);
            }
        }
    }

    /// Recomputes a bone's applied values from its current world transform, so they describe
    /// the pose after constraints. Sets the bone's applied-valid flag.
    pub fn update_applied_transform(&mut self, bone_index: usize) {
        let (scale_x, scale_y) = (self.scale_x, self.scale_y);
        let Some(bone) = self.bones.get(bone_index) else {
            return;
        };
        let (parent, inherit) = match bone.parent_index() {
            None => (ParentTransform::skeleton(scale_x, scale_y), Inherit::Normal),
            Some(parent_index) => match self.bones.get(parent_index) {
                Some(parent) => (ParentTransform::of(parent), bone.inherit),
                None => return,
            },
        };
        applied_from_world(
            &mut self.bones[bone_index],
            &parent,
            inherit,
            scale_x,
            scale_y,
        );
    }

    pub fn set_to_setup_pose(&mut self) {
        self.set_bones_to_setup_pose();
        self.set_slots_to_setup_pose();
    }

    /// Resets bones and constraint mixes.
    pub fn set_bones_to_setup_pose(&mut self) {
        let data = Arc::clone(&self.data);
        for (bone, bone_data) in self.bones.iter_mut().zip(&data.bones) {
            bone.set_to_setup_pose(bone_data);
        }
        for constraint in &mut self.transform_constraints {
            if let Some(c) = data.transform_constraints.get(constraint.data_index()) {
                constraint.set_to_setup_pose(c);
            }
        }
    }

    /// Resets slot colors and blend modes, drops deforms, and reattaches each slot's setup
    /// attachment through the active skin and the default skin.
    pub fn set_slots_to_setup_pose(&mut self) {
        let data = Arc::clone(&self.data);
        for slot_index in 0..self.slots.len() {
            let Some(slot_data) = data.slots.get(slot_index) else {
                continue;
            };
            let attachment = slot_data.attachment.as_deref().and_then(|name| {
                let resolved = self.attachment(slot_index, name).cloned();
                if resolved.is_none() {
                    log::warn!(
                        "setup attachment '{name}' of slot '{}' is not in any active skin",
                        slot_data.name
                    );
                }
                resolved
            });
            let slot = &mut self.slots[slot_index];
            slot.set_to_setup_pose(slot_data);
            slot.set_attachment(attachment);
        }
    }

    pub fn find_bone(&self, name: &str) -> Option<usize> {
        self.data.find_bone(name)
    }

    pub fn find_slot(&self, name: &str) -> Option<usize> {
        self.data.find_slot(name)
    }

    pub fn find_transform_constraint(&self, name: &str) -> Option<usize> {
        self.data.find_transform_constraint(name)
    }

    pub fn bone_by_name(&self, name: &str) -> Option<&Bone> {
        self.find_bone(name).and_then(|i| self.bones.get(i))
    }

    pub fn slot_by_name(&self, name: &str) -> Option<&Slot> {
        self.find_slot(name).and_then(|i| self.slots.get(i))
    }

    pub(crate) fn slot_name(&self, slot_index: usize) -> String {
        self.data
            .slots
            .get(slot_index)
            .map(|s| s.name.clone())
            .unwrap_or_else(|| slot_index.to_string())
    }

    /// Binds a deform to the vertex attachment currently shown by the slot. An empty buffer
    /// removes the deform.
    pub fn set_slot_deform(&mut self, slot_index: usize, vertices: Vec<f32>) -> Result<(), Error> {
        let count = self.slots.len();
        if slot_index >= count {
            return Err(Error::InvalidSlotIndex {
                index: slot_index,
                count,
            });
        }
        if vertices.is_empty() {
            self.slots[slot_index].clear_deform();
            return Ok(());
        }

        let vertex = self.slots[slot_index]
            .attachment()
            .and_then(|a| a.vertex_data())
            .map(|v| (v.vertices.deform_len(), v.id()));
        let Some((expected, attachment)) = vertex else {
            return Err(Error::NotVertexAttachment {
                slot: self.slot_name(slot_index),
            });
        };
        if vertices.len() != expected {
            return Err(Error::DeformLengthMismatch {
                slot: self.slot_name(slot_index),
                expected,
                actual: vertices.len(),
            });
        }

        self.slots[slot_index].set_deform(Deform {
            attachment,
            vertices,
        });
        Ok(())
    }
}

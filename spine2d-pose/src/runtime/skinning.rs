use super::{Bone, Skeleton};
use crate::geometry::region_local_vertices;
use crate::{Attachment, Error, MeshVertices, PointAttachmentData, RegionAttachmentData, VertexData};

fn check_output(out: &[f32], offset: usize, vertex_count: usize, stride: usize) -> Result<(), Error> {
    if stride < 2 {
        return Err(Error::InvalidValue {
            message: format!("world vertex stride must be at least 2, got {stride}"),
        });
    }
    let required = offset + vertex_count * stride;
    if out.len() < required {
        return Err(Error::BufferTooSmall {
            required,
            actual: out.len(),
        });
    }
    Ok(())
}

fn slot_bone(skeleton: &Skeleton, slot_index: usize) -> Result<&Bone, Error> {
    let count = skeleton.slots.len();
    let invalid = Error::InvalidSlotIndex {
        index: slot_index,
        count,
    };
    let slot = skeleton.slots.get(slot_index).ok_or(invalid)?;
    skeleton
        .bones
        .get(slot.bone())
        .ok_or_else(|| Error::InvalidValue {
            message: format!("slot {slot_index} references missing bone {}", slot.bone()),
        })
}

impl VertexData {
    /// Transforms local vertices `start..start + count` (two values per vertex) to world
    /// space, writing each vertex at `out[offset + i * stride]`.
    ///
    /// `start` and `count` must be even. A deform on the slot is used only if it targets this
    /// attachment. The skeleton's position is included.
    #[allow(clippy::too_many_arguments)]
    pub fn compute_world_vertices(
        &self,
        skeleton: &Skeleton,
        slot_index: usize,
        start: usize,
        count: usize,
        out: &mut [f32],
        offset: usize,
        stride: usize,
    ) -> Result<(), Error> {
        let length = self.world_vertices_length();
        let end = start + count;
        if end > length || start % 2 != 0 || count % 2 != 0 {
            return Err(Error::InvalidVertexRange { start, end, length });
        }
        let first_vertex = start / 2;
        let vertex_count = count / 2;
        check_output(out, offset, vertex_count, stride)?;

        let slot_count = skeleton.slots.len();
        let slot = skeleton
            .slots
            .get(slot_index)
            .ok_or(Error::InvalidSlotIndex {
                index: slot_index,
                count: slot_count,
            })?;
        let deform = slot.deform_for(self.id());
        let (skeleton_x, skeleton_y) = (skeleton.x, skeleton.y);

        match &self.vertices {
            MeshVertices::Unweighted(vertices) => {
                let bone = slot_bone(skeleton, slot_index)?;
                for i in 0..vertex_count {
                    let v = first_vertex + i;
                    let (x, y) = match deform {
                        Some(deform) => (
                            deform.get(v * 2).copied().unwrap_or(0.0),
                            deform.get(v * 2 + 1).copied().unwrap_or(0.0),
                        ),
                        None => (vertices[v][0], vertices[v][1]),
                    };
                    let w = offset + i * stride;
                    out[w] = x * bone.a + y * bone.b + bone.world_x + skeleton_x;
                    out[w + 1] = x * bone.c + y * bone.d + bone.world_y + skeleton_y;
                }
            }
            MeshVertices::Weighted(vertices) => {
                let bone_count = skeleton.bones.len();
                if let Some(weight) = vertices[first_vertex..first_vertex + vertex_count]
                    .iter()
                    .flatten()
                    .find(|weight| weight.bone >= bone_count)
                {
                    return Err(Error::InvalidValue {
                        message: format!(
                            "vertex weight references bone {} but the skeleton has {bone_count} bones",
                            weight.bone
                        ),
                    });
                }
                let mut f = vertices[..first_vertex]
                    .iter()
                    .map(|weights| weights.len() * 2)
                    .sum::<usize>();
                for i in 0..vertex_count {
                    let mut wx = skeleton_x;
                    let mut wy = skeleton_y;
                    for weight in &vertices[first_vertex + i] {
                        let (mut vx, mut vy) = (weight.x, weight.y);
                        if let Some(deform) = deform {
                            vx += deform.get(f).copied().unwrap_or(0.0);
                            vy += deform.get(f + 1).copied().unwrap_or(0.0);
                        }
                        f += 2;
                        let bone = &skeleton.bones[weight.bone];
                        wx += (vx * bone.a + vy * bone.b + bone.world_x) * weight.weight;
                        wy += (vx * bone.c + vy * bone.d + bone.world_y) * weight.weight;
                    }
                    let w = offset + i * stride;
                    out[w] = wx;
                    out[w + 1] = wy;
                }
            }
        }
        Ok(())
    }
}

impl RegionAttachmentData {
    /// Writes the four world corners in order BR, BL, UL, UR.
    pub fn compute_world_vertices(
        &self,
        skeleton: &Skeleton,
        slot_index: usize,
        out: &mut [f32],
        offset: usize,
        stride: usize,
    ) -> Result<(), Error> {
        check_output(out, offset, 4, stride)?;
        let bone = slot_bone(skeleton, slot_index)?;
        for (i, [x, y]) in region_local_vertices(self).into_iter().enumerate() {
            let [wx, wy] = bone.local_to_world(x, y);
            let w = offset + i * stride;
            out[w] = wx + skeleton.x;
            out[w + 1] = wy + skeleton.y;
        }
        Ok(())
    }
}

impl PointAttachmentData {
    pub fn compute_world_position(&self, skeleton: &Skeleton, bone: &Bone) -> [f32; 2] {
        let [x, y] = bone.local_to_world(self.x, self.y);
        [x + skeleton.x, y + skeleton.y]
    }

    /// Degrees. Accounts for shear and reflection in the bone's world transform.
    pub fn compute_world_rotation(&self, bone: &Bone) -> f32 {
        let r = self.rotation.to_radians();
        let cos = r.cos();
        let sin = r.sin();
        let x = cos * bone.a + sin * bone.b;
        let y = cos * bone.c + sin * bone.d;
        y.atan2(x).to_degrees()
    }
}

impl Skeleton {
    /// Replaces `out` with the world vertices of the slot's region or vertex attachment.
    /// Returns false, leaving `out` empty, when the slot shows nothing with vertices.
    pub fn slot_world_vertices(&self, slot_index: usize, out: &mut Vec<f32>) -> bool {
        out.clear();
        let Some(attachment) = self.slots.get(slot_index).and_then(|s| s.attachment()) else {
            return false;
        };
        let result = match attachment.as_ref() {
            Attachment::Region(region) => {
                out.resize(8, 0.0);
                region.compute_world_vertices(self, slot_index, out, 0, 2)
            }
            Attachment::Point(_) => return false,
            other => {
                let Some(vertex) = other.vertex_data() else {
                    return false;
                };
                let length = vertex.world_vertices_length();
                out.resize(length, 0.0);
                vertex.compute_world_vertices(self, slot_index, 0, length, out, 0, 2)
            }
        };
        if let Err(err) = result {
            log::warn!("slot {slot_index}: {err}");
            out.clear();
            return false;
        }
        true
    }

    /// World position and rotation (degrees) of the point attachment shown by the slot.
    pub fn slot_point(&self, slot_index: usize) -> Option<([f32; 2], f32)> {
        let slot = self.slots.get(slot_index)?;
        let Attachment::Point(point) = slot.attachment()?.as_ref() else {
            return None;
        };
        let bone = self.bones.get(slot.bone())?;
        Some((
            point.compute_world_position(self, bone),
            point.compute_world_rotation(bone),
        ))
    }
}

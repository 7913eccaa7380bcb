use crate::{Attachment, BlendMode, Skeleton};

const QUAD_TRIANGLES: [u32; 6] = [0, 1, 2, 2, 3, 0];

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Vertex {
    pub position: [f32; 2],
    pub uv: [f32; 2],
    pub color: [f32; 4],
}

/// A run of indices sharing an image path and blend mode.
#[derive(Clone, Debug, PartialEq)]
pub struct Draw {
    pub path: String,
    pub blend: BlendMode,
    pub first_index: usize,
    pub index_count: usize,
}

/// Triangles of a posed skeleton in slot order.
///
/// Index order within an attachment is the attachment's own (regions use two fixed
/// triangles), so it is stable from frame to frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DrawList {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
    pub draws: Vec<Draw>,
}

impl DrawList {
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.indices.clear();
        self.draws.clear();
    }
}

pub fn build_draw_list(skeleton: &Skeleton) -> DrawList {
    let mut out = DrawList::default();
    append_draw_list(&mut out, skeleton);
    out
}

pub fn append_draw_list(out: &mut DrawList, skeleton: &Skeleton) {
    let mut world = Vec::new();

    for (slot_index, slot) in skeleton.slots.iter().enumerate() {
        let Some(attachment) = slot.attachment() else {
            continue;
        };
        if slot.color[3] <= 0.0 {
            continue;
        }

        match attachment.as_ref() {
            Attachment::Region(region) => {
                if region.color[3] <= 0.0 {
                    continue;
                }
                if !skeleton.slot_world_vertices(slot_index, &mut world) {
                    continue;
                }
                let color =
                    multiply_rgba(multiply_rgba(skeleton.color, slot.color), region.color);
                let vertices = world
                    .chunks_exact(2)
                    .zip(region.uvs)
                    .map(|(xy, uv)| Vertex {
                        position: [xy[0], xy[1]],
                        uv,
                        color,
                    });
                append_indexed(out, &region.path, slot.blend, vertices, &QUAD_TRIANGLES);
            }
            Attachment::Mesh(mesh) => {
                if mesh.color[3] <= 0.0 || mesh.triangles.is_empty() {
                    continue;
                }
                if !skeleton.slot_world_vertices(slot_index, &mut world) {
                    continue;
                }
                let color = multiply_rgba(multiply_rgba(skeleton.color, slot.color), mesh.color);
                let vertices = world.chunks_exact(2).enumerate().map(|(i, xy)| Vertex {
                    position: [xy[0], xy[1]],
                    uv: mesh.uvs.get(i).copied().unwrap_or([0.0, 0.0]),
                    color,
                });
                append_indexed(out, &mesh.path, slot.blend, vertices, &mesh.triangles);
            }
            Attachment::BoundingBox(_)
            | Attachment::Path(_)
            | Attachment::Point(_)
            | Attachment::Clipping(_) => {}
        }
    }
}

fn append_indexed(
    out: &mut DrawList,
    path: &str,
    blend: BlendMode,
    vertices: impl Iterator<Item = Vertex>,
    indices: &[u32],
) {
    let base = out.vertices.len() as u32;
    out.vertices.extend(vertices);

    let first_index = out.indices.len();
    out.indices.extend(indices.iter().map(|&idx| base + idx));

    if let Some(last) = out.draws.last_mut() {
        let expected = last.first_index + last.index_count;
        if last.path == path && last.blend == blend && expected == first_index {
            last.index_count += indices.len();
            return;
        }
    }

    out.draws.push(Draw {
        path: path.to_string(),
        blend,
        first_index,
        index_count: indices.len(),
    });
}

fn multiply_rgba(a: [f32; 4], b: [f32; 4]) -> [f32; 4] {
    [a[0] * b[0], a[1] * b[1], a[2] * b[2], a[3] * b[3]]
}

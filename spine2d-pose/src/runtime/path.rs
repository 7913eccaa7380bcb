use super::Skeleton;
use crate::geometry::{
    Curve, PathPosition, locate, position_after, position_before, span_fraction,
};
use crate::{Attachment, PathAttachmentData};

const EPSILON: f32 = 1.0e-5;

/// A path attachment posed in world space, ready for sampling.
struct PosedPath {
    /// Knots as in-handle, knot, out-handle; closed paths repeat the first in-handle and knot
    /// at the end so every curve reads eight consecutive values.
    world: Vec<f32>,
    curve_count: usize,
    /// Cumulative length at the end of each curve.
    lengths: Vec<f32>,
    /// Per-curve arc-length tables, present for constant speed.
    segments: Option<Vec<[f32; 10]>>,
    closed: bool,
}

impl PosedPath {
    fn curve(&self, index: usize) -> Curve {
        Curve::from_world(&self.world, index * 6 + 2)
    }

    fn total_length(&self) -> f32 {
        self.lengths.last().copied().unwrap_or(0.0)
    }

    fn sample(&self, distance: f32) -> PathPosition {
        let total = self.total_length();
        if total <= EPSILON {
            return self.curve(0).position(0.0);
        }

        let mut p = distance;
        if self.closed {
            p = p.rem_euclid(total);
        } else if p < 0.0 {
            return position_before(p, &self.world, 2);
        } else if p > total {
            return position_after(p - total, &self.world, self.world.len() - 6);
        }

        let (index, start, end) = locate(&self.lengths, p);
        let curve = self.curve(index);
        let t = match &self.segments {
            None => span_fraction(p, start, end),
            Some(segments) => {
                let table = &segments[index];
                let (segment, seg_start, seg_end) = locate(table, p - start);
                (segment as f32 + span_fraction(p - start, seg_start, seg_end)) * 0.1
            }
        };
        curve.position(t.clamp(0.0, 1.0))
    }
}

fn path_attachment(skeleton: &Skeleton, slot_index: usize) -> Option<&PathAttachmentData> {
    match skeleton.slots.get(slot_index)?.attachment()?.as_ref() {
        Attachment::Path(path) => Some(path),
        _ => None,
    }
}

fn pose_path(skeleton: &Skeleton, slot_index: usize, path: &PathAttachmentData) -> Option<PosedPath> {
    let length = path.vertex.world_vertices_length();
    let curve_count = path.curve_count();
    if curve_count == 0 {
        return None;
    }

    let mut world = vec![0.0f32; length];
    if let Err(err) = path
        .vertex
        .compute_world_vertices(skeleton, slot_index, 0, length, &mut world, 0, 2)
    {
        log::warn!("path '{}' in slot {slot_index}: {err}", path.name);
        return None;
    }
    if path.closed {
        world.extend_from_within(0..4);
    }

    let mut posed = PosedPath {
        world,
        curve_count,
        lengths: Vec::with_capacity(curve_count),
        segments: None,
        closed: path.closed,
    };

    if path.constant_speed {
        let mut segments = Vec::with_capacity(curve_count);
        let mut total = 0.0f32;
        for i in 0..posed.curve_count {
            let table = posed.curve(i).segment_lengths();
            total += table[9];
            posed.lengths.push(total);
            segments.push(table);
        }
        posed.segments = Some(segments);
    } else {
        posed.lengths.extend_from_slice(&path.lengths);
    }
    Some(posed)
}

impl Skeleton {
    /// Samples the path attachment shown by `slot_index` at each absolute distance from its
    /// start, replacing the contents of `out`. Returns the path's total length, or `None`
    /// when the slot shows no path.
    ///
    /// Closed paths wrap distances around. Open paths extend past either end along the end
    /// tangent. Rotations are in radians, and zero unless `tangents` is set.
    pub fn compute_path_positions(
        &self,
        slot_index: usize,
        distances: &[f32],
        tangents: bool,
        out: &mut Vec<PathPosition>,
    ) -> Option<f32> {
        out.clear();
        let path = path_attachment(self, slot_index)?;
        let posed = pose_path(self, slot_index, path)?;

        out.reserve(distances.len());
        for &distance in distances {
            let mut position = posed.sample(distance);
            if !tangents {
                position.rotation = 0.0;
            }
            out.push(position);
        }
        Some(posed.total_length())
    }

    /// Total length of the path shown by the slot: measured in world space for constant speed
    /// paths, the setup lengths otherwise.
    pub fn path_length(&self, slot_index: usize) -> Option<f32> {
        let path = path_attachment(self, slot_index)?;
        if !path.constant_speed {
            return path.lengths.last().copied();
        }
        pose_path(self, slot_index, path).map(|posed| posed.total_length())
    }
}

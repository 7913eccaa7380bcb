//! Flat-buffer geometry helpers. Polygons are `[x0, y0, x1, y1, ...]`.

const EPSILON: f32 = 1.0e-5;

/// Below this, two segments are treated as parallel.
const PARALLEL_EPSILON: f32 = 1.0e-9;

/// Even-odd crossing test.
pub fn polygon_contains_point(polygon: &[f32], x: f32, y: f32) -> bool {
    let nn = polygon.len() & !1;
    if nn < 6 {
        return false;
    }

    let mut prev_index = nn - 2;
    let mut inside = false;
    let mut ii = 0usize;
    while ii < nn {
        let vertex_y = polygon[ii + 1];
        let prev_y = polygon[prev_index + 1];
        if (vertex_y < y && prev_y >= y) || (prev_y < y && vertex_y >= y) {
            let vertex_x = polygon[ii];
            if vertex_x + (y - vertex_y) / (prev_y - vertex_y) * (polygon[prev_index] - vertex_x) < x
            {
                inside = !inside;
            }
        }
        prev_index = ii;
        ii += 2;
    }
    inside
}

/// Returns true if any polygon edge intersects the segment `(x1, y1)-(x2, y2)`.
///
/// A zero-length segment and edges parallel to the segment never intersect.
pub fn polygon_intersects_segment(polygon: &[f32], x1: f32, y1: f32, x2: f32, y2: f32) -> bool {
    let nn = polygon.len() & !1;
    if nn < 4 {
        return false;
    }
    let width12 = x1 - x2;
    let height12 = y1 - y2;
    if width12 == 0.0 && height12 == 0.0 {
        return false;
    }

    let det1 = x1 * y2 - y1 * x2;
    let mut x3 = polygon[nn - 2];
    let mut y3 = polygon[nn - 1];
    let mut ii = 0usize;
    while ii < nn {
        let x4 = polygon[ii];
        let y4 = polygon[ii + 1];
        let det2 = x3 * y4 - y3 * x4;
        let width34 = x3 - x4;
        let height34 = y3 - y4;
        let det3 = width12 * height34 - height12 * width34;
        if det3.abs() > PARALLEL_EPSILON {
            let x = (det1 * width34 - width12 * det2) / det3;
            if within(x, x3, x4) && within(x, x1, x2) {
                let y = (det1 * height34 - height12 * det2) / det3;
                if within(y, y3, y4) && within(y, y1, y2) {
                    return true;
                }
            }
        }
        x3 = x4;
        y3 = y4;
        ii += 2;
    }
    false
}

fn within(v: f32, a: f32, b: f32) -> bool {
    (v >= a && v <= b) || (v >= b && v <= a)
}

/// Axis-aligned box, `min > max` when empty.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Aabb {
    pub min_x: f32,
    pub min_y: f32,
    pub max_x: f32,
    pub max_y: f32,
}

impl Default for Aabb {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl Aabb {
    pub const EMPTY: Aabb = Aabb {
        min_x: f32::INFINITY,
        min_y: f32::INFINITY,
        max_x: f32::NEG_INFINITY,
        max_y: f32::NEG_INFINITY,
    };

    pub fn include_vertices(&mut self, vertices: &[f32]) {
        for xy in vertices.chunks_exact(2) {
            self.min_x = self.min_x.min(xy[0]);
            self.min_y = self.min_y.min(xy[1]);
            self.max_x = self.max_x.max(xy[0]);
            self.max_y = self.max_y.max(xy[1]);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.min_x > self.max_x || self.min_y > self.max_y
    }

    pub fn width(&self) -> f32 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f32 {
        self.max_y - self.min_y
    }

    pub fn contains_point(&self, x: f32, y: f32) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }

    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min_x < other.max_x
            && self.max_x > other.min_x
            && self.min_y < other.max_y
            && self.max_y > other.min_y
    }

    /// Returns true if the box may be touched by the segment.
    pub fn intersects_segment(&self, x1: f32, y1: f32, x2: f32, y2: f32) -> bool {
        let Aabb {
            min_x,
            min_y,
            max_x,
            max_y,
        } = *self;
        if (x1 <= min_x && x2 <= min_x)
            || (y1 <= min_y && y2 <= min_y)
            || (x1 >= max_x && x2 >= max_x)
            || (y1 >= max_y && y2 >= max_y)
        {
            return false;
        }

        if self.contains_point(x1, y1) || self.contains_point(x2, y2) {
            return true;
        }
        let dx = x2 - x1;
        let dy = y2 - y1;
        if dx == 0.0 && dy == 0.0 {
            return false;
        }
        // Axis-aligned segments that got past the rejection above cross the box interior.
        if dx == 0.0 || dy == 0.0 {
            return true;
        }

        let m = dy / dx;
        let y = m * (min_x - x1) + y1;
        if y > min_y && y < max_y {
            return true;
        }
        let y = m * (max_x - x1) + y1;
        if y > min_y && y < max_y {
            return true;
        }
        let x = (min_y - y1) / m + x1;
        if x > min_x && x < max_x {
            return true;
        }
        let x = (max_y - y1) / m + x1;
        x > min_x && x < max_x
    }
}

/// The four local corners of a region attachment after its own offset, rotation and scale, in
/// vertex order BR, BL, UL, UR.
pub(crate) fn region_local_vertices(region: &crate::RegionAttachmentData) -> [[f32; 2]; 4] {
    let local_x = -region.width * 0.5 * region.scale_x;
    let local_y = -region.height * 0.5 * region.scale_y;
    let local_x2 = region.width * 0.5 * region.scale_x;
    let local_y2 = region.height * 0.5 * region.scale_y;

    let r = region.rotation.to_radians();
    let cos = r.cos();
    let sin = r.sin();
    let x = region.x;
    let y = region.y;

    let local_x_cos = local_x * cos + x;
    let local_x_sin = local_x * sin;
    let local_y_cos = local_y * cos + y;
    let local_y_sin = local_y * sin;
    let local_x2_cos = local_x2 * cos + x;
    let local_x2_sin = local_x2 * sin;
    let local_y2_cos = local_y2 * cos + y;
    let local_y2_sin = local_y2 * sin;

    let bl = [local_x_cos - local_y_sin, local_y_cos + local_x_sin];
    let ul = [local_x_cos - local_y2_sin, local_y2_cos + local_x_sin];
    let ur = [local_x2_cos - local_y2_sin, local_y2_cos + local_x2_sin];
    let br = [local_x2_cos - local_y_sin, local_y_cos + local_x2_sin];

    [br, bl, ul, ur]
}

/// A sampled point on a path: position and direction in radians.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct PathPosition {
    pub x: f32,
    pub y: f32,
    pub rotation: f32,
}

/// Cubic Bezier segment `(x1, y1) (cx1, cy1) (cx2, cy2) (x2, y2)`.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub(crate) struct Curve {
    pub x1: f32,
    pub y1: f32,
    pub cx1: f32,
    pub cy1: f32,
    pub cx2: f32,
    pub cy2: f32,
    pub x2: f32,
    pub y2: f32,
}

impl Curve {
    /// Reads a curve starting at `world[i]`: knot, out-handle, in-handle, knot.
    pub(crate) fn from_world(world: &[f32], i: usize) -> Self {
        let at = |o: usize| world.get(i + o).copied().unwrap_or(0.0);
        Self {
            x1: at(0),
            y1: at(1),
            cx1: at(2),
            cy1: at(3),
            cx2: at(4),
            cy2: at(5),
            x2: at(6),
            y2: at(7),
        }
    }

    /// Cumulative lengths of ten equal parameter steps; the last entry is the curve length.
    pub(crate) fn segment_lengths(&self) -> [f32; 10] {
        let Curve {
            x1,
            y1,
            cx1,
            cy1,
            cx2,
            cy2,
            x2,
            y2,
        } = *self;
        let tmpx = (x1 - cx1 * 2.0 + cx2) * 0.03;
        let tmpy = (y1 - cy1 * 2.0 + cy2) * 0.03;
        let dddfx = ((cx1 - cx2) * 3.0 - x1 + x2) * 0.006;
        let dddfy = ((cy1 - cy2) * 3.0 - y1 + y2) * 0.006;
        let mut ddfx = tmpx * 2.0 + dddfx;
        let mut ddfy = tmpy * 2.0 + dddfy;
        let mut dfx = (cx1 - x1) * 0.3 + tmpx + dddfx * 0.16666667;
        let mut dfy = (cy1 - y1) * 0.3 + tmpy + dddfy * 0.16666667;

        let mut segments = [0.0f32; 10];
        let mut curve_length = (dfx * dfx + dfy * dfy).sqrt();
        segments[0] = curve_length;
        for seg in segments.iter_mut().take(8).skip(1) {
            dfx += ddfx;
            dfy += ddfy;
            ddfx += dddfx;
            ddfy += dddfy;
            curve_length += (dfx * dfx + dfy * dfy).sqrt();
            *seg = curve_length;
        }
        dfx += ddfx;
        dfy += ddfy;
        curve_length += (dfx * dfx + dfy * dfy).sqrt();
        segments[8] = curve_length;
        dfx += ddfx + dddfx;
        dfy += ddfy + dddfy;
        curve_length += (dfx * dfx + dfy * dfy).sqrt();
        segments[9] = curve_length;
        segments
    }

    /// Point and tangent direction at parameter `p` in `[0, 1]`.
    pub(crate) fn position(&self, p: f32) -> PathPosition {
        let Curve {
            x1,
            y1,
            cx1,
            cy1,
            cx2,
            cy2,
            x2,
            y2,
        } = *self;
        if p < EPSILON || p.is_nan() {
            return PathPosition {
                x: x1,
                y: y1,
                rotation: (cy1 - y1).atan2(cx1 - x1),
            };
        }
        let tt = p * p;
        let ttt = tt * p;
        let u = 1.0 - p;
        let uu = u * u;
        let uuu = uu * u;
        let ut = u * p;
        let ut3 = ut * 3.0;
        let uut3 = u * ut3;
        let utt3 = ut3 * p;
        let x = x1 * uuu + cx1 * uut3 + cx2 * utt3 + x2 * ttt;
        let y = y1 * uuu + cy1 * uut3 + cy2 * utt3 + y2 * ttt;
        let rotation = if p < 0.001 {
            (cy1 - y1).atan2(cx1 - x1)
        } else {
            (y - (y1 * uu + cy1 * ut * 2.0 + cy2 * tt)).atan2(x - (x1 * uu + cx1 * ut * 2.0 + cx2 * tt))
        };
        PathPosition { x, y, rotation }
    }
}

/// Extrapolates `p` (negative) before the line through `world[i..i + 4]`.
pub(crate) fn position_before(p: f32, world: &[f32], i: usize) -> PathPosition {
    let x1 = world.get(i).copied().unwrap_or(0.0);
    let y1 = world.get(i + 1).copied().unwrap_or(0.0);
    let dx = world.get(i + 2).copied().unwrap_or(x1) - x1;
    let dy = world.get(i + 3).copied().unwrap_or(y1) - y1;
    let r = dy.atan2(dx);
    PathPosition {
        x: x1 + p * r.cos(),
        y: y1 + p * r.sin(),
        rotation: r,
    }
}

/// Extrapolates `p` past the end of the line through `world[i..i + 4]`.
pub(crate) fn position_after(p: f32, world: &[f32], i: usize) -> PathPosition {
    let x1 = world.get(i + 2).copied().unwrap_or(0.0);
    let y1 = world.get(i + 3).copied().unwrap_or(0.0);
    let dx = x1 - world.get(i).copied().unwrap_or(x1);
    let dy = y1 - world.get(i + 1).copied().unwrap_or(y1);
    let r = dy.atan2(dx);
    PathPosition {
        x: x1 + p * r.cos(),
        y: y1 + p * r.sin(),
        rotation: r,
    }
}

/// Finds the entry of the cumulative `lengths` containing `p`, returning its index and the
/// span `(start, end)` it covers.
pub(crate) fn locate(lengths: &[f32], p: f32) -> (usize, f32, f32) {
    let index = lengths
        .partition_point(|&length| p > length)
        .min(lengths.len().saturating_sub(1));
    let end = lengths.get(index).copied().unwrap_or(0.0);
    let start = if index == 0 { 0.0 } else { lengths[index - 1] };
    (index, start, end)
}

/// Normalized position of `p` within `[start, end]`.
pub(crate) fn span_fraction(p: f32, start: f32, end: f32) -> f32 {
    (p - start) / (end - start).max(EPSILON)
}

pub(crate) fn wrap_pi(mut radians: f32) -> f32 {
    const PI: f32 = std::f32::consts::PI;
    const PI2: f32 = 2.0 * std::f32::consts::PI;
    if radians > PI {
        radians -= PI2;
    } else if radians < -PI {
        radians += PI2;
    }
    radians
}

use super::Skeleton;
use crate::TransformConstraintData;
use crate::geometry::wrap_pi;

/// Column magnitudes at or below this are left unscaled.
const SCALE_EPSILON: f32 = 1.0e-5;

#[derive(Clone, Debug)]
pub struct TransformConstraint {
    data_index: usize,
    bones: Vec<usize>,
    target: usize,
    pub rotate_mix: f32,
    pub translate_mix: f32,
    pub scale_mix: f32,
    pub shear_mix: f32,
}

impl TransformConstraint {
    pub(crate) fn new(data_index: usize, data: &TransformConstraintData) -> Self {
        Self {
            data_index,
            bones: data.bones.clone(),
            target: data.target,
            rotate_mix: data.rotate_mix,
            translate_mix: data.translate_mix,
            scale_mix: data.scale_mix,
            shear_mix: data.shear_mix,
        }
    }

    pub fn data_index(&self) -> usize {
        self.data_index
    }

    pub fn bones(&self) -> &[usize] {
        &self.bones
    }

    pub fn target(&self) -> usize {
        self.target
    }

    pub(crate) fn set_to_setup_pose(&mut self, data: &TransformConstraintData) {
        self.rotate_mix = data.rotate_mix;
        self.translate_mix = data.translate_mix;
        self.scale_mix = data.scale_mix;
        self.shear_mix = data.shear_mix;
    }

    fn is_inert(&self) -> bool {
        self.rotate_mix == 0.0
            && self.translate_mix == 0.0
            && self.scale_mix == 0.0
            && self.shear_mix == 0.0
    }
}

#[derive(Copy, Clone, Debug)]
struct Mixes {
    rotate: f32,
    translate: f32,
    scale: f32,
    shear: f32,
}

#[derive(Copy, Clone, Debug)]
struct Offsets {
    rotation: f32,
    x: f32,
    y: f32,
    scale_x: f32,
    scale_y: f32,
    shear_y: f32,
}

/// Target world matrix, offset point and reflection-corrected angular offsets (radians).
struct TargetFrame {
    a: f32,
    b: f32,
    c: f32,
    d: f32,
    x: f32,
    y: f32,
    offset_rotation: f32,
    offset_shear_y: f32,
}

impl Skeleton {
    fn target_frame(&self, target: usize, offsets: &Offsets) -> TargetFrame {
        let t = &self.bones[target];
        let reflect = if t.a * t.d - t.b * t.c > 0.0 { 1.0 } else { -1.0 };
        let [x, y] = t.local_to_world(offsets.x, offsets.y);
        TargetFrame {
            a: t.a,
            b: t.b,
            c: t.c,
            d: t.d,
            x,
            y,
            offset_rotation: offsets.rotation.to_radians() * reflect,
            offset_shear_y: offsets.shear_y.to_radians() * reflect,
        }
    }

    /// Applies one transform constraint to the current pose. Returns true if any bone changed.
    ///
    /// Only the constrained bones are touched. `update_world_transform` also recomposes their
    /// descendants afterwards; callers applying a constraint by hand must do that themselves.
    pub fn apply_transform_constraint(&mut self, constraint_index: usize) -> bool {
        let Some(constraint) = self.transform_constraints.get(constraint_index) else {
            return false;
        };
        if constraint.is_inert() {
            return false;
        }
        let Some(data) = self.data().transform_constraints.get(constraint.data_index()) else {
            return false;
        };
        let (local, relative) = (data.local, data.relative);
        let offsets = Offsets {
            rotation: data.offset_rotation,
            x: data.offset_x,
            y: data.offset_y,
            scale_x: data.offset_scale_x,
            scale_y: data.offset_scale_y,
            shear_y: data.offset_shear_y,
        };
        let mixes = Mixes {
            rotate: constraint.rotate_mix,
            translate: constraint.translate_mix,
            scale: constraint.scale_mix,
            shear: constraint.shear_mix,
        };
        let target = constraint.target();
        if target >= self.bones.len() {
            return false;
        }
        let bones = constraint.bones().to_vec();

        match (local, relative) {
            (false, false) => self.apply_absolute_world(&bones, target, mixes, offsets),
            (false, true) => self.apply_relative_world(&bones, target, mixes, offsets),
            (true, false) => self.apply_absolute_local(&bones, target, mixes, offsets),
            (true, true) => self.apply_relative_local(&bones, target, mixes, offsets),
        }
    }

    fn apply_absolute_world(
        &mut self,
        bones: &[usize],
        target: usize,
        mixes: Mixes,
        offsets: Offsets,
    ) -> bool {
        let mut modified = false;
        for &bone_index in bones {
            if bone_index >= self.bones.len() {
                continue;
            }
            // The target can be one of `bones`.
            let TargetFrame {
                a: ta,
                b: tb,
                c: tc,
                d: td,
                x: tx,
                y: ty,
                offset_rotation,
                offset_shear_y,
            } = self.target_frame(target, &offsets);
            let bone = &mut self.bones[bone_index];
            let mut changed = false;

            if mixes.rotate != 0.0 {
                let (a, b, c, d) = (bone.a, bone.b, bone.c, bone.d);
                let r = wrap_pi(tc.atan2(ta) - c.atan2(a) + offset_rotation) * mixes.rotate;
                let cos = r.cos();
                let sin = r.sin();
                bone.a = cos * a - sin * c;
                bone.b = cos * b - sin * d;
                bone.c = sin * a + cos * c;
                bone.d = sin * b + cos * d;
                changed = true;
            }

            if mixes.translate != 0.0 {
                bone.world_x += (tx - bone.world_x) * mixes.translate;
                bone.world_y += (ty - bone.world_y) * mixes.translate;
                changed = true;
            }

            if mixes.scale > 0.0 {
                let s = (bone.a * bone.a + bone.c * bone.c).sqrt();
                if s > SCALE_EPSILON {
                    let ts = (ta * ta + tc * tc).sqrt();
                    let ns = (s + (ts - s + offsets.scale_x) * mixes.scale) / s;
                    bone.a *= ns;
                    bone.c *= ns;
                }
                let s = (bone.b * bone.b + bone.d * bone.d).sqrt();
                if s > SCALE_EPSILON {
                    let ts = (tb * tb + td * td).sqrt();
                    let ns = (s + (ts - s + offsets.scale_y) * mixes.scale) / s;
                    bone.b *= ns;
                    bone.d *= ns;
                }
                changed = true;
            }

            if mixes.shear > 0.0 {
                let (b, d) = (bone.b, bone.d);
                let by = d.atan2(b);
                let r = wrap_pi(td.atan2(tb) - tc.atan2(ta) - (by - bone.c.atan2(bone.a)));
                let r = by + (r + offset_shear_y) * mixes.shear;
                let s = (b * b + d * d).sqrt();
                bone.b = r.cos() * s;
                bone.d = r.sin() * s;
                changed = true;
            }

            if changed {
                bone.applied_valid = false;
                modified = true;
            }
        }
        modified
    }

    fn apply_relative_world(
        &mut self,
        bones: &[usize],
        target: usize,
        mixes: Mixes,
        offsets: Offsets,
    ) -> bool {
        let mut modified = false;
        for &bone_index in bones {
            if bone_index >= self.bones.len() {
                continue;
            }
            // The target can be one of `bones`.
            let TargetFrame {
                a: ta,
                b: tb,
                c: tc,
                d: td,
                x: tx,
                y: ty,
                offset_rotation,
                offset_shear_y,
            } = self.target_frame(target, &offsets);
            let bone = &mut self.bones[bone_index];
            let mut changed = false;

            if mixes.rotate != 0.0 {
                let (a, b, c, d) = (bone.a, bone.b, bone.c, bone.d);
                let r = wrap_pi(tc.atan2(ta) + offset_rotation) * mixes.rotate;
                let cos = r.cos();
                let sin = r.sin();
                bone.a = cos * a - sin * c;
                bone.b = cos * b - sin * d;
                bone.c = sin * a + cos * c;
                bone.d = sin * b + cos * d;
                changed = true;
            }

            if mixes.translate != 0.0 {
                bone.world_x += tx * mixes.translate;
                bone.world_y += ty * mixes.translate;
                changed = true;
            }

            if mixes.scale > 0.0 {
                let s = ((ta * ta + tc * tc).sqrt() - 1.0 + offsets.scale_x) * mixes.scale + 1.0;
                bone.a *= s;
                bone.c *= s;
                let s = ((tb * tb + td * td).sqrt() - 1.0 + offsets.scale_y) * mixes.scale + 1.0;
                bone.b *= s;
                bone.d *= s;
                changed = true;
            }

            if mixes.shear > 0.0 {
                let r = wrap_pi(td.atan2(tb) - tc.atan2(ta));
                let (b, d) = (bone.b, bone.d);
                let r = d.atan2(b)
                    + (r - std::f32::consts::FRAC_PI_2 + offset_shear_y) * mixes.shear;
                let s = (b * b + d * d).sqrt();
                bone.b = r.cos() * s;
                bone.d = r.sin() * s;
                changed = true;
            }

            if changed {
                bone.applied_valid = false;
                modified = true;
            }
        }
        modified
    }

    fn ensure_applied(&mut self, bone_index: usize) {
        if !self.bones[bone_index].applied_valid {
            self.update_applied_transform(bone_index);
        }
    }

    fn apply_absolute_local(
        &mut self,
        bones: &[usize],
        target: usize,
        mixes: Mixes,
        offsets: Offsets,
    ) -> bool {
        self.ensure_applied(target);

        let mut modified = false;
        for &bone_index in bones {
            if bone_index >= self.bones.len() {
                continue;
            }
            self.ensure_applied(bone_index);
            let t = self.bones[target].clone();
            let bone = &mut self.bones[bone_index];

            if mixes.rotate != 0.0 {
                let r = shortest_rotation(t.arotation - bone.arotation + offsets.rotation);
                bone.arotation += r * mixes.rotate;
            }
            if mixes.translate != 0.0 {
                bone.ax += (t.ax - bone.ax + offsets.x) * mixes.translate;
                bone.ay += (t.ay - bone.ay + offsets.y) * mixes.translate;
            }
            if mixes.scale != 0.0 {
                if bone.ascale_x.abs() > SCALE_EPSILON {
                    bone.ascale_x += (t.ascale_x - bone.ascale_x + offsets.scale_x) * mixes.scale;
                }
                if bone.ascale_y.abs() > SCALE_EPSILON {
                    bone.ascale_y += (t.ascale_y - bone.ascale_y + offsets.scale_y) * mixes.scale;
                }
            }
            if mixes.shear != 0.0 {
                let r = shortest_rotation(t.ashear_y - bone.ashear_y + offsets.shear_y);
                bone.ashear_y += r * mixes.shear;
            }

            self.update_bone_world_transform(bone_index);
            modified = true;
        }
        modified
    }

    fn apply_relative_local(
        &mut self,
        bones: &[usize],
        target: usize,
        mixes: Mixes,
        offsets: Offsets,
    ) -> bool {
        self.ensure_applied(target);

        let mut modified = false;
        for &bone_index in bones {
            if bone_index >= self.bones.len() {
                continue;
            }
            self.ensure_applied(bone_index);
            let t = self.bones[target].clone();
            let bone = &mut self.bones[bone_index];

            bone.arotation += (t.arotation + offsets.rotation) * mixes.rotate;
            bone.ax += (t.ax + offsets.x) * mixes.translate;
            bone.ay += (t.ay + offsets.y) * mixes.translate;
            bone.ascale_x *= (t.ascale_x - 1.0 + offsets.scale_x) * mixes.scale + 1.0;
            bone.ascale_y *= (t.ascale_y - 1.0 + offsets.scale_y) * mixes.scale + 1.0;
            bone.ashear_y += (t.ashear_y + offsets.shear_y) * mixes.shear;

            self.update_bone_world_transform(bone_index);
            modified = true;
        }
        modified
    }
}

/// Wraps degrees into `(-180, 180]`.
fn shortest_rotation(mut degrees: f32) -> f32 {
    degrees = degrees.rem_euclid(360.0);
    if degrees > 180.0 {
        degrees -= 360.0;
    }
    degrees
}

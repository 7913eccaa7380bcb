use crate::{BoneData, Inherit};

/// Runtime pose of a bone.
///
/// The sampler writes the local fields (`x` through `shear_y`). `update_world_transform`
/// copies them into the applied fields (`ax` through `ashear_y`) and composes the world
/// transform from those. World values are in skeleton space: the skeleton's scale is folded
/// in, its position is not.
#[derive(Clone, Debug)]
pub struct Bone {
    data_index: usize,
    parent: Option<usize>,

    pub inherit: Inherit,

    pub x: f32,
    pub y: f32,
    pub rotation: f32,
    pub scale_x: f32,
    pub scale_y: f32,
    pub shear_x: f32,
    pub shear_y: f32,

    pub ax: f32,
    pub ay: f32,
    pub arotation: f32,
    pub ascale_x: f32,
    pub ascale_y: f32,
    pub ashear_x: f32,
    pub ashear_y: f32,

    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
    pub world_x: f32,
    pub world_y: f32,

    pub(crate) applied_valid: bool,
}

impl Bone {
    pub(crate) fn new(data_index: usize, data: &BoneData) -> Self {
        let mut bone = Self {
            data_index,
            parent: data.parent,
            inherit: data.inherit,
            x: 0.0,
            y: 0.0,
            rotation: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            shear_x: 0.0,
            shear_y: 0.0,
            ax: 0.0,
            ay: 0.0,
            arotation: 0.0,
            ascale_x: 1.0,
            ascale_y: 1.0,
            ashear_x: 0.0,
            ashear_y: 0.0,
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 1.0,
            world_x: 0.0,
            world_y: 0.0,
            applied_valid: true,
        };
        bone.set_to_setup_pose(data);
        bone
    }

    pub fn data_index(&self) -> usize {
        self.data_index
    }

    pub fn parent_index(&self) -> Option<usize> {
        self.parent
    }

    /// False once a constraint has changed the world transform without updating the applied
    /// values. See `Skeleton::update_applied_transform`.
    pub fn applied_valid(&self) -> bool {
        self.applied_valid
    }

    pub(crate) fn set_to_setup_pose(&mut self, data: &BoneData) {
        self.inherit = data.inherit;
        self.x = data.x;
        self.y = data.y;
        self.rotation = data.rotation;
        self.scale_x = data.scale_x;
        self.scale_y = data.scale_y;
        self.shear_x = data.shear_x;
        self.shear_y = data.shear_y;
        self.copy_local_to_applied();
    }

    pub(crate) fn copy_local_to_applied(&mut self) {
        self.ax = self.x;
        self.ay = self.y;
        self.arotation = self.rotation;
        self.ascale_x = self.scale_x;
        self.ascale_y = self.scale_y;
        self.ashear_x = self.shear_x;
        self.ashear_y = self.shear_y;
        self.applied_valid = true;
    }

    /// Degrees.
    pub fn world_rotation_x(&self) -> f32 {
        self.c.atan2(self.a).to_degrees()
    }

    /// Degrees.
    pub fn world_rotation_y(&self) -> f32 {
        self.d.atan2(self.b).to_degrees()
    }

    pub fn world_scale_x(&self) -> f32 {
        (self.a * self.a + self.c * self.c).sqrt()
    }

    pub fn world_scale_y(&self) -> f32 {
        (self.b * self.b + self.d * self.d).sqrt()
    }

    /// Transforms a skeleton-space point into this bone's local space. A degenerate world
    /// transform maps every point to the origin.
    pub fn world_to_local(&self, world_x: f32, world_y: f32) -> [f32; 2] {
        let det = self.a * self.d - self.b * self.c;
        if det.abs() < 1.0e-12 {
            return [0.0, 0.0];
        }
        let inv_det = 1.0 / det;
        let x = world_x - self.world_x;
        let y = world_y - self.world_y;
        [
            x * self.d * inv_det - y * self.b * inv_det,
            y * self.a * inv_det - x * self.c * inv_det,
        ]
    }

    pub fn local_to_world(&self, local_x: f32, local_y: f32) -> [f32; 2] {
        [
            local_x * self.a + local_y * self.b + self.world_x,
            local_x * self.c + local_y * self.d + self.world_y,
        ]
    }

    /// Degrees in, degrees out.
    pub fn world_to_local_rotation(&self, world_rotation: f32) -> f32 {
        let r = world_rotation.to_radians();
        let sin = r.sin();
        let cos = r.cos();
        (self.a * sin - self.c * cos)
            .atan2(self.d * cos - self.b * sin)
            .to_degrees()
            + self.rotation
            - self.shear_x
    }

    /// Degrees in, degrees out.
    pub fn local_to_world_rotation(&self, local_rotation: f32) -> f32 {
        let r = (local_rotation - self.rotation + self.shear_x).to_radians();
        let sin = r.sin();
        let cos = r.cos();
        (cos * self.c + sin * self.d)
            .atan2(cos * self.a + sin * self.b)
            .to_degrees()
    }

    /// Rotates the world transform by `degrees`. Applied values become stale.
    pub fn rotate_world(&mut self, degrees: f32) {
        let r = degrees.to_radians();
        let cos = r.cos();
        let sin = r.sin();
        let (a, b, c, d) = (self.a, self.b, self.c, self.d);
        self.a = cos * a - sin * c;
        self.b = cos * b - sin * d;
        self.c = sin * a + cos * c;
        self.d = sin * b + cos * d;
        self.applied_valid = false;
    }

    #[cfg(feature = "glam")]
    pub fn world_affine(&self) -> glam::Affine2 {
        glam::Affine2::from_cols_array(&[
            self.a,
            self.c,
            self.b,
            self.d,
            self.world_x,
            self.world_y,
        ])
    }
}

#[derive(Copy, Clone, Debug)]
pub(crate) struct ParentTransform {
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
    pub world_x: f32,
    pub world_y: f32,
}

impl ParentTransform {
    pub(crate) fn of(bone: &Bone) -> Self {
        Self {
            a: bone.a,
            b: bone.b,
            c: bone.c,
            d: bone.d,
            world_x: bone.world_x,
            world_y: bone.world_y,
        }
    }

    /// Stand-in parent of root bones: the skeleton's scale, no translation.
    pub(crate) fn skeleton(scale_x: f32, scale_y: f32) -> Self {
        Self {
            a: scale_x,
            b: 0.0,
            c: 0.0,
            d: scale_y,
            world_x: 0.0,
            world_y: 0.0,
        }
    }
}

fn inverse_or_zero(v: f32) -> f32 {
    if v.abs() > 1.0e-12 { 1.0 / v } else { 0.0 }
}

fn local_linear(rotation: f32, scale_x: f32, scale_y: f32, shear_x: f32, shear_y: f32) -> [f32; 4] {
    let rotation_x = (rotation + shear_x).to_radians();
    let rotation_y = (rotation + 90.0 + shear_y).to_radians();
    [
        rotation_x.cos() * scale_x,
        rotation_y.cos() * scale_y,
        rotation_x.sin() * scale_x,
        rotation_y.sin() * scale_y,
    ]
}

pub(crate) fn update_world_transform_root(bone: &mut Bone, scale_x: f32, scale_y: f32) {
    let [la, lb, lc, ld] = local_linear(
        bone.arotation,
        bone.ascale_x,
        bone.ascale_y,
        bone.ashear_x,
        bone.ashear_y,
    );

    bone.a = la * scale_x;
    bone.b = lb * scale_x;
    bone.c = lc * scale_y;
    bone.d = ld * scale_y;
    bone.world_x = bone.ax * scale_x;
    bone.world_y = bone.ay * scale_y;
}

pub(crate) fn update_world_transform_child(
    bone: &mut Bone,
    skeleton_scale_x: f32,
    skeleton_scale_y: f32,
    parent: &ParentTransform,
) {
    let mut pa = parent.a;
    let mut pb = parent.b;
    let mut pc = parent.c;
    let mut pd = parent.d;

    bone.world_x = pa * bone.ax + pb * bone.ay + parent.world_x;
    bone.world_y = pc * bone.ax + pd * bone.ay + parent.world_y;

    match bone.inherit {
        Inherit::Normal => {
            let [la, lb, lc, ld] = local_linear(
                bone.arotation,
                bone.ascale_x,
                bone.ascale_y,
                bone.ashear_x,
                bone.ashear_y,
            );
            bone.a = pa * la + pb * lc;
            bone.b = pa * lb + pb * ld;
            bone.c = pc * la + pd * lc;
            bone.d = pc * lb + pd * ld;
            return;
        }
        Inherit::OnlyTranslation => {
            let [la, lb, lc, ld] = local_linear(
                bone.arotation,
                bone.ascale_x,
                bone.ascale_y,
                bone.ashear_x,
                bone.ashear_y,
            );
            bone.a = la;
            bone.b = lb;
            bone.c = lc;
            bone.d = ld;
        }
        Inherit::NoRotationOrReflection => {
            let sx = inverse_or_zero(skeleton_scale_x);
            let sy = inverse_or_zero(skeleton_scale_y);
            pa *= sx;
            pc *= sy;

            let mut s = pa * pa + pc * pc;
            let prx;
            if s > 1.0e-4 {
                s = (pa * pd * sy - pb * sx * pc).abs() / s;
                pb = pc * s;
                pd = pa * s;
                prx = pc.atan2(pa).to_degrees();
            } else {
                pa = 0.0;
                pc = 0.0;
                prx = 90.0 - pd.atan2(pb).to_degrees();
            }

            let [la, lb, lc, ld] = local_linear(
                bone.arotation - prx,
                bone.ascale_x,
                bone.ascale_y,
                bone.ashear_x,
                bone.ashear_y,
            );
            bone.a = pa * la - pb * lc;
            bone.b = pa * lb - pb * ld;
            bone.c = pc * la + pd * lc;
            bone.d = pc * lb + pd * ld;
        }
        Inherit::NoScale | Inherit::NoScaleOrReflection => {
            let rotation = bone.arotation.to_radians();
            let cos = rotation.cos();
            let sin = rotation.sin();

            let za = (pa * cos + pb * sin) * inverse_or_zero(skeleton_scale_x);
            let zc = (pc * cos + pd * sin) * inverse_or_zero(skeleton_scale_y);
            let mut s = (za * za + zc * zc).sqrt();
            if s > 1.0e-5 {
                s = 1.0 / s;
            }
            let za = za * s;
            let zc = zc * s;

            let mut s = (za * za + zc * zc).sqrt();
            if bone.inherit == Inherit::NoScale {
                let det = pa * pd - pb * pc;
                let flip = (det < 0.0) != ((skeleton_scale_x < 0.0) != (skeleton_scale_y < 0.0));
                if flip {
                    s = -s;
                }
            }

            let r = std::f32::consts::FRAC_PI_2 + zc.atan2(za);
            let zb = r.cos() * s;
            let zd = r.sin() * s;

            let [la, lb, lc, ld] =
                local_linear(0.0, bone.ascale_x, bone.ascale_y, bone.ashear_x, bone.ashear_y);
            bone.a = za * la + zb * lc;
            bone.b = za * lb + zb * ld;
            bone.c = zc * la + zd * lc;
            bone.d = zc * lb + zd * ld;
        }
    }

    bone.a *= skeleton_scale_x;
    bone.b *= skeleton_scale_x;
    bone.c *= skeleton_scale_y;
    bone.d *= skeleton_scale_y;
}

/// Derives applied (local) values from `bone`'s world transform relative to `parent`.
pub(crate) fn applied_from_world(
    bone: &mut Bone,
    parent: &ParentTransform,
    inherit: Inherit,
    skeleton_scale_x: f32,
    skeleton_scale_y: f32,
) {
    let pa = parent.a;
    let mut pb = parent.b;
    let pc = parent.c;
    let mut pd = parent.d;
    let det = pa * pd - pb * pc;
    let mut pid = inverse_or_zero(det);
    let mut ia = pd * pid;
    let mut ib = pb * pid;
    let mut ic = pc * pid;
    let mut id = pa * pid;

    let dx = bone.world_x - parent.world_x;
    let dy = bone.world_y - parent.world_y;
    let ax = dx * ia - dy * ib;
    let ay = dy * id - dx * ic;

    let (a, b, c, d) = (bone.a, bone.b, bone.c, bone.d);
    let (ra, rb, rc, rd) = if inherit == Inherit::OnlyTranslation {
        let sx = inverse_or_zero(skeleton_scale_x);
        let sy = inverse_or_zero(skeleton_scale_y);
        (a * sx, b * sx, c * sy, d * sy)
    } else {
        match inherit {
            Inherit::NoRotationOrReflection => {
                let s = det.abs() * inverse_or_zero(pa * pa + pc * pc);
                pb = -pc * skeleton_scale_x * s * inverse_or_zero(skeleton_scale_y);
                pd = pa * skeleton_scale_y * s * inverse_or_zero(skeleton_scale_x);
                pid = inverse_or_zero(pa * pd - pb * pc);
                ia = pd * pid;
                ib = pb * pid;
            }
            Inherit::NoScale | Inherit::NoScaleOrReflection => {
                let r = bone.arotation.to_radians();
                let cos = r.cos();
                let sin = r.sin();
                let mut pa = (pa * cos + pb * sin) * inverse_or_zero(skeleton_scale_x);
                let mut pc = (pc * cos + pd * sin) * inverse_or_zero(skeleton_scale_y);
                let mut s = (pa * pa + pc * pc).sqrt();
                if s > 1.0e-5 {
                    s = 1.0 / s;
                }
                pa *= s;
                pc *= s;
                s = (pa * pa + pc * pc).sqrt();
                if inherit == Inherit::NoScale {
                    let flip = (det < 0.0) != ((skeleton_scale_x < 0.0) != (skeleton_scale_y < 0.0));
                    if flip {
                        s = -s;
                    }
                }
                let r = std::f32::consts::FRAC_PI_2 + pc.atan2(pa);
                pb = r.cos() * s;
                pd = r.sin() * s;
                pid = inverse_or_zero(pa * pd - pb * pc);
                ia = pd * pid;
                ib = pb * pid;
                ic = pc * pid;
                id = pa * pid;
            }
            Inherit::Normal | Inherit::OnlyTranslation => {}
        }
        (
            ia * a - ib * c,
            ia * b - ib * d,
            id * c - ic * a,
            id * d - ic * b,
        )
    };

    let ascale_x = (ra * ra + rc * rc).sqrt();
    if ascale_x > 1.0e-4 {
        let det2 = ra * rd - rb * rc;
        bone.ascale_x = ascale_x;
        bone.ascale_y = det2 / ascale_x;
        bone.ashear_y = -(ra * rb + rc * rd).atan2(det2).to_degrees();
        bone.arotation = rc.atan2(ra).to_degrees();
    } else {
        bone.ascale_x = 0.0;
        bone.ascale_y = (rb * rb + rd * rd).sqrt();
        bone.ashear_y = 0.0;
        bone.arotation = 90.0 - rd.atan2(rb).to_degrees();
    }
    bone.ax = ax;
    bone.ay = ay;
    bone.ashear_x = 0.0;
    bone.applied_valid = true;
}

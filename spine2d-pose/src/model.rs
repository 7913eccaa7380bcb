use crate::ids::{AttachmentId, next_vertex_attachment_id};
use crate::Error;
use std::collections::HashMap;
use std::sync::Arc;

/// Setup pose of a bone.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct BoneData {
    pub name: String,
    /// Index of the parent in `SkeletonData::bones`. Must be smaller than this bone's index.
    pub parent: Option<usize>,
    pub length: f32,
    pub x: f32,
    pub y: f32,
    /// Degrees.
    pub rotation: f32,
    pub scale_x: f32,
    pub scale_y: f32,
    pub shear_x: f32,
    pub shear_y: f32,
    pub inherit: Inherit,
}

impl Default for BoneData {
    fn default() -> Self {
        Self {
            name: String::new(),
            parent: None,
            length: 0.0,
            x: 0.0,
            y: 0.0,
            rotation: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            shear_x: 0.0,
            shear_y: 0.0,
            inherit: Inherit::Normal,
        }
    }
}

impl BoneData {
    pub fn new(name: impl Into<String>, parent: Option<usize>) -> Self {
        Self {
            name: name.into(),
            parent,
            ..Self::default()
        }
    }
}

/// Determines how a bone inherits world transforms from its parent.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub enum Inherit {
    #[default]
    Normal,
    OnlyTranslation,
    NoRotationOrReflection,
    NoScale,
    NoScaleOrReflection,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct SlotData {
    pub name: String,
    pub bone: usize,
    /// Setup attachment name, resolved through the skins.
    pub attachment: Option<String>,
    pub color: [f32; 4],
    pub blend: BlendMode,
}

impl Default for SlotData {
    fn default() -> Self {
        Self {
            name: String::new(),
            bone: 0,
            attachment: None,
            color: [1.0, 1.0, 1.0, 1.0],
            blend: BlendMode::Normal,
        }
    }
}

impl SlotData {
    pub fn new(name: impl Into<String>, bone: usize) -> Self {
        Self {
            name: name.into(),
            bone,
            ..Self::default()
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub enum BlendMode {
    #[default]
    Normal,
    Additive,
    Multiply,
    Screen,
}

/// Setup values of a transform constraint.
///
/// `local` reads and writes applied (local) values instead of world transforms; `relative` adds
/// the target's values instead of blending toward them.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct TransformConstraintData {
    pub name: String,
    /// Application order; lower values are applied first.
    pub order: i32,
    pub bones: Vec<usize>,
    pub target: usize,

    pub rotate_mix: f32,
    pub translate_mix: f32,
    pub scale_mix: f32,
    pub shear_mix: f32,

    /// Degrees.
    pub offset_rotation: f32,
    pub offset_x: f32,
    pub offset_y: f32,
    pub offset_scale_x: f32,
    pub offset_scale_y: f32,
    /// Degrees.
    pub offset_shear_y: f32,

    pub local: bool,
    pub relative: bool,
}

impl Default for TransformConstraintData {
    fn default() -> Self {
        Self {
            name: String::new(),
            order: 0,
            bones: Vec::new(),
            target: 0,
            rotate_mix: 1.0,
            translate_mix: 1.0,
            scale_mix: 1.0,
            shear_mix: 1.0,
            offset_rotation: 0.0,
            offset_x: 0.0,
            offset_y: 0.0,
            offset_scale_x: 0.0,
            offset_scale_y: 0.0,
            offset_shear_y: 0.0,
            local: false,
            relative: false,
        }
    }
}

impl TransformConstraintData {
    pub fn new(name: impl Into<String>, bones: Vec<usize>, target: usize) -> Self {
        Self {
            name: name.into(),
            bones,
            target,
            ..Self::default()
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VertexWeight {
    pub bone: usize,
    pub x: f32,
    pub y: f32,
    pub weight: f32,
}

/// Local vertices of a vertex attachment.
///
/// Weighted vertices hold, per output vertex, the bones influencing it with a position in each
/// bone's coordinate system. Weights of one vertex are expected to sum to 1.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub enum MeshVertices {
    Unweighted(Vec<[f32; 2]>),
    Weighted(Vec<Vec<VertexWeight>>),
}

impl MeshVertices {
    pub fn vertex_count(&self) -> usize {
        match self {
            MeshVertices::Unweighted(v) => v.len(),
            MeshVertices::Weighted(v) => v.len(),
        }
    }

    pub fn is_weighted(&self) -> bool {
        matches!(self, MeshVertices::Weighted(_))
    }

    /// Number of values a deform for these vertices must hold: an absolute position per vertex
    /// when unweighted, an offset per bone influence when weighted.
    pub fn deform_len(&self) -> usize {
        match self {
            MeshVertices::Unweighted(v) => v.len() * 2,
            MeshVertices::Weighted(v) => v.iter().map(|w| w.len()).sum::<usize>() * 2,
        }
    }
}

/// Vertices shared by mesh, bounding box, path and clipping attachments.
///
/// Cloning allocates a new [`AttachmentId`], so deforms bound to the original do not apply to
/// the copy.
#[derive(Debug)]
pub struct VertexData {
    id: AttachmentId,
    pub vertices: MeshVertices,
}

impl VertexData {
    pub fn new(vertices: MeshVertices) -> Self {
        Self {
            id: next_vertex_attachment_id(),
            vertices,
        }
    }

    pub fn unweighted(vertices: Vec<[f32; 2]>) -> Self {
        Self::new(MeshVertices::Unweighted(vertices))
    }

    pub fn weighted(vertices: Vec<Vec<VertexWeight>>) -> Self {
        Self::new(MeshVertices::Weighted(vertices))
    }

    pub fn id(&self) -> AttachmentId {
        self.id
    }

    pub fn world_vertices_length(&self) -> usize {
        self.vertices.vertex_count() * 2
    }
}

impl Clone for VertexData {
    fn clone(&self) -> Self {
        Self::new(self.vertices.clone())
    }
}

#[derive(Clone, Debug)]
pub struct RegionAttachmentData {
    pub name: String,
    pub path: String,
    pub color: [f32; 4],
    pub x: f32,
    pub y: f32,
    pub rotation: f32,
    pub scale_x: f32,
    pub scale_y: f32,
    pub width: f32,
    pub height: f32,
    /// Texture coordinates in vertex order BR, BL, UL, UR.
    pub uvs: [[f32; 2]; 4],
}

impl RegionAttachmentData {
    pub fn new(name: impl Into<String>, width: f32, height: f32) -> Self {
        let name = name.into();
        Self {
            path: name.clone(),
            name,
            color: [1.0, 1.0, 1.0, 1.0],
            x: 0.0,
            y: 0.0,
            rotation: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            width,
            height,
            uvs: [[1.0, 1.0], [0.0, 1.0], [0.0, 0.0], [1.0, 0.0]],
        }
    }
}

#[derive(Clone, Debug)]
pub struct MeshAttachmentData {
    pub name: String,
    pub path: String,
    pub color: [f32; 4],
    pub vertex: VertexData,
    pub uvs: Vec<[f32; 2]>,
    pub triangles: Vec<u32>,
}

#[derive(Clone, Debug)]
pub struct BoundingBoxAttachmentData {
    pub name: String,
    pub vertex: VertexData,
}

/// A composite cubic Bezier path. Vertices are stored three per knot: in-handle, knot,
/// out-handle.
#[derive(Clone, Debug)]
pub struct PathAttachmentData {
    pub name: String,
    pub vertex: VertexData,
    /// Setup-pose lengths from the path start to the end of each curve.
    pub lengths: Vec<f32>,
    pub closed: bool,
    pub constant_speed: bool,
}

impl PathAttachmentData {
    /// Number of Bezier curves described by the vertices.
    pub fn curve_count(&self) -> usize {
        let knots = self.vertex.vertices.vertex_count() / 3;
        if self.closed {
            knots
        } else {
            knots.saturating_sub(1)
        }
    }
}

#[derive(Clone, Debug)]
pub struct PointAttachmentData {
    pub name: String,
    pub x: f32,
    pub y: f32,
    pub rotation: f32,
}

#[derive(Clone, Debug)]
pub struct ClippingAttachmentData {
    pub name: String,
    pub vertex: VertexData,
    pub end_slot: Option<usize>,
}

#[derive(Clone, Debug)]
pub enum Attachment {
    Region(RegionAttachmentData),
    Mesh(MeshAttachmentData),
    BoundingBox(BoundingBoxAttachmentData),
    Path(PathAttachmentData),
    Point(PointAttachmentData),
    Clipping(ClippingAttachmentData),
}

impl Attachment {
    pub fn name(&self) -> &str {
        match self {
            Attachment::Region(a) => a.name.as_str(),
            Attachment::Mesh(a) => a.name.as_str(),
            Attachment::BoundingBox(a) => a.name.as_str(),
            Attachment::Path(a) => a.name.as_str(),
            Attachment::Point(a) => a.name.as_str(),
            Attachment::Clipping(a) => a.name.as_str(),
        }
    }

    pub fn vertex_data(&self) -> Option<&VertexData> {
        match self {
            Attachment::Mesh(a) => Some(&a.vertex),
            Attachment::BoundingBox(a) => Some(&a.vertex),
            Attachment::Path(a) => Some(&a.vertex),
            Attachment::Clipping(a) => Some(&a.vertex),
            Attachment::Region(_) | Attachment::Point(_) => None,
        }
    }
}

/// Attachments keyed by `(slot index, attachment name)`.
///
/// The skin owns its attachments; slots hold shared handles to them, so a skin swap can tell
/// whether a slot still shows an attachment from a given skin by identity.
#[derive(Clone, Debug, Default)]
pub struct Skin {
    name: String,
    attachments: Vec<HashMap<String, Arc<Attachment>>>,
}

impl Skin {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attachments: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Adds an attachment, replacing any attachment under the same key.
    pub fn set_attachment(
        &mut self,
        slot_index: usize,
        name: impl Into<String>,
        attachment: Attachment,
    ) -> Result<Arc<Attachment>, Error> {
        let attachment = Arc::new(attachment);
        self.set_shared_attachment(slot_index, name, Arc::clone(&attachment))?;
        Ok(attachment)
    }

    /// Adds an attachment already owned by another skin.
    pub fn set_shared_attachment(
        &mut self,
        slot_index: usize,
        name: impl Into<String>,
        attachment: Arc<Attachment>,
    ) -> Result<(), Error> {
        let name = name.into();
        if name.is_empty() {
            return Err(Error::EmptyName { kind: "attachment" });
        }
        if self.attachments.len() <= slot_index {
            self.attachments.resize_with(slot_index + 1, HashMap::new);
        }
        self.attachments[slot_index].insert(name, attachment);
        Ok(())
    }

    /// Adds every attachment of `other` to this skin, sharing the instances.
    pub fn add_skin(&mut self, other: &Skin) {
        for (slot_index, name, attachment) in other.iter() {
            if self.attachments.len() <= slot_index {
                self.attachments.resize_with(slot_index + 1, HashMap::new);
            }
            self.attachments[slot_index].insert(name.to_string(), Arc::clone(attachment));
        }
    }

    pub fn attachment(&self, slot_index: usize, name: &str) -> Option<&Arc<Attachment>> {
        self.attachments
            .get(slot_index)
            .and_then(|slot_map| slot_map.get(name))
    }

    pub fn remove_attachment(&mut self, slot_index: usize, name: &str) -> Option<Arc<Attachment>> {
        self.attachments
            .get_mut(slot_index)
            .and_then(|slot_map| slot_map.remove(name))
    }

    pub fn names_for_slot(&self, slot_index: usize) -> impl Iterator<Item = &str> {
        self.attachments
            .get(slot_index)
            .into_iter()
            .flat_map(|slot_map| slot_map.keys().map(String::as_str))
    }

    pub fn attachments_for_slot(&self, slot_index: usize) -> impl Iterator<Item = &Arc<Attachment>> {
        self.attachments
            .get(slot_index)
            .into_iter()
            .flat_map(|slot_map| slot_map.values())
    }

    /// All entries as `(slot index, name, attachment)`, in ascending slot order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &str, &Arc<Attachment>)> {
        self.attachments
            .iter()
            .enumerate()
            .flat_map(|(slot_index, slot_map)| {
                slot_map
                    .iter()
                    .map(move |(name, attachment)| (slot_index, name.as_str(), attachment))
            })
    }

    pub fn len(&self) -> usize {
        self.attachments.iter().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.attachments.iter().all(HashMap::is_empty)
    }

    pub fn clear(&mut self) {
        self.attachments.clear();
    }

    pub(crate) fn slot_capacity(&self) -> usize {
        self.attachments.len()
    }
}

/// Immutable skeleton setup data, shared between skeleton instances through `Arc`.
///
/// Built by [`SkeletonDataBuilder`](crate::SkeletonDataBuilder), which validates bone
/// parentage and every index.
#[derive(Clone, Debug)]
pub struct SkeletonData {
    pub(crate) bones: Vec<BoneData>,
    pub(crate) slots: Vec<SlotData>,
    pub(crate) skins: Vec<Skin>,
    pub(crate) default_skin: Option<usize>,
    pub(crate) transform_constraints: Vec<TransformConstraintData>,
}

impl SkeletonData {
    pub fn bones(&self) -> &[BoneData] {
        &self.bones
    }

    pub fn slots(&self) -> &[SlotData] {
        &self.slots
    }

    pub fn skins(&self) -> &[Skin] {
        &self.skins
    }

    pub fn transform_constraints(&self) -> &[TransformConstraintData] {
        &self.transform_constraints
    }

    pub fn skin(&self, name: &str) -> Option<&Skin> {
        self.skins.iter().find(|s| s.name == name)
    }

    pub(crate) fn skin_index(&self, name: &str) -> Option<usize> {
        self.skins.iter().position(|s| s.name == name)
    }

    /// The skin named `default`, used as a fallback when resolving attachments.
    pub fn default_skin(&self) -> Option<&Skin> {
        self.default_skin.and_then(|i| self.skins.get(i))
    }

    pub fn find_bone(&self, name: &str) -> Option<usize> {
        self.bones.iter().position(|b| b.name == name)
    }

    pub fn find_slot(&self, name: &str) -> Option<usize> {
        self.slots.iter().position(|s| s.name == name)
    }

    pub fn find_transform_constraint(&self, name: &str) -> Option<usize> {
        self.transform_constraints
            .iter()
            .position(|c| c.name == name)
    }
}

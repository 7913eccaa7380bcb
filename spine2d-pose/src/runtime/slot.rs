use crate::{AttachmentId, Attachment, BlendMode, SlotData};
use std::sync::Arc;

/// Per-vertex override for the vertex attachment identified by `attachment`.
///
/// Unweighted attachments read `vertices` as absolute local positions. Weighted attachments
/// read them as offsets added to each bone influence.
#[derive(Clone, Debug, PartialEq)]
pub struct Deform {
    pub attachment: AttachmentId,
    pub vertices: Vec<f32>,
}

#[derive(Clone, Debug)]
pub struct Slot {
    data_index: usize,
    bone: usize,
    attachment: Option<Arc<Attachment>>,
    pub color: [f32; 4],
    pub blend: BlendMode,
    deform: Option<Deform>,
}

impl Slot {
    pub(crate) fn new(data_index: usize, data: &SlotData) -> Self {
        Self {
            data_index,
            bone: data.bone,
            attachment: None,
            color: data.color,
            blend: data.blend,
            deform: None,
        }
    }

    pub fn data_index(&self) -> usize {
        self.data_index
    }

    pub fn bone(&self) -> usize {
        self.bone
    }

    pub fn attachment(&self) -> Option<&Arc<Attachment>> {
        self.attachment.as_ref()
    }

    /// Replaces the attachment. A deform is dropped whenever the attachment instance changes.
    pub fn set_attachment(&mut self, attachment: Option<Arc<Attachment>>) {
        let same = match (&self.attachment, &attachment) {
            (Some(current), Some(next)) => Arc::ptr_eq(current, next),
            (None, None) => true,
            _ => false,
        };
        if same {
            return;
        }
        self.attachment = attachment;
        self.deform = None;
    }

    pub fn deform(&self) -> Option<&Deform> {
        self.deform.as_ref()
    }

    /// Deformed vertices, if the deform targets the attachment `id`.
    pub fn deform_for(&self, id: AttachmentId) -> Option<&[f32]> {
        self.deform
            .as_ref()
            .filter(|deform| deform.attachment == id)
            .map(|deform| deform.vertices.as_slice())
    }

    pub fn clear_deform(&mut self) {
        self.deform = None;
    }

    pub(crate) fn set_deform(&mut self, deform: Deform) {
        self.deform = Some(deform);
    }

    pub(crate) fn set_to_setup_pose(&mut self, data: &SlotData) {
        self.color = data.color;
        self.blend = data.blend;
        self.deform = None;
    }
}

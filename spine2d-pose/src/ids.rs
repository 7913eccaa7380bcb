use std::sync::atomic::{AtomicU32, Ordering};

// IDs are process-global, monotonically increasing counters. A slot's deform names the
// attachment it was produced for by id, so ids must never be reused within a process.
static NEXT_VERTEX_ATTACHMENT_ID: AtomicU32 = AtomicU32::new(0);

/// Identity of a vertex attachment, used to gate per-slot deforms.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct AttachmentId(u32);

impl AttachmentId {
    pub fn get(self) -> u32 {
        self.0
    }
}

pub(crate) fn next_vertex_attachment_id() -> AttachmentId {
    AttachmentId(NEXT_VERTEX_ATTACHMENT_ID.fetch_add(1, Ordering::Relaxed))
}

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("{kind} name cannot be empty")]
    EmptyName { kind: &'static str },

    #[error("duplicate {kind} name: {name}")]
    DuplicateName { kind: &'static str, name: String },

    #[error("unknown parent bone index {parent} for bone '{bone}'")]
    UnknownBoneParent { bone: String, parent: usize },

    #[error("parent bone index {parent} of bone '{bone}' (index {index}) must precede it")]
    BoneParentOrder {
        bone: String,
        index: usize,
        parent: usize,
    },

    #[error("cyclic bone parentage through bone '{bone}'")]
    CyclicBoneParent { bone: String },

    #[error("unknown bone index {bone} referenced by slot '{slot}'")]
    UnknownSlotBone { slot: String, bone: usize },

    #[error("unknown bone index {bone} referenced by transform constraint '{constraint}'")]
    UnknownConstraintBone { constraint: String, bone: usize },

    #[error("transform constraint '{constraint}' has no constrained bones")]
    EmptyConstraintBones { constraint: String },

    #[error("skin '{skin}' references slot index {slot_index}, but only {slot_count} slots exist")]
    InvalidSkinSlot {
        skin: String,
        slot_index: usize,
        slot_count: usize,
    },

    #[error("attachment '{attachment}' in skin '{skin}' is weighted to unknown bone index {bone}")]
    UnknownWeightBone {
        skin: String,
        attachment: String,
        bone: usize,
    },

    #[error("invalid path lengths for attachment '{attachment}': {message}")]
    InvalidPathLengths { attachment: String, message: String },

    #[error("unknown skin: {name}")]
    UnknownSkin { name: String },

    #[error("unknown slot: {name}")]
    UnknownSlot { name: String },

    #[error("unknown attachment '{attachment}' for slot '{slot}'")]
    UnknownAttachment { slot: String, attachment: String },

    #[error("slot index {index} is out of range ({count} slots)")]
    InvalidSlotIndex { index: usize, count: usize },

    #[error("vertex range {start}..{end} exceeds {length} local values")]
    InvalidVertexRange {
        start: usize,
        end: usize,
        length: usize,
    },

    #[error("slot '{slot}' has no vertex attachment")]
    NotVertexAttachment { slot: String },

    #[error("deform for slot '{slot}' has {actual} values, attachment expects {expected}")]
    DeformLengthMismatch {
        slot: String,
        expected: usize,
        actual: usize,
    },

    #[error("output buffer holds {actual} values, {required} required")]
    BufferTooSmall { required: usize, actual: usize },

    #[error("invalid value: {message}")]
    InvalidValue { message: String },
}

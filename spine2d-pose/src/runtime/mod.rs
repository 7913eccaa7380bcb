mod bone;
mod path;
mod skeleton;
mod skin;
mod skinning;
mod slot;
mod transform_constraint;

pub use bone::Bone;
pub use skeleton::Skeleton;
pub use slot::{Deform, Slot};
pub use transform_constraint::TransformConstraint;


#[cfg(test)]
mod transform_constraint_tests;



#[cfg(test)]
mod path_tests;

//! Change annotations
//!
//! Annotations are JSON files under `.changelog/`, one per change, naming the
//! change type, a description, and the module directories affected. The
//! release calculator attaches them to modules and derives version
//! increments from their types.

pub mod annotation;
pub mod change_type;

pub use annotation::{Annotation, AnnotationStore, annotation_ids, version_increment};
pub use change_type::{ChangeType, SemVerIncrement};

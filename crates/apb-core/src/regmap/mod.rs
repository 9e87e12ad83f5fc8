//! Slave register map primitives and access policies.

/// Register access-policy helpers.
pub mod access;
/// Fixed register map and index lookup.
pub mod map;

pub use access::{validate_read, validate_write};
pub use map::{
    lookup, RegisterDescriptor, RegisterKind, CONSTANT_INDEX, CONTROL_INDEX,
    MAPPED_REGISTER_COUNT, REGISTER_MAP, SCRATCH_INDEX, STATUS_INDEX, WRITE_ONLY_INDEX,
};

//! Register access-policy checks shared by the slave error logic and the register file.

use crate::{AccessViolation, RegisterKind, ViolationKind};

/// Validates a write against a register's access policy.
///
/// Unmapped indices (`kind == None`) pass: writes there are dropped silently
/// rather than flagged.
///
/// # Errors
///
/// Returns [`ViolationKind::WriteToReadOnly`] or
/// [`ViolationKind::WriteToExternal`] when `kind` is read-only.
pub const fn validate_write(kind: Option<RegisterKind>, index: u32) -> Result<(), AccessViolation> {
    match kind {
        Some(RegisterKind::ReadOnlyConstant) => Err(AccessViolation::new(
            ViolationKind::WriteToReadOnly,
            index,
        )),
        Some(RegisterKind::ReadOnlyExternal) => Err(AccessViolation::new(
            ViolationKind::WriteToExternal,
            index,
        )),
        Some(RegisterKind::ReadWrite | RegisterKind::WriteOnly) | None => Ok(()),
    }
}

/// Validates a read against a register's access policy.
///
/// Unmapped indices pass and read as zero.
///
/// # Errors
///
/// Returns [`ViolationKind::ReadFromWriteOnly`] when `kind` is write-only.
pub const fn validate_read(kind: Option<RegisterKind>, index: u32) -> Result<(), AccessViolation> {
    match kind {
        Some(RegisterKind::WriteOnly) => Err(AccessViolation::new(
            ViolationKind::ReadFromWriteOnly,
            index,
        )),
        Some(
            RegisterKind::ReadWrite
            | RegisterKind::ReadOnlyConstant
            | RegisterKind::ReadOnlyExternal,
        )
        | None => Ok(()),
    }
}

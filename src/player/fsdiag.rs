// Filesystem diagnostics: media-layer errors are decoded into a fixed,
// ordinal-indexed name table and printed. Diagnostic only; the caller
// carries on regardless.

use std::io;

const RESULT_NAMES: &[&str] = &[
    "OK",
    "DISK_ERR",
    "INT_ERR",
    "NOT_READY",
    "NO_FILE",
    "NO_PATH",
    "INVALID_NAME",
    "DENIED",
    "EXIST",
    "INVALID_OBJECT",
    "WRITE_PROTECTED",
    "INVALID_DRIVE",
    "NOT_ENABLED",
    "NO_FILE_SYSTEM",
    "MKFS_ABORTED",
    "TIMEOUT",
    "LOCKED",
    "NOT_ENOUGH_CORE",
    "TOO_MANY_OPEN_FILES",
];

/// Map a hosted I/O error onto the media layer's numeric result codes.
pub fn result_code(err: &io::Error) -> u32 {
    match err.kind() {
        io::ErrorKind::NotFound => 4,          // NO_FILE
        io::ErrorKind::PermissionDenied => 7,  // DENIED
        io::ErrorKind::AlreadyExists => 8,     // EXIST
        io::ErrorKind::InvalidInput => 6,      // INVALID_NAME
        io::ErrorKind::TimedOut => 15,         // TIMEOUT
        io::ErrorKind::Unsupported => 12,      // NOT_ENABLED
        _ => 1,                                // DISK_ERR
    }
}

pub fn result_name(code: u32) -> &'static str {
    RESULT_NAMES.get(code as usize).copied().unwrap_or("DISK_ERR")
}

pub fn report(operation: &str, err: &io::Error) {
    let code = result_code(err);
    eprintln!("{operation}: rc={code} FR_{}", result_name(code));
}

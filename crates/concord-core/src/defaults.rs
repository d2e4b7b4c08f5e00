//! Centralized default constants for concord.
//!
//! Crates reference these instead of defining their own magic numbers.

// =============================================================================
// UPLOADS
// =============================================================================

/// The only accepted upload extension (compared case-insensitively).
pub const ACCEPTED_EXTENSION: &str = "docx";

/// Maximum upload size in bytes (10 MiB).
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Multipart field carrying the uploaded file.
pub const UPLOAD_FIELD: &str = "file";

/// Maximum inflated size of any single XML part inside an upload (64 MiB).
/// Bounds decompression independently of the compressed upload size.
pub const MAX_DOCX_PART_BYTES: u64 = 64 * 1024 * 1024;

// =============================================================================
// PARAGRAPHS
// =============================================================================

/// Prefix of the externally visible paragraph anchor (`p-<index>`).
pub const PARAGRAPH_ID_PREFIX: &str = "p-";

// =============================================================================
// ANALYSIS ENGINE
// =============================================================================

/// Default Analysis Engine base URL.
pub const ANALYSIS_ENGINE_URL: &str = "http://localhost:8000";

/// Timeout for Analysis Engine calls (seconds). Pair analysis can take minutes.
pub const ANALYSIS_ENGINE_TIMEOUT_SECS: u64 = 300;

// =============================================================================
// SERVER
// =============================================================================

/// Default bind host.
pub const HOST: &str = "0.0.0.0";

/// Default bind port.
pub const PORT: u16 = 4000;

/// Default allowed CORS origin (the web client in development).
pub const CORS_ORIGIN: &str = "http://localhost:3000";

/// Default database URL.
pub const DATABASE_URL: &str = "postgres://localhost/concord";

/*!
 * Serialization Utilities
 *
 * - Bincode for the versioned channel frame (compact, fixed layout)
 * - JSON for each argument value (self-describing, tolerant of width changes)
 */

pub mod bincode;
pub mod finite;
pub mod json;

pub use self::bincode::{
    from_slice_with_header, to_vec_with_header, BincodeError, BincodeResult,
    BINCODE_FORMAT_VERSION,
};
pub use self::finite::{ensure_finite, FiniteError};
pub use self::json::{JsonError, JsonResult};

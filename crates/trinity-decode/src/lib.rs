//! Decode packed animation data from Trinity model archives.
//!
//! This crate provides pure synchronous decoding functions for unpacking
//! data from the reverse-engineered Trinity format. All functions are
//! designed to be called from any threading context - the library user
//! controls parallelism.
//!
//! # Design principles
//!
//! - **Synchronous**: No async, no threading primitives, no I/O
//! - **Total by default**: every packed input decodes to *some* value;
//!   strict validation is a separate opt-in entry point
//!
//! # Key functions
//!
//! - [`unpack_rotation`]: Decode a 48-bit packed joint rotation
//! - [`unpack_rotation_checked`]: Same, but reject over-unit encodings
//! - [`split_rotation_fields`]: Split a packed value into its bit fields

mod error;

pub mod rotations;

pub use error::{DecodeError, DecodeResult};
pub use rotations::{
    NORM_TOLERANCE, expand_component, pack_words, reconstruct_components, split_rotation_fields,
    unpack_rotation, unpack_rotation_checked,
};

/// Bit fields split out of a 48-bit packed rotation.
///
/// The packed layout drops one of the four quaternion components and
/// stores the remaining three quantized, plus enough metadata to put the
/// dropped one back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RotationFields {
    /// The three stored components, each quantized to 15 bits.
    pub quantized: [u16; 3],
    /// Slot (0-3) where the dropped component is reinserted.
    pub missing_index: usize,
    /// Whether the decoded quaternion is negated as a whole.
    pub negate: bool,
}

//! Packed rotation unpacking.
//!
//! Joint rotations are stored as 48-bit packed quaternions in a
//! smallest-three layout: three components quantized to 15 bits each, a
//! 2-bit index naming the dropped component, and a sign bit. The dropped
//! component is recovered from the unit-norm constraint.
//!
//! # Format
//!
//! The 48-bit value is carried as three 16-bit words and reassembled as
//! `(z << 32) | (y << 16) | x`. Bit layout, LSB first:
//!
//! - Bits 0-1: slot of the dropped component
//! - Bit 2: sign flag (negate the whole quaternion)
//! - Bits 3-17, 18-32, 33-47: the three stored components
//!
//! Stored components map linearly from `[0, 0x7FFF]` onto `[-PI/4, PI/4]`.

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

use glam::DQuat;
use tracing::trace;

use crate::RotationFields;
use crate::error::{DecodeError, DecodeResult};

/// Total width of the packed value.
const PACK_BITS: u32 = 48;
/// Width of one stored component.
const COMPONENT_BITS: u32 = 15;
/// Mask isolating one stored component.
const COMPONENT_MASK: u64 = (1 << COMPONENT_BITS) - 1;
/// Largest quantized component value.
pub const COMPONENT_MAX: u16 = 0x7FFF;
/// Bit offsets of the three stored components.
const COMPONENT_SHIFTS: [u32; 3] = [3, 18, 33];
/// Mask isolating the dropped-component slot (bits 0-1).
const MISSING_INDEX_MASK: u64 = 0b011;
/// Bit set when the quaternion was negated at pack time.
const SIGN_MASK: u64 = 0b100;

/// Scale applied when expanding a stored component. The divisor is the
/// largest quantized value, 0x7FFF, which makes both range endpoints exact.
const EXPAND_SCALE: f64 = FRAC_PI_2 / COMPONENT_MAX as f64;

// The flag bits and the three components exactly fill the packed value.
const _: () = assert!(COMPONENT_SHIFTS[2] + COMPONENT_BITS == PACK_BITS);

/// How far past unit length the stored components may land before
/// [`unpack_rotation_checked`] rejects the encoding. Quantization alone
/// stays well inside this.
pub const NORM_TOLERANCE: f64 = 1e-6;

/// Reassemble the 48-bit packed value from its three 16-bit words.
#[must_use]
pub fn pack_words(x: u16, y: u16, z: u16) -> u64 {
    (u64::from(z) << 32) | (u64::from(y) << 16) | u64::from(x)
}

/// Split a packed value into its bit fields.
#[must_use]
pub fn split_rotation_fields(pack: u64) -> RotationFields {
    let quantized = COMPONENT_SHIFTS.map(|shift| ((pack >> shift) & COMPONENT_MASK) as u16);
    RotationFields {
        quantized,
        missing_index: (pack & MISSING_INDEX_MASK) as usize,
        negate: (pack & SIGN_MASK) != 0,
    }
}

/// Expand a stored component onto its real-valued range.
///
/// Maps the integer domain `[0, 0x7FFF]` linearly onto `[-PI/4, PI/4]`.
#[must_use]
pub fn expand_component(quantized: u16) -> f64 {
    f64::from(quantized) * EXPAND_SCALE - FRAC_PI_4
}

/// Rebuild the four quaternion components from the packed fields.
///
/// The dropped component is recovered as `sqrt(max(1 - sum of squares, 0))`.
/// The clamp absorbs quantization overshoot at the domain boundary, so the
/// recovered value is never NaN and never negative. The returned array is in
/// (x, y, z, w) order with the recovered component at `missing_index` and
/// the stored expansions filling the other slots in order. The sign flag is
/// not applied here.
#[must_use]
pub fn reconstruct_components(fields: &RotationFields) -> [f64; 4] {
    let [a, b, c] = fields.quantized.map(expand_component);
    let recovered = (1.0 - (a * a + b * b + c * c)).max(0.0).sqrt();
    match fields.missing_index {
        0 => [recovered, a, b, c],
        1 => [a, recovered, b, c],
        2 => [a, b, recovered, c],
        _ => [a, b, c, recovered],
    }
}

/// Decode a 48-bit packed rotation into a quaternion.
///
/// Total over the full 48-bit input space: every bit pattern decodes to
/// *some* quaternion, and the result is only unit length when the encoding
/// itself was. Use [`unpack_rotation_checked`] to reject encodings that
/// cannot come from a real rotation.
#[must_use]
pub fn unpack_rotation(x: u16, y: u16, z: u16) -> DQuat {
    let pack = pack_words(x, y, z);
    let fields = split_rotation_fields(pack);
    let [qx, qy, qz, qw] = reconstruct_components(&fields);
    trace!(pack, ?fields, qx, qy, qz, qw, "unpacked rotation");

    let rotation = DQuat::from_xyzw(qx, qy, qz, qw);
    if fields.negate { -rotation } else { rotation }
}

/// Decode a 48-bit packed rotation, rejecting malformed encodings.
///
/// [`unpack_rotation`] silently clamps when the stored components already
/// exceed unit length; this entry point rejects such inputs once the excess
/// passes [`NORM_TOLERANCE`]. Within the tolerance the result is identical
/// to [`unpack_rotation`].
pub fn unpack_rotation_checked(x: u16, y: u16, z: u16) -> DecodeResult<DQuat> {
    let fields = split_rotation_fields(pack_words(x, y, z));
    let [a, b, c] = fields.quantized.map(expand_component);
    let sum_squares = a * a + b * b + c * c;
    if sum_squares > 1.0 + NORM_TOLERANCE {
        return Err(DecodeError::MalformedRotation { sum_squares });
    }
    Ok(unpack_rotation(x, y, z))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Words captured from a real animation track, decoded with the
    /// original importer to pin the expected output.
    const REFERENCE_WORDS: (u16, u16, u16) = (42, 61442, 62196);

    /// Words putting all three stored components at 0x7FFF, so their
    /// squared sum (~1.85) overshoots unit length.
    const OVER_UNIT_WORDS: (u16, u16, u16) = (65528, 65535, 65535);

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-12,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn words_reassemble_in_place() {
        let (x, y, z) = REFERENCE_WORDS;
        assert_eq!(pack_words(x, y, z), 0xF2F4_F002_002A);
    }

    #[test]
    fn fields_split_at_documented_offsets() {
        let (x, y, z) = REFERENCE_WORDS;
        let fields = split_rotation_fields(pack_words(x, y, z));
        assert_eq!(fields.quantized, [16389, 15360, 31098]);
        assert_eq!(fields.missing_index, 2);
        assert!(!fields.negate);
    }

    #[test]
    fn expansion_endpoints_are_exact() {
        assert_eq!(expand_component(0), -FRAC_PI_4);
        assert_eq!(expand_component(COMPONENT_MAX), FRAC_PI_4);
    }

    #[test]
    fn reference_rotation_unpacks() {
        let (x, y, z) = REFERENCE_WORDS;
        let q = unpack_rotation(x, y, z);
        assert_close(q.w, 0.705_389_036_244_499_2);
        assert_close(q.x, 0.000_263_660_994_212_822_08);
        assert_close(q.y, -0.049_064_914_104_879_12);
        assert_close(q.z, 0.707_120_125_744_429_3);
        assert!((q.length_squared() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn sign_bit_negates_componentwise() {
        // Identical stored fields, bit 2 clear vs set.
        let plus = unpack_rotation(40, 61442, 62196);
        let minus = unpack_rotation(44, 61442, 62196);
        assert_eq!(minus.x, -plus.x);
        assert_eq!(minus.y, -plus.y);
        assert_eq!(minus.z, -plus.z);
        assert_eq!(minus.w, -plus.w);
    }

    #[test]
    fn missing_index_selects_insertion_slot() {
        // Same stored fields with the low two bits swept over 0-3; the
        // recovered component must move across the pre-reorder tuple while
        // the stored expansions keep their relative order.
        for index in 0..4_usize {
            let x = 40 + u16::try_from(index).unwrap();
            let fields = split_rotation_fields(pack_words(x, 61442, 62196));
            assert_eq!(fields.missing_index, index);

            let components = reconstruct_components(&fields);
            assert_close(components[index], 0.707_120_125_744_429_3);

            let stored: Vec<f64> = components
                .iter()
                .enumerate()
                .filter(|&(slot, _)| slot != index)
                .map(|(_, &value)| value)
                .collect();
            assert_eq!(stored, fields.quantized.map(expand_component).to_vec());
        }
    }

    #[test]
    fn over_unit_sum_clamps_to_zero() {
        let (x, y, z) = OVER_UNIT_WORDS;
        let fields = split_rotation_fields(pack_words(x, y, z));
        assert_eq!(fields.quantized, [COMPONENT_MAX; 3]);
        assert_eq!(fields.missing_index, 0);

        let q = unpack_rotation(x, y, z);
        assert_eq!(q.x, 0.0);
        assert_close(q.w, FRAC_PI_4);
    }

    #[test]
    fn checked_matches_total_on_valid_input() {
        let (x, y, z) = REFERENCE_WORDS;
        let strict = unpack_rotation_checked(x, y, z).unwrap();
        assert_eq!(strict, unpack_rotation(x, y, z));
    }

    #[test]
    fn checked_rejects_over_unit_encoding() {
        let (x, y, z) = OVER_UNIT_WORDS;
        let DecodeError::MalformedRotation { sum_squares } =
            unpack_rotation_checked(x, y, z).unwrap_err();
        assert!(sum_squares > 1.8);
    }

    proptest! {
        #[test]
        fn any_words_decode_finite(x: u16, y: u16, z: u16) {
            let q = unpack_rotation(x, y, z);
            prop_assert!(q.x.is_finite());
            prop_assert!(q.y.is_finite());
            prop_assert!(q.z.is_finite());
            prop_assert!(q.w.is_finite());
        }

        #[test]
        fn recovered_component_is_never_negative(x: u16, y: u16, z: u16) {
            let fields = split_rotation_fields(pack_words(x, y, z));
            let components = reconstruct_components(&fields);
            prop_assert!(components[fields.missing_index] >= 0.0);
        }

        #[test]
        fn in_range_encodings_stay_unit_length(
            a in 0..=COMPONENT_MAX,
            b in 0..=COMPONENT_MAX,
            c in 0..=COMPONENT_MAX,
            missing_index in 0..4_usize,
        ) {
            let fields = RotationFields { quantized: [a, b, c], missing_index, negate: false };
            let [va, vb, vc] = fields.quantized.map(expand_component);
            prop_assume!(va * va + vb * vb + vc * vc <= 1.0);

            let norm: f64 = reconstruct_components(&fields).iter().map(|v| v * v).sum();
            prop_assert!((norm - 1.0).abs() < 1e-9);
        }
    }
}

//! Freight-metric derivations: volumetric weight, chargeable weight, and
//! concentrated-load pressure.
//!
//! All inputs arrive in the form's native units (inches, kilograms) and are
//! normalized here with explicit conversion constants; callers never mix
//! unit systems inside a formula.

/// IATA volumetric divisor for centimeter-based dimensions (cm³ per kg).
pub const VOLUMETRIC_DIVISOR_CM: f64 = 6000.0;
/// Inches to centimeters.
pub const CM_PER_INCH: f64 = 2.54;
/// Kilograms to pounds.
pub const LB_PER_KG: f64 = 2.20462;

/// Volumetric weight in kg for `piece_count` identical pieces, dimensions in
/// inches. Returns `None` when any dimension is non-finite or non-positive,
/// or when there are no pieces; the evaluator reports that as a finding.
pub fn volumetric_weight_kg(
    length_in: f64,
    width_in: f64,
    height_in: f64,
    piece_count: u32,
) -> Option<f64> {
    if !(length_in.is_finite() && width_in.is_finite() && height_in.is_finite()) {
        return None;
    }
    if length_in <= 0.0 || width_in <= 0.0 || height_in <= 0.0 || piece_count == 0 {
        return None;
    }

    let volume_cm3 =
        (length_in * CM_PER_INCH) * (width_in * CM_PER_INCH) * (height_in * CM_PER_INCH);
    Some(volume_cm3 / VOLUMETRIC_DIVISOR_CM * piece_count as f64)
}

/// Chargeable weight: the greater of declared and volumetric weight, never
/// negative. Zero only in the degenerate case where both inputs are zero,
/// which the evaluator raises as its own finding.
pub fn chargeable_weight_kg(declared_kg: f64, volumetric_kg: f64) -> f64 {
    declared_kg.max(volumetric_kg).max(0.0)
}

/// Concentrated-load pressure in PSI: piece weight over its base footprint.
/// Returns `None` when the footprint is unusable (zero, negative, or
/// non-finite area) so a positive weight on a missing base surfaces as a
/// finding instead of a division fault.
pub fn concentrated_load_psi(weight_kg: f64, length_in: f64, width_in: f64) -> Option<f64> {
    if !(weight_kg.is_finite() && length_in.is_finite() && width_in.is_finite()) {
        return None;
    }
    let area_in2 = length_in * width_in;
    if area_in2 <= 0.0 {
        return None;
    }
    Some(weight_kg * LB_PER_KG / area_in2)
}

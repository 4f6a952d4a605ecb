//! # Units
//!
//! Template geometry is stored in millimeters. The editor surfaces work in
//! CSS pixels at a fixed 96 DPI and PDF content streams work in points at
//! 72 per inch; both conversions live here so nothing else has to know the
//! constants.

const MM_PER_INCH: f64 = 25.4;
const PX_PER_INCH: f64 = 96.0;
const PT_PER_INCH: f64 = 72.0;

/// Millimeters to editor pixels (96 DPI).
pub fn mm_to_px(mm: f64) -> f64 {
    mm * PX_PER_INCH / MM_PER_INCH
}

/// Editor pixels (96 DPI) to millimeters.
pub fn px_to_mm(px: f64) -> f64 {
    px * MM_PER_INCH / PX_PER_INCH
}

/// Millimeters to PDF points.
pub fn mm_to_pt(mm: f64) -> f64 {
    mm * PT_PER_INCH / MM_PER_INCH
}

/// PDF points to millimeters.
pub fn pt_to_mm(pt: f64) -> f64 {
    pt * MM_PER_INCH / PT_PER_INCH
}

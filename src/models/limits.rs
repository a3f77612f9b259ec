//! Static parameter surface of the device: defaults and per-mode bounds.
//!
//! The session machine itself never validates ranges; callers clamp with
//! these helpers before issuing a start or a live adjustment.

use super::program::TreatmentMode;

pub const DEFAULT_DURATION_MIN: u32 = 15;
pub const DEFAULT_COLD_TEMP_C: i32 = 10;
pub const DEFAULT_HOT_TEMP_C: i32 = 40;
pub const DEFAULT_COMPRESSION_LEVEL: u8 = 2;

pub const MIN_DURATION_MIN: u32 = 5;
pub const DURATION_STEP_MIN: u32 = 5;
pub const MAX_COMPRESSION_LEVEL: u8 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TempRange {
    pub min: i32,
    pub max: i32,
}

/// Valid target temperatures for a treatment mode. Compression-only has no
/// thermal circuit and therefore no range.
pub fn temp_range(mode: TreatmentMode) -> Option<TempRange> {
    match mode {
        TreatmentMode::Cold => Some(TempRange { min: 5, max: 15 }),
        TreatmentMode::Hot => Some(TempRange { min: 35, max: 42 }),
        TreatmentMode::CompressionOnly => None,
    }
}

pub fn max_duration_min(mode: TreatmentMode) -> u32 {
    match mode {
        TreatmentMode::Cold => 20,
        TreatmentMode::Hot => 30,
        TreatmentMode::CompressionOnly => 60,
    }
}

pub fn clamp_temperature(mode: TreatmentMode, value: i32) -> Option<i32> {
    temp_range(mode).map(|range| value.clamp(range.min, range.max))
}

pub fn clamp_duration(mode: TreatmentMode, minutes: u32) -> u32 {
    minutes.clamp(MIN_DURATION_MIN, max_duration_min(mode))
}

pub fn clamp_compression_level(level: u8) -> u8 {
    level.min(MAX_COMPRESSION_LEVEL)
}

/// Label shown next to the compression level selector.
pub fn compression_level_label(level: u8) -> &'static str {
    match level {
        0 => "None",
        1 => "Low",
        2 => "Mid",
        3 => "High",
        4 => "Max",
        _ => "",
    }
}

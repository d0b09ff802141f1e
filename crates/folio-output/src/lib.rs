#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/folio/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod colors;
pub mod export;
pub mod format;

pub use colors::{
    ColorAssigner, ColorConfig, ColorToken, Rgb, blend, color_distance, company_color,
    contrast_text, expand_palette, hex_to_rgb, rgb_to_hex,
};
pub use export::{
    ExportError, ExportFormat, Exporter, GridRecord, ObservationRecord, grid_frame, grid_records,
    observation_records, observations_frame,
};
pub use format::{
    ChangeClass, change_class, format_change, format_count, format_large_number, format_number,
    format_price,
};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}

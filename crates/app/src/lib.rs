pub mod app_loop;
pub mod save_file;
pub mod track;

pub const APP_NAME: &str = "Geocoin";

/// Format a snapshot hash as `0x` followed by exactly 16 lowercase hex digits.
pub fn format_snapshot_hash(hash: u64) -> String {
    format!("0x{hash:016x}")
}

/// Coordinates as shown in the HUD, to roughly a metre.
pub fn format_position(lat: f64, lng: f64) -> String {
    format!("{lat:.5}, {lng:.5}")
}

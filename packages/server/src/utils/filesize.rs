/// Renders a byte count as the human-readable size stored in the catalog.
///
/// Sizes are always expressed in kilobytes with two decimal places, matching
/// what the dashboard displays (e.g. 1200 bytes is "1.17 KB").
pub fn format_file_size(bytes: u64) -> String {
    format!("{:.2} KB", bytes as f64 / 1024.0)
}

pub const SPREADSHEET_EXTENSION: &str = "xlsx";
pub const JSON_EXTENSION: &str = "json";

/// Download name for a materialized artifact: `{prefix}-{epoch_millis}.{ext}`.
pub fn artifact_filename(prefix: &str, epoch_millis: u64, extension: &str) -> String {
    format!("{prefix}-{epoch_millis}.{extension}")
}

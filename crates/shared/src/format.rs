//! Display formatting helpers shared by the document list, upload widget,
//! and control browser.

use chrono::{DateTime, Utc};

const SIZE_UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

/// Format a byte count for display.
///
/// Zero is always exactly `"0 Bytes"`. Any other value picks the largest
/// unit in which the value is >= 1 (capped at GB) and renders at most two
/// decimal places with trailing zeros trimmed, so 1024 is "1 KB" and
/// 1536 is "1.5 KB".
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }
    let mut unit = 0usize;
    let mut value = bytes as f64;
    while value >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{} {}", trim_decimals(value), SIZE_UNITS[unit])
}

// Two decimal places, then strip trailing zeros and a dangling point.
fn trim_decimals(value: f64) -> String {
    let s = format!("{:.2}", value);
    let s = s.trim_end_matches('0');
    s.trim_end_matches('.').to_string()
}

/// Pick a display icon for a MIME type. First matching rule wins.
pub fn file_icon(mime_type: &str) -> &'static str {
    if mime_type.contains("pdf") {
        "📄"
    } else if mime_type.contains("word") || mime_type.contains("document") {
        "📝"
    } else if mime_type.contains("text") {
        "📃"
    } else if mime_type.contains("image") {
        "🖼"
    } else {
        "📁"
    }
}

/// Final path segment of a backend filename, which may carry path-like
/// prefixes (e.g. "uploads/2025/report.pdf" renders as "report.pdf").
pub fn display_filename(filename: &str) -> &str {
    filename.rsplit('/').next().unwrap_or(filename)
}

/// "+N more document(s)" label for evidence links beyond the inline limit.
/// Singular exactly when one link is hidden.
pub fn more_documents_label(hidden: usize) -> String {
    if hidden == 1 {
        "+1 more document".to_string()
    } else {
        format!("+{} more documents", hidden)
    }
}

/// Human-readable upload/creation timestamp, e.g. "Feb 1, 2025 09:00".
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.format("%b %-d, %Y %H:%M").to_string()
}

/// Guess the MIME type for an upload from its extension. The backend is
/// the authority on accepted types; this only fills the multipart header.
pub fn mime_for_extension(filename: &str) -> &'static str {
    let ext = filename
        .rsplit('.')
        .next()
        .unwrap_or("")
        .to_ascii_lowercase();
    match ext.as_str() {
        "pdf" => "application/pdf",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "txt" => "text/plain",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_zero_bytes_is_exact() {
        assert_eq!(format_file_size(0), "0 Bytes");
    }

    #[test]
    fn test_unit_selection() {
        assert_eq!(format_file_size(1), "1 Bytes");
        assert_eq!(format_file_size(1023), "1023 Bytes");
        assert_eq!(format_file_size(1024), "1 KB");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(10 * 1024 * 1024), "10 MB");
        assert_eq!(format_file_size(3 * 1024 * 1024 * 1024), "3 GB");
    }

    #[test]
    fn test_at_most_two_decimals() {
        // 1234567 / 1024^2 = 1.17737...
        assert_eq!(format_file_size(1_234_567), "1.18 MB");
        // Trailing zeros trimmed: 1.50 -> 1.5, 2.00 -> 2
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(2048), "2 KB");
    }

    #[test]
    fn test_formatting_is_idempotent() {
        // Re-formatting the displayed numeric value through the same unit
        // yields the same string.
        for bytes in [0u64, 512, 1024, 1536, 1_234_567, 5 * 1024 * 1024] {
            let shown = format_file_size(bytes);
            let (num, _unit) = shown.split_once(' ').unwrap();
            let reparsed: f64 = num.parse().unwrap();
            assert_eq!(trim_decimals(reparsed), num);
        }
    }

    #[test]
    fn test_icon_precedence() {
        assert_eq!(file_icon("application/pdf"), "📄");
        assert_eq!(
            file_icon("application/vnd.openxmlformats-officedocument.wordprocessingml.document"),
            "📝"
        );
        assert_eq!(file_icon("application/msword"), "📝");
        assert_eq!(file_icon("text/plain"), "📃");
        assert_eq!(file_icon("image/png"), "🖼");
        assert_eq!(file_icon("application/zip"), "📁");
    }

    #[test]
    fn test_display_filename_takes_last_segment() {
        assert_eq!(display_filename("uploads/2025/report.pdf"), "report.pdf");
        assert_eq!(display_filename("report.pdf"), "report.pdf");
        assert_eq!(display_filename(""), "");
    }

    #[test]
    fn test_more_documents_singular_plural() {
        assert_eq!(more_documents_label(1), "+1 more document");
        assert_eq!(more_documents_label(2), "+2 more documents");
        assert_eq!(more_documents_label(10), "+10 more documents");
    }

    #[test]
    fn test_timestamp_format() {
        let ts = Utc.with_ymd_and_hms(2025, 2, 1, 9, 0, 0).unwrap();
        assert_eq!(format_timestamp(&ts), "Feb 1, 2025 09:00");
    }

    #[test]
    fn test_mime_guess_by_extension() {
        assert_eq!(mime_for_extension("report.pdf"), "application/pdf");
        assert_eq!(mime_for_extension("photo.JPG"), "image/jpeg");
        assert_eq!(mime_for_extension("notes.txt"), "text/plain");
        assert_eq!(mime_for_extension("archive.zip"), "application/octet-stream");
        assert_eq!(mime_for_extension("noext"), "application/octet-stream");
    }
}

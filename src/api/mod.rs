pub mod calendar;
pub mod timetable;

use actix_web::HttpResponse;

/// Attachment response carrying a rendered PDF buffer.
pub fn pdf_response(bytes: Vec<u8>, filename: &str) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("application/pdf")
        .insert_header((
            "Content-Disposition",
            format!("attachment; filename=\"{filename}\""),
        ))
        .body(bytes)
}

/// Strip path separators and quotes from a caller-supplied download
/// filename, falling back when nothing printable remains.
pub fn sanitize_filename(requested: Option<&str>, fallback: String) -> String {
    let cleaned: String = requested
        .unwrap_or("")
        .chars()
        .filter(|c| !matches!(c, '/' | '\\' | '"' | '\0' | '\r' | '\n'))
        .collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        fallback
    } else if cleaned.to_ascii_lowercase().ends_with(".pdf") {
        cleaned.to_string()
    } else {
        format!("{cleaned}.pdf")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_filename_uses_fallback() {
        assert_eq!(
            sanitize_filename(None, "report.pdf".to_string()),
            "report.pdf"
        );
        assert_eq!(
            sanitize_filename(Some("   "), "report.pdf".to_string()),
            "report.pdf"
        );
    }

    #[test]
    fn path_separators_and_quotes_are_stripped() {
        assert_eq!(
            sanitize_filename(Some("../../etc/passwd"), "report.pdf".to_string()),
            "....etcpasswd.pdf"
        );
        assert_eq!(
            sanitize_filename(Some("jan\"2025"), "report.pdf".to_string()),
            "jan2025.pdf"
        );
    }

    #[test]
    fn pdf_extension_is_appended_once() {
        assert_eq!(
            sanitize_filename(Some("january"), "report.pdf".to_string()),
            "january.pdf"
        );
        assert_eq!(
            sanitize_filename(Some("January.PDF"), "report.pdf".to_string()),
            "January.PDF"
        );
    }
}

use crate::error::{InvalidReason, NormalizeError};
use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::sync::LazyLock;

// Most specific first; `normalize` tries them in this order. Separators are
// ASCII whitespace only, not the Unicode `\s` class.
static GRANT_WITH_KIND: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^(?:US)?[\t\n\f\r ]*([0-9]{1,2})[,\t\n\f\r ]*([0-9]{3})[,\t\n\f\r ]*([0-9]{3})",
        r"[\t\n\f\r ]+[A-Z][0-9]$",
    ))
    .expect("grant-with-kind pattern")
});
static APPLICATION_WITH_SLASH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:US)?[\t\n\f\r ]*([0-9]{2})/([0-9]{3})[,\t\n\f\r ]*([0-9]{3})$")
        .expect("application-with-slash pattern")
});
static GRANT_WITH_COMMA: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:US)?[\t\n\f\r ]*([0-9]{1,2}),([0-9]{3}),([0-9]{3})$")
        .expect("grant-with-comma pattern")
});
static PUBLICATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^(?:US)?[\t\n\f\r ]*([0-9]{4})[/,\t\n\f\r ]*([0-9]{7})",
        r"(?:[\t\n\f\r ]*[A-Z][0-9])?$",
    ))
    .expect("publication pattern")
});

/// What a patent identifier denotes
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
pub enum PatentKind {
    Application,
    Grant,
    Publication,
    Unknown,
}

impl fmt::Display for PatentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PatentKind::Application => "application",
            PatentKind::Grant => "grant",
            PatentKind::Publication => "publication",
            PatentKind::Unknown => "unknown",
        })
    }
}

/// A normalized patent identifier.
///
/// `normalized` is always non-empty ASCII digits. Application numbers carry
/// `application_number == normalized`; grant and publication numbers leave it
/// unset until a resolver produces a completed copy.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PatentNumber {
    original: String,
    normalized: String,
    application_number: Option<String>,
    kind: PatentKind,
    country: String,
}

impl PatentNumber {
    fn new(original: &str, normalized: String, kind: PatentKind) -> Self {
        let application_number = match kind {
            PatentKind::Application => Some(normalized.clone()),
            _ => None,
        };
        Self {
            original: original.to_string(),
            normalized,
            application_number,
            kind,
            country: "US".to_string(),
        }
    }

    pub fn original(&self) -> &str {
        &self.original
    }

    pub fn normalized(&self) -> &str {
        &self.normalized
    }

    pub fn application_number(&self) -> Option<&str> {
        self.application_number.as_deref()
    }

    pub fn kind(&self) -> PatentKind {
        self.kind
    }

    pub fn country(&self) -> &str {
        &self.country
    }

    /// Copy of this number with the resolved application number filled in.
    pub fn with_application_number(&self, application_number: impl Into<String>) -> Self {
        Self {
            application_number: Some(application_number.into()),
            ..self.clone()
        }
    }

    /// The application number when known, else the normalized digits, which
    /// the lookup API accepts directly for grants and publications.
    pub fn to_application_number(&self) -> &str {
        self.application_number.as_deref().unwrap_or(&self.normalized)
    }

    /// `XX/XXX,XXX` for application numbers.
    pub fn format_as_application(&self) -> String {
        if self.kind != PatentKind::Application || self.normalized.len() < 8 {
            return self.normalized.clone();
        }
        let n = &self.normalized;
        format!("{}/{},{}", &n[..2], &n[2..5], &n[5..])
    }

    /// `X,XXX,XXX` or `XX,XXX,XXX` for grant numbers.
    pub fn format_as_grant(&self) -> String {
        if self.kind != PatentKind::Grant {
            return self.normalized.clone();
        }
        let n = &self.normalized;
        match n.len() {
            7 => format!("{},{},{}", &n[..1], &n[1..4], &n[4..]),
            8 => format!("{},{},{}", &n[..2], &n[2..5], &n[5..]),
            _ => n.clone(),
        }
    }

    /// `YYYY/NNNNNNN` for publication numbers.
    pub fn format_as_publication(&self) -> String {
        if self.kind != PatentKind::Publication || self.normalized.len() != 11 {
            return self.normalized.clone();
        }
        let n = &self.normalized;
        format!("{}/{}", &n[..4], &n[4..])
    }
}

impl fmt::Display for PatentNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}: {})", self.original, self.kind, self.normalized)
    }
}

/// Normalize an application, grant or publication number in any of the
/// common human-entered formats.
///
/// Accepts for example `17/248,024`, `US 11,646,472 B2`, `9123456`,
/// `US20250087686A1` and `US 2025/0087686 A1`. Bare digit strings are
/// classified by length; eight digits could be either a recent grant or an
/// application and are treated as an application.
pub fn normalize(input: &str) -> Result<PatentNumber, NormalizeError> {
    let invalid = |reason| NormalizeError::InvalidFormat {
        input: input.to_string(),
        reason,
    };

    let cleaned = input.trim();
    if cleaned.is_empty() {
        return Err(invalid(InvalidReason::Empty));
    }

    if let Some(caps) = GRANT_WITH_KIND.captures(cleaned) {
        let digits = format!("{}{}{}", &caps[1], &caps[2], &caps[3]);
        return Ok(PatentNumber::new(input, digits, PatentKind::Grant));
    }

    if let Some(caps) = APPLICATION_WITH_SLASH.captures(cleaned) {
        let digits = format!("{}{}{}", &caps[1], &caps[2], &caps[3]);
        return Ok(PatentNumber::new(input, digits, PatentKind::Application));
    }

    if let Some(caps) = GRANT_WITH_COMMA.captures(cleaned) {
        let digits = format!("{}{}{}", &caps[1], &caps[2], &caps[3]);
        return Ok(PatentNumber::new(input, digits, PatentKind::Grant));
    }

    if let Some(caps) = PUBLICATION.captures(cleaned) {
        let digits = format!("{}{}", &caps[1], &caps[2]);
        return Ok(PatentNumber::new(input, digits, PatentKind::Publication));
    }

    if cleaned.bytes().all(|b| b.is_ascii_digit()) {
        let kind = match cleaned.len() {
            7 => PatentKind::Grant,
            8 | 9 => PatentKind::Application,
            11 => PatentKind::Publication,
            n => return Err(invalid(InvalidReason::InvalidLength(n))),
        };
        return Ok(PatentNumber::new(input, cleaned.to_string(), kind));
    }

    Err(invalid(InvalidReason::Unrecognized))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kind_of(input: &str) -> PatentKind {
        normalize(input).unwrap().kind()
    }

    #[test]
    fn test_application_formats() {
        for input in ["17248024", "17/248024", "17/248,024", "US 17/248,024", "17/248 024"] {
            let pn = normalize(input).unwrap();
            assert_eq!(pn.kind(), PatentKind::Application, "{}", input);
            assert_eq!(pn.normalized(), "17248024");
            assert_eq!(pn.application_number(), Some("17248024"));
            assert_eq!(pn.to_application_number(), "17248024");
        }
    }

    #[test]
    fn test_grant_formats() {
        let cases = [
            ("11,646,472", "11646472"),
            ("US 11,646,472", "11646472"),
            ("US 11,646,472 B2", "11646472"),
            ("11646472 B2", "11646472"),
            ("9123456", "9123456"),
            ("9,123,456", "9123456"),
            ("US 9,123,456 B1", "9123456"),
            ("US 10,000,000 B2", "10000000"),
        ];
        for (input, digits) in cases {
            let pn = normalize(input).unwrap();
            assert_eq!(pn.kind(), PatentKind::Grant, "{}", input);
            assert_eq!(pn.normalized(), digits);
            assert_eq!(pn.application_number(), None);
            assert_eq!(pn.to_application_number(), digits);
        }
    }

    #[test]
    fn test_eight_bare_digits_default_to_application() {
        assert_eq!(kind_of("11646472"), PatentKind::Application);
        assert_eq!(kind_of("123456789"), PatentKind::Application);
    }

    #[test]
    fn test_publication_formats() {
        let cases = [
            ("20250087686", "20250087686"),
            ("US20250087686", "20250087686"),
            ("US20250087686A1", "20250087686"),
            ("US 2025/0087686 A1", "20250087686"),
            ("2025/0087686", "20250087686"),
            ("US 2024/0123456 A1", "20240123456"),
        ];
        for (input, digits) in cases {
            let pn = normalize(input).unwrap();
            assert_eq!(pn.kind(), PatentKind::Publication, "{}", input);
            assert_eq!(pn.normalized(), digits);
            assert_eq!(pn.normalized().len(), 11);
        }
    }

    #[test]
    fn test_surrounding_whitespace_is_trimmed() {
        let pn = normalize("  17/248,024\n").unwrap();
        assert_eq!(pn.normalized(), "17248024");
        assert_eq!(pn.original(), "  17/248,024\n");
    }

    #[test]
    fn test_invalid_inputs() {
        let reason = |input: &str| normalize(input).unwrap_err().reason().clone();

        assert_eq!(reason(""), InvalidReason::Empty);
        assert_eq!(reason("   "), InvalidReason::Empty);
        assert_eq!(reason("abc123"), InvalidReason::Unrecognized);
        assert_eq!(reason("US"), InvalidReason::Unrecognized);
        assert_eq!(reason("patent123"), InvalidReason::Unrecognized);
        assert_eq!(reason("123"), InvalidReason::InvalidLength(3));
        assert_eq!(reason("1234567890123456"), InvalidReason::InvalidLength(16));
        assert_eq!(reason("1234567890"), InvalidReason::InvalidLength(10));
    }

    #[test]
    fn test_unicode_separators_rejected() {
        let reason = |input: &str| normalize(input).unwrap_err().reason().clone();

        assert_eq!(reason("17/248\u{00A0}024"), InvalidReason::Unrecognized);
        assert_eq!(reason("US\u{3000}11,646,472 B2"), InvalidReason::Unrecognized);
        assert_eq!(reason("2025/0087686\u{2003}A1"), InvalidReason::Unrecognized);
        // ASCII tab is still a separator
        assert_eq!(normalize("US\t11,646,472 B2").unwrap().normalized(), "11646472");
    }

    #[test]
    fn test_format_as_application() {
        assert_eq!(normalize("17248024").unwrap().format_as_application(), "17/248,024");
        // no-op for other kinds
        assert_eq!(normalize("9123456").unwrap().format_as_application(), "9123456");
    }

    #[test]
    fn test_format_as_grant() {
        assert_eq!(normalize("US 11,646,472 B2").unwrap().format_as_grant(), "11,646,472");
        assert_eq!(normalize("9123456").unwrap().format_as_grant(), "9,123,456");
        assert_eq!(normalize("17248024").unwrap().format_as_grant(), "17248024");
    }

    #[test]
    fn test_format_as_publication() {
        assert_eq!(normalize("20250087686").unwrap().format_as_publication(), "2025/0087686");
        assert_eq!(normalize("9123456").unwrap().format_as_publication(), "9123456");
    }

    #[test]
    fn test_display() {
        let pn = normalize("US 11,646,472 B2").unwrap();
        assert_eq!(pn.to_string(), "US 11,646,472 B2 (grant: 11646472)");
    }

    #[test]
    fn test_with_application_number_returns_new_value() {
        let pn = normalize("9123456").unwrap();
        let resolved = pn.with_application_number("12345678");
        assert_eq!(pn.application_number(), None);
        assert_eq!(resolved.application_number(), Some("12345678"));
        assert_eq!(resolved.to_application_number(), "12345678");
        assert_eq!(resolved.kind(), PatentKind::Grant);
    }
}

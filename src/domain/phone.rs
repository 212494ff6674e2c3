// ============================================================
// PHONE NORMALIZATION
// ============================================================
// Pure validation/canonicalization of free-form phone input. The
// browser pre-check and the server-side check share this algorithm
// and differ only in the heuristic set selected by `PhoneRules`.

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

static SEPARATORS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\s()\-]").unwrap());
static RU_LOCAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[78]\d{10}$").unwrap());
static TH_LOCAL_ZERO: Lazy<Regex> = Lazy::new(|| Regex::new(r"^0\d{9}$").unwrap());
static TH_NO_PLUS: Lazy<Regex> = Lazy::new(|| Regex::new(r"^66\d{8,9}$").unwrap());
static GENERIC_DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{7,15}$").unwrap());
static CANONICAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\+\d{7,15}$").unwrap());
static RU_FULL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\+7\d{10}$").unwrap());
static TH_FULL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\+66\d{8,9}$").unwrap());

/// Canonical phone number: `+` followed by 7-15 digits, with the
/// country-specific length rules already enforced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhoneError {
    Empty,
    InvalidFormat,
}

impl fmt::Display for PhoneError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhoneError::Empty => write!(f, "Phone number is required"),
            PhoneError::InvalidFormat => write!(f, "Invalid phone format"),
        }
    }
}

impl std::error::Error for PhoneError {}

/// Heuristic subset used when the input carries no `+` prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhoneRules {
    /// Rewrite a bare `0XXXXXXXXX` as a Thai local number. The browser
    /// pre-check historically never did this; the server does.
    pub thai_local_zero: bool,
}

impl PhoneRules {
    /// Browser pre-check heuristics.
    pub fn client() -> Self {
        Self {
            thai_local_zero: false,
        }
    }

    /// Server-side heuristics, applied before any remote call.
    pub fn server() -> Self {
        Self {
            thai_local_zero: true,
        }
    }
}

/// Validate and canonicalize a free-form phone string.
///
/// Steps, in order: trim, strip separators, rewrite a leading `00` to
/// `+`, guess a country prefix when none remains (first matching
/// heuristic wins), then re-validate the canonical shape and the
/// known-country digit counts.
pub fn normalize_phone(
    input: &str,
    rules: &PhoneRules,
) -> std::result::Result<PhoneNumber, PhoneError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(PhoneError::Empty);
    }

    let mut raw = SEPARATORS.replace_all(trimmed, "").into_owned();
    if let Some(rest) = raw.strip_prefix("00") {
        raw = format!("+{}", rest);
    }

    if !raw.starts_with('+') {
        if RU_LOCAL.is_match(&raw) {
            // Domestic Russian numbering: 11 digits starting 7 or 8.
            raw = format!("+7{}", &raw[1..]);
        } else if rules.thai_local_zero && TH_LOCAL_ZERO.is_match(&raw) {
            // Thai local numbering: 0 plus 9 digits.
            raw = format!("+66{}", &raw[1..]);
        } else if TH_NO_PLUS.is_match(&raw) {
            raw = format!("+{}", raw);
        } else if GENERIC_DIGITS.is_match(&raw) {
            raw = format!("+{}", raw);
        } else {
            return Err(PhoneError::InvalidFormat);
        }
    }

    if !CANONICAL.is_match(&raw) {
        return Err(PhoneError::InvalidFormat);
    }

    if raw.starts_with("+7") {
        if !RU_FULL.is_match(&raw) {
            return Err(PhoneError::InvalidFormat);
        }
    } else if raw.starts_with("+66") && !TH_FULL.is_match(&raw) {
        return Err(PhoneError::InvalidFormat);
    }

    Ok(PhoneNumber(raw))
}

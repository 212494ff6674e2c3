// ============================================================
// DRIVE URL REWRITER
// ============================================================
// Google Drive share links do not serve image bytes directly; rewrite
// the common shapes to the direct-download host. Anything unrecognized
// passes through unchanged.

use once_cell::sync::Lazy;
use regex::Regex;

static EXPORT_VIEW: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([&?])export=view").unwrap());
static UC_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"[?&]id=([^&]+)").unwrap());
static FILE_D: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"drive\.google\.com/file/d/([^/]+)").unwrap());
static OPEN_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"drive\.google\.com/open\?id=([^&]+)").unwrap());

fn download_url(id: &str) -> String {
    format!(
        "https://drive.usercontent.google.com/download?id={}&export=view",
        id
    )
}

pub fn convert_drive_url(url: &str) -> String {
    if url.contains("drive.usercontent.google.com") {
        if EXPORT_VIEW.is_match(url) {
            return url.to_string();
        }
        let sep = if url.contains('?') { '&' } else { '?' };
        return format!("{}{}export=view", url, sep);
    }

    if url.contains("drive.google.com/uc") {
        if let Some(caps) = UC_ID.captures(url) {
            return download_url(&caps[1]);
        }
        return url.to_string();
    }

    if let Some(caps) = FILE_D.captures(url) {
        return download_url(&caps[1]);
    }

    if let Some(caps) = OPEN_ID.captures(url) {
        return download_url(&caps[1]);
    }

    url.to_string()
}

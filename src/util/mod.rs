use crate::api::{BlobData, UploadFile};
use chrono::{DateTime, NaiveDateTime};
use leptos::prelude::set_timeout;
use std::time::Duration;
use wasm_bindgen::JsCast;

const SIZE_UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

pub(crate) fn format_file_size(bytes: u64) -> String {
    if bytes < 1024 {
        return format!("{bytes} B");
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.1} {}", SIZE_UNITS[unit])
}

/// `2024-05-01T10:20:30Z` → `2024-05-01 10:20`. Unknown formats pass through.
pub(crate) fn format_timestamp(raw: &str) -> String {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.format("%Y-%m-%d %H:%M").to_string();
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return dt.format("%Y-%m-%d %H:%M").to_string();
    }
    raw.to_string()
}

pub(crate) fn format_optional_timestamp(raw: Option<&str>) -> String {
    raw.map(format_timestamp).unwrap_or_else(|| "—".to_string())
}

/// `report.pdf` → `report-hidden.pdf`.
pub(crate) fn suffixed_file_name(name: &str, suffix: &str) -> String {
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{stem}-{suffix}.{ext}"),
        _ => format!("{name}-{suffix}"),
    }
}

pub(crate) fn is_pdf_file(name: &str, mime: &str) -> bool {
    mime == "application/pdf" || name.to_lowercase().ends_with(".pdf")
}

/// Random hex string for OAuth nonces.
pub(crate) fn random_token() -> String {
    let mut buf = [0u8; 16];
    if getrandom::getrandom(&mut buf).is_err() {
        let fallback = (js_sys::Math::random() * u64::MAX as f64) as u64;
        buf[..8].copy_from_slice(&fallback.to_le_bytes());
    }
    buf.iter().map(|b| format!("{b:02x}")).collect()
}

pub(crate) async fn read_upload_file(file: &web_sys::File) -> Result<UploadFile, String> {
    let buf = wasm_bindgen_futures::JsFuture::from(file.array_buffer())
        .await
        .map_err(|e| format!("could not read {}: {:?}", file.name(), e))?;
    Ok(UploadFile {
        name: file.name(),
        mime: file.type_(),
        bytes: js_sys::Uint8Array::new(&buf).to_vec(),
    })
}

pub(crate) fn files_from_list(list: Option<web_sys::FileList>) -> Vec<web_sys::File> {
    let Some(list) = list else {
        return vec![];
    };
    (0..list.length()).filter_map(|i| list.get(i)).collect()
}

fn make_blob(data: &BlobData) -> Option<web_sys::Blob> {
    let bytes = js_sys::Uint8Array::from(data.bytes.as_slice());
    let parts = js_sys::Array::of1(&bytes);
    let options = web_sys::BlobPropertyBag::new();
    options.set_type(&data.mime);
    web_sys::Blob::new_with_u8_array_sequence_and_options(&parts, &options).ok()
}

/// An object URL that is revoked when dropped.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct BlobUrl(String);

impl BlobUrl {
    pub fn new(data: &BlobData) -> Option<Self> {
        let blob = make_blob(data)?;
        web_sys::Url::create_object_url_with_blob(&blob).ok().map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Drop for BlobUrl {
    fn drop(&mut self) {
        if web_sys::Url::revoke_object_url(&self.0).is_err() {
            log::debug!("object url already revoked: {}", self.0);
        }
    }
}

/// How long the object URL outlives the click. The browser reads it asynchronously.
const DOWNLOAD_URL_LIFETIME: Duration = Duration::from_secs(60);

/// Attaches an `<a download>` for `href` to the body, clicks it and removes it again.
pub(crate) fn click_download_link(href: &str, file_name: &str) -> bool {
    let Some(document) = web_sys::window().and_then(|w| w.document()) else {
        return false;
    };
    let (Some(body), Some(anchor)) = (
        document.body(),
        document
            .create_element("a")
            .ok()
            .and_then(|el| el.dyn_into::<web_sys::HtmlAnchorElement>().ok()),
    ) else {
        return false;
    };
    anchor.set_href(href);
    anchor.set_download(file_name);
    if body.append_child(&anchor).is_err() {
        return false;
    }
    anchor.click();
    anchor.remove();
    true
}

/// Saves `data` under `file_name`. The object URL is revoked once the download had time to start.
pub(crate) fn trigger_download(data: &BlobData, file_name: &str) {
    let Some(url) = BlobUrl::new(data) else {
        log::error!("could not create a blob for {file_name}");
        return;
    };
    if !click_download_link(url.as_str(), file_name) {
        log::error!("could not start the download of {file_name}");
        return;
    }
    set_timeout(move || drop(url), DOWNLOAD_URL_LIFETIME);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_sizes() {
        assert_eq!(format_file_size(0), "0 B");
        assert_eq!(format_file_size(1023), "1023 B");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(5 * 1024 * 1024), "5.0 MB");
    }

    #[test]
    fn timestamps() {
        assert_eq!(format_timestamp("2024-05-01T10:20:30Z"), "2024-05-01 10:20");
        assert_eq!(format_timestamp("2024-05-01T10:20:30.123"), "2024-05-01 10:20");
        assert_eq!(format_timestamp("yesterday"), "yesterday");
        assert_eq!(format_optional_timestamp(None), "—");
    }

    #[test]
    fn suffixed_names() {
        assert_eq!(suffixed_file_name("report.pdf", "hidden"), "report-hidden.pdf");
        assert_eq!(suffixed_file_name("README", "hidden"), "README-hidden");
        assert_eq!(suffixed_file_name(".env", "hidden"), ".env-hidden");
    }

    #[test]
    fn pdf_detection() {
        assert!(is_pdf_file("a.PDF", ""));
        assert!(is_pdf_file("blob", "application/pdf"));
        assert!(!is_pdf_file("a.txt", "text/plain"));
    }
}

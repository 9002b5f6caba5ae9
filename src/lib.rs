mod access;
mod api;
mod app;
mod components;
mod models;
mod pages;
mod paging;
mod state;
mod storage;
mod util;
mod validation;

use crate::api::EnvConfig;
use crate::app::App;
use leptos::prelude::*;

// Needed for `#[wasm_bindgen(start)]` on the wasm entrypoint.
#[cfg(all(target_arch = "wasm32", not(test)))]
use wasm_bindgen::prelude::wasm_bindgen;

// WASM-only tests (run with `cargo test --target wasm32-unknown-unknown` + wasm-bindgen-test-runner)
#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use crate::api::ApiClient;
    use crate::models::Account;
    use crate::storage::{
        clear_search_history, load_search_history, load_user_from_storage, save_oauth_nonce,
        save_user_to_storage, take_oauth_nonce, write_search_query,
    };
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_api_client_cookie_roundtrip_token() {
        ApiClient::clear_storage();

        let mut c = ApiClient::load_from_storage();
        assert!(!c.is_authenticated());

        c.set_token("t1".to_string());
        c.save_to_storage();

        let c2 = ApiClient::load_from_storage();
        assert_eq!(c2.token().map(|s| s.as_str()), Some("t1"));

        ApiClient::clear_storage();
        let c3 = ApiClient::load_from_storage();
        assert!(c3.token().is_none());
    }

    #[wasm_bindgen_test]
    fn test_user_storage_roundtrip() {
        let user: Account = serde_json::from_value(serde_json::json!({
            "id": 1,
            "email": "u@example.com",
            "firstName": "Ada",
            "lastName": "Lovelace"
        }))
        .expect("account should parse");
        save_user_to_storage(&user);
        let loaded = load_user_from_storage().expect("should load user from localStorage");
        assert_eq!(loaded.email, "u@example.com");
        assert_eq!(loaded.display_name(), "Ada Lovelace");
    }

    #[wasm_bindgen_test]
    fn test_oauth_nonce_is_single_use() {
        save_oauth_nonce("n-1");
        assert_eq!(take_oauth_nonce().as_deref(), Some("n-1"));
        assert_eq!(take_oauth_nonce(), None);
    }

    #[wasm_bindgen_test]
    fn test_download_link_is_attached_then_removed() {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .expect("document should exist");
        let before = document
            .query_selector_all("a[download]")
            .expect("selector should be valid")
            .length();

        assert!(crate::util::click_download_link("data:text/plain,hello", "hello.txt"));

        let after = document
            .query_selector_all("a[download]")
            .expect("selector should be valid")
            .length();
        assert_eq!(after, before);
    }

    #[wasm_bindgen_test]
    fn test_search_history_is_most_recent_first() {
        clear_search_history();
        write_search_query("invoice");
        write_search_query("contract");
        let history = write_search_query("invoice");
        assert_eq!(history, vec!["invoice".to_string(), "contract".to_string()]);
        assert_eq!(load_search_history(), history);

        clear_search_history();
        assert!(load_search_history().is_empty());
    }
}

// Only register the WASM start function for normal builds (not for tests),
// otherwise wasm-bindgen-test will end up with multiple entry symbols.
#[cfg_attr(all(target_arch = "wasm32", not(test)), wasm_bindgen(start))]
pub fn main() {
    console_error_panic_hook::set_once();
    let config = EnvConfig::new();
    if console_log::init_with_level(config.log_level()).is_err() {
        web_sys::console::warn_1(&"logger already initialised".into());
    }
    log::info!("starting against {}", config.api_url);
    mount_to_body(App);
}

#[cfg(test)]
mod tests {
    use crate::models::{AuthResponse, FileItem, FileKind, Page};

    #[test]
    fn test_login_response_contract_deserialize() {
        let json = r#"{
            "token": "jwt-token",
            "account": {
                "id": 1,
                "email": "u@example.com",
                "firstName": "Ada",
                "lastName": "Lovelace",
                "role": {"id": 2, "name": "ADMIN", "permissions": []}
            }
        }"#;
        let parsed: AuthResponse = serde_json::from_str(json).expect("login response should parse");
        assert_eq!(parsed.token, "jwt-token");
        let account = parsed.account.expect("account should be present");
        assert_eq!(account.role.map(|r| r.name).as_deref(), Some("ADMIN"));
    }

    #[test]
    fn test_login_response_without_account() {
        let parsed: AuthResponse =
            serde_json::from_str(r#"{"token": "t"}"#).expect("token-only response should parse");
        assert!(parsed.account.is_none());
    }

    #[test]
    fn test_file_page_contract_deserialize() {
        let json = r#"{
            "currentPage": 1,
            "totalPages": 3,
            "totalItems": 41,
            "pageSize": 20,
            "result": [
                {"type": "folder", "folder": {"id": 3, "name": "Invoices"}},
                {"type": "document", "document": {"id": 9, "name": "q1.pdf", "size": 2048, "mimeType": "application/pdf"}}
            ]
        }"#;
        let page: Page<FileItem> = serde_json::from_str(json).expect("file page should parse");
        assert_eq!(page.total_pages, 3);
        let kinds: Vec<FileKind> = page.result.iter().map(FileItem::kind).collect();
        assert_eq!(kinds, vec![FileKind::Folder, FileKind::Document]);
        assert_eq!(page.result[1].size(), Some(2048));
    }

    #[test]
    fn test_empty_page_without_result_field() {
        let page: Page<FileItem> =
            serde_json::from_str(r#"{"currentPage": 1, "totalPages": 0}"#).expect("should parse");
        assert!(page.result.is_empty());
    }
}

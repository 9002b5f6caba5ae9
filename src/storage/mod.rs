use crate::models::Account;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};
use wasm_bindgen::JsCast;

pub(crate) const TOKEN_COOKIE: &str = "access_token";
pub(crate) const TOKEN_MAX_AGE_SECS: u32 = 7 * 24 * 60 * 60;

pub(crate) const USER_KEY: &str = "docvault_user";
pub(crate) const SEARCH_HISTORY_KEY: &str = "docvault_search_history";
pub(crate) const THEME_KEY: &str = "docvault_theme";
pub(crate) const LANGUAGE_KEY: &str = "docvault_language";
pub(crate) const OAUTH_NONCE_KEY: &str = "docvault_oauth_nonce";

pub(crate) const SEARCH_HISTORY_MAX: usize = 10;

#[derive(
    Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, Display, EnumString, AsRefStr, EnumIter,
)]
#[strum(serialize_all = "lowercase")]
pub(crate) enum Theme {
    #[default]
    Light,
    Dark,
}

#[derive(
    Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, Display, EnumString, AsRefStr, EnumIter,
)]
#[strum(serialize_all = "lowercase")]
pub(crate) enum Language {
    #[default]
    En,
    Vi,
}

impl Language {
    pub fn label(&self) -> &'static str {
        match self {
            Language::En => "English",
            Language::Vi => "Tiếng Việt",
        }
    }
}

fn local_storage() -> Option<web_sys::Storage> {
    web_sys::window().and_then(|w| w.local_storage().ok().flatten())
}

fn html_document() -> Option<web_sys::HtmlDocument> {
    web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.dyn_into::<web_sys::HtmlDocument>().ok())
}

/// Finds `name` in a `document.cookie` style string (`a=1; b=2`).
pub(crate) fn parse_cookie(all: &str, name: &str) -> Option<String> {
    all.split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(k, _)| *k == name)
        .map(|(_, v)| urlencoding::decode(v).map(|s| s.into_owned()).unwrap_or_else(|_| v.to_string()))
        .filter(|v| !v.is_empty())
}

pub(crate) fn read_cookie(name: &str) -> Option<String> {
    let all = html_document()?.cookie().ok()?;
    parse_cookie(&all, name)
}

pub(crate) fn write_cookie(name: &str, value: &str, max_age_secs: u32) {
    if let Some(doc) = html_document() {
        let cookie = format!(
            "{}={}; path=/; max-age={}; SameSite=Lax",
            name,
            urlencoding::encode(value),
            max_age_secs
        );
        if doc.set_cookie(&cookie).is_err() {
            log::warn!("could not write cookie `{name}`");
        }
    }
}

pub(crate) fn remove_cookie(name: &str) {
    if let Some(doc) = html_document() {
        let _ = doc.set_cookie(&format!("{name}=; path=/; max-age=0; SameSite=Lax"));
    }
}

pub(crate) fn save_user_to_storage(user: &Account) {
    save_json_to_storage(USER_KEY, user);
}

pub(crate) fn load_user_from_storage() -> Option<Account> {
    load_json_from_storage(USER_KEY)
}

/// Remembers the nonce of a Google sign-in that is about to leave the app.
pub(crate) fn save_oauth_nonce(nonce: &str) {
    save_json_to_storage(OAUTH_NONCE_KEY, &nonce);
}

/// Single use: the stored nonce is forgotten as soon as it is read.
pub(crate) fn take_oauth_nonce() -> Option<String> {
    let nonce = load_json_from_storage(OAUTH_NONCE_KEY);
    remove_from_storage(OAUTH_NONCE_KEY);
    nonce
}

pub(crate) fn remove_from_storage(key: &str) {
    if let Some(storage) = local_storage() {
        let _ = storage.remove_item(key);
    }
}

pub(crate) fn load_json_from_storage<T: for<'de> Deserialize<'de>>(key: &str) -> Option<T> {
    let storage = local_storage()?;
    let json = storage.get_item(key).ok().flatten()?;
    serde_json::from_str(&json).ok()
}

pub(crate) fn save_json_to_storage<T: Serialize>(key: &str, value: &T) {
    if let Ok(json) = serde_json::to_string(value) {
        if let Some(storage) = local_storage() {
            let _ = storage.set_item(key, &json);
        }
    }
}

pub(crate) fn upsert_lru_by_key<T: Clone>(
    mut items: Vec<T>,
    item: T,
    same_key: impl Fn(&T, &T) -> bool,
    max: usize,
) -> Vec<T> {
    items.retain(|x| !same_key(x, &item));
    items.insert(0, item);
    if items.len() > max {
        items.truncate(max);
    }
    items
}

/// Most-recent-first; blank queries leave the history unchanged.
pub(crate) fn push_search_query(history: Vec<String>, query: &str) -> Vec<String> {
    let query = query.trim();
    if query.is_empty() {
        return history;
    }
    upsert_lru_by_key(
        history,
        query.to_string(),
        |a, b| a.to_lowercase() == b.to_lowercase(),
        SEARCH_HISTORY_MAX,
    )
}

pub(crate) fn load_search_history() -> Vec<String> {
    load_json_from_storage::<Vec<String>>(SEARCH_HISTORY_KEY).unwrap_or_default()
}

pub(crate) fn write_search_query(query: &str) -> Vec<String> {
    let next = push_search_query(load_search_history(), query);
    save_json_to_storage(SEARCH_HISTORY_KEY, &next);
    next
}

pub(crate) fn clear_search_history() {
    remove_from_storage(SEARCH_HISTORY_KEY);
}

fn load_enum<T: std::str::FromStr + Default>(key: &str) -> T {
    local_storage()
        .and_then(|s| s.get_item(key).ok().flatten())
        .and_then(|v| v.parse().ok())
        .unwrap_or_default()
}

fn save_str(key: &str, value: &str) {
    if let Some(storage) = local_storage() {
        let _ = storage.set_item(key, value);
    }
}

pub(crate) fn load_theme() -> Theme {
    load_enum(THEME_KEY)
}

pub(crate) fn save_theme(theme: Theme) {
    save_str(THEME_KEY, theme.as_ref());
}

pub(crate) fn load_language() -> Language {
    load_enum(LANGUAGE_KEY)
}

pub(crate) fn save_language(language: Language) {
    save_str(LANGUAGE_KEY, language.as_ref());
}

/// Reflects theme and language on the `<html>` element.
pub(crate) fn apply_preferences(theme: Theme, language: Language) {
    let Some(root) = web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.document_element())
    else {
        return;
    };

    let classes = root.class_list();
    let _ = match theme {
        Theme::Dark => classes.add_1("dark"),
        Theme::Light => classes.remove_1("dark"),
    };
    let _ = root.set_attribute("lang", language.as_ref());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_cookie_finds_exact_name() {
        let all = "theme=dark; access_token=abc.def; other_access_token=zzz";
        assert_eq!(parse_cookie(all, "access_token").as_deref(), Some("abc.def"));
        assert_eq!(parse_cookie(all, "missing"), None);
    }

    #[test]
    fn parse_cookie_decodes_and_skips_empty() {
        assert_eq!(
            parse_cookie("access_token=a%20b", "access_token").as_deref(),
            Some("a b")
        );
        assert_eq!(parse_cookie("access_token=", "access_token"), None);
        assert_eq!(parse_cookie("", "access_token"), None);
    }

    #[test]
    fn search_history_is_most_recent_first_and_deduplicated() {
        let h = push_search_query(vec![], "invoice");
        let h = push_search_query(h, "contract");
        let h = push_search_query(h, "INVOICE");
        assert_eq!(h, vec!["INVOICE".to_string(), "contract".to_string()]);
    }

    #[test]
    fn search_history_ignores_blank_and_caps_length() {
        let mut h = push_search_query(vec![], "   ");
        assert!(h.is_empty());
        for i in 0..(SEARCH_HISTORY_MAX + 5) {
            h = push_search_query(h, &format!("q{i}"));
        }
        assert_eq!(h.len(), SEARCH_HISTORY_MAX);
        assert_eq!(h[0], format!("q{}", SEARCH_HISTORY_MAX + 4));
    }

    #[test]
    fn preference_enums_round_trip_through_strings() {
        assert_eq!(Theme::Dark.as_ref(), "dark");
        assert_eq!("light".parse::<Theme>().ok(), Some(Theme::Light));
        assert_eq!("vi".parse::<Language>().ok(), Some(Language::Vi));
        assert!("klingon".parse::<Language>().is_err());
    }
}

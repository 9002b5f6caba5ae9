mod admin;
mod auth;
mod error;
mod files;

pub(crate) use admin::*;
pub(crate) use auth::*;
pub(crate) use error::*;
pub(crate) use files::*;

use crate::models::HttpMethod;
use crate::storage::{read_cookie, remove_cookie, write_cookie, TOKEN_COOKIE, TOKEN_MAX_AGE_SECS};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct EnvConfig {
    pub api_url: String,
    pub log_level: String,
    pub google_client_id: Option<String>,
}

impl EnvConfig {
    pub fn new() -> Self {
        let mut config = Self {
            api_url: "http://localhost:8080".to_string(),
            log_level: "info".to_string(),
            google_client_id: None,
        };

        let Some(env) = web_sys::window()
            .and_then(|w| w.get("ENV"))
            .filter(|env| !env.is_undefined() && env.is_object())
        else {
            return config;
        };

        let get = |key: &str| {
            js_sys::Reflect::get(&env, &key.into())
                .ok()
                .and_then(|v| v.as_string())
                .filter(|s| !s.trim().is_empty())
        };

        // `API_URL` is the documented key; `api_url` is still honoured.
        if let Some(url) = get("API_URL").or_else(|| get("api_url")) {
            config.api_url = url.trim_end_matches('/').to_string();
        }
        if let Some(level) = get("LOG_LEVEL") {
            config.log_level = level;
        }
        config.google_client_id = get("GOOGLE_CLIENT_ID");

        config
    }

    pub fn log_level(&self) -> log::Level {
        self.log_level.parse().unwrap_or(log::Level::Info)
    }
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl From<HttpMethod> for reqwest::Method {
    fn from(m: HttpMethod) -> Self {
        match m {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Patch => reqwest::Method::PATCH,
            HttpMethod::Delete => reqwest::Method::DELETE,
        }
    }
}

/// A downloaded body together with its content type.
#[derive(Clone, Debug)]
pub(crate) struct BlobData {
    pub bytes: Vec<u8>,
    pub mime: String,
}

/// A browser file already read into memory, ready for a multipart body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct UploadFile {
    pub name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    fn into_part(self) -> ApiResult<reqwest::multipart::Part> {
        let part = reqwest::multipart::Part::bytes(self.bytes).file_name(self.name);
        if self.mime.is_empty() {
            Ok(part)
        } else {
            part.mime_str(&self.mime).map_err(ApiError::parse)
        }
    }
}

#[derive(Clone, Debug)]
pub(crate) struct ApiClient {
    pub(crate) base_url: String,
    pub(crate) token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: String) -> Self {
        Self {
            base_url,
            token: None,
        }
    }

    pub fn load_from_storage() -> Self {
        let mut client = Self::new(EnvConfig::new().api_url);
        client.token = read_cookie(TOKEN_COOKIE);
        client
    }

    pub fn save_to_storage(&self) {
        if let Some(token) = &self.token {
            write_cookie(TOKEN_COOKIE, token, TOKEN_MAX_AGE_SECS);
        }
    }

    pub fn clear_storage() {
        remove_cookie(TOKEN_COOKIE);
        crate::storage::remove_from_storage(crate::storage::USER_KEY);
    }

    pub fn set_token(&mut self, token: String) {
        self.token = Some(token);
    }

    pub fn token(&self) -> Option<&String> {
        self.token.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub fn logout(&mut self) {
        self.token = None;
        Self::clear_storage();
    }

    pub(crate) fn auth_header(&self) -> Option<String> {
        self.token.as_ref().map(|t| format!("Bearer {t}"))
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn builder(&self, method: HttpMethod, path: &str) -> reqwest::RequestBuilder {
        let mut req = reqwest::Client::new().request(method.into(), self.url(path));
        if let Some(header) = self.auth_header() {
            req = req.header("Authorization", header);
        }
        req
    }

    async fn send(req: reqwest::RequestBuilder) -> ApiResult<reqwest::Response> {
        let res = req.send().await.map_err(ApiError::network)?;
        let status = res.status();
        if status.is_success() {
            Ok(res)
        } else {
            let body = res.text().await.unwrap_or_default();
            Err(ApiError::from_status(status.as_u16(), body))
        }
    }

    async fn read_blob(res: reqwest::Response) -> ApiResult<BlobData> {
        let mime = res
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = res.bytes().await.map_err(ApiError::network)?;
        Ok(BlobData {
            bytes: bytes.to_vec(),
            mime,
        })
    }

    pub(crate) async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        let res = Self::send(self.builder(HttpMethod::Get, path)).await?;
        res.json().await.map_err(ApiError::parse)
    }

    pub(crate) async fn send_json<T: serde::de::DeserializeOwned>(
        &self,
        method: HttpMethod,
        path: &str,
        body: &impl Serialize,
    ) -> ApiResult<T> {
        let res = Self::send(self.builder(method, path).json(body)).await?;
        res.json().await.map_err(ApiError::parse)
    }

    /// For endpoints whose response body is irrelevant.
    pub(crate) async fn send_empty(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<&serde_json::Value>,
    ) -> ApiResult<()> {
        let mut req = self.builder(method, path);
        if let Some(b) = body {
            req = req.json(b);
        }
        Self::send(req).await.map(|_| ())
    }

    pub(crate) async fn get_blob(&self, path: &str) -> ApiResult<BlobData> {
        let res = Self::send(self.builder(HttpMethod::Get, path)).await?;
        Self::read_blob(res).await
    }

    pub(crate) async fn post_blob(&self, path: &str, body: &impl Serialize) -> ApiResult<BlobData> {
        let res = Self::send(self.builder(HttpMethod::Post, path).json(body)).await?;
        Self::read_blob(res).await
    }

    async fn post_multipart(
        &self,
        path: &str,
        file: UploadFile,
        fields: &[(&str, String)],
    ) -> ApiResult<reqwest::Response> {
        let mut form = reqwest::multipart::Form::new().part("file", file.into_part()?);
        for (name, value) in fields {
            form = form.text(name.to_string(), value.clone());
        }
        Self::send(self.builder(HttpMethod::Post, path).multipart(form)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_without_token_has_no_auth_header() {
        let client = ApiClient::new("http://localhost:8080".to_string());
        assert!(client.auth_header().is_none());
        assert!(!client.is_authenticated());
    }

    #[test]
    fn client_with_token_sends_bearer() {
        let mut client = ApiClient::new("http://localhost:8080".to_string());
        client.set_token("jwt".to_string());
        assert_eq!(client.auth_header().as_deref(), Some("Bearer jwt"));
        assert!(client.is_authenticated());
        assert_eq!(client.token().map(String::as_str), Some("jwt"));
    }

    #[test]
    fn url_joins_base_and_path() {
        let client = ApiClient::new("https://api.example.com".to_string());
        assert_eq!(
            client.url("/api/secure/profile"),
            "https://api.example.com/api/secure/profile"
        );
    }

    #[test]
    fn http_method_maps_to_reqwest() {
        assert_eq!(reqwest::Method::from(HttpMethod::Delete), reqwest::Method::DELETE);
        assert_eq!(reqwest::Method::from(HttpMethod::Patch), reqwest::Method::PATCH);
    }
}

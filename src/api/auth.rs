use super::{ApiClient, ApiResult};
use crate::models::{Account, AuthResponse, HttpMethod};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SignupRequest {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct GoogleLoginRequest {
    pub credential: String,
}

pub(crate) const GOOGLE_AUTHORIZE_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
pub(crate) const GOOGLE_CALLBACK_PATH: &str = "/auth/google/callback";

/// Builds the implicit-flow authorize URL that returns an `id_token` in the fragment.
pub(crate) fn google_authorize_url(client_id: &str, redirect_uri: &str, nonce: &str) -> String {
    format!(
        "{GOOGLE_AUTHORIZE_URL}?client_id={}&redirect_uri={}&response_type=id_token&scope={}&nonce={}&prompt=select_account",
        urlencoding::encode(client_id),
        urlencoding::encode(redirect_uri),
        urlencoding::encode("openid email profile"),
        urlencoding::encode(nonce),
    )
}

/// Pulls `id_token` out of a `#a=1&id_token=...` fragment.
pub(crate) fn id_token_from_fragment(fragment: &str) -> Option<String> {
    fragment
        .trim_start_matches('#')
        .split('&')
        .filter_map(|kv| kv.split_once('='))
        .find(|(k, _)| *k == "id_token")
        .and_then(|(_, v)| urlencoding::decode(v).ok().map(|s| s.into_owned()))
        .filter(|v| !v.is_empty())
}

#[derive(Deserialize)]
struct IdTokenClaims {
    #[serde(default)]
    nonce: Option<String>,
}

/// The `nonce` claim of an id_token. The signature is checked by the backend, not here.
pub(crate) fn id_token_nonce(id_token: &str) -> Option<String> {
    let payload = id_token.split('.').nth(1)?;
    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
    serde_json::from_slice::<IdTokenClaims>(&bytes).ok()?.nonce
}

/// The token must echo the nonce this browser sent with the authorize request.
pub(crate) fn nonce_matches(id_token: &str, expected: Option<&str>) -> bool {
    match (id_token_nonce(id_token), expected) {
        (Some(got), Some(expected)) => got == expected,
        _ => false,
    }
}

impl ApiClient {
    pub async fn login(&self, email: &str, password: &str) -> ApiResult<AuthResponse> {
        self.send_json(
            HttpMethod::Post,
            "/api/login",
            &LoginRequest {
                email: email.to_string(),
                password: password.to_string(),
            },
        )
        .await
    }

    pub async fn signup(&self, req: &SignupRequest) -> ApiResult<AuthResponse> {
        self.send_json(HttpMethod::Post, "/api/signup", req).await
    }

    pub async fn login_with_google(&self, credential: &str) -> ApiResult<AuthResponse> {
        self.send_json(
            HttpMethod::Post,
            "/api/auth/google",
            &GoogleLoginRequest {
                credential: credential.to_string(),
            },
        )
        .await
    }

    pub async fn get_profile(&self) -> ApiResult<Account> {
        self.get_json("/api/secure/profile").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signup_request_is_camel_case() {
        let v = serde_json::to_value(SignupRequest {
            email: "u@example.com".to_string(),
            first_name: "Ada".to_string(),
            last_name: "L".to_string(),
            password: "secret1".to_string(),
        })
        .expect("should serialize");
        assert_eq!(v["firstName"], "Ada");
        assert_eq!(v["lastName"], "L");
    }

    #[test]
    fn authorize_url_encodes_parameters() {
        let url = google_authorize_url("abc.apps", "http://localhost:3000/auth/google/callback", "n1");
        assert!(url.starts_with(GOOGLE_AUTHORIZE_URL));
        assert!(url.contains("response_type=id_token"));
        assert!(url.contains("redirect_uri=http%3A%2F%2Flocalhost%3A3000%2Fauth%2Fgoogle%2Fcallback"));
        assert!(url.contains("scope=openid%20email%20profile"));
    }

    fn token_with(claims: serde_json::Value) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"RS256"}"#);
        let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
        format!("{header}.{payload}.sig")
    }

    #[test]
    fn nonce_must_match_the_one_sent() {
        let token = token_with(serde_json::json!({"sub": "1", "nonce": "n-42"}));
        assert_eq!(id_token_nonce(&token).as_deref(), Some("n-42"));
        assert!(nonce_matches(&token, Some("n-42")));
        assert!(!nonce_matches(&token, Some("n-43")));
        assert!(!nonce_matches(&token, None));
    }

    #[test]
    fn token_without_nonce_or_malformed_is_rejected() {
        let bare = token_with(serde_json::json!({"sub": "1"}));
        assert!(!nonce_matches(&bare, Some("n-42")));
        assert!(!nonce_matches("not-a-jwt", Some("n-42")));
        assert!(!nonce_matches("a.!!!.c", Some("n-42")));
    }

    #[test]
    fn id_token_is_read_from_fragment() {
        assert_eq!(
            id_token_from_fragment("#state=x&id_token=eyJ.abc&authuser=0").as_deref(),
            Some("eyJ.abc")
        );
        assert_eq!(id_token_from_fragment("#error=access_denied"), None);
        assert_eq!(id_token_from_fragment(""), None);
    }
}

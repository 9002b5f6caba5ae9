use crate::models::FieldError;
use serde::Deserialize;

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum ApiErrorKind {
    /// 400 with a field/message list.
    Validation(Vec<FieldError>),
    /// 401 or 403.
    Unauthorized,
    /// 409.
    Conflict,
    Network,
    Http(u16),
    Parse,
}

#[derive(Clone, Debug)]
pub(crate) struct ApiError {
    pub kind: ApiErrorKind,
    pub message: String,
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ApiError {}

pub(crate) const GENERIC_ERROR: &str = "System or connection error";

#[derive(Deserialize)]
#[serde(untagged)]
enum ValidationBody {
    List(Vec<FieldError>),
    Wrapped { errors: Vec<FieldError> },
}

#[derive(Deserialize)]
struct MessageBody {
    message: String,
}

impl ApiError {
    pub(crate) fn network(e: reqwest::Error) -> Self {
        Self {
            kind: ApiErrorKind::Network,
            message: e.to_string(),
        }
    }

    pub(crate) fn parse(e: impl std::fmt::Display) -> Self {
        Self {
            kind: ApiErrorKind::Parse,
            message: e.to_string(),
        }
    }

    pub(crate) fn unauthorized() -> Self {
        Self {
            kind: ApiErrorKind::Unauthorized,
            message: "Unauthorized".to_string(),
        }
    }

    /// Classifies a non-success response.
    pub(crate) fn from_status(status: u16, body: String) -> Self {
        match status {
            400 => {
                let errors = match serde_json::from_str::<ValidationBody>(&body) {
                    Ok(ValidationBody::List(e)) | Ok(ValidationBody::Wrapped { errors: e }) => e,
                    Err(_) => vec![],
                };
                let message = errors
                    .first()
                    .map(|e| e.message.clone())
                    .unwrap_or_else(|| body.clone());
                Self {
                    kind: ApiErrorKind::Validation(errors),
                    message,
                }
            }
            401 | 403 => Self::unauthorized(),
            409 => {
                let message = serde_json::from_str::<MessageBody>(&body)
                    .map(|m| m.message)
                    .unwrap_or(body);
                Self {
                    kind: ApiErrorKind::Conflict,
                    message,
                }
            }
            other => Self {
                kind: ApiErrorKind::Http(other),
                message: format!("Request failed ({other}): {body}"),
            },
        }
    }

    pub(crate) fn is_unauthorized(&self) -> bool {
        self.kind == ApiErrorKind::Unauthorized
    }

    pub(crate) fn is_conflict(&self) -> bool {
        self.kind == ApiErrorKind::Conflict
    }

    pub(crate) fn field_errors(&self) -> &[FieldError] {
        match &self.kind {
            ApiErrorKind::Validation(errors) => errors,
            _ => &[],
        }
    }

    /// The text shown in a toast or form alert.
    pub(crate) fn user_message(&self) -> String {
        match &self.kind {
            ApiErrorKind::Validation(errors) => errors
                .first()
                .map(|e| e.message.clone())
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| "Please check the highlighted fields".to_string()),
            ApiErrorKind::Unauthorized => {
                "You are not authorized to perform this action".to_string()
            }
            ApiErrorKind::Conflict => {
                if self.message.trim().is_empty() {
                    "The item already exists".to_string()
                } else {
                    self.message.clone()
                }
            }
            ApiErrorKind::Network | ApiErrorKind::Http(_) | ApiErrorKind::Parse => {
                GENERIC_ERROR.to_string()
            }
        }
    }
}

pub(crate) type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bad_request_with_bare_list_maps_to_field_errors() {
        let e = ApiError::from_status(
            400,
            r#"[{"field": "email", "message": "Email is already taken"}]"#.to_string(),
        );
        assert_eq!(e.field_errors().len(), 1);
        assert_eq!(e.field_errors()[0].field, "email");
        assert_eq!(e.user_message(), "Email is already taken");
    }

    #[test]
    fn bad_request_with_wrapped_list_maps_to_field_errors() {
        let e = ApiError::from_status(
            400,
            r#"{"errors": [{"field": "name", "message": "must not be blank"}]}"#.to_string(),
        );
        assert_eq!(e.field_errors()[0].field, "name");
    }

    #[test]
    fn bad_request_without_list_keeps_generic_field_hint() {
        let e = ApiError::from_status(400, "oops".to_string());
        assert!(e.field_errors().is_empty());
        assert_eq!(e.user_message(), "Please check the highlighted fields");
    }

    #[test]
    fn unauthorized_and_forbidden_collapse() {
        assert!(ApiError::from_status(401, String::new()).is_unauthorized());
        assert!(ApiError::from_status(403, String::new()).is_unauthorized());
    }

    #[test]
    fn conflict_surfaces_plain_text() {
        let e = ApiError::from_status(409, "A file named a.pdf already exists".to_string());
        assert!(e.is_conflict());
        assert_eq!(e.user_message(), "A file named a.pdf already exists");

        let e = ApiError::from_status(409, r#"{"message": "Duplicate key"}"#.to_string());
        assert_eq!(e.user_message(), "Duplicate key");
    }

    #[test]
    fn everything_else_is_generic() {
        let e = ApiError::from_status(500, "stack trace".to_string());
        assert_eq!(e.kind, ApiErrorKind::Http(500));
        assert_eq!(e.user_message(), GENERIC_ERROR);
        assert_eq!(ApiError::parse("bad json").user_message(), GENERIC_ERROR);
    }
}

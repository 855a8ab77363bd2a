use axum::async_trait;
use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::utils::error::AppError;
use crate::validation::{FieldErrors, REQUIRED_MESSAGE};

/// Field name used when the problem is the body as a whole.
const BODY_FIELD: &str = "body";

/// `axum::Json` whose rejections go through `AppError`, so a missing field or
/// a wrong type comes back as a field-level validation error in the usual
/// envelope.
#[derive(Debug, Clone, Copy, Default)]
pub struct Json<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for Json<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let axum::Json(value) = axum::Json::<Value>::from_request(req, state).await?;

        serde_path_to_error::deserialize(value)
            .map(Json)
            .map_err(|err| {
                let path = err.path().to_string();
                AppError::ValidationError(field_errors(&path, &err.into_inner()))
            })
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::ValidationError(FieldErrors::single(BODY_FIELD, rejection.body_text()))
    }
}

/// `path` is `.` at the top level, otherwise the dotted path to the value
/// that failed.
fn field_errors(path: &str, error: &serde_json::Error) -> FieldErrors {
    let message = error.to_string();
    let at_root = path == ".";

    if let Some(field) = missing_field(&message) {
        let field = if at_root {
            field.to_string()
        } else {
            format!("{path}.{field}")
        };
        return FieldErrors::single(field, REQUIRED_MESSAGE);
    }

    let field = if at_root { BODY_FIELD } else { path };
    FieldErrors::single(field, message)
}

fn missing_field(message: &str) -> Option<&str> {
    message.strip_prefix("missing field `")?.split('`').next()
}

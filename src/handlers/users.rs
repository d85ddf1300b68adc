//! User handlers: create and list.

use crate::error::AppError;
use crate::model::{NewUser, User};
use crate::state::AppState;
use axum::{body::Bytes, extract::State, Json};
use serde_json::Value;

fn parse_new_user(body: &[u8]) -> Result<NewUser, AppError> {
    let value: Value = serde_json::from_slice(body).map_err(|e| AppError::BadRequest(e.to_string()))?;
    match value {
        Value::Null => Ok(NewUser::default()),
        Value::Object(_) => serde_json::from_value(value).map_err(|e| AppError::BadRequest(e.to_string())),
        _ => Err(AppError::BadRequest("body must be a JSON object".into())),
    }
}

/// POST /users. The body is parsed as JSON whatever its content type.
pub async fn create_user(State(state): State<AppState>, body: Bytes) -> Result<Json<User>, AppError> {
    let new_user = parse_new_user(&body)?;
    let user = state.store.create(new_user).await?;
    tracing::debug!("created user {}", user.id);
    Ok(Json(user))
}

/// GET /users. Always a JSON array, empty when there are no rows.
pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<User>>, AppError> {
    let users = state.store.list().await?;
    Ok(Json(users))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_objects_and_null() {
        assert_eq!(parse_new_user(br#"{"name":"a"}"#).unwrap().name, "a");
        assert_eq!(parse_new_user(b"{}").unwrap().name, "");
        assert_eq!(parse_new_user(b"null").unwrap().name, "");
        assert_eq!(parse_new_user(br#"{"name":null}"#).unwrap().name, "");
        assert!(matches!(parse_new_user(b"[]"), Err(AppError::BadRequest(_))));
        assert!(matches!(parse_new_user(br#"["a"]"#), Err(AppError::BadRequest(_))));
        assert!(matches!(parse_new_user(b"7"), Err(AppError::BadRequest(_))));
    }
}

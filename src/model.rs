//! The single persisted entity and its request body.

use serde::{Deserialize, Deserializer, Serialize};

/// A stored user. `id` is assigned by the store and never changes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub name: String,
}

/// Body of `POST /users`. A missing or null `name` is stored as an empty string; unknown keys
/// (a client-supplied `id` included) are ignored.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct NewUser {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

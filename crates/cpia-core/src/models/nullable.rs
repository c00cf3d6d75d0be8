//! Serde helper for fields the service may send as explicit `null`.
//!
//! `#[serde(default)]` only covers a missing key. Pair it with
//! `deserialize_with = "super::nullable::deserialize"` so `null` also falls
//! back to the type's default.

use serde::{Deserialize, Deserializer};

pub fn deserialize<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

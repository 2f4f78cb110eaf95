use serde::{Deserialize, Deserializer};

pub mod article;
pub mod rating;
pub mod user;

pub use article::{Article, ArticleId, CatalogPosition, Keywords};
pub use rating::Rating;
pub use user::User;

/// Integer field that older imports stored as text (CSV ingestion wrote every column as a string)
#[derive(Deserialize)]
#[serde(untagged)]
enum LenientInt {
    Int(i64),
    Float(f64),
    Text(String),
}

impl LenientInt {
    fn into_i64<E: serde::de::Error>(self) -> Result<i64, E> {
        match self {
            LenientInt::Int(value) => Ok(value),
            LenientInt::Float(value) if value.fract() == 0.0 => Ok(value as i64),
            LenientInt::Float(value) => Err(E::custom(format!("expected integer, got {}", value))),
            LenientInt::Text(text) => text
                .trim()
                .parse::<i64>()
                .map_err(|_| E::custom(format!("expected integer, got {:?}", text))),
        }
    }
}

pub(crate) fn lenient_i64<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    LenientInt::deserialize(deserializer)?.into_i64()
}

/// Like [`lenient_i64`] but tolerates null and empty strings
pub(crate) fn lenient_i64_or_zero<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<LenientInt>::deserialize(deserializer)? {
        None => Ok(0),
        Some(LenientInt::Text(text)) if text.trim().is_empty() => Ok(0),
        Some(value) => value.into_i64(),
    }
}

/// Empty strings are how guest accounts spell "no value"
pub(crate) fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}

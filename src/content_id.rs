//! Client-facing content identifiers.
//!
//! Movies and series are exposed as `m_<id>` and `s_<id>`. Storage only ever
//! sees the bare integer key: every id that arrives from a client passes
//! through [`parse`] first, every movie/series id leaving the API passes
//! through [`format`].

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Kind of catalog entry an identifier refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Movie,
    Series,
}

impl ContentKind {
    pub fn prefix(self) -> &'static str {
        match self {
            ContentKind::Movie => "m",
            ContentKind::Series => "s",
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentKind::Movie => write!(f, "movie"),
            ContentKind::Series => write!(f, "series"),
        }
    }
}

/// `format(Movie, 7) == "m_7"`
pub fn format(kind: ContentKind, id: i32) -> String {
    format!("{}_{}", kind.prefix(), id)
}

/// Strips a known prefix. Input without one is returned unchanged, so bare
/// ids pass through.
pub fn parse(formatted: &str) -> &str {
    let trimmed = formatted.trim();
    trimmed
        .strip_prefix("m_")
        .or_else(|| trimmed.strip_prefix("s_"))
        .unwrap_or(trimmed)
}

/// [`parse`] followed by an integer parse. Negative ids are rejected.
pub fn parse_numeric(formatted: &str) -> Option<i32> {
    parse(formatted).parse::<i32>().ok().filter(|id| *id >= 0)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Number(i64),
    Text(String),
}

impl RawId {
    fn resolve(self) -> Option<i32> {
        match self {
            RawId::Number(n) => i32::try_from(n).ok().filter(|id| *id >= 0),
            RawId::Text(s) => parse_numeric(&s),
        }
    }
}

/// Identifier as it may arrive in a JSON body: `7`, `"7"` or `"m_7"`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IdParam(pub i32);

impl<'de> Deserialize<'de> for IdParam {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        RawId::deserialize(deserializer)?
            .resolve()
            .map(IdParam)
            .ok_or_else(|| serde::de::Error::custom("invalid content id"))
    }
}

/// Serde helper for optional body ids: null, a missing field and an empty
/// string all mean "not given".
pub fn optional_id<'de, D>(deserializer: D) -> Result<Option<IdParam>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<RawId>::deserialize(deserializer)? {
        None => Ok(None),
        Some(RawId::Text(s)) if s.trim().is_empty() => Ok(None),
        Some(raw) => raw
            .resolve()
            .map(|id| Some(IdParam(id)))
            .ok_or_else(|| serde::de::Error::custom("invalid content id")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format() {
        assert_eq!(format(ContentKind::Movie, 7), "m_7");
        assert_eq!(format(ContentKind::Series, 42), "s_42");
        assert_eq!(format(ContentKind::Movie, 0), "m_0");
    }

    #[test]
    fn test_parse_inverts_format() {
        for kind in [ContentKind::Movie, ContentKind::Series] {
            for id in [0, 1, 9, 10, 12345, i32::MAX] {
                assert_eq!(parse(&format(kind, id)), id.to_string());
                assert_eq!(parse_numeric(&format(kind, id)), Some(id));
            }
        }
    }

    #[test]
    fn test_parse_is_idempotent_on_bare_ids() {
        assert_eq!(parse("15"), "15");
        assert_eq!(parse(parse("m_15")), "15");
        assert_eq!(parse_numeric("15"), Some(15));
    }

    #[test]
    fn test_parse_leaves_unknown_prefixes() {
        assert_eq!(parse("x_3"), "x_3");
        assert_eq!(parse_numeric("x_3"), None);
        assert_eq!(parse_numeric(""), None);
        assert_eq!(parse_numeric("m_-4"), None);
    }

    #[test]
    fn test_id_param_accepts_numbers_and_strings() {
        let ids: Vec<IdParam> = serde_json::from_str(r#"[7, "8", "m_9", "s_10"]"#).unwrap();
        assert_eq!(ids, vec![IdParam(7), IdParam(8), IdParam(9), IdParam(10)]);

        assert!(serde_json::from_str::<IdParam>(r#""abc""#).is_err());
        assert!(serde_json::from_str::<IdParam>("-1").is_err());
    }

    #[test]
    fn test_optional_id_treats_blank_as_missing() {
        #[derive(Deserialize)]
        struct Body {
            #[serde(default, deserialize_with = "optional_id")]
            content_id: Option<IdParam>,
        }

        let parsed = |json: &str| serde_json::from_str::<Body>(json).map(|b| b.content_id);
        assert_eq!(parsed(r#"{"content_id":7}"#).unwrap(), Some(IdParam(7)));
        assert_eq!(parsed(r#"{"content_id":"s_7"}"#).unwrap(), Some(IdParam(7)));
        assert_eq!(parsed(r#"{"content_id":""}"#).unwrap(), None);
        assert_eq!(parsed(r#"{"content_id":null}"#).unwrap(), None);
        assert_eq!(parsed("{}").unwrap(), None);
        assert!(parsed(r#"{"content_id":"m_abc"}"#).is_err());
    }
}

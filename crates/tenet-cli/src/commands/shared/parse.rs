use std::str::FromStr;

use chrono::{DateTime, Utc};
use tenet_core::enums::UnknownVariant;

/// Parse a closed enum from its storage tag, accepting `-` for `_`.
pub fn parse_enum<T>(raw: &str) -> anyhow::Result<T>
where
    T: FromStr<Err = UnknownVariant>,
{
    Ok(raw.replace('-', "_").parse::<T>()?)
}

pub fn parse_opt_enum<T>(raw: Option<&str>) -> anyhow::Result<Option<T>>
where
    T: FromStr<Err = UnknownVariant>,
{
    raw.map(parse_enum).transpose()
}

/// Parse an RFC 3339 timestamp into UTC.
pub fn parse_timestamp(raw: &str) -> anyhow::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|error| anyhow::anyhow!("invalid timestamp '{raw}': {error}"))
}

/// Flag value for a nullable field: absent leaves it alone, an empty string
/// clears it.
pub fn clearable(raw: Option<&str>) -> Option<Option<String>> {
    raw.map(|value| (!value.is_empty()).then(|| value.to_string()))
}

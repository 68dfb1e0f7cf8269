use std::str::FromStr;

use anyhow::{Context, Result};

use crate::model::{Scale, Tier};

pub const IMPORTANCE_ENV: &str = "WIKIGATE_IMPORTANCE";
pub const SCALE_ENV: &str = "WIKIGATE_SCALE";

/// CLI flag first, then `WIKIGATE_IMPORTANCE`. An unknown name is an error.
pub fn resolve_tier_override(flag: Option<Tier>) -> Result<Option<Tier>> {
    match flag {
        Some(tier) => Ok(Some(tier)),
        None => parse_override::<Tier>(std::env::var(IMPORTANCE_ENV).ok().as_deref())
            .with_context(|| format!("invalid {IMPORTANCE_ENV}")),
    }
}

/// CLI flag first, then `WIKIGATE_SCALE`. An unknown name is an error.
pub fn resolve_scale_override(flag: Option<Scale>) -> Result<Option<Scale>> {
    match flag {
        Some(scale) => Ok(Some(scale)),
        None => parse_override::<Scale>(std::env::var(SCALE_ENV).ok().as_deref())
            .with_context(|| format!("invalid {SCALE_ENV}")),
    }
}

pub fn parse_override<T>(raw: Option<&str>) -> Result<Option<T>>
where
    T: FromStr<Err = anyhow::Error>,
{
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value.parse::<T>().map(Some),
    }
}

#[cfg(test)]
mod tests {
    use super::parse_override;
    use crate::model::{Scale, Tier};

    #[test]
    fn parse_override_accepts_mixed_case_names() {
        let tier = parse_override::<Tier>(Some("HIGH")).expect("tier should parse");
        assert_eq!(tier, Some(Tier::High));

        let scale = parse_override::<Scale>(Some(" large ")).expect("scale should parse");
        assert_eq!(scale, Some(Scale::Large));
    }

    #[test]
    fn parse_override_treats_missing_or_blank_as_unset() {
        assert_eq!(parse_override::<Tier>(None).expect("unset"), None);
        assert_eq!(parse_override::<Scale>(Some("  ")).expect("blank"), None);
    }

    #[test]
    fn parse_override_rejects_unknown_names() {
        let error = parse_override::<Tier>(Some("critical"))
            .expect_err("unknown tier should fail fast");
        assert!(
            error.to_string().contains("unknown importance tier 'critical'"),
            "unexpected error: {error}"
        );

        let error =
            parse_override::<Scale>(Some("huge")).expect_err("unknown scale should fail fast");
        assert!(
            error.to_string().contains("unknown corpus scale 'huge'"),
            "unexpected error: {error}"
        );
    }
}

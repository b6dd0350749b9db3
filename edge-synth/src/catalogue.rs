use crate::SetupType;

pub const ONE_YEAR: &str = "31536000s";
pub const ONE_DAY: &str = "86400s";
pub const TWO_SECONDS: &str = "2s";

/// Position of a rule in the dual-token chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenRole {
    /// Validates the short-lived token and mints the long-lived one.
    Master,
    /// Validates short or long, propagates long.
    Child,
    /// Validates the long-lived token only.
    Segment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleTemplate {
    pub description: &'static str,
    pub pattern: &'static str,
    pub default_ttl: &'static str,
    pub priority: u32,
    pub role: Option<TokenRole>,
}

const fn rule(
    description: &'static str,
    pattern: &'static str,
    default_ttl: &'static str,
    priority: u32,
    role: Option<TokenRole>,
) -> RuleTemplate {
    RuleTemplate {
        description,
        pattern,
        default_ttl,
        priority,
        role,
    }
}

pub const VOD_RULES: &[RuleTemplate] = &[
    rule("Master Manifest", "/**/manifest.m3u8", ONE_YEAR, 1, Some(TokenRole::Master)),
    rule("Child Playlist", "/**.m3u8", ONE_YEAR, 2, Some(TokenRole::Child)),
    rule("TS Chunks", "/**.ts", ONE_YEAR, 3, Some(TokenRole::Segment)),
    rule("DASH Manifest", "/**/manifest.mpd", ONE_YEAR, 47, None),
    rule("DASH Segments (m4s)", "/**.m4s", ONE_YEAR, 48, None),
    rule("DASH Segments (mp4)", "/**.mp4", ONE_YEAR, 49, None),
    rule("All Other", "/**", ONE_YEAR, 100, None),
];

pub const LIVE_RULES: &[RuleTemplate] = &[
    rule("Live Master Manifest", "/**/manifest.m3u8", ONE_DAY, 1, Some(TokenRole::Master)),
    rule("Live Child Playlist", "/**.m3u8", TWO_SECONDS, 2, Some(TokenRole::Child)),
    rule("Live Media Chunks", "/**.ts", ONE_YEAR, 3, Some(TokenRole::Segment)),
    rule("Live DASH Manifest", "/**/manifest.mpd", TWO_SECONDS, 47, None),
    rule("Live DASH Segments (m4s)", "/**.m4s", ONE_YEAR, 48, None),
    rule("Live DASH Segments (mp4)", "/**.mp4", ONE_YEAR, 49, None),
];

pub fn catalogue(setup_type: SetupType) -> &'static [RuleTemplate] {
    match setup_type {
        SetupType::Vod => VOD_RULES,
        SetupType::Live => LIVE_RULES,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn priorities_are_unique_and_ascending() {
        for rules in [VOD_RULES, LIVE_RULES] {
            let priorities: Vec<u32> = rules.iter().map(|r| r.priority).collect();
            let unique: HashSet<u32> = priorities.iter().copied().collect();
            assert_eq!(unique.len(), priorities.len());
            assert!(priorities.windows(2).all(|w| w[0] < w[1]));
        }
    }

    #[test]
    fn each_catalogue_has_one_rule_per_token_role() {
        for rules in [VOD_RULES, LIVE_RULES] {
            for role in [TokenRole::Master, TokenRole::Child, TokenRole::Segment] {
                assert_eq!(rules.iter().filter(|r| r.role == Some(role)).count(), 1);
            }
        }
    }
}

//! Value-level cleanup applied to cells read out of an RRA grid.
//!
//! # Vocabularies
//!
//! - Risk levels (impact, probability, control need) come from a fixed
//!   dropdown in the templates, so they are validated by exact,
//!   case-sensitive membership.
//! - Data classification labels were free text for years and carry many
//!   spellings, so they are normalized case-insensitively onto
//!   `PUBLIC`, `INTERNAL`, `RESTRICTED`, `SECRET` and `UNKNOWN`.

/// Fallback for any value that is not in the allowed vocabulary.
pub const UNKNOWN: &str = "Unknown";

/// Return `value` if it is one of `allowed`, otherwise [`UNKNOWN`].
///
/// Trailing newlines are dropped before the comparison. The comparison is
/// case-sensitive: `"high"` is not `"HIGH"`.
pub fn validate_entry<S: AsRef<str>>(value: &str, allowed: &[S]) -> String {
    let value = value.trim_end_matches(['\n', '\r']);
    if allowed.iter().any(|a| a.as_ref() == value) {
        value.to_string()
    } else {
        UNKNOWN.to_string()
    }
}

/// Split on commas, trim each piece, drop empty pieces.
///
/// `"alice, bob,,\ncarol "` → `["alice", "bob", "carol"]`
pub fn comma_tokenize(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|piece| piece.trim())
        .filter(|piece| !piece.is_empty())
        .map(str::to_string)
        .collect()
}

/// Best guess at a team name from an ownership cell.
///
/// Ownership cells tend to read `"Team, contact person, other notes"`; the
/// team is the first clause. Returns the input unchanged if that clause is
/// empty.
pub fn fuzzy_team_name(value: &str) -> String {
    let first = value.trim().split(',').next().unwrap_or_default().trim();
    if first.is_empty() {
        value.to_string()
    } else {
        first.to_string()
    }
}

const INTERNAL_SPELLINGS: &[&str] = &[
    "INTERNAL",
    "CONFIDENTIAL INTERNAL",
    "STAFF",
    "NDA",
    "MOZILLA CONFIDENTIAL - STAFF AND NDA'D MOZILLIANS ONLY",
];

const RESTRICTED_SPELLINGS: &[&str] = &[
    "RESTRICTED",
    "CONFIDENTIAL RESTRICTED",
    "WORKGROUP",
    "WORK GROUP",
    "MOZILLA CONFIDENTIAL - SPECIFIC WORK GROUPS ONLY",
    "MOZILLA CONFIDENTIAL WORK GROUPS ONLY",
];

const SECRET_SPELLINGS: &[&str] = &[
    "SECRET",
    "CONFIDENTIAL SECRET",
    "INDIVIDUAL",
    "MOZILLA CONFIDENTIAL - SPECIFIC INDIVIDUALS ONLY",
    "MOZILLA CONFIDENTIAL INDIVIDUAL ONLY",
];

/// Map a historical data classification spelling onto its canonical level.
///
/// Input is matched case-insensitively after trimming. Spellings not in the
/// table are returned unchanged; callers filter against the configured
/// data levels afterwards, so an unmapped label is dropped there rather
/// than here. Must be kept in sync with the configured data levels.
pub fn normalize_data_level(value: &str) -> String {
    let level = value.trim().to_uppercase();
    let canonical = match level.as_str() {
        "UNKNOWN" => "UNKNOWN",
        "PUBLIC" => "PUBLIC",
        l if INTERNAL_SPELLINGS.contains(&l) => "INTERNAL",
        l if RESTRICTED_SPELLINGS.contains(&l) => "RESTRICTED",
        l if SECRET_SPELLINGS.contains(&l) => "SECRET",
        _ => return value.to_string(),
    };
    canonical.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const RISK: &[&str] = &["MAXIMUM", "HIGH", "MEDIUM", "LOW", "UNKNOWN"];

    #[test]
    fn validate_accepts_members() {
        for v in RISK {
            assert_eq!(validate_entry(v, RISK), *v);
        }
    }

    #[test]
    fn validate_rejects_non_members() {
        assert_eq!(validate_entry("", RISK), UNKNOWN);
        assert_eq!(validate_entry("Very High", RISK), UNKNOWN);
        assert_eq!(validate_entry(" HIGH", RISK), UNKNOWN);
    }

    #[test]
    fn validate_is_case_sensitive() {
        assert_eq!(validate_entry("high", RISK), UNKNOWN);
        assert_eq!(validate_entry("High", RISK), UNKNOWN);
    }

    #[test]
    fn validate_trims_trailing_newline() {
        assert_eq!(validate_entry("HIGH\n", RISK), "HIGH");
    }

    #[test]
    fn validate_accepts_owned_vocabularies() {
        let allowed = vec!["LOW".to_string()];
        assert_eq!(validate_entry("LOW", &allowed), "LOW");
        assert_eq!(validate_entry("HIGH", &allowed), UNKNOWN);
    }

    #[test]
    fn comma_tokenize_basic() {
        assert_eq!(
            comma_tokenize("alice, bob,,\ncarol "),
            vec!["alice", "bob", "carol"]
        );
    }

    #[test]
    fn comma_tokenize_drops_whitespace_only_pieces() {
        assert!(comma_tokenize("").is_empty());
        assert!(comma_tokenize(" , ,\n").is_empty());
        assert_eq!(comma_tokenize("solo"), vec!["solo"]);
    }

    #[test]
    fn fuzzy_team_name_takes_first_clause() {
        assert_eq!(fuzzy_team_name("Cloud Services, jdoe, see wiki"), "Cloud Services");
        assert_eq!(fuzzy_team_name("  Identity  "), "Identity");
        assert_eq!(fuzzy_team_name("Web Team , bob"), "Web Team");
    }

    #[test]
    fn fuzzy_team_name_falls_back_to_input() {
        assert_eq!(fuzzy_team_name(""), "");
        assert_eq!(fuzzy_team_name(", bob"), ", bob");
        assert_eq!(fuzzy_team_name("   "), "   ");
    }

    #[test]
    fn data_level_table() {
        assert_eq!(normalize_data_level("Confidential Internal"), "INTERNAL");
        assert_eq!(normalize_data_level("staff"), "INTERNAL");
        assert_eq!(normalize_data_level("NDA"), "INTERNAL");
        assert_eq!(normalize_data_level("work group"), "RESTRICTED");
        assert_eq!(
            normalize_data_level("Mozilla Confidential - Specific Work Groups Only"),
            "RESTRICTED"
        );
        assert_eq!(normalize_data_level("Individual"), "SECRET");
        assert_eq!(normalize_data_level("public"), "PUBLIC");
        assert_eq!(normalize_data_level("Unknown"), "UNKNOWN");
    }

    #[test]
    fn data_level_passes_unmapped_values_through() {
        assert_eq!(normalize_data_level("Top Secret-ish"), "Top Secret-ish");
        assert_eq!(normalize_data_level(""), "");
    }

    #[test]
    fn data_level_is_idempotent() {
        let inputs = INTERNAL_SPELLINGS
            .iter()
            .chain(RESTRICTED_SPELLINGS)
            .chain(SECRET_SPELLINGS)
            .chain(&["PUBLIC", "UNKNOWN", "public", "staff", "unmapped"]);
        for x in inputs {
            let once = normalize_data_level(x);
            assert_eq!(normalize_data_level(&once), once, "input {x:?}");
        }
    }
}

//! Reading engine inputs from JSON and plain-text files
//!
//! Transactions and rules arrive as JSON arrays; noise filters as a text
//! file with one filter per line (`#` starts a comment line).

use std::collections::HashSet;
use std::fs;
use std::io::Read;
use std::path::Path;

use crate::error::{Error, Result};
use crate::models::{CategorizationRule, RawTransaction};

/// Parse a JSON array of transactions
///
/// Transactions without an id are numbered from 1 in file order. Explicit
/// ids must be unique.
pub fn parse_transactions<R: Read>(reader: R) -> Result<Vec<RawTransaction>> {
    let mut transactions: Vec<RawTransaction> = serde_json::from_reader(reader)?;

    let mut seen = HashSet::new();
    for tx in transactions.iter().filter(|tx| tx.id != 0) {
        if !seen.insert(tx.id) {
            return Err(Error::InvalidData(format!(
                "Duplicate transaction id: {}",
                tx.id
            )));
        }
    }

    let mut next_id = 1;
    for tx in transactions.iter_mut().filter(|tx| tx.id == 0) {
        while seen.contains(&next_id) {
            next_id += 1;
        }
        tx.id = next_id;
        seen.insert(next_id);
    }

    Ok(transactions)
}

/// Parse a JSON array of rules, preserving their order
pub fn parse_rules<R: Read>(reader: R) -> Result<Vec<CategorizationRule>> {
    Ok(serde_json::from_reader(reader)?)
}

/// Parse noise filters, one per line
pub fn parse_noise_filters(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

pub fn load_transactions(path: &Path) -> Result<Vec<RawTransaction>> {
    parse_transactions(fs::File::open(path)?)
}

pub fn load_rules(path: &Path) -> Result<Vec<CategorizationRule>> {
    parse_rules(fs::File::open(path)?)
}

pub fn load_noise_filters(path: &Path) -> Result<Vec<String>> {
    Ok(parse_noise_filters(&fs::read_to_string(path)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MatchMode, RecurrenceInterval};

    #[test]
    fn test_parse_transactions_assigns_missing_ids() {
        let json = r#"[
            {"source_text": "NETFLIX.COM", "date": "2024-01-01", "amount": -99},
            {"id": 1, "source_text": "SPOTIFY", "date": "2024-01-02", "amount": -59},
            {"source_text": "NETTO", "date": "2024-01-03", "amount": -200.5}
        ]"#;
        let transactions = parse_transactions(json.as_bytes()).unwrap();
        let ids: Vec<i64> = transactions.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![2, 1, 3]);
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let json = r#"[
            {"id": 4, "source_text": "A", "date": "2024-01-01", "amount": 1},
            {"id": 4, "source_text": "B", "date": "2024-01-01", "amount": 1}
        ]"#;
        assert!(matches!(
            parse_transactions(json.as_bytes()),
            Err(Error::InvalidData(_))
        ));
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        assert!(matches!(
            parse_transactions("{".as_bytes()),
            Err(Error::Json(_))
        ));
    }

    #[test]
    fn test_parse_rules_defaults() {
        let json = r#"[
            {"raw_pattern": "uber", "target_category": "Transport"},
            {"clean_display_name": "Netflix", "target_category": "Entertainment",
             "match_mode": "exact", "recurrence_interval": "Monthly", "auto_complete": true}
        ]"#;
        let rules = parse_rules(json.as_bytes()).unwrap();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].match_mode, MatchMode::Fuzzy);
        assert_eq!(rules[0].recurrence_interval, None);
        assert_eq!(rules[0].default_planned_flag, None);
        assert_eq!(rules[1].match_mode, MatchMode::Exact);
        assert_eq!(
            rules[1].recurrence_interval,
            Some(RecurrenceInterval::Monthly)
        );
    }

    #[test]
    fn test_parse_noise_filters() {
        let filters = parse_noise_filters("# anti-rules\nNOTA\n\n  city  \n#skip\n");
        assert_eq!(filters, vec!["NOTA".to_string(), "city".to_string()]);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            load_rules(&dir.path().join("rules.json")),
            Err(Error::Io(_))
        ));
    }
}

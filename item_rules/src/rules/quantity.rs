//! Numeric extraction from matched text.

use regex::{Captures, Regex};
use std::collections::BTreeMap;
use std::sync::OnceLock;

/// Named captures collected while matching a signal.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Bindings(BTreeMap<String, String>);

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect every named group that participated in the match.
    pub fn from_captures(pattern: &Regex, captures: &Captures<'_>) -> Self {
        let mut bindings = Self::new();
        for name in pattern.capture_names().flatten() {
            if let Some(value) = captures.name(name) {
                bindings.insert(name, value.as_str());
            }
        }
        bindings
    }

    pub fn insert(&mut self, name: &str, value: &str) {
        self.0.insert(name.to_string(), value.to_string());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// Merge another set of bindings; values in `other` win.
    pub fn merge(&mut self, other: Bindings) {
        self.0.extend(other.0);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Where an effect's numeric value comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Quantity {
    Fixed(i64),
    /// A named capture group, parsed with [`parse_amount`].
    Captured(String),
}

impl Quantity {
    pub fn captured(group: &str) -> Self {
        Quantity::Captured(group.to_string())
    }
}

/// Parse a game-text amount: digits with optional thousands separators, or
/// the literal word "one".
pub fn parse_amount(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    if trimmed.eq_ignore_ascii_case("one") || trimmed.eq_ignore_ascii_case("an") {
        return Some(1);
    }
    let digits: String = trimmed.chars().filter(|c| *c != ',').collect();
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

fn quantity_list_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)(?P<amount>one|\d[\d,]*)\s*x\s+(?P<name>[^,]+?)\s*(?:,|\.?$)")
            .expect("quantity list pattern is valid")
    })
}

/// Parse a text-only quantity report such as
/// `"10 x Grimy ranarr, 3 x Grimy toadflax"` into `(amount, name)` pairs.
pub fn parse_quantity_list(text: &str) -> Vec<(i64, String)> {
    quantity_list_pattern()
        .captures_iter(text)
        .filter_map(|caps| {
            let amount = parse_amount(caps.name("amount")?.as_str())?;
            let name = caps.name("name")?.as_str().trim().to_string();
            Some((amount, name))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("one"), Some(1));
        assert_eq!(parse_amount("One"), Some(1));
        assert_eq!(parse_amount("1,234"), Some(1234));
        assert_eq!(parse_amount(" 42 "), Some(42));
        assert_eq!(parse_amount("12a"), None);
        assert_eq!(parse_amount(""), None);
    }

    #[test]
    fn test_parse_quantity_list() {
        let parsed = parse_quantity_list("10 x Grimy ranarr, 3 x Grimy toadflax.");
        assert_eq!(
            parsed,
            vec![
                (10, "Grimy ranarr".to_string()),
                (3, "Grimy toadflax".to_string())
            ]
        );
    }

    #[test]
    fn test_parse_quantity_list_thousands() {
        let parsed = parse_quantity_list("1,234 x Adamant dart");
        assert_eq!(parsed, vec![(1234, "Adamant dart".to_string())]);
    }

    #[test]
    fn test_bindings_from_captures() {
        let pattern = Regex::new(r"has (?P<charges>[\d,]+) charges(?P<unused> left)?").unwrap();
        let caps = pattern.captures("has 1,000 charges").unwrap();
        let bindings = Bindings::from_captures(&pattern, &caps);
        assert_eq!(bindings.get("charges"), Some("1,000"));
        assert_eq!(bindings.get("unused"), None);
    }
}

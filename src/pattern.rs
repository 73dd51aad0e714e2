use chrono::NaiveDate;
use std::fmt;
use std::str::FromStr;

/// Long localized date, e.g. `March 5, 2023`.
pub const DEFAULT_PATTERN: &str = "LL";

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PatternError {
    #[error("date pattern is empty")]
    Empty,
    #[error("unterminated [literal] in date pattern: {0}")]
    UnterminatedLiteral(String),
    #[error("date pattern {0:?} needs a year and either month and day or day of year")]
    Incomplete(String),
}

/// A moment-style date pattern (`YYYY-MM-DD`, `LL`, ...) compiled to a
/// chrono format string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatePattern {
    source: String,
    strftime: String,
}

#[derive(Default)]
struct Fields {
    year: bool,
    month: bool,
    day: bool,
    ordinal: bool,
}

// Longest tokens first so `MMMM` wins over `MM`.
const TOKENS: &[(&str, &str)] = &[
    ("YYYY", "%Y"),
    ("YY", "%y"),
    ("MMMM", "%B"),
    ("MMM", "%b"),
    ("MM", "%m"),
    ("M", "%-m"),
    ("DDDD", "%j"),
    ("DD", "%d"),
    ("D", "%-d"),
    ("dddd", "%A"),
    ("ddd", "%a"),
];

const MACROS: &[(&str, &str)] = &[
    ("LL", "MMMM D, YYYY"),
    ("ll", "MMM D, YYYY"),
    ("L", "MM/DD/YYYY"),
];

impl DatePattern {
    pub fn new(pattern: &str) -> Result<Self, PatternError> {
        if pattern.trim().is_empty() {
            return Err(PatternError::Empty);
        }
        let expanded = expand_macros(pattern);
        let mut strftime = String::with_capacity(expanded.len() * 2);
        let mut fields = Fields::default();
        let mut rest = expanded.as_str();
        'outer: while !rest.is_empty() {
            if let Some(literal) = rest.strip_prefix('[') {
                let end = literal
                    .find(']')
                    .ok_or_else(|| PatternError::UnterminatedLiteral(pattern.to_string()))?;
                push_literal(&mut strftime, &literal[..end]);
                rest = &literal[end + 1..];
                continue;
            }
            for (token, directive) in TOKENS {
                if let Some(tail) = rest.strip_prefix(token) {
                    match token.chars().next() {
                        Some('Y') => fields.year = true,
                        Some('M') => fields.month = true,
                        Some('D') if *token == "DDDD" => fields.ordinal = true,
                        Some('D') => fields.day = true,
                        _ => {}
                    }
                    strftime.push_str(directive);
                    rest = tail;
                    continue 'outer;
                }
            }
            let mut chars = rest.chars();
            if let Some(ch) = chars.next() {
                push_literal(&mut strftime, ch.encode_utf8(&mut [0; 4]));
            }
            rest = chars.as_str();
        }
        if !fields.year || !((fields.month && fields.day) || fields.ordinal) {
            return Err(PatternError::Incomplete(pattern.to_string()));
        }
        Ok(DatePattern {
            source: pattern.to_string(),
            strftime,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn format(&self, date: NaiveDate) -> String {
        date.format(&self.strftime).to_string()
    }

    /// Returns `None` for anything that does not match the pattern exactly
    /// (surrounding whitespace aside).
    pub fn parse(&self, text: &str) -> Option<NaiveDate> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return None;
        }
        NaiveDate::parse_from_str(trimmed, &self.strftime).ok()
    }
}

impl Default for DatePattern {
    fn default() -> Self {
        DatePattern {
            source: DEFAULT_PATTERN.to_string(),
            strftime: "%B %-d, %Y".to_string(),
        }
    }
}

impl FromStr for DatePattern {
    type Err = PatternError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DatePattern::new(s)
    }
}

impl fmt::Display for DatePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

fn expand_macros(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len());
    let mut rest = pattern;
    'outer: while !rest.is_empty() {
        if let Some(literal) = rest.strip_prefix('[') {
            // Copy bracketed text untouched; an unterminated one is reported later.
            match literal.find(']') {
                Some(end) => {
                    out.push_str(&rest[..end + 2]);
                    rest = &literal[end + 1..];
                }
                None => {
                    out.push_str(rest);
                    rest = "";
                }
            }
            continue;
        }
        for (name, body) in MACROS {
            if let Some(tail) = rest.strip_prefix(name) {
                out.push_str(body);
                rest = tail;
                continue 'outer;
            }
        }
        let mut chars = rest.chars();
        if let Some(ch) = chars.next() {
            out.push(ch);
        }
        rest = chars.as_str();
    }
    out
}

fn push_literal(out: &mut String, text: &str) {
    for ch in text.chars() {
        if ch == '%' {
            out.push_str("%%");
        } else {
            out.push(ch);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn default_pattern_is_long_format() {
        let pattern = DatePattern::default();
        assert_eq!(pattern, DatePattern::new("LL").unwrap());
        assert_eq!(pattern.format(ymd(2023, 3, 5)), "March 5, 2023");
        assert_eq!(pattern.parse("March 5, 2023"), Some(ymd(2023, 3, 5)));
    }

    #[test]
    fn iso_like_pattern() {
        let pattern = DatePattern::new("YYYY-MM-DD").unwrap();
        assert_eq!(pattern.format(ymd(2024, 2, 29)), "2024-02-29");
        assert_eq!(pattern.parse(" 2024-02-29 "), Some(ymd(2024, 2, 29)));
        assert_eq!(pattern.parse("2023-02-29"), None);
        assert_eq!(pattern.parse("2024-13-40"), None);
    }

    #[test]
    fn round_trips_across_patterns() {
        let dates = [ymd(1999, 12, 31), ymd(2000, 1, 1), ymd(2024, 2, 29), ymd(2031, 7, 4)];
        for source in ["YYYY-MM-DD", "LL", "L", "ll", "dddd, D MMMM YYYY", "YYYY/DDDD", "DD.MM.YYYY"] {
            let pattern = DatePattern::new(source).unwrap();
            for date in dates {
                let text = pattern.format(date);
                assert_eq!(pattern.parse(&text), Some(date), "{source}: {text}");
            }
        }
    }

    #[test]
    fn literals_and_percent_are_escaped() {
        let pattern = DatePattern::new("[Day] D [of] MMMM YYYY 100%").unwrap();
        let date = ymd(2023, 3, 15);
        assert_eq!(pattern.format(date), "Day 15 of March 2023 100%");
        assert_eq!(pattern.parse("Day 15 of March 2023 100%"), Some(date));
    }

    #[test]
    fn garbage_never_parses() {
        let pattern = DatePattern::new("YYYY-MM-DD").unwrap();
        for text in ["", "   ", "tomorrow", "2024-01", "2024-01-01x", "01-01-2024", "💥"] {
            assert_eq!(pattern.parse(text), None, "{text:?}");
        }
    }

    #[test]
    fn rejects_bad_patterns() {
        assert_eq!(DatePattern::new(""), Err(PatternError::Empty));
        assert_eq!(
            DatePattern::new("YYYY-MM"),
            Err(PatternError::Incomplete("YYYY-MM".into()))
        );
        assert!(matches!(
            DatePattern::new("[YYYY-MM-DD"),
            Err(PatternError::UnterminatedLiteral(_))
        ));
    }
}

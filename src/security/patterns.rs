//! Threat patterns for rule-based detection.
//!
//! Contains regex patterns for the two detector groups:
//! - SQL injection
//! - Cross-site scripting (XSS)
//!
//! Each group is an ordered table; detection short-circuits on the first
//! matching pattern of the group.

use lazy_static::lazy_static;
use regex::Regex;

/// A threat detection pattern
#[derive(Debug, Clone)]
pub struct ThreatPattern {
    /// Pattern name
    pub name: &'static str,
    /// Regex pattern
    pub pattern: &'static str,
    /// Detector group
    pub group: PatternGroup,
    /// Description
    pub description: &'static str,
}

/// Detector groups
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternGroup {
    /// SQL injection
    SqlInjection,
    /// Cross-site scripting
    Xss,
}

impl std::fmt::Display for PatternGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PatternGroup::SqlInjection => write!(f, "sql_injection"),
            PatternGroup::Xss => write!(f, "xss"),
        }
    }
}

/// SQL injection patterns
pub static SQL_INJECTION_PATTERNS: &[ThreatPattern] = &[
    ThreatPattern {
        name: "sql_comment",
        pattern: r"--|/\*|\*/",
        group: PatternGroup::SqlInjection,
        description: "SQL comment marker",
    },
    ThreatPattern {
        name: "sql_keyword",
        pattern: r"(?i)\b(select|insert|update|delete|drop|create|alter|exec|execute|union|truncate)\b",
        group: PatternGroup::SqlInjection,
        description: "SQL statement keyword",
    },
    ThreatPattern {
        name: "sql_metachar",
        pattern: r"['|\\]|%27",
        group: PatternGroup::SqlInjection,
        description: "Quote, pipe or backslash",
    },
    ThreatPattern {
        name: "sql_system_function",
        pattern: r"(?i)\b(xp|sp)_\w+",
        group: PatternGroup::SqlInjection,
        description: "Extended or system stored procedure",
    },
    ThreatPattern {
        name: "boolean_bypass",
        pattern: r#"(?i)\b(or|and)\s+['"]?\w+['"]?\s*=\s*['"]?\w+"#,
        group: PatternGroup::SqlInjection,
        description: "Tautology used to bypass a WHERE clause",
    },
];

/// XSS patterns
pub static XSS_PATTERNS: &[ThreatPattern] = &[
    ThreatPattern {
        name: "script_tag",
        pattern: r"(?i)<\s*/?\s*script\b",
        group: PatternGroup::Xss,
        description: "Script element",
    },
    ThreatPattern {
        name: "embedded_content_tag",
        pattern: r"(?i)<\s*(iframe|object|embed)\b",
        group: PatternGroup::Xss,
        description: "Frame, object or embed element",
    },
    ThreatPattern {
        name: "javascript_uri",
        pattern: r"(?i)javascript\s*:",
        group: PatternGroup::Xss,
        description: "javascript: URI",
    },
    ThreatPattern {
        name: "event_handler",
        pattern: r"(?i)\bon[a-z]{3,}\s*=",
        group: PatternGroup::Xss,
        description: "Inline event handler attribute, in or out of a tag",
    },
];

lazy_static! {
    /// Compiled SQL injection patterns
    pub static ref SQL_INJECTION_REGEX: Vec<(Regex, &'static ThreatPattern)> = {
        SQL_INJECTION_PATTERNS
            .iter()
            .filter_map(|p| Regex::new(p.pattern).ok().map(|r| (r, p)))
            .collect()
    };

    /// Compiled XSS patterns
    pub static ref XSS_REGEX: Vec<(Regex, &'static ThreatPattern)> = {
        XSS_PATTERNS
            .iter()
            .filter_map(|p| Regex::new(p.pattern).ok().map(|r| (r, p)))
            .collect()
    };
}

/// Returns `true` if any SQL injection pattern matches.
///
/// Empty input never matches.
pub fn detect_sql_injection(input: &str) -> bool {
    !input.is_empty() && SQL_INJECTION_REGEX.iter().any(|(regex, _)| regex.is_match(input))
}

/// Returns `true` if any XSS pattern matches.
///
/// Empty input never matches.
pub fn detect_xss(input: &str) -> bool {
    !input.is_empty() && XSS_REGEX.iter().any(|(regex, _)| regex.is_match(input))
}

/// Match content against all patterns
///
/// Unlike the `detect_*` functions this does not short-circuit, so it
/// reports every pattern that fired. Used for diagnostics.
pub fn match_patterns(content: &str) -> Vec<&'static ThreatPattern> {
    let mut matches = Vec::new();

    for (regex, pattern) in SQL_INJECTION_REGEX.iter() {
        if regex.is_match(content) {
            matches.push(*pattern);
        }
    }

    for (regex, pattern) in XSS_REGEX.iter() {
        if regex.is_match(content) {
            matches.push(*pattern);
        }
    }

    matches
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_patterns_compile() {
        assert_eq!(SQL_INJECTION_REGEX.len(), SQL_INJECTION_PATTERNS.len());
        assert_eq!(XSS_REGEX.len(), XSS_PATTERNS.len());
    }

    #[test]
    fn test_sql_injection_detection() {
        assert!(detect_sql_injection("'; DROP TABLE users; --"));
        assert!(detect_sql_injection("1 OR 1=1"));
        assert!(detect_sql_injection("admin' --"));
        assert!(detect_sql_injection("EXEC xp_cmdshell 'dir'"));
        assert!(detect_sql_injection("a UNION SELECT password FROM users"));
        assert!(detect_sql_injection(r"C:\path"));
    }

    #[test]
    fn test_sql_safe_content() {
        assert!(!detect_sql_injection("hello world"));
        assert!(!detect_sql_injection("user@example.com"));
        assert!(!detect_sql_injection("order 66 for pickup"));
        assert!(!detect_sql_injection(""));
    }

    #[test]
    fn test_xss_detection() {
        assert!(detect_xss("<script>alert(1)</script>"));
        assert!(detect_xss("< SCRIPT src=//evil>"));
        assert!(detect_xss("<iframe src=x>"));
        assert!(detect_xss("<embed src=x>"));
        assert!(detect_xss("JavaScript:alert(1)"));
        assert!(detect_xss("<img src=x onerror=alert(1)>"));
    }

    #[test]
    fn test_event_handler_without_tag() {
        // Breaking out of a quoted attribute value needs no `<`
        assert!(detect_xss(r#"" onmouseover="alert(1)"#));
        assert!(detect_xss("x' ONFOCUS =alert(1) autofocus"));
        assert!(!detect_xss("one = two"));
        assert!(!detect_xss("turn the lights on = yes"));
    }

    #[test]
    fn test_xss_safe_content() {
        assert!(!detect_xss("plain text"));
        assert!(!detect_xss("one = two"));
        assert!(!detect_xss("a < b > c"));
        assert!(!detect_xss(""));
    }

    #[test]
    fn test_match_patterns_reports_every_hit() {
        let matches = match_patterns("<script>'; DROP TABLE users; --</script>");

        let names: Vec<_> = matches.iter().map(|p| p.name).collect();
        assert!(names.contains(&"sql_comment"));
        assert!(names.contains(&"sql_keyword"));
        assert!(names.contains(&"script_tag"));
        assert!(matches.iter().any(|p| p.group == PatternGroup::SqlInjection));
        assert!(matches.iter().any(|p| p.group == PatternGroup::Xss));
    }

    #[test]
    fn test_match_patterns_safe_content() {
        assert!(match_patterns("What is the capital of France?").is_empty());
    }

    #[test]
    fn test_groups_are_consistent() {
        for pattern in SQL_INJECTION_PATTERNS {
            assert_eq!(pattern.group, PatternGroup::SqlInjection);
        }
        for pattern in XSS_PATTERNS {
            assert_eq!(pattern.group, PatternGroup::Xss);
        }
    }
}

//! Level-driven input sanitization.
//!
//! Pipeline, in order:
//!
//! 1. Level transform (`Basic` escapes, `Strict` deletes, `Paranoid` restricts)
//! 2. Custom patterns, each deleting its matches
//! 3. Truncation to `max_length`

use super::policy::{SecurityLevel, SecurityPolicy};

/// Characters deleted under [`SecurityLevel::Strict`].
pub const STRICT_DANGEROUS_CHARS: &[char] = &[
    '<', '>', '\'', '"', '&', '|', '(', ')', '{', '}', '[', ']', '\\',
];

/// Characters kept under [`SecurityLevel::Paranoid`].
///
/// ASCII letters and digits, whitespace, and `- _ . @`.
pub fn is_paranoid_safe(c: char) -> bool {
    c.is_ascii_alphanumeric() || c.is_whitespace() || matches!(c, '-' | '_' | '.' | '@')
}

/// Characters deleted under [`SecurityLevel::Strict`].
pub fn is_strict_dangerous(c: char) -> bool {
    STRICT_DANGEROUS_CHARS.contains(&c)
}

/// Sanitize `input` according to `policy`.
pub fn sanitize(input: &str, policy: &SecurityPolicy) -> String {
    let mut output = match policy.level {
        SecurityLevel::Paranoid => input.chars().filter(|c| is_paranoid_safe(*c)).collect(),
        SecurityLevel::Strict => input.chars().filter(|c| !is_strict_dangerous(*c)).collect(),
        SecurityLevel::Basic => escape(input),
    };

    for pattern in &policy.custom_patterns {
        output = pattern.strip(&output);
    }

    match policy.max_length {
        Some(max) => truncate_chars(&output, max),
        None => output,
    }
}

/// Escape in a single pass so `&` is never applied to entities produced here.
fn escape(input: &str) -> String {
    let mut output = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '\'' => output.push_str("''"),
            '"' => output.push_str("&quot;"),
            '<' => output.push_str("&lt;"),
            '>' => output.push_str("&gt;"),
            '&' => output.push_str("&amp;"),
            _ => output.push(c),
        }
    }
    output
}

/// Length in characters (Unicode scalar values).
pub fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Keep the first `max` characters of `s`.
pub fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}

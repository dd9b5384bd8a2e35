//! Shared text predicates and normalization helpers used across stages.

/// Collapse interior whitespace runs to a single space and trim the ends.
pub(crate) fn normalize_spacing(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_space = false;
    for ch in text.chars() {
        if ch.is_whitespace() {
            pending_space = !out.is_empty();
        } else {
            if pending_space {
                out.push(' ');
                pending_space = false;
            }
            out.push(ch);
        }
    }
    out
}

/// Count of substantive (alphanumeric) characters.
pub(crate) fn substantive_len(text: &str) -> usize {
    text.chars().filter(|c| c.is_alphanumeric()).count()
}

/// Count of alphabetic characters.
pub(crate) fn alpha_len(text: &str) -> usize {
    text.chars().filter(|c| c.is_alphabetic()).count()
}

/// Fraction of the text's characters that are ASCII digits (0.0 for empty).
pub(crate) fn digit_ratio(text: &str) -> f32 {
    let total = text.chars().filter(|c| !c.is_whitespace()).count();
    if total == 0 {
        return 0.0;
    }
    let digits = text.chars().filter(|c| c.is_ascii_digit()).count();
    digits as f32 / total as f32
}

/// Fraction of the alphabetic characters that are uppercase (0.0 when there
/// are none).
pub(crate) fn uppercase_ratio(text: &str) -> f32 {
    let mut alpha = 0usize;
    let mut upper = 0usize;
    for c in text.chars().filter(|c| c.is_alphabetic()) {
        alpha += 1;
        if c.is_uppercase() {
            upper += 1;
        }
    }
    if alpha == 0 { 0.0 } else { upper as f32 / alpha as f32 }
}

/// Whitespace-delimited word count.
pub(crate) fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Words that start with a lowercase letter.
pub(crate) fn lowercase_word_count(text: &str) -> usize {
    text.split_whitespace()
        .filter(|w| w.chars().next().is_some_and(|c| c.is_lowercase()))
        .count()
}

/// Capitalized name-like tokens ("Ashish", "Vaswani-Smith").
pub(crate) fn capitalized_token_count(text: &str) -> usize {
    text.split_whitespace()
        .filter(|w| {
            let mut chars = w.chars();
            chars.next().is_some_and(|c| c.is_uppercase()) && w.chars().filter(|c| c.is_alphabetic()).count() >= 2
        })
        .count()
}

/// True when the text ends a sentence: terminal `.`, `!` or `?`, allowing a
/// trailing closing quote or bracket.
pub(crate) fn ends_sentence(text: &str) -> bool {
    let trimmed = text.trim_end_matches(['"', '\u{201D}', '\'', ')', ']', '}']);
    matches!(trimmed.chars().last(), Some('.' | '!' | '?'))
}

/// A token is word-like when it carries at least one alphabetic character
/// and no math operators.
pub(crate) fn is_word_like(token: &str) -> bool {
    let has_alpha = token.chars().any(|c| c.is_alphabetic());
    let has_math = token.chars().any(is_math_symbol);
    has_alpha && !has_math
}

/// Operators and relation symbols that mark math context.
pub(crate) fn is_math_symbol(c: char) -> bool {
    matches!(
        c,
        '=' | '+'
            | '\u{2212}' // minus sign
            | '\u{00D7}' // multiplication sign
            | '\u{2211}' // n-ary summation
            | '\u{220F}' // n-ary product
            | '\u{221A}' // square root
            | '\u{2208}' // element of
            | '\u{2264}'
            | '\u{2265}'
            | '\u{2248}'
            | '\u{223C}'
            | '\u{2032}' // prime
            | '^'
            | '_'
            | '|'
            | '/'
            | '<'
            | '>'
    )
}

/// Ratio of math-ish characters (symbols, digits, greek, brackets) to all
/// non-space characters.
pub(crate) fn math_char_ratio(text: &str) -> f32 {
    let mut total = 0usize;
    let mut mathish = 0usize;
    for c in text.chars().filter(|c| !c.is_whitespace()) {
        total += 1;
        let greek = ('\u{0370}'..='\u{03FF}').contains(&c);
        if is_math_symbol(c) || c.is_ascii_digit() || greek || matches!(c, '(' | ')' | '[' | ']' | '{' | '}' | ',' | '.' | '-') {
            mathish += 1;
        }
    }
    if total == 0 { 0.0 } else { mathish as f32 / total as f32 }
}

/// Affiliation/footnote symbol markers.
pub(crate) fn is_affiliation_symbol(c: char) -> bool {
    matches!(c, '*' | '\u{2217}' | '\u{2020}' | '\u{2021}' | '\u{00A7}' | '\u{00B6}' | '#')
}

//! Post-processing that applies a `CodeStyle` to rendered sources.
//!
//! Templates are authored with four-space indentation, single-quoted string
//! literals (where the language allows a choice) and semicolons. These passes
//! convert that canonical form into the configured style.

use crate::config::{CodeStyle, QuoteStyle};

const TEMPLATE_INDENT: usize = 4;

/// Replace every leading four-space level with the configured indent unit.
pub fn reindent(source: &str, style: &CodeStyle) -> String {
    let unit = style.indent_unit();
    if unit == " ".repeat(TEMPLATE_INDENT) {
        return source.to_string();
    }
    map_lines(source, |line| {
        let spaces = line.len() - line.trim_start_matches(' ').len();
        let levels = spaces / TEMPLATE_INDENT;
        let remainder = spaces % TEMPLATE_INDENT;
        format!("{}{}{}", unit.repeat(levels), " ".repeat(remainder), &line[spaces..])
    })
}

/// Strip statement-ending semicolons when the style disables them.
pub fn apply_semicolons(source: &str, semicolons: bool) -> String {
    if semicolons {
        return source.to_string();
    }
    map_lines(source, |line| {
        let trimmed = line.trim_end();
        match trimmed.strip_suffix(';') {
            Some(stripped) if !trimmed.trim_start().starts_with("for") => stripped.to_string(),
            _ => line.to_string(),
        }
    })
}

/// Re-quote string literals to the configured quote character.
///
/// Literals that contain the target quote are left alone. Backtick templates
/// and line comments starting with `comment` are copied through untouched.
pub fn apply_quotes(source: &str, quotes: QuoteStyle, comment: &str) -> String {
    let target = quotes.char();
    let mut out = String::with_capacity(source.len());

    for (i, line) in source.split('\n').enumerate() {
        if i > 0 {
            out.push('\n');
        }
        requote_line(line, target, comment, &mut out);
    }
    out
}

fn requote_line(line: &str, target: char, comment: &str, out: &mut String) {
    let chars: Vec<char> = line.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if !comment.is_empty() && line[byte_offset(&chars, i)..].starts_with(comment) {
            out.extend(&chars[i..]);
            return;
        }
        if c == '`' {
            let end = find_closing(&chars, i, '`').unwrap_or(chars.len() - 1);
            out.extend(&chars[i..=end]);
            i = end + 1;
            continue;
        }
        if c == '\'' || c == '"' {
            let Some(end) = find_closing(&chars, i, c) else {
                out.extend(&chars[i..]);
                return;
            };
            let inner: String = chars[i + 1..end].iter().collect();
            if c == target || inner.contains(target) {
                out.extend(&chars[i..=end]);
            } else {
                let other = if target == '"' { '\'' } else { '"' };
                let unescaped = inner.replace(&format!("\\{other}"), &other.to_string());
                out.push(target);
                out.push_str(&unescaped);
                out.push(target);
            }
            i = end + 1;
            continue;
        }
        out.push(c);
        i += 1;
    }
}

fn find_closing(chars: &[char], start: usize, quote: char) -> Option<usize> {
    let mut i = start + 1;
    while i < chars.len() {
        match chars[i] {
            '\\' => i += 2,
            c if c == quote => return Some(i),
            _ => i += 1,
        }
    }
    None
}

fn byte_offset(chars: &[char], index: usize) -> usize {
    chars[..index].iter().map(|c| c.len_utf8()).sum()
}

fn map_lines(source: &str, f: impl Fn(&str) -> String) -> String {
    source.split('\n').map(f).collect::<Vec<_>>().join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Indentation, Language};

    #[test]
    fn test_reindent_to_two_spaces() {
        let style = CodeStyle::for_language(Language::Javascript);
        let out = reindent("a {\n    b {\n        c;\n    }\n}", &style);
        assert_eq!(out, "a {\n  b {\n    c;\n  }\n}");
    }

    #[test]
    fn test_reindent_to_tabs() {
        let mut style = CodeStyle::for_language(Language::Go);
        style.indentation = Indentation::Tabs;
        assert_eq!(reindent("func x() {\n    y()\n}", &style), "func x() {\n\ty()\n}");
    }

    #[test]
    fn test_four_spaces_is_identity() {
        let style = CodeStyle::for_language(Language::Java);
        let src = "class A {\n    void b() {}\n}";
        assert_eq!(reindent(src, &style), src);
    }

    #[test]
    fn test_strip_semicolons() {
        let out = apply_semicolons("const a = 1;\nfoo();\nfor (;;) {}", false);
        assert_eq!(out, "const a = 1\nfoo()\nfor (;;) {}");
        assert_eq!(apply_semicolons("x;", true), "x;");
    }

    #[test]
    fn test_requote_to_double() {
        let out = apply_quotes("it('works', () => {}); // it's fine", QuoteStyle::Double, "//");
        assert_eq!(out, "it(\"works\", () => {}); // it's fine");
    }

    #[test]
    fn test_requote_keeps_literals_containing_target() {
        let out = apply_quotes(r#"x = 'say "hi"'"#, QuoteStyle::Double, "#");
        assert_eq!(out, r#"x = 'say "hi"'"#);
    }

    #[test]
    fn test_requote_to_single_and_skips_backticks() {
        let out = apply_quotes(r#"a("b", `c "d"`)"#, QuoteStyle::Single, "//");
        assert_eq!(out, r#"a('b', `c "d"`)"#);
    }
}

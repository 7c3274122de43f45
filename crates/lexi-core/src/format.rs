//! Display helpers for word fields

use std::iter::Peekable;
use std::str::Chars;

/// Split an example text into display lines
///
/// A line ends after a run of `.`, `!` or `?`, after a `)` that is followed
/// by an ASCII letter, digit or bullet, and before a `•` that follows text on the
/// same line. Lines are trimmed and empty ones dropped.
pub fn example_lines(text: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '.' | '!' | '?' => {
                line.push(c);
                while let Some(&next) = chars.peek() {
                    if !is_terminator(next) {
                        break;
                    }
                    line.push(next);
                    chars.next();
                }
                finish_line(&mut lines, &mut line);
            }
            ')' => {
                line.push(c);
                if starts_new_line(&chars) {
                    finish_line(&mut lines, &mut line);
                }
            }
            '•' => {
                finish_line(&mut lines, &mut line);
                line.push(c);
            }
            _ => line.push(c),
        }
    }
    finish_line(&mut lines, &mut line);

    lines
}

fn is_terminator(c: char) -> bool {
    matches!(c, '.' | '!' | '?')
}

/// Whether the next non-space character is ASCII alphanumeric or a bullet
fn starts_new_line(chars: &Peekable<Chars<'_>>) -> bool {
    chars
        .clone()
        .find(|c| !c.is_whitespace())
        .is_some_and(|c| c.is_ascii_alphanumeric() || c == '•')
}

fn finish_line(lines: &mut Vec<String>, line: &mut String) {
    let trimmed = line.trim();
    if !trimmed.is_empty() {
        lines.push(trimmed.to_string());
    }
    line.clear();
}

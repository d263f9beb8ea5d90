//! Heuristic pattern fixer
//!
//! Applies a fixed, ordered set of line-local repairs to submitted source.
//! The repairs are purely textual: they never fail and make no attempt to
//! understand the code, so the output is best-effort and may still be invalid.
//!
//! Per line, in order:
//! 1. Trim trailing whitespace
//! 2. Close an unbalanced quote
//! 3. Rewrite statement-style `print x` into `print(x)`
//! 4. Turn `=` into `==` on `if` lines that have no `==` yet

use regex::Regex;
use std::sync::OnceLock;

static PRINT_STATEMENT: OnceLock<Regex> = OnceLock::new();

fn print_statement() -> &'static Regex {
    PRINT_STATEMENT.get_or_init(|| {
        Regex::new(r"^print\s+(.*)$").expect("print statement pattern is valid")
    })
}

/// Fix a whole blob of source text.
///
/// The output always has the same number of lines as the input; each line
/// is transformed independently and rejoined with `\n`.
pub fn fix_code(code: &str) -> String {
    code.split('\n').map(fix_line).collect::<Vec<_>>().join("\n")
}

/// Apply every repair to a single line.
pub fn fix_line(line: &str) -> String {
    let line = line.trim_end();
    let line = balance_quotes(line);
    let line = repair_print_call(&line);
    repair_conditional(&line)
}

/// Append a closing quote when the line holds an odd number of quote characters.
///
/// Prefers `"` whenever the line contains one. Escaped or nested quotes are
/// not understood.
fn balance_quotes(line: &str) -> String {
    let doubles = line.matches('"').count();
    let singles = line.matches('\'').count();

    if (doubles + singles) % 2 == 0 {
        return line.to_string();
    }

    let closing = if doubles > 0 { '"' } else { '\'' };
    let mut fixed = String::with_capacity(line.len() + 1);
    fixed.push_str(line);
    fixed.push(closing);
    fixed
}

/// Rewrite `print value` into `print(value)`, keeping the line's indentation.
fn repair_print_call(line: &str) -> String {
    let body = line.trim_start();
    let indent = &line[..line.len() - body.len()];

    if !body.starts_with("print") || body.ends_with(')') {
        return line.to_string();
    }

    match print_statement().captures(body) {
        Some(caps) => {
            let content = caps.get(1).map_or("", |m| m.as_str()).trim();
            format!("{}print({})", indent, content)
        }
        None => line.to_string(),
    }
}

/// Replace assignment with equality on conditional lines.
///
/// Every `=` on the line is replaced, including ones inside string literals.
fn repair_conditional(line: &str) -> String {
    if line.contains("if ") && line.contains('=') && !line.contains("==") {
        line.replace('=', "==")
    } else {
        line.to_string()
    }
}

//! Session script parsing
//!
//! One event per line. Plain text replaces the field value (caret at the
//! end). Lines starting with `:` are commands; `#` starts a comment.

use anyhow::{anyhow, bail, Context, Result};
use typeahead_popover::KeyEvent;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Replace the field value
    Input(String),
    /// Key-down in the input
    Key(KeyEvent),
    /// Move the caret to a character offset
    Caret(usize),
    /// Let time pass
    Wait(u64),
    /// Escape pressed inside the result list
    ListEscape,
    /// Activate the result at this index
    Select(usize),
    /// Ask the list for the next page
    More,
    /// Print the list props
    Show,
}

/// Parse one script line; blank lines and comments yield `None`
pub fn parse_line(line: &str) -> Result<Option<Step>> {
    let line = line.trim_end_matches(&['\r', '\n'][..]);
    if line.trim().is_empty() || line.trim_start().starts_with('#') {
        return Ok(None);
    }

    let Some(command) = line.strip_prefix(':') else {
        return Ok(Some(Step::Input(line.to_string())));
    };

    let mut parts = command.split_whitespace();
    let name = parts.next().ok_or_else(|| anyhow!("empty command"))?;
    let arg = parts.next();

    let step = match name {
        "wait" => Step::Wait(number(name, arg)?),
        "caret" => Step::Caret(number(name, arg)?),
        "select" => Step::Select(number(name, arg)?),
        "list-esc" => Step::ListEscape,
        "more" => Step::More,
        "show" => Step::Show,
        "clear" => Step::Input(String::new()),
        key => {
            let event = KeyEvent::parse(key).ok_or_else(|| anyhow!("unknown command ':{}'", key))?;
            Step::Key(event)
        }
    };
    Ok(Some(step))
}

/// Parse a whole script, reporting the offending line number on error
pub fn parse_script(script: &str) -> Result<Vec<Step>> {
    let mut steps = Vec::new();
    for (index, line) in script.lines().enumerate() {
        if let Some(step) = parse_line(line).with_context(|| format!("line {}", index + 1))? {
            steps.push(step);
        }
    }
    Ok(steps)
}

fn number<T: std::str::FromStr>(name: &str, arg: Option<&str>) -> Result<T> {
    let Some(arg) = arg else {
        bail!(":{} needs a number", name);
    };
    arg.parse()
        .map_err(|_| anyhow!(":{} expects a number, got '{}'", name, arg))
}

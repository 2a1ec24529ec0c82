//! String Functions
//!
//! Thin wrappers over `str` operations. Arguments arrive subject-last so
//! they compose in template pipelines.

use tracing::warn;

use crate::registry::FuncMap;
use crate::value::Value;

/// Upper bound, in bytes, on text built by `repeat` and `indent`.
pub const MAX_OUTPUT_LEN: usize = 1 << 24;

fn within_limit(func: &str, len: Option<usize>) -> bool {
    match len {
        Some(n) if n <= MAX_OUTPUT_LEN => true,
        _ => {
            warn!(func, limit = MAX_OUTPUT_LEN, "output too large, returning empty string");
            false
        }
    }
}

fn is_word_separator(c: char) -> bool {
    !(c.is_alphanumeric() || c == '_')
}

fn map_word_starts(s: &str, f: impl Fn(char) -> String) -> String {
    let mut out = String::with_capacity(s.len());
    let mut at_start = true;
    for c in s.chars() {
        if at_start && !is_word_separator(c) {
            out.push_str(&f(c));
        } else {
            out.push(c);
        }
        at_start = is_word_separator(c);
    }
    out
}

pub fn title(s: &str) -> String {
    map_word_starts(s, |c| c.to_uppercase().collect())
}

pub fn untitle(s: &str) -> String {
    map_word_starts(s, |c| c.to_lowercase().collect())
}

pub fn swapcase(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if c.is_uppercase() {
            out.extend(c.to_lowercase());
        } else if c.is_lowercase() {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
    }
    out
}

pub fn trim_all(cutset: &str, s: &str) -> String {
    s.trim_matches(|c| cutset.contains(c)).to_string()
}

/// Character-indexed substring. A negative start means from the beginning,
/// a negative or overlong end means to the end.
pub fn substr(start: i64, end: i64, s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let len = chars.len();
    let start = usize::try_from(start).unwrap_or(0).min(len);
    let end = usize::try_from(end).map_or(len, |e| e.min(len));
    if start >= end {
        return String::new();
    }
    chars[start..end].iter().collect()
}

/// `s` repeated `count` times. Negative counts, and results larger than
/// [`MAX_OUTPUT_LEN`], give "".
pub fn repeat(count: i64, s: &str) -> String {
    let Ok(n) = usize::try_from(count) else {
        return String::new();
    };
    if !within_limit("repeat", s.len().checked_mul(n)) {
        return String::new();
    }
    s.repeat(n)
}

pub fn nospace(s: &str) -> String {
    s.chars().filter(|c| !c.is_whitespace()).collect()
}

/// First `n` characters; a negative `n` keeps the last `|n|`.
pub fn trunc(n: i64, s: &str) -> String {
    let len = s.chars().count();
    let keep = usize::try_from(n.unsigned_abs()).unwrap_or(usize::MAX).min(len);
    if n >= 0 {
        s.chars().take(keep).collect()
    } else {
        s.chars().skip(len - keep).collect()
    }
}

const ELLIPSIS: &str = "...";

/// Shorten to `width` characters with a trailing ellipsis.
/// Widths below 4 leave the string unchanged.
pub fn abbrev(width: i64, s: &str) -> String {
    abbrevboth(0, width, s)
}

/// Abbreviate on both sides, keeping the text around character `offset`.
pub fn abbrevboth(offset: i64, width: i64, s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let len = chars.len();
    let Ok(width) = usize::try_from(width) else {
        return s.to_string();
    };
    if width < 4 || len <= width {
        return s.to_string();
    }

    let mut offset = usize::try_from(offset).unwrap_or(0).min(len);
    if len - offset < width - 3 {
        offset = len - (width - 3);
    }
    if offset <= 4 {
        let head: String = chars[..width - 3].iter().collect();
        return head + ELLIPSIS;
    }
    if width < 7 {
        return s.to_string();
    }
    if offset + width - 3 < len {
        let rest: String = chars[offset..].iter().collect();
        return format!("{}{}", ELLIPSIS, abbrev(width as i64 - 3, &rest));
    }
    let tail: String = chars[len - (width - 3)..].iter().collect();
    format!("{}{}", ELLIPSIS, tail)
}

pub fn initials(s: &str) -> String {
    s.split_whitespace().filter_map(|w| w.chars().next()).collect()
}

/// Greedy word wrap. Words longer than `width` sit on their own line.
pub fn wrap_with(width: i64, sep: &str, s: &str) -> String {
    let width = usize::try_from(width).unwrap_or(1).max(1);
    let mut lines: Vec<String> = Vec::new();
    let mut line = String::new();
    for word in s.split_whitespace() {
        if !line.is_empty() && line.chars().count() + 1 + word.chars().count() > width {
            lines.push(std::mem::take(&mut line));
        }
        if !line.is_empty() {
            line.push(' ');
        }
        line.push_str(word);
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines.join(sep)
}

pub fn wrap(width: i64, s: &str) -> String {
    wrap_with(width, "\n", s)
}

/// Results larger than [`MAX_OUTPUT_LEN`] give "".
pub fn indent(spaces: i64, s: &str) -> String {
    let width = usize::try_from(spaces).unwrap_or(0);
    let lines = s.matches('\n').count() + 1;
    let total = width.checked_mul(lines).and_then(|pad| pad.checked_add(s.len()));
    if !within_limit("indent", total) {
        return String::new();
    }
    let pad = " ".repeat(width);
    format!("{}{}", pad, s.replace('\n', &format!("\n{}", pad)))
}

/// Double-quoted with JSON escaping.
pub fn quote(s: &str) -> String {
    serde_json::to_string(s).unwrap_or_else(|_| format!("\"{}\"", s))
}

pub fn squote(s: &str) -> String {
    format!("'{}'", s)
}

fn non_nil(values: &[Value]) -> impl Iterator<Item = &Value> {
    values.iter().filter(|v| !matches!(v, Value::Nil))
}

pub fn cat(values: &[Value]) -> String {
    non_nil(values).map(Value::to_string).collect::<Vec<_>>().join(" ")
}

pub fn plural(one: &str, many: &str, count: i64) -> String {
    let word = if count == 1 { one } else { many };
    word.to_string()
}

pub fn join(sep: &str, v: &Value) -> String {
    match v {
        Value::Seq(items) => non_nil(items).map(Value::to_string).collect::<Vec<_>>().join(sep),
        Value::Nil => String::new(),
        other => other.to_string(),
    }
}

pub(crate) fn register(funcs: &mut FuncMap) {
    funcs.define("trim", |a| {
        a.exactly(1)?;
        Ok(Value::from(a.string(0).trim()))
    });
    funcs.define("trimAll", |a| {
        a.exactly(2)?;
        Ok(Value::from(trim_all(&a.string(0), &a.string(1))))
    });
    funcs.define("trimPrefix", |a| {
        a.exactly(2)?;
        let (prefix, s) = (a.string(0), a.string(1));
        Ok(Value::from(s.strip_prefix(prefix.as_str()).unwrap_or(&s)))
    });
    funcs.define("trimSuffix", |a| {
        a.exactly(2)?;
        let (suffix, s) = (a.string(0), a.string(1));
        Ok(Value::from(s.strip_suffix(suffix.as_str()).unwrap_or(&s)))
    });
    funcs.define("upper", |a| {
        a.exactly(1)?;
        Ok(Value::from(a.string(0).to_uppercase()))
    });
    funcs.define("lower", |a| {
        a.exactly(1)?;
        Ok(Value::from(a.string(0).to_lowercase()))
    });
    funcs.define("title", |a| {
        a.exactly(1)?;
        Ok(Value::from(title(&a.string(0))))
    });
    funcs.define("untitle", |a| {
        a.exactly(1)?;
        Ok(Value::from(untitle(&a.string(0))))
    });
    funcs.define("swapcase", |a| {
        a.exactly(1)?;
        Ok(Value::from(swapcase(&a.string(0))))
    });
    funcs.define("substr", |a| {
        a.exactly(3)?;
        Ok(Value::from(substr(a.int(0)?, a.int(1)?, &a.string(2))))
    });
    funcs.define("repeat", |a| {
        a.exactly(2)?;
        Ok(Value::from(repeat(a.int(0)?, &a.string(1))))
    });
    funcs.define("nospace", |a| {
        a.exactly(1)?;
        Ok(Value::from(nospace(&a.string(0))))
    });
    funcs.define("trunc", |a| {
        a.exactly(2)?;
        Ok(Value::from(trunc(a.int(0)?, &a.string(1))))
    });
    funcs.define("abbrev", |a| {
        a.exactly(2)?;
        Ok(Value::from(abbrev(a.int(0)?, &a.string(1))))
    });
    funcs.define("abbrevboth", |a| {
        a.exactly(3)?;
        Ok(Value::from(abbrevboth(a.int(0)?, a.int(1)?, &a.string(2))))
    });
    funcs.define("initials", |a| {
        a.exactly(1)?;
        Ok(Value::from(initials(&a.string(0))))
    });
    funcs.define("wrap", |a| {
        a.exactly(2)?;
        Ok(Value::from(wrap(a.int(0)?, &a.string(1))))
    });
    funcs.define("wrapWith", |a| {
        a.exactly(3)?;
        Ok(Value::from(wrap_with(a.int(0)?, &a.string(1), &a.string(2))))
    });
    funcs.define("indent", |a| {
        a.exactly(2)?;
        Ok(Value::from(indent(a.int(0)?, &a.string(1))))
    });
    funcs.define("contains", |a| {
        a.exactly(2)?;
        Ok(Value::Bool(a.string(1).contains(a.string(0).as_str())))
    });
    funcs.define("hasPrefix", |a| {
        a.exactly(2)?;
        Ok(Value::Bool(a.string(1).starts_with(a.string(0).as_str())))
    });
    funcs.define("hasSuffix", |a| {
        a.exactly(2)?;
        Ok(Value::Bool(a.string(1).ends_with(a.string(0).as_str())))
    });
    funcs.define("quote", |a| {
        let quoted: Vec<String> = non_nil(a.values()).map(|v| quote(&v.to_string())).collect();
        Ok(Value::from(quoted.join(" ")))
    });
    funcs.define("squote", |a| {
        let quoted: Vec<String> = non_nil(a.values()).map(|v| squote(&v.to_string())).collect();
        Ok(Value::from(quoted.join(" ")))
    });
    funcs.define("cat", |a| Ok(Value::from(cat(a.values()))));
    funcs.define("replace", |a| {
        a.exactly(3)?;
        Ok(Value::from(a.string(2).replace(a.string(0).as_str(), &a.string(1))))
    });
    funcs.define("plural", |a| {
        a.exactly(3)?;
        Ok(Value::from(plural(&a.string(0), &a.string(1), a.int(2)?)))
    });
    funcs.define("join", |a| {
        a.exactly(2)?;
        Ok(Value::from(join(&a.string(0), a.get(1))))
    });
}

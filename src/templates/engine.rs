//! Text substitution engine
//!
//! Templates compile once into a segment tree; rendering walks the tree
//! against a [`Context`]. Values are HTML-escaped on substitution.

use std::borrow::Cow;

use super::{Context, TemplateError, Value};

/// A compiled template
#[derive(Debug)]
pub(crate) struct Template {
    segments: Vec<Segment>,
}

#[derive(Debug)]
enum Segment {
    Text(String),
    Var(String),
    Each {
        key: String,
        var: String,
        body: Vec<Segment>,
    },
}

impl Template {
    /// Compile `source`, reporting malformed syntax against `name`
    pub(crate) fn compile(name: &str, source: &str) -> Result<Self, TemplateError> {
        // Stack of open each blocks: (key, var, segments before the block)
        let mut stack: Vec<(String, String, Vec<Segment>)> = Vec::new();
        let mut current: Vec<Segment> = Vec::new();
        let mut rest = source;

        while let Some(open) = rest.find("{{") {
            if open > 0 {
                current.push(Segment::Text(rest[..open].to_string()));
            }
            let after = &rest[open + 2..];
            let close = after
                .find("}}")
                .ok_or_else(|| TemplateError::parse(name, "unterminated {{ tag"))?;
            let tag = after[..close].trim();
            rest = &after[close + 2..];

            if tag == "/each" {
                let (key, var, parent) = stack
                    .pop()
                    .ok_or_else(|| TemplateError::parse(name, "{{/each}} without open block"))?;
                let body = std::mem::replace(&mut current, parent);
                current.push(Segment::Each { key, var, body });
            } else if let Some(tail) = tag.strip_prefix("each ") {
                let (key, var) = parse_each(tail)
                    .ok_or_else(|| TemplateError::parse(name, format!("malformed each tag: {tag}")))?;
                stack.push((key, var, std::mem::take(&mut current)));
            } else if is_key(tag) {
                current.push(Segment::Var(tag.to_string()));
            } else {
                return Err(TemplateError::parse(
                    name,
                    format!("bad placeholder {{{{{tag}}}}}"),
                ));
            }
        }
        if !rest.is_empty() {
            current.push(Segment::Text(rest.to_string()));
        }
        if !stack.is_empty() {
            return Err(TemplateError::parse(name, "unclosed each block"));
        }

        Ok(Self { segments: current })
    }

    pub(crate) fn render(&self, ctx: &Context) -> Result<String, TemplateError> {
        let mut out = String::new();
        render_segments(&self.segments, ctx, None, &mut out)?;
        Ok(out)
    }
}

/// Parse the tail of an each tag: `key |var|`
fn parse_each(tail: &str) -> Option<(String, String)> {
    let (key, binding) = tail.trim().split_once(char::is_whitespace)?;
    let var = binding.trim().strip_prefix('|')?.strip_suffix('|')?;
    if is_key(key) && is_key(var) {
        Some((key.to_string(), var.to_string()))
    } else {
        None
    }
}

fn is_key(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn render_segments(
    segments: &[Segment],
    ctx: &Context,
    scope: Option<(&str, &str)>,
    out: &mut String,
) -> Result<(), TemplateError> {
    for segment in segments {
        match segment {
            Segment::Text(text) => out.push_str(text),
            Segment::Var(key) => {
                if let Some((var, item)) = scope {
                    if var == key {
                        out.push_str(&escape_html(item));
                        continue;
                    }
                }
                match ctx.get(key) {
                    Some(Value::Text(value)) => out.push_str(&escape_html(value)),
                    Some(Value::List(_)) => return Err(TemplateError::NotText(key.clone())),
                    None => return Err(TemplateError::UnknownKey(key.clone())),
                }
            }
            Segment::Each { key, var, body } => {
                let items = match ctx.get(key) {
                    Some(Value::List(items)) => items,
                    Some(Value::Text(_)) => return Err(TemplateError::NotAList(key.clone())),
                    None => return Err(TemplateError::UnknownKey(key.clone())),
                };
                for item in items {
                    render_segments(body, ctx, Some((var, item)), out)?;
                }
            }
        }
    }
    Ok(())
}

fn escape_html(input: &str) -> Cow<'_, str> {
    if !input.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(input);
    }
    let mut out = String::with_capacity(input.len() + 8);
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&#34;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    Cow::Owned(out)
}

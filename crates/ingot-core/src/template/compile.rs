//! Tokenizer for template lines

use super::{ColumnRef, Function, FunctionCall, Segment, TemplateError, TemplateLine, Transform};

pub(super) fn compile_line(number: usize, source: &str) -> Result<TemplateLine, TemplateError> {
    let chars: Vec<char> = source.chars().collect();
    let mut head = Vec::new();
    let mut tail = Vec::new();
    let mut call: Option<FunctionCall> = None;

    let mut in_quotes = false;
    let mut escaped = false;
    // inside a `<...>` node position
    let mut in_angle = false;
    let mut pos = 0;

    while pos < chars.len() {
        let c = chars[pos];
        let segments = if call.is_some() { &mut tail } else { &mut head };

        if c == '[' && !escaped {
            if let Some((column_ref, end)) = column_ref_at(&chars, pos, number, false)? {
                segments.push(if in_angle {
                    Segment::NodeId(column_ref)
                } else {
                    Segment::Value(column_ref)
                });
                pos = end;
                continue;
            }
        }

        if c == '=' && !in_quotes && !in_angle {
            if let Some((parsed, end)) = call_at(&chars, pos, number)? {
                if call.is_some() {
                    return Err(TemplateError::MultipleFunctions { line: number });
                }
                call = Some(parsed);
                pos = end;
                continue;
            }
        }

        if in_quotes {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_quotes = false;
            }
        } else if in_angle {
            if c == '>' {
                in_angle = false;
            }
        } else if c == '"' {
            in_quotes = true;
        } else if c == '<' {
            in_angle = true;
        }

        push_char(segments, c);
        pos += 1;
    }

    Ok(TemplateLine {
        number,
        source: source.to_string(),
        head,
        call,
        tail,
    })
}

fn push_char(segments: &mut Vec<Segment>, c: char) {
    if let Some(Segment::Text(text)) = segments.last_mut() {
        text.push(c);
    } else {
        segments.push(Segment::Text(c.to_string()));
    }
}

fn is_column_name(name: &str) -> bool {
    !name.trim().is_empty()
        && name
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '_' | ' ' | '.' | '|' | '-'))
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_alphabetic() || c == '_')
        && chars.all(|c| c.is_alphanumeric() || c == '_')
}

/// Try to read a column reference starting at the `[` at `start`
///
/// Returns `None` when the bracket is literal text. Inside function
/// arguments an unknown transform also makes the bracket literal, so list
/// literals such as `[a,b]` pass through untouched.
fn column_ref_at(
    chars: &[char],
    start: usize,
    line: usize,
    in_args: bool,
) -> Result<Option<(ColumnRef, usize)>, TemplateError> {
    let mut end = None;
    for (offset, &c) in chars[start + 1..].iter().enumerate() {
        match c {
            ']' => {
                end = Some(start + 1 + offset);
                break;
            }
            '[' => return Ok(None),
            _ => {}
        }
    }
    let Some(end) = end else {
        return Ok(None);
    };

    let body: String = chars[start + 1..end].iter().collect();
    let parts: Vec<&str> = body.split(',').collect();
    if parts.len() > 2 || !is_column_name(parts[0]) {
        return Ok(None);
    }

    let transform = match parts.get(1) {
        None => None,
        Some(name) if !is_identifier(name) => return Ok(None),
        Some(name) => match Transform::from_name(name) {
            Some(transform) => Some(transform),
            None if in_args => return Ok(None),
            None => {
                return Err(TemplateError::UnknownTransform {
                    line,
                    name: name.to_string(),
                })
            }
        },
    };

    Ok(Some((
        ColumnRef {
            column: parts[0].to_string(),
            transform,
        },
        end + 1,
    )))
}

/// Try to read `=name(args)` starting at the `=` at `start`
fn call_at(
    chars: &[char],
    start: usize,
    line: usize,
) -> Result<Option<(FunctionCall, usize)>, TemplateError> {
    let mut open = start + 1;
    while open < chars.len() && (chars[open].is_alphanumeric() || chars[open] == '_') {
        open += 1;
    }
    if open == start + 1 || open >= chars.len() || chars[open] != '(' {
        return Ok(None);
    }

    let name: String = chars[start + 1..open].iter().collect();
    let function =
        Function::from_name(&name).ok_or(TemplateError::UnknownFunction { line, name: name.clone() })?;

    let mut raw_args = Vec::new();
    let mut current = String::new();
    let mut parens = 0usize;
    let mut brackets = 0usize;
    let mut in_quotes = false;
    let mut close = None;

    for (offset, &c) in chars[open + 1..].iter().enumerate() {
        match c {
            '"' => in_quotes = !in_quotes,
            _ if in_quotes => {}
            '(' => parens += 1,
            '[' => brackets += 1,
            ']' => brackets = brackets.saturating_sub(1),
            ')' if parens == 0 && brackets == 0 => {
                close = Some(open + 1 + offset);
                break;
            }
            ')' => parens = parens.saturating_sub(1),
            ',' if parens == 0 && brackets == 0 => {
                raw_args.push(std::mem::take(&mut current));
                continue;
            }
            _ => {}
        }
        current.push(c);
    }

    let Some(close) = close else {
        return Err(TemplateError::UnterminatedCall {
            line,
            function: name,
        });
    };
    if !(raw_args.is_empty() && current.trim().is_empty()) {
        raw_args.push(current);
    }

    if raw_args.len() != function.arity() {
        return Err(TemplateError::Arity {
            line,
            function: function.name(),
            expected: function.arity(),
            found: raw_args.len(),
        });
    }

    let args = raw_args
        .iter()
        .map(|raw| compile_arg(function, raw.trim(), line))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Some((FunctionCall { function, args }, close + 1)))
}

/// Compile one function argument
///
/// A bare `[name]` given to `split` may be a column or a one-element list;
/// it becomes [`Segment::ColumnOrText`] and is decided per row.
fn compile_arg(function: Function, raw: &str, line: usize) -> Result<Vec<Segment>, TemplateError> {
    let chars: Vec<char> = raw.chars().collect();
    let mut segments = Vec::new();
    let mut pos = 0;
    while pos < chars.len() {
        if chars[pos] == '[' {
            if let Some((column_ref, end)) = column_ref_at(&chars, pos, line, true)? {
                segments.push(
                    if function == Function::Split && column_ref.transform.is_none() {
                        Segment::ColumnOrText(column_ref)
                    } else {
                        Segment::Value(column_ref)
                    },
                );
                pos = end;
                continue;
            }
        }
        push_char(&mut segments, chars[pos]);
        pos += 1;
    }
    Ok(segments)
}

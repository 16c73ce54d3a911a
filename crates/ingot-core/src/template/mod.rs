//! Template substitution engine
//!
//! A template is a list of statement patterns. Each pattern is compiled once
//! into [`Segment`]s and an optional [`FunctionCall`], then rendered against
//! every row by a [`Renderer`].
//!
//! ```text
//! <_:Person_[id]> <Person.name> "[name,toUpper]" .
//! <_:Place_[id]> <Place.loc> =geoloc([lat],[lng]) .
//! <_:Doc_[id]> <Doc.tag> =split([tags]) *
//! ```

mod compile;
mod error;
mod functions;
mod render;

pub use error::TemplateError;
pub use functions::{geojson_point, Function};
pub use render::Renderer;

use crate::row::LINE_NUMBER_COLUMN;

/// Transformation applied to a column value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transform {
    /// Spaces become underscores
    NoSpace,
    /// Uppercase
    ToUpper,
    /// Lowercase
    ToLower,
}

impl Transform {
    /// Look up a transform by its template name
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "nospace" => Some(Transform::NoSpace),
            "toUpper" => Some(Transform::ToUpper),
            "toLower" => Some(Transform::ToLower),
            _ => None,
        }
    }

    /// Template name of this transform
    pub fn name(self) -> &'static str {
        match self {
            Transform::NoSpace => "nospace",
            Transform::ToUpper => "toUpper",
            Transform::ToLower => "toLower",
        }
    }

    /// Apply the transform to a value
    pub fn apply(self, value: &str) -> String {
        match self {
            Transform::NoSpace => value.replace(' ', "_"),
            Transform::ToUpper => value.to_uppercase(),
            Transform::ToLower => value.to_lowercase(),
        }
    }
}

/// A `[column]` or `[column,transform]` reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRef {
    pub column: String,
    pub transform: Option<Transform>,
}

/// Compiled piece of a statement pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Literal text copied as is
    Text(String),
    /// Column value embedded in a literal
    Value(ColumnRef),
    /// Column value inside a `<...>` node position, made identifier-safe
    NodeId(ColumnRef),
    /// Bare `[name]` argument of `split`: the column's value when the row
    /// has that column, the bracket text as a one-element list otherwise
    ColumnOrText(ColumnRef),
}

/// A `=function(args)` call with compiled arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionCall {
    pub function: Function,
    pub args: Vec<Vec<Segment>>,
}

/// One compiled statement pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateLine {
    /// One-based line number in the template text
    pub number: usize,
    /// Original pattern text
    pub source: String,
    /// Segments before the function call, or the whole line without one
    pub head: Vec<Segment>,
    pub call: Option<FunctionCall>,
    /// Segments after the function call
    pub tail: Vec<Segment>,
}

impl TemplateLine {
    /// Column references of this line in order of appearance
    pub fn column_refs(&self) -> impl Iterator<Item = &ColumnRef> {
        let args = self.call.iter().flat_map(|c| c.args.iter().flatten());
        self.head
            .iter()
            .chain(args)
            .chain(self.tail.iter())
            .filter_map(|segment| match segment {
                Segment::Value(r) | Segment::NodeId(r) => Some(r),
                Segment::Text(_) | Segment::ColumnOrText(_) => None,
            })
    }

    /// References that fall back to literal text when their column is absent
    pub fn fallback_refs(&self) -> impl Iterator<Item = &ColumnRef> {
        self.call
            .iter()
            .flat_map(|c| c.args.iter().flatten())
            .filter_map(|segment| match segment {
                Segment::ColumnOrText(r) => Some(r),
                _ => None,
            })
    }

    /// True when the line renders to itself for every row
    pub fn is_static(&self) -> bool {
        self.call.is_none() && self.column_refs().next().is_none()
    }
}

/// A compiled template
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Template {
    lines: Vec<TemplateLine>,
}

impl Template {
    /// Compile template text; comments and blank lines are dropped
    pub fn parse(text: &str) -> Result<Self, TemplateError> {
        let lines = text
            .lines()
            .enumerate()
            .filter(|(_, line)| {
                let trimmed = line.trim_start();
                !trimmed.is_empty() && !trimmed.starts_with('#')
            })
            .map(|(idx, line)| compile::compile_line(idx + 1, line))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { lines })
    }

    pub fn lines(&self) -> &[TemplateLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Distinct referenced column names in order of first appearance
    pub fn columns(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for column_ref in self.lines.iter().flat_map(TemplateLine::column_refs) {
            if !seen.contains(&column_ref.column.as_str()) {
                seen.push(&column_ref.column);
            }
        }
        seen
    }

    /// Verify every referenced column exists in `headers`
    ///
    /// The line number column is always available.
    pub fn check_columns<S: AsRef<str>>(&self, headers: &[S]) -> Result<(), TemplateError> {
        for line in &self.lines {
            for column_ref in line.column_refs() {
                let known = column_ref.column == LINE_NUMBER_COLUMN
                    || headers.iter().any(|h| h.as_ref() == column_ref.column);
                if !known {
                    return Err(TemplateError::UnknownColumn {
                        line: line.number,
                        column: column_ref.column.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}

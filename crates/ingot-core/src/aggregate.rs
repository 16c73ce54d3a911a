//! Triple aggregation and deduplication
//!
//! Rendering a template over many rows repeats statements (every row that
//! mentions the same country emits the same country node). [`TripleMap`]
//! keys statements by subject and predicate so that single-valued
//! predicates are written once and list predicates collect every value.

use crate::chunk::StatementLine;
use crate::row::Row;
use crate::template::{Renderer, Template, TemplateError};
use crate::triple::Statement;
use std::borrow::Borrow;
use std::collections::HashMap;
use tracing::{debug, trace};

/// Null literal produced by rendering a missing numeric value
const NULL_LITERAL: &str = "\"nan\"";

/// Object side of an aggregated statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectValue {
    Single(String),
    List(Vec<String>),
}

/// Insertion-ordered map from `subject predicate` to object value(s)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TripleMap {
    entries: Vec<(String, ObjectValue)>,
    index: HashMap<String, usize>,
    malformed: usize,
    skipped_null: usize,
}

impl TripleMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Render `template` over `rows` in order and aggregate the output
    pub fn from_rows<I, R>(
        template: &Template,
        rows: I,
        renderer: &mut Renderer,
    ) -> Result<Self, TemplateError>
    where
        I: IntoIterator<Item = R>,
        R: Borrow<Row>,
    {
        let mut map = Self::new();
        for row in rows {
            for line in renderer.render_row(template, row.borrow())? {
                map.accumulate(&line);
            }
        }
        debug!(
            keys = map.len(),
            malformed = map.malformed,
            skipped_null = map.skipped_null,
            "Aggregated rendered statements"
        );
        Ok(map)
    }

    /// Merge one rendered line into the map
    ///
    /// Returns `false` when the line was dropped, either because it carries
    /// the `"nan"` null literal or because it is malformed.
    pub fn accumulate(&mut self, line: &str) -> bool {
        if line.contains(NULL_LITERAL) {
            self.skipped_null += 1;
            return false;
        }
        let Some(statement) = Statement::parse(line) else {
            if !line.trim().is_empty() {
                trace!(line, "Dropping malformed statement");
                self.malformed += 1;
            }
            return false;
        };

        let key = statement.key();
        let object = statement.object.to_string();
        match self.index.get(&key) {
            Some(&idx) => {
                let value = &mut self.entries[idx].1;
                if statement.is_list() {
                    match value {
                        ObjectValue::List(values) => values.push(object),
                        ObjectValue::Single(previous) => {
                            let previous = std::mem::take(previous);
                            *value = ObjectValue::List(vec![previous, object]);
                        }
                    }
                } else {
                    *value = ObjectValue::Single(object);
                }
            }
            None => {
                let value = if statement.is_list() {
                    ObjectValue::List(vec![object])
                } else {
                    ObjectValue::Single(object)
                };
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, value));
            }
        }
        true
    }

    /// Look up the object value(s) for a subject and predicate
    pub fn get(&self, subject: &str, predicate: &str) -> Option<&ObjectValue> {
        self.index
            .get(&format!("{subject} {predicate}"))
            .map(|&idx| &self.entries[idx].1)
    }

    /// Number of distinct subject/predicate keys
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of statement lines [`TripleMap::statements`] yields
    pub fn statement_count(&self) -> usize {
        self.entries
            .iter()
            .map(|(_, value)| match value {
                ObjectValue::Single(_) => 1,
                ObjectValue::List(values) => values.len(),
            })
            .sum()
    }

    /// Lines dropped because they could not be parsed
    pub fn malformed_count(&self) -> usize {
        self.malformed
    }

    /// Lines dropped because they carried the null literal
    pub fn null_count(&self) -> usize {
        self.skipped_null
    }

    /// Serialize to `subject predicate object .` lines in key order
    ///
    /// List entries expand to one line per element and are flagged so that
    /// chunking never splits them.
    pub fn statements(&self) -> impl Iterator<Item = StatementLine> + '_ {
        self.entries.iter().flat_map(|(key, value)| {
            let lines: Vec<StatementLine> = match value {
                ObjectValue::Single(object) => vec![StatementLine {
                    text: format!("{key} {object} ."),
                    list_element: false,
                }],
                ObjectValue::List(objects) => objects
                    .iter()
                    .map(|object| StatementLine {
                        text: format!("{key} {object} ."),
                        list_element: true,
                    })
                    .collect(),
            };
            lines
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(map: &TripleMap) -> Vec<String> {
        map.statements().map(|s| s.text).collect()
    }

    #[test]
    fn test_scalar_overwrite_keeps_position() {
        let mut map = TripleMap::new();
        map.accumulate("<_:a> <name> \"first\" .");
        map.accumulate("<_:b> <name> \"other\" .");
        map.accumulate("<_:a> <name> \"second\" .");

        assert_eq!(
            texts(&map),
            vec!["<_:a> <name> \"second\" .", "<_:b> <name> \"other\" ."]
        );
    }

    #[test]
    fn test_list_accumulates_with_duplicates() {
        let mut map = TripleMap::new();
        map.accumulate("<_:a> <tag> \"x\" *");
        map.accumulate("<_:a> <tag> \"y\" *");
        map.accumulate("<_:a> <tag> \"x\" *");

        assert_eq!(
            map.get("<_:a>", "<tag>"),
            Some(&ObjectValue::List(vec![
                "\"x\"".to_string(),
                "\"y\"".to_string(),
                "\"x\"".to_string()
            ]))
        );
        assert!(map.statements().all(|s| s.list_element));
        assert_eq!(map.statement_count(), 3);
    }

    #[test]
    fn test_list_promotes_prior_scalar() {
        let mut map = TripleMap::new();
        map.accumulate("<_:a> <tag> \"x\" .");
        map.accumulate("<_:a> <tag> \"y\" *");
        assert_eq!(
            map.get("<_:a>", "<tag>"),
            Some(&ObjectValue::List(vec!["\"x\"".to_string(), "\"y\"".to_string()]))
        );
    }

    #[test]
    fn test_null_literal_and_malformed_are_dropped() {
        let mut map = TripleMap::new();
        assert!(!map.accumulate("<_:a> <score> \"nan\" ."));
        assert!(!map.accumulate("not a statement"));
        assert!(!map.accumulate(""));
        assert!(map.is_empty());
        assert_eq!(map.null_count(), 1);
        assert_eq!(map.malformed_count(), 1);
    }

    #[test]
    fn test_from_rows_person_scenario() {
        let template = Template::parse(
            "<_:Person_[id]> <dgraph.type> \"Person\" .\n<_:Person_[id]> <Person.name> \"[name]\" .",
        )
        .unwrap();
        let rows = vec![
            Row::from_pairs(0, [("id", Some("1")), ("name", Some("Ada"))]),
            Row::from_pairs(1, [("id", Some("1")), ("name", Some("Ada"))]),
            Row::from_pairs(2, [("id", Some("2")), ("name", Some("Bo"))]),
        ];
        let map = TripleMap::from_rows(&template, &rows, &mut Renderer::seeded(0)).unwrap();

        assert_eq!(map.len(), 4);
        assert_eq!(
            texts(&map),
            vec![
                "<_:Person_1> <dgraph.type> \"Person\" .",
                "<_:Person_1> <Person.name> \"Ada\" .",
                "<_:Person_2> <dgraph.type> \"Person\" .",
                "<_:Person_2> <Person.name> \"Bo\" .",
            ]
        );
    }
}

//! Row rendering

use super::functions::escape_literal;
use super::{ColumnRef, Segment, Template, TemplateError, TemplateLine};
use crate::row::{Cell, Row};
use ingot_config::TemplateConfig;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Renders compiled template lines against rows
///
/// Owns the random source used by `randomDate`; a seeded renderer produces
/// identical output for identical input.
#[derive(Debug, Clone)]
pub struct Renderer {
    rng: StdRng,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer {
    /// Renderer seeded from the operating system
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Deterministic renderer
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_config(config: &TemplateConfig) -> Self {
        match config.random_seed {
            Some(seed) => Self::seeded(seed),
            None => Self::new(),
        }
    }

    /// Render one line for one row
    ///
    /// Returns `Ok(None)` when a referenced column is missing for the row.
    /// A `split` call yields one line per list element, possibly none.
    pub fn render(
        &mut self,
        line: &TemplateLine,
        row: &Row,
    ) -> Result<Option<Vec<String>>, TemplateError> {
        let mut missing = false;
        for column_ref in line.column_refs() {
            if lookup(line.number, row, column_ref)?.is_none() {
                missing = true;
            }
        }
        for column_ref in line.fallback_refs() {
            if matches!(row.cell(&column_ref.column), Some(Cell::Missing)) {
                missing = true;
            }
        }
        if missing {
            return Ok(None);
        }

        let head = render_segments(line.number, &line.head, row)?;
        let Some(call) = &line.call else {
            return Ok(Some(vec![head]));
        };

        let tail = render_segments(line.number, &line.tail, row)?;
        let args = call
            .args
            .iter()
            .map(|arg| render_arg(line.number, arg, row))
            .collect::<Result<Vec<_>, _>>()?;

        let objects = call.function.evaluate(line.number, &args, &mut self.rng)?;
        Ok(Some(
            objects
                .into_iter()
                .map(|object| format!("{head}{object}{tail}"))
                .collect(),
        ))
    }

    /// Render every line of `template` for one row, in template order
    pub fn render_row(
        &mut self,
        template: &Template,
        row: &Row,
    ) -> Result<Vec<String>, TemplateError> {
        let mut rendered = Vec::new();
        for line in template.lines() {
            if let Some(lines) = self.render(line, row)? {
                rendered.extend(lines);
            }
        }
        Ok(rendered)
    }
}

fn lookup<'r>(
    line: usize,
    row: &'r Row,
    column_ref: &ColumnRef,
) -> Result<Option<&'r str>, TemplateError> {
    match row.cell(&column_ref.column) {
        Some(Cell::Value(value)) => Ok(Some(value)),
        Some(Cell::Missing) => Ok(None),
        None => Err(TemplateError::UnknownColumn {
            line,
            column: column_ref.column.clone(),
        }),
    }
}

fn transformed(column_ref: &ColumnRef, value: &str) -> String {
    match column_ref.transform {
        Some(transform) => transform.apply(value),
        None => value.to_string(),
    }
}

fn identifier_safe(value: &str) -> String {
    value
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}

fn render_segments(line: usize, segments: &[Segment], row: &Row) -> Result<String, TemplateError> {
    let mut out = String::new();
    for segment in segments {
        match segment {
            Segment::Text(text) => out.push_str(text),
            Segment::Value(column_ref) => {
                let value = lookup(line, row, column_ref)?.unwrap_or_default();
                out.push_str(&escape_literal(&transformed(column_ref, value)));
            }
            Segment::NodeId(column_ref) => {
                let value = lookup(line, row, column_ref)?.unwrap_or_default();
                out.push_str(&transformed(column_ref, &identifier_safe(value)));
            }
            Segment::ColumnOrText(column_ref) => out.push_str(&column_or_text(row, column_ref)),
        }
    }
    Ok(out)
}

fn render_arg(line: usize, segments: &[Segment], row: &Row) -> Result<String, TemplateError> {
    let mut out = String::new();
    for segment in segments {
        match segment {
            Segment::Text(text) => out.push_str(text),
            Segment::Value(column_ref) | Segment::NodeId(column_ref) => {
                let value = lookup(line, row, column_ref)?.unwrap_or_default();
                out.push_str(&transformed(column_ref, value));
            }
            Segment::ColumnOrText(column_ref) => out.push_str(&column_or_text(row, column_ref)),
        }
    }
    Ok(out.trim().to_string())
}

fn column_or_text(row: &Row, column_ref: &ColumnRef) -> String {
    match row.cell(&column_ref.column) {
        Some(cell) => cell.value().unwrap_or_default().to_string(),
        None => format!("[{}]", column_ref.column),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, Option<&str>)]) -> Row {
        Row::from_pairs(0, pairs.iter().map(|(k, v)| (*k, *v)))
    }

    fn render_one(template: &str, row: &Row) -> Result<Option<Vec<String>>, TemplateError> {
        let template = Template::parse(template)?;
        Renderer::seeded(1).render(&template.lines()[0], row)
    }

    #[test]
    fn test_value_and_node_id_substitution() {
        let r = row(&[("id", Some("a b/1")), ("name", Some("Ada \"The\" Countess"))]);
        let out = render_one("<_:Person_[id]> <Person.name> \"[name]\" .", &r)
            .unwrap()
            .unwrap();
        assert_eq!(
            out,
            vec![r#"<_:Person_a_b_1> <Person.name> "Ada \"The\" Countess" ."#]
        );
    }

    #[test]
    fn test_transform_in_node_id() {
        let r = row(&[("city", Some("new york"))]);
        let out = render_one("<_:City_[city,toUpper]> <dgraph.type> \"City\" .", &r)
            .unwrap()
            .unwrap();
        assert_eq!(out, vec!["<_:City_NEW_YORK> <dgraph.type> \"City\" ."]);
    }

    #[test]
    fn test_missing_value_drops_line() {
        let r = row(&[("id", Some("1")), ("name", None)]);
        assert_eq!(
            render_one("<_:P_[id]> <P.name> \"[name]\" .", &r).unwrap(),
            None
        );
    }

    #[test]
    fn test_absent_column_is_error() {
        let r = row(&[("id", Some("1"))]);
        let err = render_one("<_:P_[id]> <P.name> \"[name]\" .", &r).unwrap_err();
        assert!(matches!(err, TemplateError::UnknownColumn { column, .. } if column == "name"));
    }

    #[test]
    fn test_line_number_reference() {
        let r = Row::from_pairs(41, [("v", Some("x"))]);
        let template = Template::parse("<_:Row_[LINENUMBER]> <Row.v> \"[v]\" .").unwrap();
        let out = Renderer::new().render(&template.lines()[0], &r).unwrap().unwrap();
        assert_eq!(out, vec!["<_:Row_41> <Row.v> \"x\" ."]);
    }

    #[test]
    fn test_geoloc_render() {
        let r = row(&[("id", Some("1")), ("lat", Some("12.5")), ("lng", Some("45.25"))]);
        let out = render_one("<_:P_[id]> <P.loc> =geoloc([lat],[lng]) .", &r)
            .unwrap()
            .unwrap();
        assert_eq!(
            out,
            vec![r#"<_:P_1> <P.loc> "{\"type\":\"Point\",\"coordinates\":[45.25000000,12.50000000]}"^^<geo:geojson> ."#]
        );
    }

    #[test]
    fn test_split_fans_out() {
        let r = row(&[("id", Some("9"))]);
        let out = render_one("<_:D_[id]> <D.tag> =split([a, b, c]) *", &r)
            .unwrap()
            .unwrap();
        assert_eq!(
            out,
            vec![
                "<_:D_9> <D.tag> \"a\" *",
                "<_:D_9> <D.tag> \"b\" *",
                "<_:D_9> <D.tag> \"c\" *",
            ]
        );
    }

    #[test]
    fn test_split_column_value() {
        let r = row(&[("id", Some("9")), ("tags", Some("['red', 'blue']"))]);
        let out = render_one("<_:D_[id]> <D.tag> =split([tags]) *", &r)
            .unwrap()
            .unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[1], "<_:D_9> <D.tag> \"blue\" *");
    }

    #[test]
    fn test_split_single_element_list() {
        let r = row(&[("id", Some("9"))]);
        let out = render_one("<_:D_[id]> <D.tag> =split([red]) *", &r)
            .unwrap()
            .unwrap();
        assert_eq!(out, vec!["<_:D_9> <D.tag> \"red\" *"]);
    }

    #[test]
    fn test_split_bare_bracket_prefers_column() {
        let r = row(&[("id", Some("9")), ("red", Some("[crimson, scarlet]"))]);
        let out = render_one("<_:D_[id]> <D.tag> =split([red]) *", &r)
            .unwrap()
            .unwrap();
        assert_eq!(
            out,
            vec!["<_:D_9> <D.tag> \"crimson\" *", "<_:D_9> <D.tag> \"scarlet\" *"]
        );

        let r = row(&[("id", Some("9")), ("red", None)]);
        assert_eq!(render_one("<_:D_[id]> <D.tag> =split([red]) *", &r).unwrap(), None);
    }

    #[test]
    fn test_iri_value_is_identifier_safe() {
        let r = row(&[("id", Some("1")), ("slug", Some("a b\"c"))]);
        let out = render_one("<_:P_[id]> <P.link> <http://ex.org/[slug]> .", &r)
            .unwrap()
            .unwrap();
        assert_eq!(out, vec!["<_:P_1> <P.link> <http://ex.org/a_b_c> ."]);
    }

    #[test]
    fn test_datetime_with_column_args() {
        let r = row(&[("id", Some("1")), ("born", Some("10/12/1815"))]);
        let out = render_one("<_:P_[id]> <P.born> =datetime([born],%d/%m/%Y) .", &r)
            .unwrap()
            .unwrap();
        assert_eq!(out, vec!["<_:P_1> <P.born> \"1815-12-10T00:00:00\" ."]);
    }

    #[test]
    fn test_seeded_renderers_agree() {
        let template = Template::parse("<_:E_[id]> <E.at> =randomDate(2000-01-01,2030-12-31) .").unwrap();
        let r = row(&[("id", Some("1"))]);
        let a = Renderer::seeded(99).render_row(&template, &r).unwrap();
        let b = Renderer::seeded(99).render_row(&template, &r).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_static_line_renders_unchanged() {
        let r = row(&[]);
        let out = render_one("<_:root> <dgraph.type> \"Root\" .", &r).unwrap().unwrap();
        assert_eq!(out, vec!["<_:root> <dgraph.type> \"Root\" ."]);
    }
}

//! Rendered statement lines
//!
//! A rendered line has the shape `<subject> <predicate> object MARKER`,
//! where `MARKER` is `.` for single-valued predicates and `*` for list
//! predicates.

/// Terminator of a rendered statement line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementMarker {
    /// `.`: later values overwrite earlier ones
    Single,
    /// `*`: values accumulate
    List,
}

/// A parsed statement line borrowing from its source text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Statement<'a> {
    pub subject: &'a str,
    pub predicate: &'a str,
    pub object: &'a str,
    pub marker: StatementMarker,
}

impl<'a> Statement<'a> {
    /// Parse a statement line; `None` if the line is malformed
    pub fn parse(line: &'a str) -> Option<Self> {
        let line = line.trim();
        let (subject, rest) = iri_token(line)?;
        let rest = skip_whitespace(rest)?;
        let (predicate, rest) = iri_token(rest)?;
        let rest = skip_whitespace(rest)?;

        let marker = match rest.chars().last()? {
            '.' => StatementMarker::Single,
            '*' => StatementMarker::List,
            _ => return None,
        };
        let body = &rest[..rest.len() - 1];
        if !body.ends_with(char::is_whitespace) {
            return None;
        }
        let object = body.trim_end();
        if object.is_empty() {
            return None;
        }

        Some(Self {
            subject,
            predicate,
            object,
            marker,
        })
    }

    /// Deduplication key: subject and predicate
    pub fn key(&self) -> String {
        format!("{} {}", self.subject, self.predicate)
    }

    pub fn is_list(&self) -> bool {
        self.marker == StatementMarker::List
    }
}

/// Split a leading `<...>` token without whitespace off `text`
fn iri_token(text: &str) -> Option<(&str, &str)> {
    if !text.starts_with('<') {
        return None;
    }
    let end = text.find(char::is_whitespace).unwrap_or(text.len());
    let token = &text[..end];
    if token.len() < 3 || !token.ends_with('>') {
        return None;
    }
    Some((token, &text[end..]))
}

/// Strip leading whitespace, requiring at least one character of it
fn skip_whitespace(text: &str) -> Option<&str> {
    let trimmed = text.trim_start();
    (trimmed.len() < text.len()).then_some(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_scalar_statement() {
        let s = Statement::parse("<_:P_1> <Person.name> \"Ada Lovelace\" .").unwrap();
        assert_eq!(s.subject, "<_:P_1>");
        assert_eq!(s.predicate, "<Person.name>");
        assert_eq!(s.object, "\"Ada Lovelace\"");
        assert_eq!(s.marker, StatementMarker::Single);
        assert_eq!(s.key(), "<_:P_1> <Person.name>");
    }

    #[test]
    fn test_parse_list_statement() {
        let s = Statement::parse("<_:D_1> <D.tag> \"a\" *").unwrap();
        assert!(s.is_list());
    }

    #[test]
    fn test_object_may_contain_spaces_and_dots() {
        let s = Statement::parse("<_:P_1> <P.loc> \"{\\\"a\\\": 1.5}\"^^<geo:geojson> .").unwrap();
        assert_eq!(s.object, "\"{\\\"a\\\": 1.5}\"^^<geo:geojson>");
    }

    #[test]
    fn test_malformed_lines() {
        assert!(Statement::parse("").is_none());
        assert!(Statement::parse("<_:P_1> <Person.name> \"Ada\"").is_none());
        assert!(Statement::parse("<_:P_1> <Person.name> \"Ada\".").is_none());
        assert!(Statement::parse("_:P_1 <Person.name> \"Ada\" .").is_none());
        assert!(Statement::parse("<_:P_1> <Person.name> .").is_none());
        assert!(Statement::parse("<_:P_1> Person.name \"Ada\" .").is_none());
    }
}

//! Blank node references in serialized statements
//!
//! A reference is a `<_:label>` token in subject or object position. The
//! label (`_:label`, without angle brackets) is the key of the
//! [`IdentifierCache`](crate::IdentifierCache).

use crate::triple::Statement;

fn blank_label(token: &str) -> Option<&str> {
    token
        .strip_prefix('<')
        .and_then(|t| t.strip_suffix('>'))
        .filter(|label| label.starts_with("_:") && label.len() > 2)
        .filter(|label| !label.contains(char::is_whitespace))
}

/// Blank labels referenced by a statement line, subject first
pub fn blank_references(line: &str) -> Vec<&str> {
    let Some(statement) = Statement::parse(line) else {
        return Vec::new();
    };
    [statement.subject, statement.object]
        .into_iter()
        .filter_map(blank_label)
        .collect()
}

/// Replace resolvable blank references in a statement line
///
/// `resolve` maps a label to a store identifier; references it cannot
/// resolve are left untouched. Lines that do not parse are returned as is.
pub fn rewrite_blank_references<'a, F>(line: &str, mut resolve: F) -> String
where
    F: FnMut(&str) -> Option<&'a str>,
{
    let Some(statement) = Statement::parse(line) else {
        return line.to_string();
    };
    let mut rewrite = |token: &str| match blank_label(token).and_then(&mut resolve) {
        Some(uid) => format!("<{uid}>"),
        None => token.to_string(),
    };
    let subject = rewrite(statement.subject);
    let object = rewrite(statement.object);
    let marker = if statement.is_list() { '*' } else { '.' };
    format!("{subject} {} {object} {marker}", statement.predicate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::IdentifierCache;

    #[test]
    fn test_references_in_subject_and_object() {
        let refs = blank_references("<_:Link_1_2> <Link.to> <_:Node_2> .");
        assert_eq!(refs, vec!["_:Link_1_2", "_:Node_2"]);
    }

    #[test]
    fn test_literal_objects_are_not_references() {
        assert_eq!(blank_references("<_:P_1> <P.note> \"<_:fake>\" ."), vec!["_:P_1"]);
        assert!(blank_references("<0x1> <P.name> \"Ada\" .").is_empty());
    }

    #[test]
    fn test_rewrite_with_cache() {
        let cache: IdentifierCache = [("_:a", "0x10")].into_iter().collect();
        let line = rewrite_blank_references("<_:a> <knows> <_:b> .", |label| cache.get(label));
        assert_eq!(line, "<0x10> <knows> <_:b> .");
    }

    #[test]
    fn test_rewrite_leaves_unparsed_line() {
        let line = rewrite_blank_references("garbage", |_| Some("0x1"));
        assert_eq!(line, "garbage");
    }
}

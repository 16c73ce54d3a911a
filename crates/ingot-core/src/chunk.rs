//! Bounded-size chunking of serialized statements

/// One serialized statement and whether it belongs to a list expansion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatementLine {
    pub text: String,
    pub list_element: bool,
}

/// An ordered batch of statement lines, the unit of commit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Zero-based position in the chunk stream
    pub index: usize,
    pub lines: Vec<String>,
}

impl Chunk {
    pub fn new(index: usize, lines: Vec<String>) -> Self {
        Self { index, lines }
    }

    /// Newline-terminated statement text
    pub fn to_text(&self) -> String {
        let mut text = String::new();
        for line in &self.lines {
            text.push_str(line);
            text.push('\n');
        }
        text
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Groups statement lines into chunks
///
/// A line is pushed first; the chunk is flushed once its length exceeds
/// the threshold and the pushed line is not a list element. List
/// expansions therefore stay within one chunk. The final partial chunk is
/// always yielded.
pub struct Chunker<I> {
    statements: I,
    threshold: usize,
    next_index: usize,
}

impl<I> Chunker<I>
where
    I: Iterator<Item = StatementLine>,
{
    pub fn new<S>(statements: S, threshold: usize) -> Self
    where
        S: IntoIterator<IntoIter = I>,
    {
        Self {
            statements: statements.into_iter(),
            threshold,
            next_index: 0,
        }
    }
}

impl<I> Iterator for Chunker<I>
where
    I: Iterator<Item = StatementLine>,
{
    type Item = Chunk;

    fn next(&mut self) -> Option<Chunk> {
        let mut lines = Vec::new();
        for statement in self.statements.by_ref() {
            lines.push(statement.text);
            if lines.len() > self.threshold && !statement.list_element {
                break;
            }
        }
        if lines.is_empty() {
            return None;
        }
        let chunk = Chunk::new(self.next_index, lines);
        self.next_index += 1;
        Some(chunk)
    }
}

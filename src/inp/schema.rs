//! Record schemas
//!
//! A [`Schema`] describes one object section: which fields its records carry,
//! which of them form the key, how consecutive lines are grouped into one
//! record, and how a line group becomes a [`Record`].
//!
//! Grouping strategies ([`Grouping`]):
//!
//! - `SingleLine`: every line is its own record.
//! - `RepeatedKey`: consecutive lines sharing the leading token form one record.
//! - `KeywordBlock`: a record opens at a line led by the start keyword and runs
//!   until the next one (control rules).
//! - `HeaderBlock`: a record opens at a header-tagged line; lines tagged as
//!   carry lines are remembered and prepended to every following record
//!   (transect roughness).
//!
//! Typed record structs implement [`RecordType`] and are exposed as schemas
//! through [`TypedSchema`].

use crate::inp::error::SchemaError;
use crate::inp::lexing::{Line, Tokens};
use crate::inp::record::{flat_line, FieldSet, Record};
use std::fmt;
use std::iter::Peekable;
use std::marker::PhantomData;
use std::sync::Arc;
use std::vec;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grouping {
    SingleLine,
    RepeatedKey,
    KeywordBlock {
        start: &'static str,
    },
    HeaderBlock {
        header: &'static str,
        carry: &'static [&'static str],
    },
}

impl Grouping {
    pub fn groups(self, lines: Vec<Line>) -> LineGroups {
        LineGroups {
            grouping: self,
            lines: lines.into_iter().peekable(),
            carried: Vec::new(),
            unclaimed: None,
        }
    }

    /// Records span several lines and read better with a blank line between them.
    pub fn is_block(&self) -> bool {
        matches!(
            self,
            Grouping::KeywordBlock { .. } | Grouping::HeaderBlock { .. }
        )
    }
}

/// Lines forming one record.
pub type LineGroup = Vec<Line>;

/// Lazy iterator of line groups produced by a [`Grouping`].
pub struct LineGroups {
    grouping: Grouping,
    lines: Peekable<vec::IntoIter<Line>>,
    carried: Vec<Line>,
    /// Latest carry line not yet applied to any record.
    unclaimed: Option<Line>,
}

impl LineGroups {
    fn orphan(line: Line) -> SchemaError {
        SchemaError::OrphanLine {
            line_index: line.index,
            token: line.head().to_string(),
        }
    }

    fn next_repeated_key(&mut self) -> Option<LineGroup> {
        let first = self.lines.next()?;
        let key = first.head().to_string();
        let mut group = vec![first];
        while let Some(line) = self.lines.next_if(|line| line.head() == key) {
            group.push(line);
        }
        Some(group)
    }

    fn next_keyword_block(&mut self, start: &str) -> Option<Result<LineGroup, SchemaError>> {
        let first = self.lines.next()?;
        if !first.head().eq_ignore_ascii_case(start) {
            return Some(Err(Self::orphan(first)));
        }
        let mut group = vec![first];
        while let Some(line) = self
            .lines
            .next_if(|line| !line.head().eq_ignore_ascii_case(start))
        {
            group.push(line);
        }
        Some(Ok(group))
    }

    fn next_header_block(
        &mut self,
        header: &str,
        carry: &[&str],
    ) -> Option<Result<LineGroup, SchemaError>> {
        let is_carry = |line: &Line| carry.iter().any(|tag| line.head().eq_ignore_ascii_case(tag));
        loop {
            let Some(line) = self.lines.next() else {
                return self.unclaimed.take().map(|line| Err(Self::orphan(line)));
            };
            if is_carry(&line) {
                self.carried.retain(|kept| !kept.head().eq_ignore_ascii_case(line.head()));
                self.carried.push(line.clone());
                self.unclaimed = Some(line);
                continue;
            }
            if !line.head().eq_ignore_ascii_case(header) {
                return Some(Err(Self::orphan(line)));
            }
            self.unclaimed = None;

            let mut group = self.carried.clone();
            group.push(line);
            while let Some(line) = self.lines.next_if(|line| {
                !is_carry(line) && !line.head().eq_ignore_ascii_case(header)
            }) {
                group.push(line);
            }
            return Some(Ok(group));
        }
    }
}

impl Iterator for LineGroups {
    type Item = Result<LineGroup, SchemaError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.grouping {
            Grouping::SingleLine => self.lines.next().map(|line| Ok(vec![line])),
            Grouping::RepeatedKey => self.next_repeated_key().map(Ok),
            Grouping::KeywordBlock { start } => self.next_keyword_block(start),
            Grouping::HeaderBlock { header, carry } => self.next_header_block(header, carry),
        }
    }
}

/// Description of an object section's records.
pub trait Schema: Send + Sync {
    /// Record type name, e.g. `Junction`.
    fn kind(&self) -> &str;

    fn identifier(&self) -> &[&'static str];

    fn field_names(&self) -> &[&'static str];

    fn grouping(&self) -> Grouping {
        Grouping::SingleLine
    }

    /// Whether the section is written as an aligned table.
    fn table_export(&self) -> bool {
        true
    }

    fn group(&self, lines: Vec<Line>) -> LineGroups {
        self.grouping().groups(lines)
    }

    fn from_tokens(&self, lines: &[Tokens]) -> Result<Box<dyn Record>, SchemaError>;
}

impl fmt::Debug for dyn Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("kind", &self.kind())
            .field("grouping", &self.grouping())
            .finish()
    }
}

/// A concrete record struct that knows how to parse and lay out itself.
pub trait RecordType: FieldSet + Record + Clone {
    const GROUPING: Grouping = Grouping::SingleLine;
    const TABLE_EXPORT: bool = true;

    fn parse(lines: &[Tokens]) -> Result<Self, SchemaError>;

    /// Source lines for this record.
    fn lines(&self) -> Vec<Tokens> {
        vec![flat_line(self)]
    }
}

/// [`Schema`] over a [`RecordType`].
pub struct TypedSchema<T>(PhantomData<fn() -> T>);

impl<T: RecordType> TypedSchema<T> {
    pub fn new() -> Self {
        TypedSchema(PhantomData)
    }

    pub fn shared() -> Arc<dyn Schema> {
        Arc::new(Self::new())
    }
}

impl<T: RecordType> Default for TypedSchema<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: RecordType> Schema for TypedSchema<T> {
    fn kind(&self) -> &str {
        T::KIND
    }

    fn identifier(&self) -> &[&'static str] {
        T::IDENTIFIER
    }

    fn field_names(&self) -> &[&'static str] {
        T::FIELDS
    }

    fn grouping(&self) -> Grouping {
        T::GROUPING
    }

    fn table_export(&self) -> bool {
        T::TABLE_EXPORT
    }

    fn from_tokens(&self, lines: &[Tokens]) -> Result<Box<dyn Record>, SchemaError> {
        Ok(Box::new(T::parse(lines)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(text: &str) -> Vec<Line> {
        text.lines()
            .enumerate()
            .map(|(index, raw)| Line::new(index, raw.split_whitespace().map(String::from).collect()))
            .collect()
    }

    fn heads(groups: Vec<Result<LineGroup, SchemaError>>) -> Vec<Vec<String>> {
        groups
            .into_iter()
            .map(|group| {
                group
                    .unwrap()
                    .iter()
                    .map(|line| line.tokens.join(" "))
                    .collect()
            })
            .collect()
    }

    #[test]
    fn test_single_line_grouping() {
        let groups: Vec<_> = Grouping::SingleLine.groups(lines("A 1\nA 2")).collect();
        assert_eq!(heads(groups), vec![vec!["A 1"], vec!["A 2"]]);
    }

    #[test]
    fn test_repeated_key_grouping() {
        let groups: Vec<_> = Grouping::RepeatedKey
            .groups(lines("C1 PUMP1 0 1\nC1 2 3\nC2 4 5\nC1 6 7"))
            .collect();
        assert_eq!(
            heads(groups),
            vec![
                vec!["C1 PUMP1 0 1", "C1 2 3"],
                vec!["C2 4 5"],
                vec!["C1 6 7"]
            ]
        );
    }

    #[test]
    fn test_keyword_block_grouping() {
        let text = "RULE R1\nIF NODE J1 DEPTH > 1\nTHEN PUMP P1 STATUS = ON\nRULE R2\nIF X";
        let groups: Vec<_> = Grouping::KeywordBlock { start: "RULE" }
            .groups(lines(text))
            .collect();
        let heads = heads(groups);
        assert_eq!(heads.len(), 2);
        assert_eq!(heads[0].len(), 3);
        assert_eq!(heads[1], vec!["RULE R2", "IF X"]);
    }

    #[test]
    fn test_keyword_block_orphan_line() {
        let mut groups = Grouping::KeywordBlock { start: "RULE" }.groups(lines("IF X\nRULE R1"));
        assert_eq!(
            groups.next(),
            Some(Err(SchemaError::OrphanLine {
                line_index: 0,
                token: "IF".into()
            }))
        );
    }

    #[test]
    fn test_header_block_carries_latest_line() {
        let text = "NC 0.1 0.1 0.02\nX1 T1 2 0 10\nGR 5 0 4 10\nX1 T2 2 0 10\nNC 0.2 0.2 0.03\nX1 T3 0 0 0";
        let grouping = Grouping::HeaderBlock {
            header: "X1",
            carry: &["NC"],
        };
        let groups = heads(grouping.groups(lines(text)).collect());
        assert_eq!(
            groups,
            vec![
                vec!["NC 0.1 0.1 0.02", "X1 T1 2 0 10", "GR 5 0 4 10"],
                vec!["NC 0.1 0.1 0.02", "X1 T2 2 0 10"],
                vec!["NC 0.2 0.2 0.03", "X1 T3 0 0 0"],
            ]
        );
    }

    #[test]
    fn test_header_block_trailing_carry_line() {
        let grouping = Grouping::HeaderBlock {
            header: "X1",
            carry: &["NC"],
        };
        let groups: Vec<_> = grouping
            .groups(lines("NC 0.1 0.1 0.1\nX1 T1 0 0 0\nNC 0.2 0.2 0.2"))
            .collect();
        assert_eq!(groups.len(), 2);
        assert!(groups[0].is_ok());
        assert_eq!(
            groups[1],
            Err(SchemaError::OrphanLine {
                line_index: 2,
                token: "NC".into()
            })
        );
    }

    #[test]
    fn test_header_block_orphan_data_line() {
        let grouping = Grouping::HeaderBlock {
            header: "X1",
            carry: &["NC"],
        };
        let first = grouping.groups(lines("GR 1 2")).next();
        assert!(matches!(first, Some(Err(SchemaError::OrphanLine { .. }))));
    }
}

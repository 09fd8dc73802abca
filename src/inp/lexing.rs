//! Line tokenizer
//!
//! Splits raw project text into [`SectionBlock`]s. Each line is run through a
//! small [`logos`] lexer that drops everything after the comment marker `;` and
//! splits the rest on whitespace. Blank and comment-only lines produce no
//! [`Line`], but every raw line is kept on the block so that unknown sections can
//! be written back verbatim.

use crate::inp::error::FormatError;
use logos::Logos;

/// Whitespace-delimited tokens of one line.
pub type Tokens = Vec<String>;

#[derive(Logos, Debug, PartialEq, Clone)]
#[logos(skip r"[ \t\r\f\x0B]+")]
pub enum Token {
    #[regex(r";[^\n]*")]
    Comment,

    #[regex(r"[^ \t\r\f\x0B\n;]+", |lex| lex.slice().to_string())]
    Word(String),
}

/// A non-empty line of a section, with its position in the source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub index: usize,
    pub tokens: Tokens,
}

impl Line {
    pub fn new(index: usize, tokens: Tokens) -> Self {
        Line { index, tokens }
    }

    /// Leading token; lines never hold zero tokens.
    pub fn head(&self) -> &str {
        self.tokens.first().map(String::as_str).unwrap_or_default()
    }
}

/// Everything between one section header and the next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionBlock {
    pub name: String,
    pub header_index: usize,
    pub lines: Vec<Line>,
    /// Raw text of every line after the header, trailing blank lines removed.
    pub raw_lines: Vec<String>,
}

impl SectionBlock {
    fn new(name: String, header_index: usize) -> Self {
        SectionBlock {
            name,
            header_index,
            lines: Vec::new(),
            raw_lines: Vec::new(),
        }
    }

    fn push(&mut self, index: usize, raw: &str, tokens: Tokens) {
        self.raw_lines.push(raw.to_string());
        if !tokens.is_empty() {
            self.lines.push(Line::new(index, tokens));
        }
    }

    fn trim_trailing_blank(&mut self) {
        while self
            .raw_lines
            .last()
            .is_some_and(|line| line.trim().is_empty())
        {
            self.raw_lines.pop();
        }
    }
}

/// Tokens of a single raw line, comment stripped.
pub fn split_line(raw: &str, line_index: usize) -> Result<Tokens, FormatError> {
    let mut tokens = Vec::new();
    let mut lexer = Token::lexer(raw);
    while let Some(token) = lexer.next() {
        match token {
            Ok(Token::Word(word)) => tokens.push(word),
            Ok(Token::Comment) => break,
            Err(()) => {
                return Err(FormatError::UnexpectedCharacter {
                    line_index,
                    column: lexer.span().start,
                })
            }
        }
    }
    Ok(tokens)
}

/// Split project text into section blocks, in source order.
///
/// Content ahead of the first header has nowhere to go and is skipped with a
/// warning.
pub fn tokenize(text: &str) -> Result<Vec<SectionBlock>, FormatError> {
    let mut blocks: Vec<SectionBlock> = Vec::new();

    for (index, raw) in text.lines().enumerate() {
        let tokens = split_line(raw, index)?;

        if tokens.first().is_some_and(|first| first.starts_with('[')) {
            let name = header_name(&tokens, index)?;
            blocks.push(SectionBlock::new(name, index));
            continue;
        }

        match blocks.last_mut() {
            Some(block) => block.push(index, raw, tokens),
            None if !tokens.is_empty() => {
                tracing::warn!(line = index + 1, "ignoring content before the first section header");
            }
            None => {}
        }
    }

    for block in &mut blocks {
        block.trim_trailing_blank();
    }
    Ok(blocks)
}

fn header_name(tokens: &[String], line_index: usize) -> Result<String, FormatError> {
    let text = tokens.join(" ");
    let inner = &text[1..];
    match inner.find(']') {
        None => Err(FormatError::UnterminatedHeader { line_index, text }),
        Some(end) if end + 1 != inner.len() => {
            Err(FormatError::MalformedHeader { line_index, text })
        }
        Some(end) => {
            let name = inner[..end].trim();
            if name.is_empty() {
                Err(FormatError::EmptyHeader { line_index })
            } else {
                Ok(name.to_string())
            }
        }
    }
}

//! Output tree
//!
//! A small closed set of formatting nodes. The generator decides what to
//! say; renderers decide how to lay it out. Every renderer matches all
//! variants.

use std::fmt;

/// How the children of a list are joined
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Join {
    /// On one line, with a separator
    Inline(&'static str),
    /// One child per line
    Lines,
    /// One child per line, blank line between children
    Paragraphs,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InterpolationPart {
    Text(String),
    Code(Code),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Code {
    None,
    List { items: Vec<Code>, join: Join },
    Text(String),
    Multiline(Vec<String>),
    /// `$"..."` string template
    Interpolation(Vec<InterpolationPart>),
    /// Header line followed by a braced, indented body
    Block { header: Box<Code>, body: Vec<Code> },
    /// Statement when rendered as lines, conditional expression when inline
    If {
        condition: Box<Code>,
        then_branch: Box<Code>,
        else_branch: Option<Box<Code>>,
    },
}

impl Code {
    pub fn text(text: impl Into<String>) -> Code {
        Code::Text(text.into())
    }

    pub fn inline(items: Vec<Code>, separator: &'static str) -> Code {
        Code::List {
            items,
            join: Join::Inline(separator),
        }
    }

    /// Space-separated words, skipping empty ones
    pub fn words<I, S>(words: I) -> Code
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let items = words
            .into_iter()
            .map(Into::into)
            .filter(|word: &String| !word.is_empty())
            .map(Code::Text)
            .collect();
        Code::inline(items, " ")
    }

    pub fn lines(items: Vec<Code>) -> Code {
        Code::List {
            items,
            join: Join::Lines,
        }
    }

    pub fn paragraphs(items: Vec<Code>) -> Code {
        Code::List {
            items,
            join: Join::Paragraphs,
        }
    }

    pub fn block(header: Code, body: Vec<Code>) -> Code {
        Code::Block {
            header: Box::new(header),
            body,
        }
    }

    /// `code;`
    pub fn statement(code: Code) -> Code {
        Code::inline(vec![code, Code::text(";")], "")
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Code::None)
    }

    /// Node kind, as used by the tree dump
    pub fn kind(&self) -> &'static str {
        match self {
            Code::None => "None",
            Code::List { .. } => "List",
            Code::Text(_) => "Text",
            Code::Multiline(_) => "Multiline",
            Code::Interpolation(_) => "Interpolation",
            Code::Block { .. } => "Block",
            Code::If { .. } => "If",
        }
    }
}

/// An IR shape the generator has no rendering for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsupportedShape {
    pub kind: String,
}

impl UnsupportedShape {
    pub fn new(kind: impl Into<String>) -> Self {
        UnsupportedShape { kind: kind.into() }
    }

    /// Inline marker emitted in place of the node
    pub fn marker(&self) -> Code {
        Code::text(format!("/* UNSUPPORTED: {} */", self.kind))
    }
}

impl fmt::Display for UnsupportedShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unsupported IR shape {}", self.kind)
    }
}

impl std::error::Error for UnsupportedShape {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_words_skip_empty() {
        let code = Code::words(["public", "", "class", "Rectangle"]);
        let Code::List { items, join } = code else {
            panic!("expected a list");
        };
        assert_eq!(join, Join::Inline(" "));
        assert_eq!(items.len(), 3);
    }

    #[test]
    fn test_marker() {
        let shape = UnsupportedShape::new("BLOCK");
        assert_eq!(shape.marker(), Code::text("/* UNSUPPORTED: BLOCK */"));
        assert_eq!(shape.to_string(), "unsupported IR shape BLOCK");
    }
}

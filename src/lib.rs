pub mod core {
    pub mod parser;
    pub mod layout;
    pub mod extract;
}

pub mod number {
    pub mod normalizer;
    pub mod resolver;
}

pub mod utils {
    pub mod document_processor;
}

pub mod config;
pub mod error;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use crate::config::ResolverConfig;
pub use crate::core::layout::PatentDocument;
pub use crate::core::parser::{parse, parse_application_xml, parse_grant_xml, parse_xml};
pub use crate::error::{NormalizeError, ParseError, ResolutionError};
pub use crate::number::normalizer::{normalize, PatentNumber};
pub use crate::number::resolver::{Resolver, SearchCapability};

/// Which of the two ICE grammars a document was (or should be) decoded with.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum DocumentKind {
    Grant,
    Application,
}

impl DocumentKind {
    /// Root element name of the grammar.
    pub fn root_element(self) -> &'static str {
        match self {
            DocumentKind::Grant => "us-patent-grant",
            DocumentKind::Application => "us-patent-application",
        }
    }

    /// Name of the bibliographic block for the grammar.
    pub fn bibliography_element(self) -> &'static str {
        match self {
            DocumentKind::Grant => "us-bibliographic-data-grant",
            DocumentKind::Application => "us-bibliographic-data-application",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.root_element())
    }
}

/// Inline formatting elements that may appear inside paragraphs and claim text.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum InlineStyle {
    Subscript,
    Superscript,
    Italic,
    Bold,
}

impl InlineStyle {
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "sub" => Some(InlineStyle::Subscript),
            "sup" => Some(InlineStyle::Superscript),
            "i" => Some(InlineStyle::Italic),
            "b" => Some(InlineStyle::Bold),
            _ => None,
        }
    }
}

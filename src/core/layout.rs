use crate::{DocumentKind, InlineStyle};
use chrono::NaiveDate;
use serde::Serialize;

/// A decoded patent document: exactly one of the two ICE grammars.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PatentDocument {
    Grant(PatentBody),
    Application(PatentBody),
}

/// Root attributes and sections shared by both grammars.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct PatentBody {
    pub header: DocumentHeader,
    pub bibliography: Option<Bibliography>,
    #[serde(rename = "abstract")]
    pub abstract_section: Option<Abstract>,
    pub drawings: Option<Drawings>,
    pub description: Option<Description>,
    pub claims: Option<Claims>,
}

/// Attributes of the root element
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct DocumentHeader {
    pub lang: Option<String>,
    pub dtd_version: Option<String>,
    pub file: Option<String>,
    pub status: Option<String>,
    pub id: Option<String>,
    pub country: Option<String>,
    pub date_produced: Option<String>,
    pub date_published: Option<String>,
}

impl DocumentHeader {
    pub fn produced_on(&self) -> Option<NaiveDate> {
        self.date_produced.as_deref().and_then(parse_ice_date)
    }

    pub fn published_on(&self) -> Option<NaiveDate> {
        self.date_published.as_deref().and_then(parse_ice_date)
    }
}

/// Parse the `YYYYMMDD` dates used throughout the ICE grammars.
pub fn parse_ice_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y%m%d").ok()
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct Bibliography {
    pub publication_reference: Option<DocumentId>,
    pub application_reference: Option<DocumentId>,
    pub invention_titles: Vec<Title>,
}

/// `document-id` block of a publication or application reference
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct DocumentId {
    pub country: Option<String>,
    pub doc_number: Option<String>,
    pub kind: Option<String>,
    pub date: Option<String>,
}

impl DocumentId {
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        self.date.as_deref().and_then(parse_ice_date)
    }
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct Title {
    pub id: Option<String>,
    pub lang: Option<String>,
    pub text: String,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct Abstract {
    pub id: Option<String>,
    pub lang: Option<String>,
    pub paragraphs: Vec<Paragraph>,
}

/// Headings and paragraphs are kept as two sequences, each in document order.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct Description {
    pub id: Option<String>,
    pub lang: Option<String>,
    pub headings: Vec<Heading>,
    pub paragraphs: Vec<Paragraph>,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct Heading {
    pub id: Option<String>,
    pub level: Option<String>,
    pub text: String,
}

/// A `p` element. `text` is the element's own character data; text inside
/// inline formatting children is kept separately in `spans`.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct Paragraph {
    pub id: Option<String>,
    pub num: Option<String>,
    pub text: String,
    pub spans: Vec<InlineSpan>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct InlineSpan {
    pub style: InlineStyle,
    pub text: String,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct Drawings {
    pub id: Option<String>,
    pub figures: Vec<Figure>,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct Figure {
    pub id: Option<String>,
    pub image: Option<Image>,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct Image {
    pub id: Option<String>,
    pub height: Option<String>,
    pub width: Option<String>,
    pub file: Option<String>,
    pub alt: Option<String>,
    pub content: Option<String>,
    pub format: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct Claims {
    pub id: Option<String>,
    pub lang: Option<String>,
    pub claims: Vec<Claim>,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct Claim {
    pub id: Option<String>,
    /// Declared `num` attribute, e.g. `"00001"`
    pub number: Option<String>,
    pub text_nodes: Vec<ClaimTextNode>,
}

/// One `claim-text` element: its own character data followed by nested
/// `claim-text` children (dependent claim elements) in document order.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct ClaimTextNode {
    pub id: Option<String>,
    pub text: String,
    pub nested: Vec<ClaimTextNode>,
    pub spans: Vec<InlineSpan>,
}

impl PatentDocument {
    pub fn kind(&self) -> DocumentKind {
        match self {
            PatentDocument::Grant(_) => DocumentKind::Grant,
            PatentDocument::Application(_) => DocumentKind::Application,
        }
    }

    pub fn body(&self) -> &PatentBody {
        match self {
            PatentDocument::Grant(body) | PatentDocument::Application(body) => body,
        }
    }

    pub fn header(&self) -> &DocumentHeader {
        &self.body().header
    }

    pub fn bibliography(&self) -> Option<&Bibliography> {
        self.body().bibliography.as_ref()
    }

    pub fn abstract_section(&self) -> Option<&Abstract> {
        self.body().abstract_section.as_ref()
    }

    pub fn description(&self) -> Option<&Description> {
        self.body().description.as_ref()
    }

    pub fn claims(&self) -> Option<&Claims> {
        self.body().claims.as_ref()
    }

    pub fn drawings(&self) -> Option<&Drawings> {
        self.body().drawings.as_ref()
    }
}

use crate::core::layout::{
    Abstract, Bibliography, Claim, ClaimTextNode, Claims, Description, DocumentHeader, DocumentId,
    Drawings, Figure, Heading, Image, InlineSpan, Paragraph, PatentBody, PatentDocument, Title,
};
use crate::error::ParseError;
use crate::{DocumentKind, InlineStyle};
use log::{debug, warn};
use quick_xml::events::Event;
use quick_xml::Reader;
use roxmltree::{Document, Node, ParsingOptions};

/// Deepest element nesting accepted. roxmltree builds its tree recursively,
/// so deeper input is rejected before it reaches the tree builder.
pub const MAX_NESTING_DEPTH: usize = 256;

pub trait Parser {
    /// Decode raw XML bytes into a patent document
    fn parse(&self, data: &[u8]) -> Result<PatentDocument, ParseError>;
}

/// Strict decoder for `us-patent-grant` documents (ICE DTD 4.7).
#[derive(Debug, Clone, Copy, Default)]
pub struct GrantParser;

/// Strict decoder for `us-patent-application` documents (ICE DTD 4.6).
#[derive(Debug, Clone, Copy, Default)]
pub struct ApplicationParser;

/// Parser that accepts either grammar, trying the grant grammar first.
#[derive(Debug, Clone, Copy, Default)]
pub struct UniversalParser {
    pub grant_parser: GrantParser,
    pub application_parser: ApplicationParser,
}

impl Parser for GrantParser {
    fn parse(&self, data: &[u8]) -> Result<PatentDocument, ParseError> {
        parse_strict(data, DocumentKind::Grant)
    }
}

impl Parser for ApplicationParser {
    fn parse(&self, data: &[u8]) -> Result<PatentDocument, ParseError> {
        parse_strict(data, DocumentKind::Application)
    }
}

impl UniversalParser {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Parser for UniversalParser {
    fn parse(&self, data: &[u8]) -> Result<PatentDocument, ParseError> {
        if data.is_empty() {
            return Err(ParseError::EmptyDocument);
        }

        match self.grant_parser.parse(data) {
            Ok(doc) => return Ok(doc),
            Err(e) => debug!("Not a grant document: {}", e),
        }
        match self.application_parser.parse(data) {
            Ok(doc) => Ok(doc),
            Err(e) => {
                debug!("Not an application document: {}", e);
                Err(ParseError::UnrecognizedDocumentType)
            }
        }
    }
}

/// Parse patent XML. With a kind hint the bytes must use that grammar;
/// without one the grammar is detected from the root element.
pub fn parse(data: &[u8], expected: Option<DocumentKind>) -> Result<PatentDocument, ParseError> {
    match expected {
        Some(DocumentKind::Grant) => GrantParser.parse(data),
        Some(DocumentKind::Application) => ApplicationParser.parse(data),
        None => UniversalParser::new().parse(data),
    }
}

pub fn parse_xml(data: &[u8]) -> Result<PatentDocument, ParseError> {
    parse(data, None)
}

pub fn parse_grant_xml(data: &[u8]) -> Result<PatentDocument, ParseError> {
    parse(data, Some(DocumentKind::Grant))
}

pub fn parse_application_xml(data: &[u8]) -> Result<PatentDocument, ParseError> {
    parse(data, Some(DocumentKind::Application))
}

fn parse_strict(data: &[u8], kind: DocumentKind) -> Result<PatentDocument, ParseError> {
    if data.is_empty() {
        return Err(ParseError::EmptyDocument);
    }
    let text = std::str::from_utf8(data).map_err(|e| ParseError::MalformedXml(e.to_string()))?;
    check_nesting_depth(text)?;

    // ICE exports always carry a DOCTYPE pointing at the external DTD.
    let options = ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    };
    let doc = Document::parse_with_options(text, options)?;
    let root = doc.root_element();

    let actual = root.tag_name().name();
    if actual != kind.root_element() {
        return Err(ParseError::DocumentTypeMismatch {
            expected: kind,
            actual: actual.to_string(),
        });
    }

    let body = decode_body(root, kind);
    debug!(
        "Decoded {} ({} claims, {} description paragraphs)",
        actual,
        body.claims.as_ref().map_or(0, |c| c.claims.len()),
        body.description.as_ref().map_or(0, |d| d.paragraphs.len()),
    );

    Ok(match kind {
        DocumentKind::Grant => PatentDocument::Grant(body),
        DocumentKind::Application => PatentDocument::Application(body),
    })
}

/// Single streaming pass over the element events. Syntax errors are left for
/// roxmltree to report.
fn check_nesting_depth(text: &str) -> Result<(), ParseError> {
    let mut reader = Reader::from_str(text);
    let mut depth = 0usize;
    loop {
        match reader.read_event() {
            Ok(Event::Start(_)) => {
                depth += 1;
                if depth > MAX_NESTING_DEPTH {
                    warn!("Rejecting document nested deeper than {}", MAX_NESTING_DEPTH);
                    return Err(ParseError::MalformedXml("nesting too deep".to_string()));
                }
            }
            Ok(Event::End(_)) => depth = depth.saturating_sub(1),
            Ok(Event::Eof) | Err(_) => return Ok(()),
            Ok(_) => {}
        }
    }
}

fn decode_body(root: Node, kind: DocumentKind) -> PatentBody {
    PatentBody {
        header: DocumentHeader {
            lang: attr(root, "lang"),
            dtd_version: attr(root, "dtd-version"),
            file: attr(root, "file"),
            status: attr(root, "status"),
            id: attr(root, "id"),
            country: attr(root, "country"),
            date_produced: attr(root, "date-produced"),
            date_published: attr(root, "date-publ"),
        },
        bibliography: child(root, kind.bibliography_element()).map(decode_bibliography),
        abstract_section: child(root, "abstract").map(|node| Abstract {
            id: attr(node, "id"),
            lang: attr(node, "lang"),
            paragraphs: children(node, "p").map(decode_paragraph).collect(),
        }),
        drawings: child(root, "drawings").map(decode_drawings),
        description: child(root, "description").map(decode_description),
        claims: child(root, "claims").map(decode_claims),
    }
}

fn decode_bibliography(node: Node) -> Bibliography {
    let reference = |name: &str| {
        child(node, name)
            .and_then(|r| child(r, "document-id"))
            .map(decode_document_id)
    };
    Bibliography {
        publication_reference: reference("publication-reference"),
        application_reference: reference("application-reference"),
        invention_titles: children(node, "invention-title")
            .map(|t| Title {
                id: attr(t, "id"),
                lang: attr(t, "lang"),
                text: own_text(t),
            })
            .collect(),
    }
}

fn decode_document_id(node: Node) -> DocumentId {
    DocumentId {
        country: child_text(node, "country"),
        doc_number: child_text(node, "doc-number"),
        kind: child_text(node, "kind"),
        date: child_text(node, "date"),
    }
}

fn decode_description(node: Node) -> Description {
    Description {
        id: attr(node, "id"),
        lang: attr(node, "lang"),
        headings: children(node, "heading")
            .map(|h| Heading {
                id: attr(h, "id"),
                level: attr(h, "level"),
                text: own_text(h),
            })
            .collect(),
        paragraphs: children(node, "p").map(decode_paragraph).collect(),
    }
}

fn decode_paragraph(node: Node) -> Paragraph {
    Paragraph {
        id: attr(node, "id"),
        num: attr(node, "num"),
        text: own_text(node),
        spans: inline_spans(node),
    }
}

fn decode_drawings(node: Node) -> Drawings {
    Drawings {
        id: attr(node, "id"),
        figures: children(node, "figure")
            .map(|fig| Figure {
                id: attr(fig, "id"),
                image: child(fig, "img").map(|img| Image {
                    id: attr(img, "id"),
                    height: attr(img, "he"),
                    width: attr(img, "wi"),
                    file: attr(img, "file"),
                    alt: attr(img, "alt"),
                    content: attr(img, "img-content"),
                    format: attr(img, "img-format"),
                }),
            })
            .collect(),
    }
}

fn decode_claims(node: Node) -> Claims {
    Claims {
        id: attr(node, "id"),
        lang: attr(node, "lang"),
        claims: children(node, "claim")
            .map(|c| Claim {
                id: attr(c, "id"),
                number: attr(c, "num"),
                text_nodes: children(c, "claim-text").map(decode_claim_text).collect(),
            })
            .collect(),
    }
}

struct ClaimTextFrame<'a, 'input> {
    pending: std::vec::IntoIter<Node<'a, 'input>>,
    node: ClaimTextNode,
}

impl<'a, 'input> ClaimTextFrame<'a, 'input> {
    fn open(element: Node<'a, 'input>) -> Self {
        let pending: Vec<_> = children(element, "claim-text").collect();
        Self {
            pending: pending.into_iter(),
            node: ClaimTextNode {
                id: attr(element, "id"),
                text: own_text(element),
                nested: Vec::new(),
                spans: inline_spans(element),
            },
        }
    }
}

/// Build a `claim-text` subtree with an explicit stack rather than recursion.
fn decode_claim_text(element: Node) -> ClaimTextNode {
    let mut stack = vec![ClaimTextFrame::open(element)];
    let mut finished = None;

    while let Some(frame) = stack.last_mut() {
        if let Some(next) = frame.pending.next() {
            stack.push(ClaimTextFrame::open(next));
            continue;
        }
        let Some(done) = stack.pop() else { break };
        match stack.last_mut() {
            Some(parent) => parent.node.nested.push(done.node),
            None => finished = Some(done.node),
        }
    }

    finished.unwrap_or_default()
}

fn inline_spans(node: Node) -> Vec<InlineSpan> {
    node.children()
        .filter(|n| n.is_element())
        .filter_map(|n| {
            InlineStyle::from_tag(n.tag_name().name()).map(|style| InlineSpan {
                style,
                text: own_text(n),
            })
        })
        .collect()
}

fn child<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children()
        .find(|n| n.is_element() && n.tag_name().name() == name)
}

fn children<'a, 'input: 'a>(
    node: Node<'a, 'input>,
    name: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
    node.children()
        .filter(move |n| n.is_element() && n.tag_name().name() == name)
}

fn attr(node: Node, name: &str) -> Option<String> {
    node.attribute(name).map(|v| v.to_string())
}

/// Character data directly inside `node`, excluding text of child elements.
fn own_text(node: Node) -> String {
    node.children()
        .filter(|n| n.is_text())
        .filter_map(|n| n.text())
        .collect()
}

fn child_text(node: Node, name: &str) -> Option<String> {
    child(node, name).map(own_text)
}

#[cfg(test)]
mod tests {
    use super::*;

    const GRANT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE us-patent-grant SYSTEM "us-patent-grant-v47-2022-02-17.dtd" [ ]>
<us-patent-grant lang="EN" dtd-version="v4.7 2022-02-17" country="US" date-produced="20220101" date-publ="20220104">
  <us-bibliographic-data-grant>
    <invention-title id="t1">WIDGET</invention-title>
  </us-bibliographic-data-grant>
  <abstract id="abstract"><p id="p-0001" num="0001">H<sub>2</sub>O based widget.</p></abstract>
  <claims id="claims">
    <claim id="CLM-00001" num="00001">
      <claim-text>1. A widget comprising:
        <claim-text>a body; and</claim-text>
      </claim-text>
    </claim>
  </claims>
</us-patent-grant>"#;

    const APPLICATION: &str = r#"<us-patent-application lang="EN" country="US">
  <us-bibliographic-data-application>
    <invention-title>GADGET</invention-title>
  </us-bibliographic-data-application>
</us-patent-application>"#;

    #[test]
    fn test_grant_with_doctype() {
        let doc = parse_grant_xml(GRANT.as_bytes()).unwrap();
        assert_eq!(doc.kind(), DocumentKind::Grant);
        assert_eq!(doc.header().lang.as_deref(), Some("EN"));
        assert_eq!(doc.header().dtd_version.as_deref(), Some("v4.7 2022-02-17"));
        assert_eq!(
            doc.header().published_on(),
            chrono::NaiveDate::from_ymd_opt(2022, 1, 4)
        );
    }

    #[test]
    fn test_paragraph_text_excludes_inline_spans() {
        let doc = parse_xml(GRANT.as_bytes()).unwrap();
        let p = &doc.abstract_section().unwrap().paragraphs[0];
        assert_eq!(p.text, "HO based widget.");
        assert_eq!(p.spans.len(), 1);
        assert_eq!(p.spans[0].style, InlineStyle::Subscript);
        assert_eq!(p.spans[0].text, "2");
    }

    #[test]
    fn test_claim_text_tree() {
        let doc = parse_xml(GRANT.as_bytes()).unwrap();
        let claim = &doc.claims().unwrap().claims[0];
        assert_eq!(claim.number.as_deref(), Some("00001"));
        assert_eq!(claim.text_nodes.len(), 1);
        let top = &claim.text_nodes[0];
        assert!(top.text.contains("A widget comprising:"));
        assert_eq!(top.nested.len(), 1);
        assert_eq!(top.nested[0].text, "a body; and");
        assert!(top.nested[0].nested.is_empty());
    }

    fn nested_claim_xml(depth: usize) -> String {
        let mut xml = String::from("<us-patent-application><claims><claim num=\"1\">");
        for i in 0..depth {
            xml.push_str(&format!("<claim-text>level{}", i));
        }
        for _ in 0..depth {
            xml.push_str("</claim-text>");
        }
        xml.push_str("</claim></claims></us-patent-application>");
        xml
    }

    #[test]
    fn test_deep_claim_nesting_under_limit() {
        // root, claims and claim account for three levels
        let depth = MAX_NESTING_DEPTH - 3;
        let xml = nested_claim_xml(depth);

        let doc = parse_application_xml(xml.as_bytes()).unwrap();
        let mut node = &doc.claims().unwrap().claims[0].text_nodes[0];
        let mut seen = 1;
        while let Some(next) = node.nested.first() {
            node = next;
            seen += 1;
        }
        assert_eq!(seen, depth);
        assert_eq!(node.text, format!("level{}", depth - 1));
    }

    #[test]
    fn test_nesting_past_limit_is_rejected() {
        let xml = nested_claim_xml(MAX_NESTING_DEPTH - 2);
        assert_eq!(
            parse_application_xml(xml.as_bytes()),
            Err(ParseError::MalformedXml("nesting too deep".to_string()))
        );

        let xml = nested_claim_xml(100_000);
        assert_eq!(
            parse_application_xml(xml.as_bytes()),
            Err(ParseError::MalformedXml("nesting too deep".to_string()))
        );
        assert_eq!(
            parse_xml(xml.as_bytes()),
            Err(ParseError::UnrecognizedDocumentType)
        );
    }

    #[test]
    fn test_mismatched_root() {
        let err = parse_grant_xml(APPLICATION.as_bytes()).unwrap_err();
        assert_eq!(
            err,
            ParseError::DocumentTypeMismatch {
                expected: DocumentKind::Grant,
                actual: "us-patent-application".to_string(),
            }
        );
    }

    #[test]
    fn test_empty_and_malformed() {
        assert_eq!(parse_xml(b""), Err(ParseError::EmptyDocument));
        assert_eq!(parse_grant_xml(b""), Err(ParseError::EmptyDocument));
        assert!(matches!(
            parse_grant_xml(b"<us-patent-grant><unclosed></us-patent-grant>"),
            Err(ParseError::MalformedXml(_))
        ));
        assert!(matches!(
            parse_grant_xml(&[0xff, 0xfe, 0x00]),
            Err(ParseError::MalformedXml(_))
        ));
    }
}

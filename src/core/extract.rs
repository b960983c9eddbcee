//! Plain-text extraction over a parsed patent document.
//!
//! Every function here is total: a missing section yields an empty string or
//! an empty list. Inline formatting spans (sub/sup/i/b) never contribute text.

use crate::core::layout::{Abstract, Claim, ClaimTextNode, Description, PatentDocument};

/// First invention title, trimmed.
pub fn title(doc: &PatentDocument) -> String {
    doc.bibliography()
        .and_then(|bib| bib.invention_titles.first())
        .map(|t| t.text.trim().to_string())
        .unwrap_or_default()
}

pub fn abstract_text(doc: &PatentDocument) -> String {
    doc.abstract_section().map(extract_abstract).unwrap_or_default()
}

pub fn description_text(doc: &PatentDocument) -> String {
    doc.description().map(extract_description).unwrap_or_default()
}

/// Claims of the document, or an empty slice when the section is absent.
pub fn claim_list(doc: &PatentDocument) -> &[Claim] {
    doc.claims().map(|c| c.claims.as_slice()).unwrap_or(&[])
}

/// Paragraph texts separated by blank lines.
pub fn extract_abstract(section: &Abstract) -> String {
    let text = section
        .paragraphs
        .iter()
        .map(|p| p.text.trim())
        .collect::<Vec<_>>()
        .join("\n\n");
    text.trim().to_string()
}

/// All headings, then all paragraphs, each separated by a blank line.
///
/// Headings and paragraphs are stored as separate sequences, so the output
/// does not interleave a heading with the paragraphs that follow it.
pub fn extract_description(section: &Description) -> String {
    let mut out = String::new();
    let blocks = section
        .headings
        .iter()
        .map(|h| h.text.trim())
        .chain(section.paragraphs.iter().map(|p| p.text.trim()));

    for block in blocks {
        if !out.is_empty() {
            out.push_str("\n\n");
        }
        out.push_str(block);
    }
    out.trim().to_string()
}

/// Depth-first, left-to-right text of a claim and all of its nested
/// `claim-text` elements, non-empty fragments joined by single spaces.
pub fn claim_text(claim: &Claim) -> String {
    let mut fragments: Vec<&str> = Vec::new();
    let mut stack: Vec<&ClaimTextNode> = claim.text_nodes.iter().rev().collect();

    while let Some(node) = stack.pop() {
        let text = node.text.trim();
        if !text.is_empty() {
            fragments.push(text);
        }
        stack.extend(node.nested.iter().rev());
    }

    fragments.join(" ")
}

/// Text of every claim in order, skipping claims with no text.
pub fn all_claims_text(claims: &[Claim]) -> Vec<String> {
    claims
        .iter()
        .map(claim_text)
        .filter(|text| !text.is_empty())
        .collect()
}

/// `CLAIM {n}:\n{text}` blocks separated by blank lines. `n` is the declared
/// claim number when it starts with an integer, else the 1-based position.
pub fn all_claims_text_formatted(claims: &[Claim]) -> String {
    let mut out = String::new();
    for (i, claim) in claims.iter().enumerate() {
        let number = claim
            .number
            .as_deref()
            .and_then(leading_integer)
            .unwrap_or(i as i64 + 1);

        if i > 0 {
            out.push_str("\n\n");
        }
        out.push_str(&format!("CLAIM {}:\n{}", number, claim_text(claim)));
    }
    out
}

/// Integer prefix of `raw` (after leading whitespace), e.g. `"00012"` -> 12.
fn leading_integer(raw: &str) -> Option<i64> {
    let s = raw.trim_start();
    let sign_len = usize::from(s.starts_with(['+', '-']));
    let digits = s[sign_len..].bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    s[..sign_len + digits].parse().ok()
}

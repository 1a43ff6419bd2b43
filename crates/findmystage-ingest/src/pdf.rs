//! PDF text extraction.
//!
//! Pages are visited in page-number order. Within a page, every text-showing
//! operator (`Tj`, `TJ`, `'`, `"`) yields one fragment, decoded with the
//! font selected by the preceding `Tf`. Fragments come out in content-stream
//! order, which need not match the visual reading order of multi-column
//! layouts.

use std::collections::BTreeMap;

use findmystage_core::{Error, Result};
use lopdf::content::Content;
use lopdf::{Document, Encoding, Object, ObjectId};
use tracing::{debug, warn};

use crate::document::ExtractedText;

/// Kerning adjustments below this (in thousandths of an em) read as a space.
const TJ_SPACE_THRESHOLD: i64 = -100;

/// Decode a PDF held in memory and return its page-ordered text.
pub fn extract_text(bytes: &[u8]) -> Result<ExtractedText> {
    let doc = load(bytes)?;
    let pages = doc.get_pages();

    let mut page_texts = Vec::with_capacity(pages.len());
    for (&number, &page_id) in &pages {
        let fragments = page_fragments(&doc, page_id)
            .map_err(|e| Error::Extraction(format!("Failed to read page {}: {}", number, e)))?;
        page_texts.push(join_fragments(&fragments));
    }

    let text = ExtractedText::from_pages(&page_texts);
    debug!(
        "Extracted {} chars from {} PDF pages",
        text.as_str().len(),
        page_texts.len()
    );
    Ok(text)
}

fn load(bytes: &[u8]) -> Result<Document> {
    let doc = Document::load_mem(bytes)
        .map_err(|e| Error::Extraction(format!("Failed to decode PDF: {}", e)))?;
    if doc.is_encrypted() {
        return Err(Error::Extraction("PDF is encrypted".into()));
    }
    Ok(doc)
}

/// One decoded string per text-showing operator on the page.
fn page_fragments(doc: &Document, page_id: ObjectId) -> lopdf::Result<Vec<String>> {
    let encodings: BTreeMap<Vec<u8>, Encoding> = doc
        .get_page_fonts(page_id)?
        .into_iter()
        .map(|(name, font)| font.get_font_encoding(doc).map(|enc| (name, enc)))
        .collect::<lopdf::Result<_>>()?;
    let content = Content::decode(&doc.get_page_content(page_id)?)?;

    let mut fragments = Vec::new();
    let mut current: Option<&Encoding> = None;
    for op in &content.operations {
        let shown = match op.operator.as_str() {
            "Tf" => {
                current = op
                    .operands
                    .first()
                    .and_then(|name| name.as_name().ok())
                    .and_then(|name| encodings.get(name));
                continue;
            }
            "Tj" | "TJ" | "'" => &op.operands[..],
            // `aw ac string "`: only the string is text.
            "\"" => op.operands.last().map(std::slice::from_ref).unwrap_or(&[]),
            _ => continue,
        };
        let Some(encoding) = current else {
            warn!("Skipping text shown without a decodable font");
            continue;
        };
        let mut run = String::new();
        decode_operands(&mut run, encoding, shown)?;
        fragments.push(run);
    }
    Ok(fragments)
}

fn decode_operands(
    out: &mut String,
    encoding: &Encoding,
    operands: &[Object],
) -> lopdf::Result<()> {
    for operand in operands {
        match operand {
            Object::String(bytes, _) => out.push_str(&Document::decode_text(encoding, bytes)?),
            Object::Array(items) => decode_operands(out, encoding, items)?,
            Object::Integer(adjust) if *adjust < TJ_SPACE_THRESHOLD => out.push(' '),
            Object::Real(adjust) if *adjust < TJ_SPACE_THRESHOLD as f32 => out.push(' '),
            _ => {}
        }
    }
    Ok(())
}

/// Trim fragments, drop blank ones and join the rest with single spaces.
fn join_fragments<S: AsRef<str>>(fragments: &[S]) -> String {
    fragments
        .iter()
        .map(|f| f.as_ref().trim())
        .filter(|f| !f.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Builders for small in-memory PDFs used by tests across the workspace.
#[cfg(any(test, feature = "fixtures"))]
pub mod fixtures {
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Document, Object, Stream};

    /// Build a PDF with one page per entry; each page holds one text object
    /// per fragment. An empty fragment list yields a page without text.
    pub fn pdf_with_pages(pages: &[&[&str]]) -> Vec<u8> {
        let pages = pages
            .iter()
            .map(|fragments| {
                fragments
                    .iter()
                    .enumerate()
                    .flat_map(|(i, fragment)| {
                        let mut ops = vec![Operation::new("BT", vec![]), select_font()];
                        ops.extend(positioned_run(i, fragment));
                        ops.push(Operation::new("ET", vec![]));
                        ops
                    })
                    .collect()
            })
            .collect();
        pdf_with_page_operations(pages)
    }

    /// Build a one-page PDF whose runs all sit inside a single text object,
    /// each moved with `Td` and shown with its own `Tj`, the way word
    /// processors lay out lines.
    pub fn pdf_with_single_text_object(runs: &[&str]) -> Vec<u8> {
        let mut ops = vec![Operation::new("BT", vec![]), select_font()];
        for (i, run) in runs.iter().enumerate() {
            ops.extend(positioned_run(i, run));
        }
        ops.push(Operation::new("ET", vec![]));
        pdf_with_page_operations(vec![ops])
    }

    /// `Tf` selecting the fixture font.
    pub fn select_font() -> Operation {
        Operation::new("Tf", vec!["F1".into(), 12.into()])
    }

    fn positioned_run(line: usize, text: &str) -> [Operation; 2] {
        let y = 700 - (line as i64) * 20;
        [
            Operation::new("Td", vec![72.into(), y.into()]),
            Operation::new("Tj", vec![Object::string_literal(text)]),
        ]
    }

    /// Build a PDF with one page per operation list, all pages sharing a
    /// WinAnsi Helvetica font named `F1`.
    pub fn pdf_with_page_operations(pages: Vec<Vec<Operation>>) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut kids: Vec<Object> = Vec::new();
        for operations in pages {
            let content = Content { operations };
            let content_id = doc.add_object(Stream::new(
                dictionary! {},
                content.encode().expect("content encodes"),
            ));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "Resources" => resources_id,
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut buf = Vec::new();
        doc.save_to(&mut buf).expect("pdf serializes");
        buf
    }
}

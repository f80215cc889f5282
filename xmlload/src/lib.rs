//! Turns the XML program format consumed by [taci](../taci/index.html) into the
//! generic [`taci::dom::Element`] tree its loader operates on.
//!
//! The interpreter's own `Loader` is deliberately XML-agnostic: it only knows
//! about the minimal [`Element`](taci::dom::Element) tree type. This crate is the
//! concrete adapter that fills that gap for real programs, using [quick-xml] as a
//! streaming pull-parser rather than building a full general-purpose XML DOM. The
//! element tree it produces carries exactly the structure the loader validates
//! (§4.1 of the interpreter's spec): a `program` root, `instruction` children,
//! `arg1`/`arg2`/`arg3` leaves with their text content as the lexeme.
//!
//! [quick-xml]: https://docs.rs/quick-xml/

mod error;

pub use error::Error;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use taci::dom::Element;

pub type Result<T> = std::result::Result<T, Error>;

/// Parses `input` into an [`Element`] tree, without interpreting it further.
///
/// Element and attribute names are decoded as UTF-8; text content and attribute
/// values have XML entity references (`&amp;`, `&#965;`, ...) resolved. Whitespace
/// is preserved verbatim — the loader is the one that trims argument lexemes.
pub fn parse(input: &str) -> Result<Element> {
    let mut reader = Reader::from_str(input);
    reader.trim_text(false);

    let mut buf = Vec::new();
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_event(&mut buf)? {
            Event::Start(ref start) => {
                stack.push(element_from_tag(&reader, start)?);
            }
            Event::Empty(ref start) => {
                let element = element_from_tag(&reader, start)?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::Text(ref text) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&text.unescape_and_decode(&reader)?);
                }
            }
            Event::CData(ref text) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&String::from_utf8_lossy(text));
                }
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| Error::Malformed("unmatched closing tag".to_string()))?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    root.ok_or_else(|| Error::Malformed("document has no root element".to_string()))
}

/// Parses `input` and loads it in one step, for callers (namely `taci-runner`)
/// that don't need the intermediate element tree.
pub fn load(input: &str) -> std::result::Result<taci::Program, taci::Error> {
    let root = parse(input).map_err(taci::Error::from)?;
    taci::load(&root)
}

fn element_from_tag<R: std::io::BufRead>(
    reader: &Reader<R>,
    tag: &BytesStart,
) -> Result<Element> {
    let name = std::str::from_utf8(tag.name())
        .map_err(|_| Error::Malformed("non-UTF-8 element name".to_string()))?
        .to_string();

    let mut element = Element::new(name);
    for attr in tag.attributes() {
        let attr = attr?;
        let key = std::str::from_utf8(attr.key)
            .map_err(|_| Error::Malformed("non-UTF-8 attribute name".to_string()))?
            .to_string();
        let value = attr.unescape_and_decode_value(reader)?;
        element.attributes.insert(key, value);
    }

    Ok(element)
}

/// Appends `element` to whatever is currently open, or establishes it as the
/// document root if nothing is.
fn attach(stack: &mut Vec<Element>, root: &mut Option<Element>, element: Element) -> Result<()> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None => {
            if root.is_some() {
                return Err(Error::Malformed(
                    "document has more than one root element".to_string(),
                ));
            }
            *root = Some(element);
        }
    }
    Ok(())
}

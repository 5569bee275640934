//! Small layer over quick-xml shared by the Premiere and FCPX exporters.

use std::collections::BTreeMap;
use std::fmt::Display;
use std::io::Cursor;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::error::{EditError, ExportError, Result};

fn xml_err<E: Display>(e: E) -> ExportError {
    ExportError::XmlWrite {
        reason: e.to_string(),
    }
}

/// Error for a document that cannot be read back
pub(crate) fn parse_error<E: Display>(format: &str, e: E) -> EditError {
    ExportError::ParseFailed {
        format: format.to_string(),
        reason: e.to_string(),
    }
    .into()
}

/// Indented XML document under construction
pub(crate) struct XmlOut {
    writer: Writer<Cursor<Vec<u8>>>,
}

impl XmlOut {
    pub fn new() -> Self {
        Self {
            writer: Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2),
        }
    }

    /// XML declaration followed by `<!DOCTYPE doctype>`
    pub fn prolog(&mut self, doctype: &str) -> Result<()> {
        self.write(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        self.write(Event::DocType(BytesText::from_escaped(doctype)))
    }

    pub fn open(&mut self, name: &str, attrs: &[(&str, String)]) -> Result<()> {
        self.write(Event::Start(element(name, attrs)))
    }

    pub fn empty(&mut self, name: &str, attrs: &[(&str, String)]) -> Result<()> {
        self.write(Event::Empty(element(name, attrs)))
    }

    pub fn close(&mut self, name: &str) -> Result<()> {
        self.write(Event::End(BytesEnd::new(name)))
    }

    /// `<name>value</name>` on one line
    pub fn text(&mut self, name: &str, value: &str) -> Result<()> {
        self.open(name, &[])?;
        self.write(Event::Text(BytesText::new(value)))?;
        self.close(name)
    }

    pub fn finish(self) -> Result<String> {
        let bytes = self.writer.into_inner().into_inner();
        let text = String::from_utf8(bytes).map_err(xml_err)?;
        Ok(text)
    }

    fn write(&mut self, event: Event<'_>) -> Result<()> {
        self.writer.write_event(event).map_err(xml_err)?;
        Ok(())
    }
}

fn element<'a>(name: &'a str, attrs: &[(&str, String)]) -> BytesStart<'a> {
    let mut start = BytesStart::new(name);
    for (key, value) in attrs {
        start.push_attribute((*key, value.as_str()));
    }
    start
}

/// Element name as an owned string
pub(crate) fn element_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.name().as_ref()).into_owned()
}

/// All attributes of an element, unescaped
pub(crate) fn attribute_map(e: &BytesStart<'_>, format: &str) -> Result<BTreeMap<String, String>> {
    let mut map = BTreeMap::new();
    for attr in e.attributes() {
        let attr = attr.map_err(|err| parse_error(format, err))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|err| parse_error(format, err))?
            .into_owned();
        map.insert(key, value);
    }
    Ok(map)
}

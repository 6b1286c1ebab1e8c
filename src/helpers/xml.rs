//! XML utilities for the SpreadsheetML parts of an XLSX package
//! Provides a reader wrapper with helper traits for attribute and text processing,
//! and a small element-writing layer on top of `quick_xml::Writer`

use crate::error::VolumeSheetError;
use quick_xml::escape::resolve_xml_entity;
use quick_xml::events::attributes::Attribute;
use quick_xml::events::BytesDecl;
use quick_xml::events::BytesEnd;
use quick_xml::events::BytesRef;
use quick_xml::events::BytesStart;
use quick_xml::events::BytesText;
use quick_xml::events::Event;
use quick_xml::Reader;
use quick_xml::Writer;
use std::borrow::Cow;
use std::io::BufRead;
use std::io::Write;
use thiserror::Error;

/// Errors specific to XML parsing operations
#[derive(Error, Debug)]
pub enum XmlError {
    #[error("Parse entity '{0}' failed")]
    ParseEntityError(String),
}

/// XML reader wrapper configured for spreadsheet parsing
pub(crate) struct XmlReader<R: BufRead> {
    reader: Reader<R>,
    buffer: Vec<u8>,
}

impl<R: BufRead> XmlReader<R> {
    /// Creates a new XML reader configured for spreadsheet parsing
    pub(crate) fn new(buf_reader: R) -> XmlReader<R> {
        let mut reader = Reader::from_reader(buf_reader);
        let config = reader.config_mut();
        config.check_comments = false;
        config.check_end_names = false;
        config.expand_empty_elements = true;
        config.trim_text(false);

        let buffer = Vec::with_capacity(1024);
        XmlReader { reader, buffer }
    }

    /// Reads the next XML event from the reader
    pub(crate) fn next(&'_ mut self) -> Result<Option<Event<'_>>, VolumeSheetError> {
        self.buffer.clear();
        match self.reader.read_event_into(&mut self.buffer) {
            Ok(Event::Eof) => Ok(None),
            Ok(event) => Ok(Some(event)),
            Err(error) => Err(VolumeSheetError::XmlError(error)),
        }
    }
}

/// Helper trait for XML attributes providing unescaped values
pub(crate) trait XmlAttributeHelper<'a> {
    /// Gets the unescaped attribute value as a string
    fn get_value(&self) -> Result<Cow<'a, str>, VolumeSheetError>;
}

impl<'a> XmlAttributeHelper<'a> for Attribute<'a> {
    fn get_value(&self) -> Result<Cow<'a, str>, VolumeSheetError> {
        Ok(self.unescape_value()?)
    }
}

/// Helper trait for XML nodes providing attribute access methods
pub(crate) trait XmlNodeHelper<'a> {
    /// Gets an attribute value by name
    fn get_attribute_value(&'a self, name: &str) -> Result<Option<Cow<'a, str>>, VolumeSheetError>;
}

impl<'a> XmlNodeHelper<'a> for BytesStart<'a> {
    fn get_attribute_value(&'a self, name: &str) -> Result<Option<Cow<'a, str>>, VolumeSheetError> {
        self.try_get_attribute(name)?
            .map(|attribute| attribute.get_value())
            .transpose()
    }
}

/// Helper trait for building text content from XML events
pub(crate) trait XmlTextContextHelper {
    /// Appends text content from BytesText event
    fn push_bytes_text(&mut self, text: &BytesText) -> Result<(), VolumeSheetError>;

    /// Appends text content from BytesRef event (handles entities and character references)
    fn push_bytes_ref(&mut self, bytes: &BytesRef) -> Result<(), VolumeSheetError>;
}

impl XmlTextContextHelper for String {
    fn push_bytes_text(&mut self, text: &BytesText) -> Result<(), VolumeSheetError> {
        self.push_str(&text.xml_content()?);
        Ok(())
    }

    fn push_bytes_ref(&mut self, bytes: &BytesRef) -> Result<(), VolumeSheetError> {
        let raw = bytes.xml_content()?;
        if let Some(number) = raw.strip_prefix('#') {
            let code = if let Some(hex) = number.strip_prefix('x') {
                u32::from_str_radix(hex, 16)?
            } else {
                number.parse::<u32>()?
            };
            if let Some(character) = char::from_u32(code) {
                self.push(character);
            }
        } else if let Some(entity) = resolve_xml_entity(&raw) {
            self.push_str(entity);
        } else {
            Err(XmlError::ParseEntityError(raw.to_string()))?;
        }

        Ok(())
    }
}

#[macro_export]
macro_rules! match_xml_events {
    ($reader:expr => { $($arms:tt)* }) => {
        while let Some(result) = $reader.next()? {
            match result {
                Event::Eof => break,
                $($arms)*
                _ => (),
            }
        }
    };
}

/// Element writer for SpreadsheetML parts.
/// Every part is written with an XML declaration and without indentation.
pub(crate) struct XmlWriter<W: Write> {
    writer: Writer<W>,
}

impl<W: Write> XmlWriter<W> {
    /// Creates a writer and emits the standalone XML declaration
    pub(crate) fn new(inner: W) -> Result<XmlWriter<W>, VolumeSheetError> {
        let mut writer = Writer::new(inner);
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;
        Ok(XmlWriter { writer })
    }

    /// Opens an element with the given attributes
    pub(crate) fn start(&mut self, name: &str, attributes: &[(&str, &str)]) -> Result<(), VolumeSheetError> {
        let mut element = BytesStart::new(name);
        for attribute in attributes {
            element.push_attribute(*attribute);
        }
        self.writer.write_event(Event::Start(element))?;
        Ok(())
    }

    /// Closes an element
    pub(crate) fn end(&mut self, name: &str) -> Result<(), VolumeSheetError> {
        self.writer.write_event(Event::End(BytesEnd::new(name)))?;
        Ok(())
    }

    /// Writes a self-closing element
    pub(crate) fn empty(&mut self, name: &str, attributes: &[(&str, &str)]) -> Result<(), VolumeSheetError> {
        let mut element = BytesStart::new(name);
        for attribute in attributes {
            element.push_attribute(*attribute);
        }
        self.writer.write_event(Event::Empty(element))?;
        Ok(())
    }

    /// Writes an element holding escaped text only
    pub(crate) fn text_element(&mut self, name: &str, attributes: &[(&str, &str)], text: &str) -> Result<(), VolumeSheetError> {
        self.start(name, attributes)?;
        self.writer.write_event(Event::Text(BytesText::new(text)))?;
        self.end(name)
    }

    /// Returns the underlying output
    pub(crate) fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}

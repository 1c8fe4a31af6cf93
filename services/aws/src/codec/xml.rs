//! Schemaless XML decoding on top of quick-xml.

use super::ErrorFields;
use quick_xml::events::Event;
use quick_xml::Reader;
use reqwire_core::{Error, Result};
use serde_json::{Map, Value};

struct Node {
    name: String,
    text: String,
    children: Map<String, Value>,
}

impl Node {
    fn new(name: String) -> Self {
        Self {
            name,
            text: String::new(),
            children: Map::new(),
        }
    }

    fn into_value(self) -> Value {
        if !self.children.is_empty() {
            Value::Object(self.children)
        } else if self.text.is_empty() {
            Value::Null
        } else {
            Value::String(self.text)
        }
    }

    /// Repeated names turn into an array in document order.
    fn insert(&mut self, name: String, value: Value) {
        match self.children.get_mut(&name) {
            None => {
                self.children.insert(name, value);
            }
            Some(Value::Array(items)) => items.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            }
        }
    }
}

fn xml_error(e: impl Into<anyhow::Error>) -> Error {
    Error::protocol("response body is not valid xml").with_source(e)
}

/// Parse an XML document into its root element name and a JSON tree.
///
/// Elements with children become objects, text-only elements become
/// strings and empty elements become `null`. Attributes are ignored.
pub fn parse(body: &[u8]) -> Result<(String, Value)> {
    let xml = std::str::from_utf8(body).map_err(xml_error)?;
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<Node> = Vec::new();
    let mut root: Option<(String, Value)> = None;

    loop {
        match reader.read_event().map_err(xml_error)? {
            Event::Start(e) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).to_string();
                stack.push(Node::new(name));
            }
            Event::Empty(e) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).to_string();
                match stack.last_mut() {
                    Some(parent) => parent.insert(name, Value::Null),
                    None => root = Some((name, Value::Null)),
                }
            }
            Event::Text(e) => {
                if let Some(node) = stack.last_mut() {
                    node.text.push_str(&e.unescape().map_err(xml_error)?);
                }
            }
            Event::CData(e) => {
                if let Some(node) = stack.last_mut() {
                    node.text.push_str(&String::from_utf8_lossy(&e.into_inner()));
                }
            }
            Event::End(_) => {
                let Some(node) = stack.pop() else {
                    return Err(Error::protocol("unbalanced closing tag in xml body"));
                };
                let name = node.name.clone();
                let value = node.into_value();
                match stack.last_mut() {
                    Some(parent) => parent.insert(name, value),
                    None => root = Some((name, value)),
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(Error::protocol("xml body ended inside an element"));
    }
    root.ok_or_else(|| Error::protocol("xml body has no root element"))
}

/// Elements whose direct children carry the error fields.
const ERROR_PARENTS: &[&str] = &["Error", "ErrorResponse", "Response"];

/// Pick `Code`, `Message` and `RequestId` out of an XML error body.
///
/// Query services nest them as `ErrorResponse/Error/Code`, S3 puts them
/// directly under `Error` and EC2 uses `Response/Errors/Error`. Fields are
/// only taken from those parents, so detail elements with their own `Code`
/// are skipped. Returns `None` if the body is not XML.
pub(crate) fn parse_error(body: &[u8]) -> Option<ErrorFields> {
    let xml = std::str::from_utf8(body).ok()?;
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut fields = ErrorFields::default();
    let mut seen_element = false;
    let mut path: Vec<String> = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                seen_element = true;
                path.push(String::from_utf8_lossy(e.local_name().as_ref()).to_string());
            }
            Ok(Event::Empty(_)) => seen_element = true,
            Ok(Event::Text(e)) => {
                let [.., parent, current] = path.as_slice() else {
                    continue;
                };
                if !ERROR_PARENTS.contains(&parent.as_str()) {
                    continue;
                }
                let slot = match current.as_str() {
                    "Code" => &mut fields.code,
                    "Message" => &mut fields.message,
                    "RequestId" | "RequestID" => &mut fields.request_id,
                    _ => continue,
                };
                if slot.is_none() {
                    *slot = Some(e.unescape().unwrap_or_default().to_string());
                }
            }
            Ok(Event::End(_)) => {
                path.pop();
            }
            Ok(Event::Eof) => break,
            Err(_) => return None,
            _ => {}
        }
    }

    seen_element.then_some(fields)
}

//! XML-RPC message encoding and decoding.

use pushrelay_core::Fault;
use quick_xml::Reader;
use quick_xml::escape::{escape, unescape};
use quick_xml::events::Event;
use serde_json::{Map, Number, Value};

use crate::{Result, XmlRpcError};

/// Decoded `methodResponse`.
#[derive(Debug, Clone, PartialEq)]
pub enum MethodResponse {
    /// The call succeeded with this value (`null` when no params were sent).
    Success(Value),
    /// The call failed with this fault.
    Fault(Fault),
}

/// Encode a `methodCall` document.
pub fn encode_call(method: &str, args: &[Value]) -> String {
    let mut xml = String::from("<?xml version=\"1.0\"?>\n<methodCall><methodName>");
    xml.push_str(&escape(method));
    xml.push_str("</methodName><params>");
    for arg in args {
        xml.push_str("<param>");
        encode_value(&mut xml, arg);
        xml.push_str("</param>");
    }
    xml.push_str("</params></methodCall>");
    xml
}

fn encode_value(out: &mut String, value: &Value) {
    out.push_str("<value>");
    match value {
        Value::Null => out.push_str("<nil/>"),
        Value::Bool(b) => {
            out.push_str("<boolean>");
            out.push_str(if *b { "1" } else { "0" });
            out.push_str("</boolean>");
        }
        Value::Number(n) => match n.as_i64().filter(|i| i32::try_from(*i).is_ok()) {
            Some(i) => {
                out.push_str("<int>");
                out.push_str(&i.to_string());
                out.push_str("</int>");
            }
            None => {
                out.push_str("<double>");
                out.push_str(&n.as_f64().unwrap_or_default().to_string());
                out.push_str("</double>");
            }
        },
        Value::String(s) => {
            out.push_str("<string>");
            out.push_str(&escape(s.as_str()));
            out.push_str("</string>");
        }
        Value::Array(values) => {
            out.push_str("<array><data>");
            for v in values {
                encode_value(out, v);
            }
            out.push_str("</data></array>");
        }
        Value::Object(members) => {
            out.push_str("<struct>");
            for (name, v) in members {
                out.push_str("<member><name>");
                out.push_str(&escape(name.as_str()));
                out.push_str("</name>");
                encode_value(out, v);
                out.push_str("</member>");
            }
            out.push_str("</struct>");
        }
    }
    out.push_str("</value>");
}

/// Decode a `methodResponse` document.
pub fn decode_response(xml: &str) -> Result<MethodResponse> {
    let root = parse_document(xml)?;
    if root.name != "methodResponse" {
        return Err(malformed(format!("expected methodResponse, got {}", root.name)));
    }

    if let Some(fault) = root.child("fault") {
        return decode_fault(fault).map(MethodResponse::Fault);
    }

    let value = match root.child("params").and_then(|p| p.child("param")) {
        Some(param) => decode_value(param.required("value")?)?,
        None => Value::Null,
    };
    Ok(MethodResponse::Success(value))
}

fn decode_fault(fault: &Element) -> Result<Fault> {
    let Value::Object(members) = decode_value(fault.required("value")?)? else {
        return Err(malformed("fault value is not a struct"));
    };

    let code = members
        .get("faultCode")
        .and_then(Value::as_i64)
        .and_then(|c| i32::try_from(c).ok())
        .ok_or_else(|| malformed("fault without an integer faultCode"))?;
    let message = members
        .get("faultString")
        .and_then(Value::as_str)
        .unwrap_or_default();

    Ok(Fault::new(code, message))
}

fn decode_value(value: &Element) -> Result<Value> {
    let Some(typed) = value.children.first() else {
        return Ok(Value::String(value.text()?));
    };

    match typed.name.as_str() {
        "int" | "i4" | "i8" => {
            let text = typed.text()?;
            text.trim()
                .parse::<i64>()
                .map(Value::from)
                .map_err(|_| malformed(format!("invalid integer: {text}")))
        }
        "boolean" => match typed.text()?.trim() {
            "1" | "true" => Ok(Value::Bool(true)),
            "0" | "false" => Ok(Value::Bool(false)),
            other => Err(malformed(format!("invalid boolean: {other}"))),
        },
        "double" => {
            let text = typed.text()?;
            text.trim()
                .parse::<f64>()
                .ok()
                .and_then(Number::from_f64)
                .map(Value::Number)
                .ok_or_else(|| malformed(format!("invalid double: {text}")))
        }
        "string" | "dateTime.iso8601" | "base64" => Ok(Value::String(typed.text()?)),
        "nil" => Ok(Value::Null),
        "array" => typed
            .required("data")?
            .children
            .iter()
            .filter(|c| c.name == "value")
            .map(decode_value)
            .collect::<Result<Vec<_>>>()
            .map(Value::Array),
        "struct" => {
            let mut members = Map::new();
            for member in typed.children.iter().filter(|c| c.name == "member") {
                let name = member.required("name")?.text()?;
                let value = decode_value(member.required("value")?)?;
                members.insert(name, value);
            }
            Ok(Value::Object(members))
        }
        other => Err(malformed(format!("unsupported value type: {other}"))),
    }
}

/// Minimal element tree; text is kept escaped until read.
#[derive(Debug, Default)]
struct Element {
    name: String,
    children: Vec<Element>,
    raw_text: String,
}

impl Element {
    fn new(name: String) -> Self {
        Self {
            name,
            ..Default::default()
        }
    }

    fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    fn required(&self, name: &str) -> Result<&Element> {
        self.child(name)
            .ok_or_else(|| malformed(format!("<{}> without <{}>", self.name, name)))
    }

    fn text(&self) -> Result<String> {
        unescape(&self.raw_text)
            .map(|s| s.into_owned())
            .map_err(|e| malformed(e.to_string()))
    }
}

fn parse_document(xml: &str) -> Result<Element> {
    let mut reader = Reader::from_str(xml);
    let mut stack: Vec<Element> = Vec::new();
    let mut root = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) => stack.push(Element::new(utf8(e.local_name().as_ref())?)),
            Event::Empty(e) => {
                let element = Element::new(utf8(e.local_name().as_ref())?);
                attach(&mut stack, &mut root, element);
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| malformed("unbalanced closing tag"))?;
                attach(&mut stack, &mut root, element);
            }
            Event::Text(t) => {
                if let Some(top) = stack.last_mut() {
                    top.raw_text.push_str(&utf8(&t)?);
                }
            }
            Event::GeneralRef(r) => {
                if let Some(top) = stack.last_mut() {
                    top.raw_text.push('&');
                    top.raw_text.push_str(&utf8(&r)?);
                    top.raw_text.push(';');
                }
            }
            Event::CData(c) => {
                if let Some(top) = stack.last_mut() {
                    top.raw_text.push_str(&escape(utf8(&c)?.as_str()));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(malformed("unexpected end of document"));
    }
    root.ok_or_else(|| malformed("empty document"))
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None => *root = Some(element),
    }
}

fn utf8(bytes: &[u8]) -> Result<String> {
    std::str::from_utf8(bytes)
        .map(str::to_string)
        .map_err(|e| malformed(e.to_string()))
}

fn malformed(message: impl Into<String>) -> XmlRpcError {
    XmlRpcError::Malformed(message.into())
}

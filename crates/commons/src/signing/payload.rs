use std::borrow::Cow;
use std::io;

use serde::{Serialize, ser::Error as _};
use serde_json::{Serializer, Value, ser::Formatter};

use crate::error::Error;

/// Input to [`HmacSigner::generate`](super::HmacSigner::generate).
///
/// Text is signed verbatim. JSON values are serialized first, keeping
/// object keys in the order they were inserted and escaping strings the way
/// PHP's `json_encode` does with its default flags.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload<'a> {
    Text(Cow<'a, str>),
    Json(Cow<'a, Value>),
}

impl<'a> Payload<'a> {
    /// Convert any serializable value into a structured payload.
    ///
    /// Struct fields keep their declaration order. Values that have no JSON
    /// representation (e.g. maps with non-string keys) are rejected.
    pub fn json<T>(value: &T) -> Result<Payload<'static>, Error>
    where
        T: Serialize + ?Sized,
    {
        Ok(Payload::Json(Cow::Owned(serde_json::to_value(value)?)))
    }

    /// The exact string that gets signed.
    pub fn canonicalize(&self) -> Result<Cow<'_, str>, Error> {
        match self {
            Payload::Text(text) => Ok(Cow::Borrowed(&**text)),
            Payload::Json(value) => {
                let canonical =
                    String::from_utf8(encode_json(&**value)?).map_err(serde_json::Error::custom)?;
                Ok(Cow::Owned(canonical))
            }
        }
    }
}

/// Serialize `value` to the bytes a structured payload is signed over.
///
/// The transport sends request bodies through this too, so the bytes on the
/// wire are the bytes that were signed.
pub(crate) fn encode_json<T>(value: &T) -> Result<Vec<u8>, serde_json::Error>
where
    T: Serialize + ?Sized,
{
    let mut buf = Vec::new();
    let mut ser = Serializer::with_formatter(&mut buf, JsonEncodeFormatter);
    value.serialize(&mut ser)?;
    Ok(buf)
}

/// Compact output with `/` written as `\/` and every non-ASCII character as
/// `\uXXXX` (UTF-16 surrogate pairs above U+FFFF).
struct JsonEncodeFormatter;

impl Formatter for JsonEncodeFormatter {
    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        let mut start = 0;
        for (idx, ch) in fragment.char_indices() {
            if ch.is_ascii() && ch != '/' {
                continue;
            }

            writer.write_all(&fragment.as_bytes()[start..idx])?;
            if ch == '/' {
                writer.write_all(b"\\/")?;
            } else {
                let mut units = [0; 2];
                for unit in ch.encode_utf16(&mut units) {
                    write!(writer, "\\u{unit:04x}")?;
                }
            }
            start = idx + ch.len_utf8();
        }

        writer.write_all(&fragment.as_bytes()[start..])
    }
}

impl<'a> From<&'a str> for Payload<'a> {
    fn from(text: &'a str) -> Self {
        Payload::Text(Cow::Borrowed(text))
    }
}

impl<'a> From<&'a String> for Payload<'a> {
    fn from(text: &'a String) -> Self {
        Payload::Text(Cow::Borrowed(text.as_str()))
    }
}

impl From<String> for Payload<'static> {
    fn from(text: String) -> Self {
        Payload::Text(Cow::Owned(text))
    }
}

impl<'a> From<&'a Value> for Payload<'a> {
    fn from(value: &'a Value) -> Self {
        Payload::Json(Cow::Borrowed(value))
    }
}

impl From<Value> for Payload<'static> {
    fn from(value: Value) -> Self {
        Payload::Json(Cow::Owned(value))
    }
}

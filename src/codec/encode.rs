//! Flat JSON encoding.

use super::{DATETIME_FORMAT, DATE_FORMAT};
use chrono::{NaiveDate, NaiveDateTime};

/// Records that serialize to a single flat JSON object.
pub trait ToFlatJson {
    fn to_flat_json(&self) -> String;
}

/// `[obj,obj,...]` from each record's flat object.
pub fn encode_array<T: ToFlatJson>(items: &[T]) -> String {
    let mut out = String::from("[");
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push_str(&item.to_flat_json());
    }
    out.push(']');
    out
}

/// Escape text for a JSON string literal. Control characters without a
/// short form are written as `\u00XX`.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => {
                out.push_str(&format!("\\u{:04x}", c as u32));
            }
            c => out.push(c),
        }
    }
    out
}

/// Builds one flat object, field by field, in insertion order.
#[derive(Debug)]
pub struct ObjectWriter {
    buf: String,
    fields: usize,
}

impl Default for ObjectWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectWriter {
    pub fn new() -> Self {
        Self {
            buf: String::from("{"),
            fields: 0,
        }
    }

    fn key(&mut self, key: &str) {
        if self.fields > 0 {
            self.buf.push(',');
        }
        self.fields += 1;
        self.buf.push('"');
        self.buf.push_str(&escape(key));
        self.buf.push_str("\":");
    }

    fn raw(mut self, key: &str, literal: &str) -> Self {
        self.key(key);
        self.buf.push_str(literal);
        self
    }

    pub fn string(mut self, key: &str, value: &str) -> Self {
        self.key(key);
        self.buf.push('"');
        self.buf.push_str(&escape(value));
        self.buf.push('"');
        self
    }

    pub fn opt_string(self, key: &str, value: Option<&str>) -> Self {
        match value {
            Some(v) => self.string(key, v),
            None => self.null(key),
        }
    }

    pub fn int(self, key: &str, value: i64) -> Self {
        self.raw(key, &value.to_string())
    }

    pub fn opt_int(self, key: &str, value: Option<i64>) -> Self {
        match value {
            Some(v) => self.int(key, v),
            None => self.null(key),
        }
    }

    /// Non-finite values have no JSON literal and are written as `null`.
    pub fn float(self, key: &str, value: f64) -> Self {
        if value.is_finite() {
            self.raw(key, &value.to_string())
        } else {
            self.null(key)
        }
    }

    pub fn opt_float(self, key: &str, value: Option<f64>) -> Self {
        match value {
            Some(v) => self.float(key, v),
            None => self.null(key),
        }
    }

    pub fn boolean(self, key: &str, value: bool) -> Self {
        self.raw(key, if value { "true" } else { "false" })
    }

    pub fn opt_date(self, key: &str, value: Option<NaiveDate>) -> Self {
        let text = value.map(|d| d.format(DATE_FORMAT).to_string());
        self.opt_string(key, text.as_deref())
    }

    pub fn opt_datetime(self, key: &str, value: Option<NaiveDateTime>) -> Self {
        let text = value.map(|d| d.format(DATETIME_FORMAT).to_string());
        self.opt_string(key, text.as_deref())
    }

    pub fn null(self, key: &str) -> Self {
        self.raw(key, "null")
    }

    pub fn finish(mut self) -> String {
        self.buf.push('}');
        self.buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_order() {
        assert_eq!(escape(r"a\b"), r"a\\b");
        assert_eq!(escape("say \"hi\""), r#"say \"hi\""#);
        assert_eq!(escape("\\\""), r#"\\\""#);
        assert_eq!(escape("l1\nl2\r\tx"), r"l1\nl2\r\tx");
    }

    #[test]
    fn test_other_control_chars_use_unicode_escapes() {
        assert_eq!(escape("a\u{1}b\u{1f}"), r"a\u0001b\u001f");
        let json = ObjectWriter::new().string("k", "a\u{1}b\u{8}").finish();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["k"], "a\u{1}b\u{8}");
    }

    #[test]
    fn test_writer_literals() {
        let json = ObjectWriter::new()
            .int("id", 3)
            .string("nome", "Rex \"the dog\"")
            .opt_string("raca", None)
            .float("peso", 12.5)
            .opt_float("salario", Some(f64::NAN))
            .boolean("ativo", true)
            .opt_date("nascimento", NaiveDate::from_ymd_opt(2020, 2, 29))
            .finish();
        assert_eq!(
            json,
            r#"{"id":3,"nome":"Rex \"the dog\"","raca":null,"peso":12.5,"salario":null,"ativo":true,"nascimento":"2020-02-29"}"#
        );
    }

    #[test]
    fn test_empty_object_and_array() {
        assert_eq!(ObjectWriter::new().finish(), "{}");
        struct One;
        impl ToFlatJson for One {
            fn to_flat_json(&self) -> String {
                ObjectWriter::new().int("n", 1).finish()
            }
        }
        assert_eq!(encode_array::<One>(&[]), "[]");
        assert_eq!(encode_array(&[One, One]), r#"[{"n":1},{"n":1}]"#);
    }

    #[test]
    fn test_datetime_format() {
        let at = NaiveDate::from_ymd_opt(2024, 5, 1)
            .and_then(|d| d.and_hms_opt(9, 30, 5))
            .unwrap();
        let json = ObjectWriter::new().opt_datetime("dataCadastro", Some(at)).finish();
        assert_eq!(json, r#"{"dataCadastro":"2024-05-01T09:30:05"}"#);
    }
}

//! Lenient scalar decoding for request bodies.
//!
//! Clients send amounts as numbers or numeric strings, and invoice numbers
//! as strings or bare numbers. `null`, absent and blank values decode to
//! `None`.

use serde::de::{Deserializer, Error, Visitor};
use std::fmt;

enum Scalar {
    Number(f64),
    Text(String),
}

/// Accepts a JSON number or string; `null` decodes to `None`.
struct ScalarVisitor {
    expecting: &'static str,
}

impl<'de> Visitor<'de> for ScalarVisitor {
    type Value = Option<Scalar>;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.expecting)
    }

    fn visit_unit<E: Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_none<E: Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_some<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(self)
    }

    fn visit_i64<E: Error>(self, v: i64) -> Result<Self::Value, E> {
        Ok(Some(Scalar::Number(v as f64)))
    }

    fn visit_u64<E: Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(Some(Scalar::Number(v as f64)))
    }

    fn visit_f64<E: Error>(self, v: f64) -> Result<Self::Value, E> {
        Ok(Some(Scalar::Number(v)))
    }

    fn visit_str<E: Error>(self, v: &str) -> Result<Self::Value, E> {
        Ok(Some(Scalar::Text(v.to_owned())))
    }

    fn visit_string<E: Error>(self, v: String) -> Result<Self::Value, E> {
        Ok(Some(Scalar::Text(v)))
    }
}

fn scalar<'de, D>(deserializer: D, expecting: &'static str) -> Result<Option<Scalar>, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(ScalarVisitor { expecting })
}

/// Decodes an optional amount from a number or a numeric string.
pub fn amount<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match scalar(deserializer, "a number or numeric string")? {
        None => Ok(None),
        Some(Scalar::Number(n)) => Ok(Some(n)),
        Some(Scalar::Text(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            match trimmed.parse::<f64>() {
                Ok(n) if n.is_finite() => Ok(Some(n)),
                _ => Err(D::Error::custom(format!("invalid number: \"{}\"", s))),
            }
        }
    }
}

/// Decodes an optional string, accepting bare numbers as their text form.
pub fn text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match scalar(deserializer, "a string or number")? {
        None => None,
        Some(Scalar::Text(s)) => Some(s),
        Some(Scalar::Number(n)) if n.fract() == 0.0 && n.abs() < 1e15 => {
            Some(format!("{}", n as i64))
        }
        Some(Scalar::Number(n)) => Some(n.to_string()),
    })
}

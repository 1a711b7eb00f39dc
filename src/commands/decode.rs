//! Decoding raw option values into typed arguments
//!
//! Values are looked up by declared name and projected into declaration order,
//! so handlers can index arguments positionally. Anything absent or not
//! coercible to the declared kind becomes `ArgValue::Null`.

use serde_json::Value;
use std::fmt;

use super::options::{CommandOption, OptionKind};
use crate::interaction::event::{AttachmentInfo, RawOption, ResolvedData, UserInfo};

#[derive(Debug, Clone, PartialEq)]
pub enum ArgValue {
    Null,
    String(String),
    Integer(i64),
    Boolean(bool),
    User(UserInfo),
    /// Channel id
    Channel(String),
    /// Role id
    Role(String),
    Float(f64),
    Attachment(AttachmentInfo),
}

impl ArgValue {
    pub fn is_null(&self) -> bool {
        matches!(self, ArgValue::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ArgValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ArgValue::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ArgValue::Float(f) => Some(*f),
            ArgValue::Integer(n) => Some(*n as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ArgValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_user(&self) -> Option<&UserInfo> {
        match self {
            ArgValue::User(u) => Some(u),
            _ => None,
        }
    }

    pub fn as_attachment(&self) -> Option<&AttachmentInfo> {
        match self {
            ArgValue::Attachment(a) => Some(a),
            _ => None,
        }
    }

    /// Id of a user, channel, role or attachment argument
    pub fn id(&self) -> Option<&str> {
        match self {
            ArgValue::User(u) => Some(&u.id),
            ArgValue::Channel(id) | ArgValue::Role(id) => Some(id),
            ArgValue::Attachment(a) => Some(&a.id),
            _ => None,
        }
    }
}

impl fmt::Display for ArgValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgValue::Null => Ok(()),
            ArgValue::String(s) => f.write_str(s),
            ArgValue::Integer(n) => write!(f, "{n}"),
            ArgValue::Boolean(b) => write!(f, "{b}"),
            ArgValue::User(u) => write!(f, "<@{}>", u.id),
            ArgValue::Channel(id) => write!(f, "<#{id}>"),
            ArgValue::Role(id) => write!(f, "<@&{id}>"),
            ArgValue::Float(v) => write!(f, "{v}"),
            ArgValue::Attachment(a) => f.write_str(&a.url),
        }
    }
}

/// Snowflake ids arrive as strings but older payloads send bare numbers
fn id_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Decode one raw value under the declared kind
pub fn decode_value(kind: OptionKind, value: &Value, resolved: &ResolvedData) -> ArgValue {
    let decoded = match kind {
        OptionKind::String => match value {
            Value::String(s) => Some(ArgValue::String(s.clone())),
            Value::Number(n) => Some(ArgValue::String(n.to_string())),
            Value::Bool(b) => Some(ArgValue::String(b.to_string())),
            _ => None,
        },
        OptionKind::Integer => value
            .as_i64()
            .or_else(|| value.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
            .or_else(|| value.as_str().and_then(|s| s.trim().parse().ok()))
            .map(ArgValue::Integer),
        OptionKind::Float => value
            .as_f64()
            .or_else(|| value.as_str().and_then(|s| s.trim().parse().ok()))
            .map(ArgValue::Float),
        OptionKind::Boolean => value
            .as_bool()
            .or_else(|| value.as_str().and_then(|s| s.parse().ok()))
            .map(ArgValue::Boolean),
        OptionKind::User => id_text(value).map(|id| {
            ArgValue::User(
                resolved
                    .users
                    .get(&id)
                    .cloned()
                    .unwrap_or_else(|| UserInfo {
                        id,
                        ..UserInfo::default()
                    }),
            )
        }),
        OptionKind::Channel => id_text(value).map(ArgValue::Channel),
        OptionKind::Role => id_text(value).map(ArgValue::Role),
        OptionKind::Attachment => id_text(value)
            .and_then(|id| resolved.attachments.get(&id).cloned())
            .map(ArgValue::Attachment),
    };
    decoded.unwrap_or(ArgValue::Null)
}

/// Project raw options onto the declared list, one value per declared option
pub fn decode_arguments(
    declared: &[CommandOption],
    raw: &[RawOption],
    resolved: &ResolvedData,
) -> Vec<ArgValue> {
    declared
        .iter()
        .map(|option| {
            raw.iter()
                .find(|r| r.name == option.name)
                .and_then(|r| r.value.as_ref())
                .map(|value| decode_value(option.kind, value, resolved))
                .unwrap_or(ArgValue::Null)
        })
        .collect()
}

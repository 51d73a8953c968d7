//! Read-only inspection of component state.
//!
//! Debuggers, test harnesses and the snapshot viewer all look at chips the
//! same way: by dotted path (`timer.value`, `p0.x`, `memory.0x80`).
//! Queries never affect emulation state.

use std::fmt;

/// A dynamically-typed query result.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    I8(i8),
    /// Beam coordinates go negative during horizontal blank.
    I16(i16),
    String(String),
    Array(Vec<Value>),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(v) => write!(f, "{v}"),
            Value::U8(v) => write!(f, "{v:#04X}"),
            Value::U16(v) => write!(f, "{v:#06X}"),
            Value::U32(v) => write!(f, "{v:#010X}"),
            Value::U64(v) => write!(f, "{v}"),
            Value::I8(v) => write!(f, "{v}"),
            Value::I16(v) => write!(f, "{v}"),
            Value::String(v) => f.write_str(v),
            Value::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
        }
    }
}

macro_rules! value_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(v)
                }
            }
        )*
    };
}

value_from!(
    bool => Bool,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    i8 => I8,
    i16 => I16,
    String => String,
);

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

/// Parse an address written as `0x1F`, `$1F`, or decimal.
#[must_use]
pub fn parse_address(text: &str) -> Option<u16> {
    if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        u16::from_str_radix(hex, 16).ok()
    } else if let Some(hex) = text.strip_prefix('$') {
        u16::from_str_radix(hex, 16).ok()
    } else {
        text.parse().ok()
    }
}

/// A component whose state can be inspected between ticks.
pub trait Observable {
    /// Look up one property by dotted path, e.g. `x`, `timer.value` or
    /// `p0.x`. `None` if the path is not recognised.
    fn query(&self, path: &str) -> Option<Value>;

    /// Every path `query` accepts. Placeholders such as `<address>` stand
    /// for a family of paths.
    fn query_paths(&self) -> &'static [&'static str];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_forms() {
        assert_eq!(parse_address("0x80"), Some(0x80));
        assert_eq!(parse_address("$FF"), Some(0xFF));
        assert_eq!(parse_address("129"), Some(129));
        assert_eq!(parse_address("zz"), None);
    }

    #[test]
    fn display_formats() {
        assert_eq!(Value::U8(0x0A).to_string(), "0x0A");
        assert_eq!(Value::I16(-68).to_string(), "-68");
        let arr = Value::Array(vec![Value::Bool(true), Value::U16(0x1FF8)]);
        assert_eq!(arr.to_string(), "[true, 0x1FF8]");
    }

    #[test]
    fn conversions() {
        assert_eq!(Value::from(-3i8), Value::I8(-3));
        assert_eq!(Value::from("none"), Value::String("none".into()));
    }
}

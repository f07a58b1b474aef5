//! Read-only state inspection.
//!
//! Every chip answers dotted-path queries (`raster.line`, `irq.status`, ...)
//! for debuggers and tests. A query never changes emulation state, so
//! clear-on-read registers are reported without being cleared.

use std::fmt;

/// A queried value.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Value {
    Bool(bool),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    I32(i32),
    Text(String),
    List(Vec<Value>),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::U8(v) => write!(f, "${v:02X}"),
            Self::U16(v) => write!(f, "${v:04X}"),
            Self::U32(v) => write!(f, "${v:08X}"),
            Self::U64(v) => write!(f, "{v}"),
            Self::I32(v) => write!(f, "{v}"),
            Self::Text(v) => f.write_str(v),
            Self::List(items) => {
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
        $(impl From<$ty> for Value {
            fn from(v: $ty) -> Self {
                Self::$variant(v)
            }
        })*
    };
}

value_from!(bool => Bool, u8 => U8, u16 => U16, u32 => U32, u64 => U64, i32 => I32, String => Text);

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Text(v.to_owned())
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }
}

/// A component whose state can be inspected by path.
pub trait Observable {
    /// Look up one path; `None` when the path is unknown.
    fn query(&self, path: &str) -> Option<Value>;

    /// Every path `query` answers.
    fn query_paths(&self) -> &'static [&'static str];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_uses_hex_for_registers() {
        assert_eq!(Value::from(0x1Bu8).to_string(), "$1B");
        assert_eq!(Value::from(0xD011u16).to_string(), "$D011");
        assert_eq!(Value::from(vec![1u8, 2]).to_string(), "[$01, $02]");
        assert_eq!(Value::from(-3i32).to_string(), "-3");
    }
}

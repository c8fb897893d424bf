//! Core types for the bus graph.

use std::fmt;

/// A unique identifier for a node on the bus.
///
/// Node ids are assigned in declaration order, starting at 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "N{}", self.0)
    }
}

/// The arbitration id of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MessageId(pub u32);

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Bit layout of a signal inside its message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    /// Motorola order, DBC code `0`
    BigEndian,
    /// Intel order, DBC code `1`
    LittleEndian,
}

impl ByteOrder {
    /// Parse a byte order from its DBC code.
    pub fn from_code(code: char) -> Option<Self> {
        match code {
            '0' => Some(Self::BigEndian),
            '1' => Some(Self::LittleEndian),
            _ => None,
        }
    }

    pub fn is_little_endian(&self) -> bool {
        matches!(self, Self::LittleEndian)
    }
}

/// Whether the raw value of a signal is two's complement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    /// DBC code `+`
    Unsigned,
    /// DBC code `-`
    Signed,
}

impl ValueType {
    /// Parse a value type from its DBC code.
    pub fn from_code(code: char) -> Option<Self> {
        match code {
            '+' => Some(Self::Unsigned),
            '-' => Some(Self::Signed),
            _ => None,
        }
    }

    pub fn is_signed(&self) -> bool {
        matches!(self, Self::Signed)
    }
}

/// Multiplexing role of a signal.
///
/// A signal is either the multiplexor of its message, active only for one
/// multiplexor value, or plain. The roles cannot be combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Multiplexing {
    /// Always present
    #[default]
    None,
    /// Selects which multiplexed group is active (`M`)
    Multiplexor,
    /// Active when the multiplexor carries this value (`m<n>`)
    Multiplexed(u32),
}

impl Multiplexing {
    pub fn is_multiplexor(&self) -> bool {
        matches!(self, Self::Multiplexor)
    }

    /// The multiplexor value this signal belongs to, if any.
    pub fn group(&self) -> Option<u32> {
        match self {
            Self::Multiplexed(group) => Some(*group),
            _ => None,
        }
    }
}

/// Entity kinds an attribute definition can apply to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeTarget {
    Bus,
    Node,
    Message,
    Signal,
}

impl AttributeTarget {
    /// Parse a target from the object marker preceding the attribute name.
    /// No marker means the bus itself.
    pub fn from_marker(marker: Option<&str>) -> Option<Self> {
        match marker {
            None => Some(Self::Bus),
            Some("BU_") => Some(Self::Node),
            Some("BO_") => Some(Self::Message),
            Some("SG_") => Some(Self::Signal),
            Some(_) => None,
        }
    }
}

impl fmt::Display for AttributeTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Bus => "bus",
            Self::Node => "node",
            Self::Message => "message",
            Self::Signal => "signal",
        };
        f.write_str(name)
    }
}

/// Value domain of an attribute definition.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeType {
    Float { min: f64, max: f64 },
    Int { min: i64, max: i64 },
    String,
    /// Allowed values in declaration order
    Enum(Vec<String>),
}

impl AttributeType {
    /// The DBC keyword for this type.
    pub fn keyword(&self) -> &'static str {
        match self {
            Self::Float { .. } => "FLOAT",
            Self::Int { .. } => "INT",
            Self::String => "STRING",
            Self::Enum(_) => "ENUM",
        }
    }
}

/// The entity a description is attached to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DescriptionTarget {
    Bus,
    Node(NodeId),
    Message(MessageId),
    Signal(MessageId, String),
}

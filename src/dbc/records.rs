//! Typed DBC records.
//!
//! Every keyword-prefixed line decodes into one [`Record`] variant with named,
//! typed fields. Decoding only looks at the line itself; resolving names
//! against the bus graph happens in the parser.

use std::fmt;

use super::continuation::split_terminated;
use super::scanner::Scanner;
use crate::error::Result;
use crate::network::{AttributeTarget, AttributeType, ByteOrder, Multiplexing, ValueType};

/// Record kinds recognised by the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    /// `VERSION`
    Version,
    /// `BU_`
    Nodes,
    /// `BO_`
    Message,
    /// `SG_`
    Signal,
    /// `BS_`
    BusConfiguration,
    /// `BA_DEF_`
    AttributeDefinition,
    /// `CM_`
    Description,
}

impl RecordKind {
    /// Identify a record by its leading token.
    ///
    /// The token is the text before the first whitespace, `:` or `"`, compared
    /// exactly, so longer keywords such as `BA_DEF_DEF_` or `BO_TX_BU_` never
    /// match a shorter one.
    pub fn detect(line: &str) -> Option<Self> {
        let token = line
            .split(|c: char| c.is_whitespace() || c == ':' || c == '"')
            .next()
            .unwrap_or("");
        Self::from_keyword(token)
    }

    /// Parse a record kind from its keyword.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "VERSION" => Some(Self::Version),
            "BU_" => Some(Self::Nodes),
            "BO_" => Some(Self::Message),
            "SG_" => Some(Self::Signal),
            "BS_" => Some(Self::BusConfiguration),
            "BA_DEF_" => Some(Self::AttributeDefinition),
            "CM_" => Some(Self::Description),
            _ => None,
        }
    }

    /// The keyword that introduces this record.
    pub fn keyword(&self) -> &'static str {
        match self {
            Self::Version => "VERSION",
            Self::Nodes => "BU_",
            Self::Message => "BO_",
            Self::Signal => "SG_",
            Self::BusConfiguration => "BS_",
            Self::AttributeDefinition => "BA_DEF_",
            Self::Description => "CM_",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Version => "version",
            Self::Nodes => "node list",
            Self::Message => "message",
            Self::Signal => "signal",
            Self::BusConfiguration => "bus configuration",
            Self::AttributeDefinition => "attribute definition",
            Self::Description => "description",
        };
        write!(f, "{} ({})", name, self.keyword())
    }
}

/// `VERSION "<text>"`
#[derive(Debug, Clone, PartialEq)]
pub struct VersionRecord {
    pub version: String,
}

/// `BU_: <name>*`
#[derive(Debug, Clone, PartialEq)]
pub struct NodesRecord {
    pub names: Vec<String>,
}

/// `BO_ <id> <name>: <length> <sender>`
#[derive(Debug, Clone, PartialEq)]
pub struct MessageRecord {
    pub id: u32,
    pub name: String,
    pub length: u32,
    pub sender: String,
}

/// `SG_ <name> [M|m<n>] : <start>|<length>@<order><sign> (<factor>,<offset>) [<min>|<max>] "<unit>" <receivers>`
#[derive(Debug, Clone, PartialEq)]
pub struct SignalRecord {
    pub name: String,
    pub multiplexing: Multiplexing,
    pub start_bit: u32,
    pub length: u32,
    pub byte_order: ByteOrder,
    pub value_type: ValueType,
    pub factor: f64,
    pub offset: f64,
    pub min: f64,
    pub max: f64,
    pub unit: String,
    pub receivers: Vec<String>,
}

/// `BS_: [<speed>[: <btr1>,<btr2>]]`
#[derive(Debug, Clone, PartialEq)]
pub struct BusConfigurationRecord {
    pub speed: Option<u32>,
    pub bit_timing: Option<(u32, u32)>,
}

/// `BA_DEF_ [BU_|BO_|SG_] "<name>" <type> <clause>`
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeDefinitionRecord {
    pub target: AttributeTarget,
    pub name: String,
    pub value_type: AttributeType,
}

/// Entity a description names, before resolution against the graph.
#[derive(Debug, Clone, PartialEq)]
pub enum DescriptionKey {
    Bus,
    Node(String),
    Message(u32),
    Signal(u32, String),
}

/// `CM_ [BU_ <node>|BO_ <id>|SG_ <id> <signal>] "<text>`
#[derive(Debug, Clone, PartialEq)]
pub struct DescriptionRecord {
    pub key: DescriptionKey,
    /// Text after the opening quote, without the `";` terminator
    pub text: String,
    /// Whether the text closed on the same line
    pub terminated: bool,
}

/// A decoded record.
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    Version(VersionRecord),
    Nodes(NodesRecord),
    Message(MessageRecord),
    Signal(SignalRecord),
    BusConfiguration(BusConfigurationRecord),
    AttributeDefinition(AttributeDefinitionRecord),
    Description(DescriptionRecord),
}

impl Record {
    /// Decode one line already identified as `kind`.
    pub fn decode(kind: RecordKind, line: usize, text: &str) -> Result<Self> {
        let mut s = Scanner::new(kind, line, text);
        s.keyword()?;
        let record = match kind {
            RecordKind::Version => Self::Version(decode_version(&mut s)?),
            RecordKind::Nodes => Self::Nodes(decode_nodes(&mut s)?),
            RecordKind::Message => Self::Message(decode_message(&mut s)?),
            RecordKind::Signal => Self::Signal(decode_signal(&mut s)?),
            RecordKind::BusConfiguration => {
                Self::BusConfiguration(decode_bus_configuration(&mut s)?)
            }
            RecordKind::AttributeDefinition => {
                Self::AttributeDefinition(decode_attribute_definition(&mut s)?)
            }
            RecordKind::Description => Self::Description(decode_description(&mut s)?),
        };
        Ok(record)
    }
}

fn decode_version(s: &mut Scanner<'_>) -> Result<VersionRecord> {
    let version = s.quoted("version string")?.to_string();
    s.finish()?;
    Ok(VersionRecord { version })
}

fn decode_nodes(s: &mut Scanner<'_>) -> Result<NodesRecord> {
    s.expect(':', "after BU_")?;
    let mut names = Vec::new();
    while !s.is_at_end() {
        names.push(s.identifier("node name")?.to_string());
    }
    Ok(NodesRecord { names })
}

fn decode_message(s: &mut Scanner<'_>) -> Result<MessageRecord> {
    let id = s.number("message id")?;
    let name = s.identifier("message name")?.to_string();
    s.expect(':', "after message name")?;
    let length = s.number("message length")?;
    let sender = s.identifier("sender")?.to_string();
    s.finish()?;
    Ok(MessageRecord {
        id,
        name,
        length,
        sender,
    })
}

fn decode_signal(s: &mut Scanner<'_>) -> Result<SignalRecord> {
    let name = s.identifier("signal name")?.to_string();

    let multiplexing = if s.peek() == Some(':') {
        Multiplexing::None
    } else {
        let marker = s.identifier("multiplexer marker")?;
        parse_multiplexing(marker).ok_or_else(|| {
            if marker.starts_with('m') && marker.ends_with('M') {
                s.error(format!(
                    "multiplexor marker and group id are mutually exclusive in '{marker}'"
                ))
            } else {
                s.error(format!("invalid multiplexer marker '{marker}'"))
            }
        })?
    };
    s.expect(':', "after signal name")?;

    let start_bit = s.number("start bit")?;
    s.expect('|', "after start bit")?;
    let length = s.number("bit length")?;
    s.expect('@', "after bit length")?;
    let order = s.next_char("byte order")?;
    let byte_order = ByteOrder::from_code(order)
        .ok_or_else(|| s.error(format!("invalid byte order '{order}'")))?;
    let sign = s.next_char("value type")?;
    let value_type =
        ValueType::from_code(sign).ok_or_else(|| s.error(format!("invalid value type '{sign}'")))?;

    s.expect('(', "before factor")?;
    let factor = s.float("factor")?;
    s.expect(',', "after factor")?;
    let offset = s.float("offset")?;
    s.expect(')', "after offset")?;

    s.expect('[', "before minimum")?;
    let min = s.float("minimum")?;
    s.expect('|', "after minimum")?;
    let max = s.float("maximum")?;
    s.expect(']', "after maximum")?;

    let unit = s.quoted("unit")?.to_string();

    let receivers: Vec<String> = s
        .rest()
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect();
    if receivers.is_empty() {
        return Err(s.error("missing receiver list"));
    }

    Ok(SignalRecord {
        name,
        multiplexing,
        start_bit,
        length,
        byte_order,
        value_type,
        factor,
        offset,
        min,
        max,
        unit,
        receivers,
    })
}

/// `M` marks the multiplexor, `m<n>` a member of group `n`.
fn parse_multiplexing(marker: &str) -> Option<Multiplexing> {
    if marker == "M" {
        return Some(Multiplexing::Multiplexor);
    }
    let digits = marker.strip_prefix('m')?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok().map(Multiplexing::Multiplexed)
}

fn decode_bus_configuration(s: &mut Scanner<'_>) -> Result<BusConfigurationRecord> {
    s.expect(':', "after BS_")?;
    let mut record = BusConfigurationRecord {
        speed: None,
        bit_timing: None,
    };
    if s.is_at_end() {
        return Ok(record);
    }
    record.speed = Some(s.number("bus speed")?);
    if s.eat(':') {
        let btr1 = s.number("BTR1")?;
        s.expect(',', "between BTR values")?;
        let btr2 = s.number("BTR2")?;
        record.bit_timing = Some((btr1, btr2));
    }
    s.finish()?;
    Ok(record)
}

fn decode_attribute_definition(s: &mut Scanner<'_>) -> Result<AttributeDefinitionRecord> {
    let marker = if s.peek() == Some('"') {
        None
    } else {
        Some(s.identifier("object type")?)
    };
    let target = AttributeTarget::from_marker(marker)
        .ok_or_else(|| s.error(format!("unknown object type '{}'", marker.unwrap_or(""))))?;

    let name = s.quoted("attribute name")?;
    if name.is_empty() {
        return Err(s.error("empty attribute name"));
    }
    let name = name.to_string();

    let type_name = s.identifier("attribute type")?;
    let value_type = match type_name {
        "FLOAT" => AttributeType::Float {
            min: s.float("minimum")?,
            max: s.float("maximum")?,
        },
        "INT" => AttributeType::Int {
            min: s.number("minimum")?,
            max: s.number("maximum")?,
        },
        "STRING" => AttributeType::String,
        "ENUM" => {
            let mut values = Vec::new();
            if s.peek() == Some('"') {
                loop {
                    values.push(s.quoted("enum value")?.to_string());
                    if !s.eat(',') {
                        break;
                    }
                }
            }
            AttributeType::Enum(values)
        }
        other => return Err(s.error(format!("unknown attribute type '{other}'"))),
    };

    s.eat(';');
    s.finish()?;
    Ok(AttributeDefinitionRecord {
        target,
        name,
        value_type,
    })
}

fn decode_description(s: &mut Scanner<'_>) -> Result<DescriptionRecord> {
    let key = if s.peek() == Some('"') {
        DescriptionKey::Bus
    } else {
        match s.identifier("object type")? {
            "BU_" => DescriptionKey::Node(s.identifier("node name")?.to_string()),
            "BO_" => DescriptionKey::Message(s.number("message id")?),
            "SG_" => {
                let id = s.number("message id")?;
                DescriptionKey::Signal(id, s.identifier("signal name")?.to_string())
            }
            other => return Err(s.error(format!("unknown object type '{other}'"))),
        }
    };
    s.expect('"', "before description text")?;

    let rest = s.rest();
    let record = match split_terminated(rest) {
        Some(text) => DescriptionRecord {
            key,
            text: text.to_string(),
            terminated: true,
        },
        None => DescriptionRecord {
            key,
            text: rest.to_string(),
            terminated: false,
        },
    };
    Ok(record)
}

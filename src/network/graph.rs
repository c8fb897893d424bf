//! Bus graph structure.

use std::collections::{BTreeMap, HashMap};

use super::types::{
    AttributeTarget, AttributeType, ByteOrder, DescriptionTarget, MessageId, Multiplexing, NodeId,
    ValueType,
};
use crate::error::{DbcError, EntityKind, Result};

/// A participant on the bus.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// Position in declaration order
    pub id: NodeId,
    /// Unique node name
    pub name: String,
    pub description: Option<String>,
    /// Messages this node sends, in declaration order
    message_ids: Vec<MessageId>,
}

impl Node {
    fn new(id: NodeId, name: String) -> Self {
        Self {
            id,
            name,
            description: None,
            message_ids: Vec::new(),
        }
    }

    /// Ids of the messages sent by this node.
    pub fn message_ids(&self) -> &[MessageId] {
        &self.message_ids
    }
}

/// A frame on the bus.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    /// Arbitration id, unique on the bus
    pub id: MessageId,
    pub name: String,
    /// Payload length in bytes
    pub length: u32,
    /// Sending node
    pub sender: NodeId,
    pub description: Option<String>,
    signals: Vec<Signal>,
}

impl Message {
    /// Create a message with no signals.
    ///
    /// The sender is assigned when the message is added to a [`Bus`].
    pub fn new(id: MessageId, name: impl Into<String>, length: u32) -> Self {
        Self {
            id,
            name: name.into(),
            length,
            sender: NodeId(0),
            description: None,
            signals: Vec::new(),
        }
    }

    /// Signals in declaration order.
    pub fn signals(&self) -> &[Signal] {
        &self.signals
    }

    /// Find a signal by name.
    pub fn signal(&self, name: &str) -> Option<&Signal> {
        self.signals.iter().find(|s| s.name == name)
    }

    fn signal_mut(&mut self, name: &str) -> Option<&mut Signal> {
        self.signals.iter_mut().find(|s| s.name == name)
    }

    /// The multiplexor signal of this message, if it has one.
    pub fn multiplexor(&self) -> Option<&Signal> {
        self.signals.iter().find(|s| s.multiplexing.is_multiplexor())
    }
}

/// A bit field packed inside a message.
///
/// The physical value is `raw * factor + offset`.
#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    /// Name, unique within the owning message
    pub name: String,
    /// Owning message, set when the signal is added to the bus
    pub message_id: MessageId,
    pub start_bit: u32,
    /// Length in bits
    pub length: u32,
    pub byte_order: ByteOrder,
    pub value_type: ValueType,
    pub factor: f64,
    pub offset: f64,
    pub min: f64,
    pub max: f64,
    pub unit: String,
    pub multiplexing: Multiplexing,
    pub description: Option<String>,
    /// Receiving nodes, without duplicates, in listed order
    pub receivers: Vec<NodeId>,
}

impl Signal {
    pub fn is_little_endian(&self) -> bool {
        self.byte_order.is_little_endian()
    }

    pub fn is_signed(&self) -> bool {
        self.value_type.is_signed()
    }
}

/// A typed metadata schema entry.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeDefinition {
    /// Name, unique across all definitions
    pub name: String,
    /// Entity kind the attribute applies to
    pub target: AttributeTarget,
    pub value_type: AttributeType,
}

/// The root of a parsed network description.
#[derive(Debug, Clone, Default)]
pub struct Bus {
    /// Format version string
    pub version: Option<String>,
    /// Bus speed in kbit/s, unset unless declared
    pub speed: Option<u32>,
    /// Legacy BTR register pair following the speed
    pub bit_timing: Option<(u32, u32)>,
    pub description: Option<String>,

    /// All nodes, indexed by [`NodeId`]
    nodes: Vec<Node>,

    /// Mapping from node names to node IDs
    node_map: HashMap<String, NodeId>,

    /// All messages, keyed by arbitration id
    messages: BTreeMap<MessageId, Message>,

    /// Attribute definitions, keyed by name
    attribute_definitions: BTreeMap<String, AttributeDefinition>,
}

impl Bus {
    /// Create an empty bus.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node.
    pub fn add_node(&mut self, name: impl Into<String>) -> Result<NodeId> {
        let name = name.into();
        if self.node_map.contains_key(&name) {
            return Err(DbcError::duplicate(EntityKind::Node, name));
        }
        let id = NodeId(self.nodes.len());
        self.node_map.insert(name.clone(), id);
        self.nodes.push(Node::new(id, name));
        Ok(id)
    }

    /// Add a message sent by `sender`.
    ///
    /// The message is registered both on the sender and in the bus-wide id
    /// index. On failure the bus is left unchanged.
    pub fn add_message(&mut self, sender: &str, mut message: Message) -> Result<MessageId> {
        let sender_id = self.node_by_name(sender)?.id;
        if self.messages.contains_key(&message.id) {
            return Err(DbcError::duplicate(EntityKind::Message, message.id));
        }
        let id = message.id;
        message.sender = sender_id;
        self.nodes[sender_id.0].message_ids.push(id);
        self.messages.insert(id, message);
        Ok(id)
    }

    /// Add a signal to an existing message.
    pub fn add_signal(&mut self, message_id: MessageId, mut signal: Signal) -> Result<()> {
        let message = self.message_mut(message_id)?;
        if message.signal(&signal.name).is_some() {
            return Err(DbcError::duplicate(
                EntityKind::Signal,
                format!("{}.{}", message.name, signal.name),
            ));
        }
        signal.message_id = message_id;
        message.signals.push(signal);
        Ok(())
    }

    /// Add an attribute definition.
    pub fn add_attribute_definition(&mut self, definition: AttributeDefinition) -> Result<()> {
        if self.attribute_definitions.contains_key(&definition.name) {
            return Err(DbcError::duplicate(
                EntityKind::AttributeDefinition,
                definition.name,
            ));
        }
        self.attribute_definitions
            .insert(definition.name.clone(), definition);
        Ok(())
    }

    /// Find a node by name.
    pub fn node_by_name(&self, name: &str) -> Result<&Node> {
        self.node_map
            .get(name)
            .map(|id| &self.nodes[id.0])
            .ok_or_else(|| DbcError::UnknownNode {
                name: name.to_string(),
            })
    }

    /// Get a node by id.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// Find a message by arbitration id.
    pub fn message_by_id(&self, id: MessageId) -> Result<&Message> {
        self.messages
            .get(&id)
            .ok_or(DbcError::UnknownMessage { id: id.0 })
    }

    fn message_mut(&mut self, id: MessageId) -> Result<&mut Message> {
        self.messages
            .get_mut(&id)
            .ok_or(DbcError::UnknownMessage { id: id.0 })
    }

    /// Find a signal by its message id and name.
    pub fn signal_by_message_id_and_name(&self, id: MessageId, name: &str) -> Result<&Signal> {
        self.message_by_id(id)?
            .signal(name)
            .ok_or_else(|| DbcError::UnknownSignal {
                message_id: id.0,
                name: name.to_string(),
            })
    }

    /// Find an attribute definition by name.
    pub fn attribute_definition(&self, name: &str) -> Option<&AttributeDefinition> {
        self.attribute_definitions.get(name)
    }

    /// Attach a description to an entity, replacing any previous one.
    pub fn set_description(&mut self, target: &DescriptionTarget, text: String) -> Result<()> {
        let slot = match target {
            DescriptionTarget::Bus => &mut self.description,
            DescriptionTarget::Node(id) => match self.nodes.get_mut(id.0) {
                Some(node) => &mut node.description,
                None => {
                    return Err(DbcError::UnknownNode {
                        name: id.to_string(),
                    })
                }
            },
            DescriptionTarget::Message(id) => &mut self.message_mut(*id)?.description,
            DescriptionTarget::Signal(id, name) => {
                let message_id = id.0;
                let signal = self.message_mut(*id)?.signal_mut(name).ok_or_else(|| {
                    DbcError::UnknownSignal {
                        message_id,
                        name: name.clone(),
                    }
                })?;
                &mut signal.description
            }
        };
        *slot = Some(text);
        Ok(())
    }

    /// All nodes in declaration order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    /// All messages, ordered by id.
    pub fn messages(&self) -> impl Iterator<Item = &Message> {
        self.messages.values()
    }

    /// Messages sent by the named node, in declaration order.
    pub fn messages_of(&self, node_name: &str) -> Result<Vec<&Message>> {
        let node = self.node_by_name(node_name)?;
        Ok(node
            .message_ids
            .iter()
            .filter_map(|id| self.messages.get(id))
            .collect())
    }

    /// All attribute definitions, ordered by name.
    pub fn attribute_definitions(&self) -> impl Iterator<Item = &AttributeDefinition> {
        self.attribute_definitions.values()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    /// Get the name of a node.
    pub fn node_name(&self, id: NodeId) -> &str {
        self.node(id).map(|n| n.name.as_str()).unwrap_or("?")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signal(name: &str) -> Signal {
        Signal {
            name: name.to_string(),
            message_id: MessageId(0),
            start_bit: 0,
            length: 8,
            byte_order: ByteOrder::LittleEndian,
            value_type: ValueType::Unsigned,
            factor: 1.0,
            offset: 0.0,
            min: 0.0,
            max: 255.0,
            unit: String::new(),
            multiplexing: Multiplexing::None,
            description: None,
            receivers: Vec::new(),
        }
    }

    fn bus_with_message() -> Bus {
        let mut bus = Bus::new();
        bus.add_node("ECU1").unwrap();
        bus.add_message("ECU1", Message::new(MessageId(100), "EngineData", 8))
            .unwrap();
        bus
    }

    #[test]
    fn test_add_node_rejects_duplicates() {
        let mut bus = Bus::new();
        assert_eq!(bus.add_node("ECU1").unwrap(), NodeId(0));
        assert_eq!(bus.add_node("ECU2").unwrap(), NodeId(1));
        let err = bus.add_node("ECU1").unwrap_err();
        assert!(matches!(
            err,
            DbcError::DuplicateEntity {
                kind: EntityKind::Node,
                ..
            }
        ));
        assert_eq!(bus.node_count(), 2);
    }

    #[test]
    fn test_add_message_registers_on_sender() {
        let bus = bus_with_message();
        let node = bus.node_by_name("ECU1").unwrap();
        assert_eq!(node.message_ids(), &[MessageId(100)]);
        let message = bus.message_by_id(MessageId(100)).unwrap();
        assert_eq!(message.sender, node.id);
        assert_eq!(bus.messages_of("ECU1").unwrap().len(), 1);
    }

    #[test]
    fn test_add_message_unknown_sender_leaves_bus_unchanged() {
        let mut bus = Bus::new();
        bus.add_node("ECU1").unwrap();
        let err = bus
            .add_message("ECU9", Message::new(MessageId(1), "M", 8))
            .unwrap_err();
        assert!(matches!(err, DbcError::UnknownNode { ref name } if name == "ECU9"));
        assert_eq!(bus.message_count(), 0);
        assert!(bus.message_by_id(MessageId(1)).is_err());
    }

    #[test]
    fn test_add_message_duplicate_id() {
        let mut bus = bus_with_message();
        let err = bus
            .add_message("ECU1", Message::new(MessageId(100), "Other", 4))
            .unwrap_err();
        assert!(matches!(
            err,
            DbcError::DuplicateEntity {
                kind: EntityKind::Message,
                ..
            }
        ));
        assert_eq!(bus.message_by_id(MessageId(100)).unwrap().name, "EngineData");
        assert_eq!(bus.node_by_name("ECU1").unwrap().message_ids().len(), 1);
    }

    #[test]
    fn test_add_signal_sets_owner_and_rejects_duplicates() {
        let mut bus = bus_with_message();
        bus.add_signal(MessageId(100), signal("RPM")).unwrap();
        let sig = bus
            .signal_by_message_id_and_name(MessageId(100), "RPM")
            .unwrap();
        assert_eq!(sig.message_id, MessageId(100));

        let err = bus.add_signal(MessageId(100), signal("RPM")).unwrap_err();
        assert!(matches!(
            err,
            DbcError::DuplicateEntity {
                kind: EntityKind::Signal,
                ..
            }
        ));
    }

    #[test]
    fn test_lookups_fail_with_not_found() {
        let bus = bus_with_message();
        assert!(bus.node_by_name("nope").unwrap_err().is_not_found());
        assert!(bus.message_by_id(MessageId(7)).unwrap_err().is_not_found());
        let err = bus
            .signal_by_message_id_and_name(MessageId(100), "nope")
            .unwrap_err();
        assert!(matches!(err, DbcError::UnknownSignal { message_id: 100, .. }));
    }

    #[test]
    fn test_duplicate_attribute_definition() {
        let mut bus = Bus::new();
        let def = AttributeDefinition {
            name: "BusType".to_string(),
            target: AttributeTarget::Bus,
            value_type: AttributeType::String,
        };
        bus.add_attribute_definition(def.clone()).unwrap();
        assert!(bus.add_attribute_definition(def).is_err());
        assert_eq!(bus.attribute_definitions().count(), 1);
    }

    #[test]
    fn test_set_description_targets() {
        let mut bus = bus_with_message();
        bus.add_signal(MessageId(100), signal("RPM")).unwrap();

        bus.set_description(&DescriptionTarget::Bus, "bus".into()).unwrap();
        bus.set_description(&DescriptionTarget::Node(NodeId(0)), "node".into())
            .unwrap();
        bus.set_description(&DescriptionTarget::Message(MessageId(100)), "msg".into())
            .unwrap();
        bus.set_description(
            &DescriptionTarget::Signal(MessageId(100), "RPM".into()),
            "sig".into(),
        )
        .unwrap();

        assert_eq!(bus.description.as_deref(), Some("bus"));
        assert_eq!(bus.node_by_name("ECU1").unwrap().description.as_deref(), Some("node"));
        let message = bus.message_by_id(MessageId(100)).unwrap();
        assert_eq!(message.description.as_deref(), Some("msg"));
        assert_eq!(message.signal("RPM").unwrap().description.as_deref(), Some("sig"));

        let err = bus
            .set_description(&DescriptionTarget::Signal(MessageId(100), "X".into()), "x".into())
            .unwrap_err();
        assert!(err.is_not_found());
    }
}

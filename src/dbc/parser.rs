//! Line dispatcher for DBC input.

use tracing::{debug, trace};

use super::continuation::Continuation;
use super::records::*;
use crate::error::{DbcError, Result};
use crate::network::{
    AttributeDefinition, Bus, DescriptionTarget, Message, MessageId, NodeId, Signal,
};

/// Parser configuration.
#[derive(Debug, Clone, Default)]
pub struct ParserConfig {
    /// Receiver names that are dropped instead of resolved.
    pub ignored_receivers: Vec<String>,
    /// Accept a description still open at end of input.
    pub allow_unterminated_description: bool,
}

impl ParserConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop receivers with this name.
    ///
    /// Tools write `Vector__XXX` for "no receiver"; ignoring it lets such
    /// files parse without declaring a placeholder node.
    pub fn with_ignored_receiver(mut self, name: impl Into<String>) -> Self {
        self.ignored_receivers.push(name.into());
        self
    }

    /// Assign the buffered text of a description left open at end of input
    /// instead of failing.
    pub fn with_unterminated_description(mut self, allow: bool) -> Self {
        self.allow_unterminated_description = allow;
        self
    }
}

/// What the next line is interpreted against.
#[derive(Debug)]
enum Mode {
    /// No open message
    Normal,
    /// Signals attach to this message
    InMessage(MessageId),
    /// Every line belongs to an open description
    InContinuation(Continuation),
}

/// Stateful line parser building a [`Bus`].
pub struct Parser {
    bus: Bus,
    mode: Mode,
    config: ParserConfig,
    line: usize,
}

impl Parser {
    /// Create a parser with the default configuration.
    pub fn new() -> Self {
        Self::with_config(ParserConfig::default())
    }

    /// Create a parser with custom configuration.
    pub fn with_config(config: ParserConfig) -> Self {
        Self {
            bus: Bus::new(),
            mode: Mode::Normal,
            config,
            line: 0,
        }
    }

    /// Feed the next input line.
    pub fn feed_line(&mut self, raw: &str) -> Result<()> {
        self.line += 1;
        let text = raw.trim_end();

        match std::mem::replace(&mut self.mode, Mode::Normal) {
            Mode::InContinuation(mut continuation) => {
                trace!(line = self.line, target = ?continuation.target(), "description continuation");
                if continuation.feed(text) {
                    let (target, description) = continuation.into_parts();
                    self.bus.set_description(&target, description)?;
                } else {
                    self.mode = Mode::InContinuation(continuation);
                }
                Ok(())
            }
            mode => {
                self.mode = mode;
                self.dispatch(text)
            }
        }
    }

    /// Finish the parse and hand out the bus.
    pub fn finish(self) -> Result<Bus> {
        let mut bus = self.bus;
        if let Mode::InContinuation(continuation) = self.mode {
            if !self.config.allow_unterminated_description {
                return Err(DbcError::malformed(
                    RecordKind::Description,
                    continuation.opened_at(),
                    continuation.opening_line(),
                    "description is not terminated before end of input",
                ));
            }
            let (target, mut description) = continuation.into_parts();
            if description.ends_with('\n') {
                description.pop();
            }
            bus.set_description(&target, description)?;
        }
        debug!(
            lines = self.line,
            nodes = bus.node_count(),
            messages = bus.message_count(),
            "parse complete"
        );
        Ok(bus)
    }

    /// Number of lines consumed so far.
    pub fn line(&self) -> usize {
        self.line
    }

    /// Whether a description is waiting for its terminator.
    pub fn in_continuation(&self) -> bool {
        matches!(self.mode, Mode::InContinuation(_))
    }

    /// The message signals currently attach to.
    pub fn current_message(&self) -> Option<MessageId> {
        match self.mode {
            Mode::InMessage(id) => Some(id),
            _ => None,
        }
    }

    fn dispatch(&mut self, text: &str) -> Result<()> {
        let text = text.trim_start();
        let Some(kind) = RecordKind::detect(text) else {
            return Ok(());
        };
        // A bare keyword is an entry of the NS_ symbol listing, not a record.
        if text == kind.keyword() {
            return Ok(());
        }

        debug!(line = self.line, kind = %kind, "record");
        let record = Record::decode(kind, self.line, text)?;
        self.apply(record, text)
    }

    fn apply(&mut self, record: Record, text: &str) -> Result<()> {
        match record {
            Record::Version(r) => {
                self.bus.version = Some(r.version);
            }
            Record::Nodes(r) => {
                for name in r.names {
                    self.bus.add_node(name)?;
                }
            }
            Record::Message(r) => {
                let message = Message::new(MessageId(r.id), r.name, r.length);
                let id = self.bus.add_message(&r.sender, message)?;
                self.mode = Mode::InMessage(id);
            }
            Record::Signal(r) => {
                let message_id = self
                    .current_message()
                    .ok_or(DbcError::ContextError { line: self.line })?;
                let signal = self.build_signal(r, message_id)?;
                self.bus.add_signal(message_id, signal)?;
            }
            Record::BusConfiguration(r) => {
                if r.speed.is_some() {
                    self.bus.speed = r.speed;
                }
                if r.bit_timing.is_some() {
                    self.bus.bit_timing = r.bit_timing;
                }
            }
            Record::AttributeDefinition(r) => {
                self.bus.add_attribute_definition(AttributeDefinition {
                    name: r.name,
                    target: r.target,
                    value_type: r.value_type,
                })?;
            }
            Record::Description(r) => {
                let target = self.resolve_description(&r.key)?;
                if r.terminated {
                    self.bus.set_description(&target, r.text)?;
                } else {
                    self.mode = Mode::InContinuation(Continuation::new(
                        target, &r.text, self.line, text,
                    ));
                }
            }
        }
        Ok(())
    }

    fn build_signal(&self, r: SignalRecord, message_id: MessageId) -> Result<Signal> {
        let mut receivers: Vec<NodeId> = Vec::with_capacity(r.receivers.len());
        for name in &r.receivers {
            if self.config.ignored_receivers.iter().any(|n| n == name) {
                continue;
            }
            let id = self.bus.node_by_name(name)?.id;
            if !receivers.contains(&id) {
                receivers.push(id);
            }
        }

        Ok(Signal {
            name: r.name,
            message_id,
            start_bit: r.start_bit,
            length: r.length,
            byte_order: r.byte_order,
            value_type: r.value_type,
            factor: r.factor,
            offset: r.offset,
            min: r.min,
            max: r.max,
            unit: r.unit,
            multiplexing: r.multiplexing,
            description: None,
            receivers,
        })
    }

    fn resolve_description(&self, key: &DescriptionKey) -> Result<DescriptionTarget> {
        let target = match key {
            DescriptionKey::Bus => DescriptionTarget::Bus,
            DescriptionKey::Node(name) => DescriptionTarget::Node(self.bus.node_by_name(name)?.id),
            DescriptionKey::Message(id) => {
                DescriptionTarget::Message(self.bus.message_by_id(MessageId(*id))?.id)
            }
            DescriptionKey::Signal(id, name) => {
                let signal = self.bus.signal_by_message_id_and_name(MessageId(*id), name)?;
                DescriptionTarget::Signal(signal.message_id, signal.name.clone())
            }
        };
        Ok(target)
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::{ByteOrder, Multiplexing};

    fn feed(parser: &mut Parser, input: &str) -> Result<()> {
        for line in input.lines() {
            parser.feed_line(line)?;
        }
        Ok(())
    }

    #[test]
    fn test_message_opens_context() {
        let mut parser = Parser::new();
        feed(&mut parser, "BU_: A B\nBO_ 10 M: 8 A").unwrap();
        assert_eq!(parser.current_message(), Some(MessageId(10)));
        assert_eq!(parser.line(), 2);
        feed(&mut parser, "BO_ 11 N: 8 B").unwrap();
        assert_eq!(parser.current_message(), Some(MessageId(11)));
    }

    #[test]
    fn test_context_persists_across_unrelated_records() {
        let mut parser = Parser::new();
        feed(
            &mut parser,
            "BU_: A B\n\
             BO_ 10 M: 8 A\n\
             BA_DEF_ \"X\" STRING;\n\
             CM_ BO_ 10 \"single line\";\n\
             SG_ S : 0|8@1+ (1,0) [0|255] \"\" B",
        )
        .unwrap();
        let bus = parser.finish().unwrap();
        let signal = bus
            .signal_by_message_id_and_name(MessageId(10), "S")
            .unwrap();
        assert_eq!(signal.message_id, MessageId(10));
    }

    #[test]
    fn test_signal_without_message_is_context_error() {
        let mut parser = Parser::new();
        feed(&mut parser, "BU_: A").unwrap();
        let err = parser
            .feed_line("SG_ S : 0|8@1+ (1,0) [0|255] \"\" A")
            .unwrap_err();
        assert!(matches!(err, DbcError::ContextError { line: 2 }));
    }

    #[test]
    fn test_continuation_resets_message_context() {
        let mut parser = Parser::new();
        feed(
            &mut parser,
            "BU_: A\n\
             BO_ 10 M: 8 A\n\
             CM_ BO_ 10 \"multi\n\
             line\";",
        )
        .unwrap();
        assert!(!parser.in_continuation());
        assert_eq!(parser.current_message(), None);
        let err = parser
            .feed_line(" SG_ S : 0|8@1+ (1,0) [0|255] \"\" A")
            .unwrap_err();
        assert!(matches!(err, DbcError::ContextError { .. }));
    }

    #[test]
    fn test_continuation_swallows_keyword_lines() {
        let mut parser = Parser::new();
        feed(&mut parser, "BU_: A\nCM_ \"opening").unwrap();
        assert!(parser.in_continuation());
        feed(&mut parser, "BU_: B\nBO_ 1 X: 8 A\nend\";").unwrap();
        let bus = parser.finish().unwrap();
        assert_eq!(bus.node_count(), 1);
        assert_eq!(bus.message_count(), 0);
        assert_eq!(
            bus.description.as_deref(),
            Some("opening\nBU_: B\nBO_ 1 X: 8 A\nend")
        );
    }

    #[test]
    fn test_unterminated_description_at_end_of_input() {
        let mut parser = Parser::new();
        feed(&mut parser, "CM_ \"never\nclosed").unwrap();
        match parser.finish().unwrap_err() {
            DbcError::MalformedRecord {
                kind, line, text, ..
            } => {
                assert_eq!(kind, RecordKind::Description);
                assert_eq!(line, 1);
                assert_eq!(text, "CM_ \"never");
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let mut parser =
            Parser::with_config(ParserConfig::new().with_unterminated_description(true));
        feed(&mut parser, "CM_ \"never\nclosed").unwrap();
        let bus = parser.finish().unwrap();
        assert_eq!(bus.description.as_deref(), Some("never\nclosed"));
    }

    #[test]
    fn test_ignored_receivers() {
        let mut parser =
            Parser::with_config(ParserConfig::new().with_ignored_receiver("Vector__XXX"));
        feed(
            &mut parser,
            "BU_: A B\n\
             BO_ 1 M: 8 A\n\
             SG_ S m2 : 0|8@0+ (1,0) [0|255] \"\" Vector__XXX B B",
        )
        .unwrap();
        let bus = parser.finish().unwrap();
        let signal = bus.signal_by_message_id_and_name(MessageId(1), "S").unwrap();
        assert_eq!(signal.receivers, vec![NodeId(1)]);
        assert_eq!(signal.byte_order, ByteOrder::BigEndian);
        assert_eq!(signal.multiplexing, Multiplexing::Multiplexed(2));
    }

    #[test]
    fn test_symbol_listing_is_ignored() {
        let mut parser = Parser::new();
        feed(&mut parser, "NS_ :\n\tCM_\n\tBA_DEF_\n\tBA_\n\nBS_:\nBU_: A").unwrap();
        let bus = parser.finish().unwrap();
        assert_eq!(bus.node_count(), 1);
        assert_eq!(bus.speed, None);
    }
}

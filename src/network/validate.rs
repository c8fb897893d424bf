//! Network validation.

use std::fmt;

use tracing::warn;

use super::{Bus, Message, MessageId, Signal};

/// A consistency finding in a parsed network.
///
/// Findings never abort a parse; they describe layouts a decoder could not
/// use as written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationIssue {
    /// The signal's bits extend past the message payload
    SignalOutOfBounds {
        message_id: MessageId,
        signal: String,
    },
    /// A multiplexed signal sits in a message without a multiplexor
    MissingMultiplexor {
        message_id: MessageId,
        signal: String,
    },
    /// More than one signal claims to be the multiplexor
    MultipleMultiplexors { message_id: MessageId },
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SignalOutOfBounds { message_id, signal } => {
                write!(f, "signal '{signal}' exceeds the payload of message {message_id}")
            }
            Self::MissingMultiplexor { message_id, signal } => write!(
                f,
                "signal '{signal}' is multiplexed but message {message_id} has no multiplexor"
            ),
            Self::MultipleMultiplexors { message_id } => {
                write!(f, "message {message_id} has more than one multiplexor")
            }
        }
    }
}

/// Validate a parsed network.
///
/// Checks:
/// - Every signal fits inside its message payload
/// - Multiplexed signals have a multiplexor in the same message
/// - At most one multiplexor per message
pub fn validate_network(bus: &Bus) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    for message in bus.messages() {
        validate_message(message, &mut issues);
    }

    for issue in &issues {
        warn!(%issue, "network validation");
    }

    issues
}

fn validate_message(message: &Message, issues: &mut Vec<ValidationIssue>) {
    let payload_bits = u64::from(message.length) * 8;
    let multiplexors = message
        .signals()
        .iter()
        .filter(|s| s.multiplexing.is_multiplexor())
        .count();

    if multiplexors > 1 {
        issues.push(ValidationIssue::MultipleMultiplexors {
            message_id: message.id,
        });
    }

    for signal in message.signals() {
        if !fits_payload(signal, payload_bits) {
            issues.push(ValidationIssue::SignalOutOfBounds {
                message_id: message.id,
                signal: signal.name.clone(),
            });
        }
        if signal.multiplexing.group().is_some() && multiplexors == 0 {
            issues.push(ValidationIssue::MissingMultiplexor {
                message_id: message.id,
                signal: signal.name.clone(),
            });
        }
    }
}

/// Whether the signal's bit range lies inside a payload of `payload_bits`.
fn fits_payload(signal: &Signal, payload_bits: u64) -> bool {
    if signal.length == 0 {
        return false;
    }
    let last_bit = if signal.is_little_endian() {
        u64::from(signal.start_bit) + u64::from(signal.length) - 1
    } else {
        // Motorola start bit names the MSB in sawtooth numbering; map it to a
        // linear position counted from the first transmitted bit.
        let msb = u64::from(signal.start_bit / 8) * 8 + u64::from(7 - signal.start_bit % 8);
        msb + u64::from(signal.length) - 1
    };
    last_bit < payload_bits
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dbc::parse;

    #[test]
    fn test_valid_network_has_no_issues() {
        let bus = parse(
            "BU_: A B\n\
             BO_ 1 M: 8 A\n\
             SG_ Sel M : 0|8@1+ (1,0) [0|255] \"\" B\n\
             SG_ X m1 : 8|8@1+ (1,0) [0|255] \"\" B\n\
             SG_ Y : 63|8@0+ (1,0) [0|255] \"\" B\n",
        )
        .unwrap();
        assert!(validate_network(&bus).is_empty());
    }

    #[test]
    fn test_signal_out_of_bounds() {
        let bus = parse(
            "BU_: A B\n\
             BO_ 1 M: 2 A\n\
             SG_ Wide : 8|16@1+ (1,0) [0|1] \"\" B\n\
             SG_ Moto : 7|16@0+ (1,0) [0|1] \"\" B\n",
        )
        .unwrap();
        let issues = validate_network(&bus);
        assert_eq!(
            issues,
            vec![ValidationIssue::SignalOutOfBounds {
                message_id: MessageId(1),
                signal: "Wide".to_string(),
            }]
        );
    }

    #[test]
    fn test_largest_message_length() {
        let bus = parse(
            "BU_: A B\n\
             BO_ 1 M: 4294967295 A\n\
             SG_ S : 0|8@1+ (1,0) [0|1] \"\" B\n\
             SG_ Top : 4294967287|8@1+ (1,0) [0|1] \"\" B\n",
        )
        .unwrap();
        assert!(validate_network(&bus).is_empty());
    }

    #[test]
    fn test_multiplexing_issues() {
        let bus = parse(
            "BU_: A B\n\
             BO_ 1 M: 8 A\n\
             SG_ X m1 : 8|8@1+ (1,0) [0|255] \"\" B\n\
             BO_ 2 N: 8 A\n\
             SG_ S1 M : 0|8@1+ (1,0) [0|255] \"\" B\n\
             SG_ S2 M : 8|8@1+ (1,0) [0|255] \"\" B\n",
        )
        .unwrap();
        let issues = validate_network(&bus);
        assert!(issues.contains(&ValidationIssue::MissingMultiplexor {
            message_id: MessageId(1),
            signal: "X".to_string(),
        }));
        assert!(issues.contains(&ValidationIssue::MultipleMultiplexors {
            message_id: MessageId(2),
        }));
    }
}

//! Canbus - DBC network description inspector
//!
//! Parses a DBC file and prints the resulting bus graph.
//!
//! # Usage
//!
//! ```bash
//! canbus network.dbc --ignore-receiver Vector__XXX --validate
//! RUST_LOG=debug canbus network.dbc
//! ```

use std::path::PathBuf;

use clap::Parser;
use canbus_core::{
    dbc,
    error::Result,
    network::{validate_network, AttributeType, Bus, Multiplexing},
    ParserConfig,
};
use tracing_subscriber::EnvFilter;

/// DBC network description inspector
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the network description file (.dbc)
    #[arg(value_name = "DBC_FILE")]
    dbc_file: PathBuf,

    /// Receiver name to drop instead of resolving (repeatable)
    #[arg(long = "ignore-receiver", value_name = "NAME")]
    ignored_receivers: Vec<String>,

    /// Accept a description left open at end of file
    #[arg(long)]
    lenient_descriptions: bool,

    /// Check signal layouts after parsing
    #[arg(long)]
    validate: bool,

    /// Log every record to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut config =
        ParserConfig::new().with_unterminated_description(args.lenient_descriptions);
    for name in args.ignored_receivers {
        config = config.with_ignored_receiver(name);
    }

    // Parse the network file
    let bus = dbc::parse_file(&args.dbc_file, config)?;

    print_summary(&bus);

    if args.validate {
        let issues = validate_network(&bus);
        if issues.is_empty() {
            println!("\nvalidation: ok");
        } else {
            println!("\nvalidation: {} issue(s)", issues.len());
            for issue in issues {
                println!("  {issue}");
            }
        }
    }

    Ok(())
}

fn print_summary(bus: &Bus) {
    println!("version: {}", bus.version.as_deref().unwrap_or("-"));
    match bus.speed {
        Some(speed) => println!("speed:   {speed} kbit/s"),
        None => println!("speed:   -"),
    }

    println!("\nnodes ({}):", bus.node_count());
    for node in bus.nodes() {
        println!("  {} ({} messages)", node.name, node.message_ids().len());
    }

    println!("\nmessages ({}):", bus.message_count());
    for message in bus.messages() {
        println!(
            "  {:#x} {} [{} bytes] from {}",
            message.id.0,
            message.name,
            message.length,
            bus.node_name(message.sender)
        );
        for signal in message.signals() {
            let mux = match signal.multiplexing {
                Multiplexing::None => String::new(),
                Multiplexing::Multiplexor => " M".to_string(),
                Multiplexing::Multiplexed(group) => format!(" m{group}"),
            };
            let receivers: Vec<&str> = signal
                .receivers
                .iter()
                .map(|id| bus.node_name(*id))
                .collect();
            println!(
                "    {}{} {}|{}@{}{} ({},{}) [{}|{}] \"{}\" -> {}",
                signal.name,
                mux,
                signal.start_bit,
                signal.length,
                if signal.is_little_endian() { 1 } else { 0 },
                if signal.is_signed() { '-' } else { '+' },
                signal.factor,
                signal.offset,
                signal.min,
                signal.max,
                signal.unit,
                receivers.join(", ")
            );
        }
    }

    let definitions: Vec<_> = bus.attribute_definitions().collect();
    if !definitions.is_empty() {
        println!("\nattribute definitions ({}):", definitions.len());
        for def in definitions {
            let domain = match &def.value_type {
                AttributeType::Float { min, max } => format!(" {min}..{max}"),
                AttributeType::Int { min, max } => format!(" {min}..{max}"),
                AttributeType::String => String::new(),
                AttributeType::Enum(values) => format!(" {}", values.join("|")),
            };
            println!(
                "  {} ({}) {}{}",
                def.name,
                def.target,
                def.value_type.keyword(),
                domain
            );
        }
    }
}

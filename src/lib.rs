//! Hexterm
//!
//! Terminal protocol handling and an emulated terminal, without a display:
//!
//! - `parser`: tokenizer and canonical serializer for ANSI/VT escape text
//! - `core`: screen model, cells, cursor, private modes, graphic registry
//! - `terminal`: applies tokens to a screen and answers state queries
//! - `workload`: buffered writes flushed into a terminal
//! - `config`: terminal configuration

pub mod config;
pub mod core;
pub mod parser;
pub mod terminal;
pub mod workload;

pub use parser::{serialize, tokenize, AnsiToken, Tokenizer};
pub use terminal::{Terminal, TerminalEvent};
pub use workload::{Workload, WorkloadWriter};

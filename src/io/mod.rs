//! I/O module
//!
//! Handles CSV input and output around the core.
//!
//! # Components
//!
//! - `csv_format` - CSV format handling (row conversion, event, warning and boleto serialization)
//! - `sync_reader` - Instruction CSV reader with iterator interface

pub mod csv_format;
pub mod sync_reader;

pub use csv_format::{
    convert_instruction_row, write_boletos_csv, write_events_csv, write_warnings_csv,
    InstructionRow,
};
pub use sync_reader::InstructionReader;

//! Command execution on the host and inside the subsystem, and path mapping
//! between the two.

pub mod command;
pub mod path;
pub mod subsystem;

pub use command::{
    execute, execute_program, execute_streaming, CommandOptions, CommandResult, OutputCallback,
    OutputLine,
};
pub use path::{has_drive, translate, translate_path};
pub use subsystem::SubsystemShell;


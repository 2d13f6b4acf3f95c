pub mod adapter;
pub mod columns;
pub mod convert;
pub mod cursor;
pub mod error;
pub mod file;
pub mod import;
pub mod memory;
pub mod reader;
pub mod settings;

pub mod reader;

pub use reader::CsvReader;

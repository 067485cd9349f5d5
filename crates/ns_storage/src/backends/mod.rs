pub mod csv;
pub mod jsonl;

pub use self::csv::CsvStore;
pub use self::jsonl::JsonLinesStore;

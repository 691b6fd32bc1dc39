// Concrete remote stores and the workbook reader.

pub mod csv_table;
pub mod memory;
pub mod sheets;
pub mod workbook;

pub use csv_table::CsvDirectoryTable;
pub use memory::MemoryTable;
pub use sheets::GoogleSheetsTable;
pub use workbook::WorkbookReader;

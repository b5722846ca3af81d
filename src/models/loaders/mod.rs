pub mod row_loader;

pub use row_loader::load_rows;

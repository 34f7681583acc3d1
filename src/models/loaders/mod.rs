pub mod toml_loader;

pub use toml_loader::{load_data_table, load_mapping_overrides};

pub mod loaders;
pub mod mapping;
pub mod outcome;
pub mod table;

pub use loaders::{load_data_table, load_mapping_overrides};
pub use mapping::{ChoiceOption, ControlKind, FieldMapping, FieldMappingTable, FieldOverride};
pub use outcome::{RowOutcome, RowStatus};
pub use table::{Batch, CellValue, DataTable, Record};

//! On-disk project layout and the CSV tables that connect pipeline stages.

pub mod layout;
pub mod tables;

pub use layout::ProjectLayout;
pub use tables::{
    read_processed_table, read_raw_table, write_processed_table, write_raw_table,
    PROCESSED_COLUMNS, RAW_COLUMNS,
};

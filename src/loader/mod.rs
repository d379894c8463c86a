//! Moves a job's data between Storage and its staging area.
//!
//! [`InputDataLoader`] fetches the input mapping before the component runs,
//! [`OutputDataLoader`] uploads its results afterwards. Both operate on the
//! staging resolved by a [`StagingStrategy`].

mod input;
mod output;
mod strategy;

pub use input::{InputDataLoader, InputDataLoaderFactory, LoadInputDataResult};
pub use output::{OutputDataLoader, OutputDataLoaderFactory, data_type_support};
pub use strategy::{
    INPUT_FILES_DIR, INPUT_TABLES_DIR, OUTPUT_FILES_DIR, OUTPUT_TABLES_DIR, StagingStrategy,
    check_staging,
};

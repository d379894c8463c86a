//! Declarative schema trees for raw component, configuration, state and
//! app-proxy documents.
//!
//! Each definition describes the accepted keys, types, defaults, enum
//! allow-lists and cross-field rules of one document as a [`Node`] tree.
//! A single normalizer walks the tree and either returns the normalized
//! document (defaults filled) or a [`ConfigurationInvalid`] naming the
//! offending path.
//!
//! ```
//! use jobqueue_staging::schema::{ConfigurationDefinition, Definition};
//! use serde_json::json;
//!
//! let normalized = ConfigurationDefinition
//!     .process_configuration(&json!({"parameters": {"foo": "bar"}}))
//!     .unwrap();
//! assert_eq!(normalized["artifacts"]["options"]["zip"], json!(true));
//! ```

mod app_proxy;
mod component;
mod configuration;
mod error;
mod node;
mod state;

pub use app_proxy::{AUTH_RULE_TYPES, AppProxyDefinition};
pub use component::{
    CONFIGURATION_FORMATS, ComponentSpecificationDefinition, DATA_TYPE_SUPPORT,
    DEFAULT_BUCKET_STAGES, DEFAULT_MEMORY, DEFAULT_PROCESS_TIMEOUT, GELF_SERVER_TYPES,
    IMAGE_TYPES, INPUT_STAGING_TYPES, LOGGING_TYPES, NETWORK_TYPES, OUTPUT_STAGING_TYPES,
    PROCESSOR_POSITIONS, VERBOSITY_VALUES,
};
pub use configuration::{ConfigurationDefinition, TABLE_MODIFICATIONS, WORKSPACE_CREDENTIALS_TYPES};
pub use error::ConfigurationInvalid;
pub use node::{ExtraKeys, Node, NodeKind, Prune, Rule};
pub use state::StateDefinition;

use serde_json::Value;

/// A named schema tree.
pub trait Definition {
    /// Root segment used in error paths.
    fn root(&self) -> &'static str;

    fn tree(&self) -> &Node;

    /// Validate `raw` and return it normalized.
    fn process_configuration(&self, raw: &Value) -> Result<Value, ConfigurationInvalid> {
        self.tree().process(self.root(), raw)
    }
}

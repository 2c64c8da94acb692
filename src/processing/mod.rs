//! The processing engine and its contexts.

mod callbacks;
mod context;
mod options;
mod processor;
mod skipped;

pub use callbacks::{Callback, CallbackContext, CallbackFn, CallbackStage};
pub use context::{FieldContext, ResolverContext, TypeContext};
pub use options::{Options, RequiredFields};
pub use processor::Processor;
pub use skipped::{SkippedPropertiesContext, SkippedProperty};

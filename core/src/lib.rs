// storefront-flow/src/lib.rs

//! Async step pipelines for storefront request flows.
//!
//! A [`Pipeline`] is an ordered list of named steps. Each step can carry
//! `before`, `on` and `after` handlers which receive a clone of the shared
//! [`ContextData`] and answer with a [`PipelineControl`]. Steps may be optional
//! or guarded by a skip condition that inspects the context.
//!
//! The [`Registry`] keys pipelines by the type of their context data, so a
//! request handler only has to build a context value and hand it over:
//!
//! ```ignore
//! let ctx = ContextData::new(AddToCartCtxData { .. });
//! registry.run(ctx.clone()).await?;
//! let item = ctx.read().updated_item.clone();
//! ```

pub mod context;
pub mod control;
pub mod error;
pub mod pipeline;
pub mod registry;
pub mod step;

pub use crate::context::{ContextData, Handler};
pub use crate::control::{PipelineControl, PipelineResult};
pub use crate::error::{FlowError, FlowResult};
pub use crate::pipeline::Pipeline;
pub use crate::registry::Registry;
pub use crate::step::{SkipCondition, StepDef};

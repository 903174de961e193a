//! adjoin Cloud Synthesis
//!
//! This crate turns declared cloud resources into CloudFormation templates.
//! Nothing here talks to AWS: the deployment engine resolves every
//! deploy-time value, orders the resources and provisions them.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                   adjoin CLI                     │
//! │              (adjoin synth / diff)               │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────┐
//! │                 adjoin-cloud                     │
//! │  ┌──────────────┐  ┌──────────────────────┐     │
//! │  │  App/Stack   │  │  Tokens/Intrinsics   │     │
//! │  └──────────────┘  └──────────────────────┘     │
//! │  ┌──────────────┐  ┌──────────────────────┐     │
//! │  │  Plan (diff) │  │   Cloud assembly     │     │
//! │  └──────────────┘  └──────────────────────┘     │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//!           ┌───────▼───────┐
//!           │  <stack>.     │
//!           │ template.json │
//!           └───────────────┘
//! ```

pub mod action;
pub mod assembly;
pub mod error;
pub mod stack;
pub mod template;
pub mod token;

// Re-exports
pub use action::{Action, ActionType, Plan, PlanSummary};
pub use assembly::{Artifact, AssemblyWriter, CloudAssembly, Manifest};
pub use error::{CloudError, Result};
pub use stack::{App, ResourceRef, Stack, make_unique_id};
pub use template::{DeletionPolicy, Output, Parameter, Resource, Template};
pub use token::{Intrinsic, Pseudo, TokenTable, is_present, is_unresolved, join};

//! AWS resources for adjoin
//!
//! Typed declarations of the AWS resources a domain-joined Windows host
//! needs. Each constructor adds one or more resources to an
//! [`adjoin_cloud::Stack`] and returns a handle exposing the resource's
//! deploy-time values (`Ref`, attributes) as token strings.
//!
//! # Example
//!
//! ```ignore
//! use adjoin_aws::ec2::{Vpc, VpcProps};
//! use adjoin_cloud::Stack;
//!
//! let mut stack = Stack::new("AdFsxStack");
//! let vpc = Vpc::new(&mut stack, "VPC", VpcProps::default())?;
//! let private = vpc.private_subnets();
//! ```

pub mod directoryservice;
pub mod ec2;
pub mod error;
pub mod iam;
pub mod secretsmanager;
pub mod ssm;

pub use error::{AwsError, Result};

use adjoin_cloud::{ResourceRef, Stack};
use serde::Serialize;

/// Declares a resource from a serializable property struct
pub(crate) fn declare<P: Serialize>(
    stack: &mut Stack,
    path: &str,
    resource_type: &str,
    properties: &P,
) -> Result<ResourceRef> {
    let properties = serde_json::to_value(properties)?;
    Ok(stack.add_resource(path, resource_type, properties)?)
}

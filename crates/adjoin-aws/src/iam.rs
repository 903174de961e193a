//! IAM roles and managed policies

use crate::declare;
use crate::ec2::Tag;
use crate::error::Result;
use adjoin_cloud::{Intrinsic, Pseudo, ResourceRef, Stack};
use serde::Serialize;
use serde_json::{Value, json};

const POLICY_VERSION: &str = "2012-10-17";
const MANAGED_POLICY_ARNS: &str = "ManagedPolicyArns";

/// AWS service allowed to assume a role
#[derive(Debug, Clone)]
pub struct ServicePrincipal {
    service: String,
}

impl ServicePrincipal {
    /// Short service name, e.g. `ec2`
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    /// `<service>.<url suffix>`, resolved per partition at deploy time
    pub fn principal(&self, stack: &mut Stack) -> String {
        format!(
            "{}.{}",
            self.service,
            stack.token(Intrinsic::pseudo(Pseudo::UrlSuffix))
        )
    }
}

/// Policy managed by AWS, referenced by name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagedPolicy {
    name: String,
}

impl ManagedPolicy {
    pub fn from_aws_managed_policy_name(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// `arn:<partition>:iam::aws:policy/<name>`
    pub fn arn(&self, stack: &mut Stack) -> String {
        format!(
            "arn:{}:iam::aws:policy/{}",
            stack.token(Intrinsic::pseudo(Pseudo::Partition)),
            self.name
        )
    }
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct CfnRoleProps {
    assume_role_policy_document: Value,
    tags: Vec<Tag>,
}

/// `AWS::IAM::Role`
#[derive(Debug, Clone)]
pub struct Role {
    resource: ResourceRef,
}

impl Role {
    pub fn new(stack: &mut Stack, id: &str, assumed_by: &ServicePrincipal) -> Result<Self> {
        let principal = assumed_by.principal(stack);
        let props = CfnRoleProps {
            assume_role_policy_document: json!({
                "Statement": [{
                    "Action": "sts:AssumeRole",
                    "Effect": "Allow",
                    "Principal": { "Service": principal },
                }],
                "Version": POLICY_VERSION,
            }),
            tags: vec![Tag::new("Name", stack.node_path(id))],
        };
        let resource = declare(stack, &format!("{}/Resource", id), "AWS::IAM::Role", &props)?;
        Ok(Self { resource })
    }

    pub fn resource(&self) -> &ResourceRef {
        &self.resource
    }

    /// Attaches a managed policy to the role
    pub fn add_managed_policy(&self, stack: &mut Stack, policy: &ManagedPolicy) -> Result<()> {
        let arn = policy.arn(stack);
        stack.append_property(&self.resource, MANAGED_POLICY_ARNS, Value::String(arn))?;
        tracing::debug!(
            role = %self.resource.logical_id(),
            policy = %policy.name(),
            "Attached managed policy"
        );
        Ok(())
    }
}

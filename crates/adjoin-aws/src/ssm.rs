//! Systems Manager documents and associations

use crate::declare;
use crate::error::Result;
use adjoin_cloud::{ResourceRef, Stack};
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CfnDocumentProps {
    /// Document body; a JSON string or object
    pub content: Value,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_type: Option<String>,
}

/// `AWS::SSM::Document`
#[derive(Debug, Clone)]
pub struct CfnDocument {
    resource: ResourceRef,
    document_ref: String,
}

impl CfnDocument {
    pub fn new(stack: &mut Stack, id: &str, props: &CfnDocumentProps) -> Result<Self> {
        let resource = declare(stack, id, "AWS::SSM::Document", props)?;
        let document_ref = stack.token(resource.reference());
        Ok(Self {
            resource,
            document_ref,
        })
    }

    pub fn resource(&self) -> &ResourceRef {
        &self.resource
    }

    /// `Ref` of the document (its name), as a token string
    pub fn document_ref(&self) -> &str {
        &self.document_ref
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CfnAssociationProps {
    /// Name of the document to run
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub association_name: Option<String>,
}

/// `AWS::SSM::Association`
#[derive(Debug, Clone)]
pub struct CfnAssociation {
    resource: ResourceRef,
}

impl CfnAssociation {
    pub fn new(stack: &mut Stack, id: &str, props: &CfnAssociationProps) -> Result<Self> {
        let resource = declare(stack, id, "AWS::SSM::Association", props)?;
        Ok(Self { resource })
    }

    pub fn resource(&self) -> &ResourceRef {
        &self.resource
    }
}

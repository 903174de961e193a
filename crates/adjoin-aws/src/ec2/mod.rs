//! EC2 and VPC resources

mod instance;
mod machine;
pub mod network;
mod vpc;

pub use instance::{Instance, InstanceProps, SecurityGroup};
pub use machine::{InstanceType, UserData, WindowsImage, WindowsVersion};
pub use network::{CidrBlock, NetworkBuilder};
pub use vpc::{Subnet, SubnetConfiguration, SubnetType, Vpc, VpcProps};

use crate::declare;
use crate::error::Result;
use adjoin_cloud::{ResourceRef, Stack};
use serde::Serialize;
use serde_json::Value;

/// Resource tag
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Tag {
    pub key: String,
    pub value: String,
}

impl Tag {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// `Name` tag carrying the construct path
pub(crate) fn name_tags(stack: &Stack, path: &str) -> Vec<Tag> {
    vec![Tag::new("Name", stack.node_path(path))]
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CfnDhcpOptionsProps {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain_name: Option<String>,

    /// List of addresses, or a deploy-time list such as `Fn::GetAtt`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain_name_servers: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub ntp_servers: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub netbios_node_type: Option<u8>,
}

/// `AWS::EC2::DHCPOptions`
#[derive(Debug, Clone)]
pub struct CfnDhcpOptions {
    resource: ResourceRef,
    dhcp_options_id: String,
}

impl CfnDhcpOptions {
    pub fn new(stack: &mut Stack, id: &str, props: &CfnDhcpOptionsProps) -> Result<Self> {
        let resource = declare(stack, id, "AWS::EC2::DHCPOptions", props)?;
        let dhcp_options_id = stack.token(resource.reference());
        Ok(Self {
            resource,
            dhcp_options_id,
        })
    }

    pub fn resource(&self) -> &ResourceRef {
        &self.resource
    }

    pub fn dhcp_options_id(&self) -> &str {
        &self.dhcp_options_id
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
struct CfnVpcDhcpOptionsAssociationProps<'a> {
    dhcp_options_id: &'a str,
    vpc_id: &'a str,
}

/// `AWS::EC2::VPCDHCPOptionsAssociation`
#[derive(Debug, Clone)]
pub struct CfnVpcDhcpOptionsAssociation {
    resource: ResourceRef,
}

impl CfnVpcDhcpOptionsAssociation {
    pub fn new(stack: &mut Stack, id: &str, dhcp_options_id: &str, vpc_id: &str) -> Result<Self> {
        let resource = declare(
            stack,
            id,
            "AWS::EC2::VPCDHCPOptionsAssociation",
            &CfnVpcDhcpOptionsAssociationProps {
                dhcp_options_id,
                vpc_id,
            },
        )?;
        Ok(Self { resource })
    }

    pub fn resource(&self) -> &ResourceRef {
        &self.resource
    }
}

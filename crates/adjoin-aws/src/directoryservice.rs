//! AWS Managed Microsoft AD

use crate::declare;
use crate::error::Result;
use adjoin_cloud::{Intrinsic, ResourceRef, Stack};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct VpcSettings {
    pub subnet_ids: Vec<String>,
    pub vpc_id: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CfnMicrosoftAdProps {
    /// Fully qualified domain name, e.g. `example.corp`
    pub name: String,

    /// Admin password; normally a secret reference
    pub password: String,

    pub vpc_settings: VpcSettings,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub edition: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub short_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub create_alias: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_sso: Option<bool>,
}

/// `AWS::DirectoryService::MicrosoftAD`
#[derive(Debug, Clone)]
pub struct CfnMicrosoftAd {
    resource: ResourceRef,
    name: String,
    attr_alias: String,
}

impl CfnMicrosoftAd {
    pub fn new(stack: &mut Stack, id: &str, props: &CfnMicrosoftAdProps) -> Result<Self> {
        let resource = declare(stack, id, "AWS::DirectoryService::MicrosoftAD", props)?;
        let attr_alias = stack.token(resource.get_att("Alias"));
        Ok(Self {
            resource,
            name: props.name.clone(),
            attr_alias,
        })
    }

    pub fn resource(&self) -> &ResourceRef {
        &self.resource
    }

    /// Directory name as declared
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Alias of the directory (`d-xxxxxxxxxx`), as a token string
    pub fn attr_alias(&self) -> &str {
        &self.attr_alias
    }

    /// Resolver addresses of the directory; a list known only at deploy time
    pub fn attr_dns_ip_addresses(&self) -> Intrinsic {
        self.resource.get_att("DnsIpAddresses")
    }

    /// One resolver address picked by position.
    ///
    /// The list length is unknown while synthesizing, so an index past its
    /// end fails at deploy time.
    pub fn dns_ip_address(&self, stack: &mut Stack, index: usize) -> String {
        stack.token(Intrinsic::select(index, self.attr_dns_ip_addresses()))
    }
}

//! stack ノードのパース

use crate::error::{CoreError, Result};
use crate::model::{StackConfig, VpcConfig};
use adjoin_aws::ec2::{CidrBlock, SubnetConfiguration, SubnetType};
use kdl::KdlNode;
use tracing::warn;

/// stack ノードをパース
pub fn parse_stack(node: &KdlNode) -> Result<StackConfig> {
    let name = first_string(node)
        .ok_or_else(|| CoreError::InvalidConfig("stack requires a name".to_string()))?;

    let mut config = StackConfig::named(name);

    let Some(children) = node.children() else {
        return Ok(config);
    };

    for child in children.nodes() {
        match child.name().value() {
            "domain" => {
                config.domain = required_string(child)?;
            }
            "instance-type" | "instance_type" => {
                config.instance_type = required_string(child)?
                    .parse()
                    .map_err(|e| invalid(child, e))?;
            }
            "windows-version" | "windows_version" => {
                config.windows_version = required_string(child)?
                    .parse()
                    .map_err(|e| invalid(child, e))?;
            }
            "managed-policies" | "managed_policies" => {
                config.managed_policies = string_list(child)?;
            }
            "document-name" | "document_name" => {
                config.document_name = required_string(child)?;
            }
            "edition" => {
                config.directory_edition = Some(required_string(child)?);
            }
            "bootstrap" => {
                config.bootstrap_commands = string_list(child)?;
            }
            "vpc" => {
                config.vpc = parse_vpc(child)?;
            }
            other => {
                warn!(stack = %config.name, key = other, "Ignoring unknown stack setting");
            }
        }
    }

    Ok(config)
}

/// vpc ノードをパース
fn parse_vpc(node: &KdlNode) -> Result<VpcConfig> {
    let mut vpc = VpcConfig::default();

    let Some(children) = node.children() else {
        return Ok(vpc);
    };

    let mut subnets = Vec::new();
    for child in children.nodes() {
        match child.name().value() {
            "cidr" => {
                let cidr = required_string(child)?;
                cidr.parse::<CidrBlock>().map_err(|e| invalid(child, e))?;
                vpc.cidr = cidr;
            }
            "max-azs" | "max_azs" => {
                let max_azs = required_count(child)?;
                if max_azs == 0 {
                    return Err(CoreError::InvalidConfig(
                        "max-azs は1以上を指定してください".to_string(),
                    ));
                }
                vpc.max_azs = max_azs;
            }
            "nat-gateways" | "nat_gateways" => {
                vpc.nat_gateways = Some(required_count(child)?);
            }
            "subnet" => {
                subnets.push(parse_subnet(child)?);
            }
            other => {
                warn!(key = other, "Ignoring unknown vpc setting");
            }
        }
    }

    // subnet ノードがあればデフォルト構成を置き換える
    if !subnets.is_empty() {
        vpc.subnets = subnets;
    }

    Ok(vpc)
}

/// subnet ノードをパース
///
/// `subnet "Private" type="private" cidr-mask=24`
fn parse_subnet(node: &KdlNode) -> Result<SubnetConfiguration> {
    let name = required_string(node)?;

    let subnet_type = match node.get("type").and_then(|v| v.as_string()) {
        Some("public") => SubnetType::Public,
        Some("private") => SubnetType::Private,
        Some("isolated") => SubnetType::Isolated,
        Some(other) => {
            return Err(CoreError::InvalidConfig(format!(
                "subnet {}: 未知のサブネット種別です: {}",
                name, other
            )));
        }
        None => {
            return Err(CoreError::InvalidConfig(format!(
                "subnet {}: type=\"public|private|isolated\" を指定してください",
                name
            )));
        }
    };

    let cidr_mask = match node.get("cidr-mask") {
        Some(value) => Some(
            value
                .as_integer()
                .and_then(|v| u8::try_from(v).ok())
                .filter(|mask| (16..=28).contains(mask))
                .ok_or_else(|| {
                    CoreError::InvalidConfig(format!(
                        "subnet {}: cidr-mask は16〜28で指定してください",
                        name
                    ))
                })?,
        ),
        None => None,
    };

    Ok(SubnetConfiguration {
        name,
        subnet_type,
        cidr_mask,
    })
}

fn first_string(node: &KdlNode) -> Option<String> {
    node.entries()
        .first()
        .and_then(|e| e.value().as_string())
        .map(|s| s.to_string())
}

fn required_string(node: &KdlNode) -> Result<String> {
    first_string(node).ok_or_else(|| {
        CoreError::InvalidConfig(format!(
            "{} には文字列を1つ指定してください",
            node.name().value()
        ))
    })
}

fn required_count(node: &KdlNode) -> Result<usize> {
    node.entries()
        .first()
        .and_then(|e| e.value().as_integer())
        .and_then(|v| usize::try_from(v).ok())
        .ok_or_else(|| {
            CoreError::InvalidConfig(format!(
                "{} には0以上の整数を指定してください",
                node.name().value()
            ))
        })
}

fn string_list(node: &KdlNode) -> Result<Vec<String>> {
    node.entries()
        .iter()
        .map(|e| {
            e.value().as_string().map(|s| s.to_string()).ok_or_else(|| {
                CoreError::InvalidConfig(format!(
                    "{} の値はすべて文字列で指定してください",
                    node.name().value()
                ))
            })
        })
        .collect()
}

fn invalid(node: &KdlNode, err: impl std::fmt::Display) -> CoreError {
    CoreError::InvalidConfig(format!("{}: {}", node.name().value(), err))
}

//! VPC with public and private subnets spread over availability zones

use super::network::{CidrBlock, NetworkBuilder};
use super::{Tag, name_tags};
use crate::declare;
use crate::error::{AwsError, Result};
use adjoin_cloud::{Intrinsic, ResourceRef, Stack};
use serde::Serialize;
use serde_json::{Value, json};
use tracing::debug;

const DEFAULT_CIDR: &str = "10.0.0.0/16";
const DEFAULT_MAX_AZS: usize = 2;
const ANY_IPV4: &str = "0.0.0.0/0";
const SUBNET_NAME_TAG: &str = "aws-cdk:subnet-name";
const SUBNET_TYPE_TAG: &str = "aws-cdk:subnet-type";

/// Kind of subnet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubnetType {
    /// Routed to the internet gateway
    Public,
    /// Outbound internet access through a NAT gateway
    Private,
    /// No route to the internet at all
    Isolated,
}

impl SubnetType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubnetType::Public => "Public",
            SubnetType::Private => "Private",
            SubnetType::Isolated => "Isolated",
        }
    }
}

impl std::fmt::Display for SubnetType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One group of subnets, repeated in every availability zone
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubnetConfiguration {
    pub name: String,
    pub subnet_type: SubnetType,
    /// Prefix length; `None` shares the remaining space equally
    pub cidr_mask: Option<u8>,
}

impl SubnetConfiguration {
    pub fn new(name: impl Into<String>, subnet_type: SubnetType) -> Self {
        Self {
            name: name.into(),
            subnet_type,
            cidr_mask: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct VpcProps {
    pub cidr: String,
    pub max_azs: usize,
    /// Defaults to one per availability zone
    pub nat_gateways: Option<usize>,
    pub subnet_configuration: Vec<SubnetConfiguration>,
}

impl Default for VpcProps {
    fn default() -> Self {
        Self {
            cidr: DEFAULT_CIDR.to_string(),
            max_azs: DEFAULT_MAX_AZS,
            nat_gateways: None,
            subnet_configuration: vec![
                SubnetConfiguration::new("Public", SubnetType::Public),
                SubnetConfiguration::new("Private", SubnetType::Private),
            ],
        }
    }
}

/// A declared subnet
#[derive(Debug, Clone)]
pub struct Subnet {
    name: String,
    subnet_type: SubnetType,
    cidr: CidrBlock,
    az_index: usize,
    subnet_id: String,
    availability_zone: String,
    route_table: ResourceRef,
}

impl Subnet {
    /// Construct id inside the VPC (e.g. "PublicSubnet1")
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn subnet_type(&self) -> SubnetType {
        self.subnet_type
    }

    pub fn cidr(&self) -> CidrBlock {
        self.cidr
    }

    pub fn az_index(&self) -> usize {
        self.az_index
    }

    /// `Ref` of the subnet, as a token string
    pub fn subnet_id(&self) -> &str {
        &self.subnet_id
    }

    pub fn availability_zone(&self) -> &str {
        &self.availability_zone
    }

    pub fn route_table(&self) -> &ResourceRef {
        &self.route_table
    }
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct CfnVpcProps {
    cidr_block: String,
    enable_dns_hostnames: bool,
    enable_dns_support: bool,
    instance_tenancy: &'static str,
    tags: Vec<Tag>,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct CfnSubnetProps {
    cidr_block: String,
    vpc_id: String,
    availability_zone: String,
    map_public_ip_on_launch: bool,
    tags: Vec<Tag>,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct CfnRouteProps {
    route_table_id: String,
    destination_cidr_block: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    gateway_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    nat_gateway_id: Option<String>,
}

/// A VPC and its network plumbing
#[derive(Debug, Clone)]
pub struct Vpc {
    id: String,
    resource: ResourceRef,
    vpc_id: String,
    cidr: CidrBlock,
    subnets: Vec<Subnet>,
    internet_gateway: Option<ResourceRef>,
    gateway_attachment: Option<ResourceRef>,
    nat_gateways: Vec<ResourceRef>,
}

impl Vpc {
    pub fn new(stack: &mut Stack, id: &str, props: VpcProps) -> Result<Self> {
        let mut network = NetworkBuilder::new(&props.cidr)?;
        if props.max_azs == 0 {
            return Err(AwsError::InvalidVpc("max_azs must be at least 1".to_string()));
        }
        if props.subnet_configuration.is_empty() {
            return Err(AwsError::InvalidVpc("no subnet configuration".to_string()));
        }

        let has_public = props
            .subnet_configuration
            .iter()
            .any(|c| c.subnet_type == SubnetType::Public);
        let has_private = props
            .subnet_configuration
            .iter()
            .any(|c| c.subnet_type == SubnetType::Private);
        // NAT gateways only serve private subnets
        let nat_count = if has_public && has_private {
            props.nat_gateways.unwrap_or(props.max_azs).min(props.max_azs)
        } else {
            0
        };
        if has_private && nat_count == 0 {
            return Err(AwsError::InvalidVpc(
                "private subnets need a public subnet and at least one NAT gateway; use isolated subnets instead"
                    .to_string(),
            ));
        }

        let tags = name_tags(stack, id);
        let resource = declare(
            stack,
            &format!("{}/Resource", id),
            "AWS::EC2::VPC",
            &CfnVpcProps {
                cidr_block: network.block().to_string(),
                enable_dns_hostnames: true,
                enable_dns_support: true,
                instance_tenancy: "default",
                tags,
            },
        )?;
        let vpc_id = stack.token(resource.reference());

        let mut vpc = Self {
            id: id.to_string(),
            resource,
            vpc_id,
            cidr: network.block(),
            subnets: Vec::new(),
            internet_gateway: None,
            gateway_attachment: None,
            nat_gateways: Vec::new(),
        };

        if has_public {
            vpc.declare_internet_gateway(stack)?;
        }

        // fixed-mask subnets are carved first; the rest is split equally
        let mut cidrs: Vec<Vec<CidrBlock>> = vec![Vec::new(); props.subnet_configuration.len()];
        for (blocks, config) in cidrs.iter_mut().zip(&props.subnet_configuration) {
            if let Some(mask) = config.cidr_mask {
                for _ in 0..props.max_azs {
                    blocks.push(network.add_subnet(mask)?);
                }
            }
        }
        let shared = props
            .subnet_configuration
            .iter()
            .filter(|c| c.cidr_mask.is_none())
            .count();
        if shared > 0 {
            let mask = network.mask_for_remaining_subnets(shared * props.max_azs)?;
            for (blocks, config) in cidrs.iter_mut().zip(&props.subnet_configuration) {
                if config.cidr_mask.is_none() {
                    for _ in 0..props.max_azs {
                        blocks.push(network.add_subnet(mask)?);
                    }
                }
            }
        }

        for (config, blocks) in props.subnet_configuration.iter().zip(cidrs) {
            for (az_index, cidr) in blocks.into_iter().enumerate() {
                vpc.declare_subnet(stack, config, az_index, cidr, nat_count)?;
            }
        }

        debug!(
            vpc = %id,
            subnets = vpc.subnets.len(),
            nat_gateways = vpc.nat_gateways.len(),
            "Declared VPC"
        );
        Ok(vpc)
    }

    fn declare_internet_gateway(&mut self, stack: &mut Stack) -> Result<()> {
        let igw = stack.add_resource(
            &format!("{}/IGW", self.id),
            "AWS::EC2::InternetGateway",
            json!({ "Tags": name_tags(stack, &self.id) }),
        )?;
        let igw_id = stack.token(igw.reference());
        let attachment = stack.add_resource(
            &format!("{}/VPCGW", self.id),
            "AWS::EC2::VPCGatewayAttachment",
            json!({ "VpcId": self.vpc_id, "InternetGatewayId": igw_id }),
        )?;
        self.internet_gateway = Some(igw);
        self.gateway_attachment = Some(attachment);
        Ok(())
    }

    fn declare_subnet(
        &mut self,
        stack: &mut Stack,
        config: &SubnetConfiguration,
        az_index: usize,
        cidr: CidrBlock,
        nat_count: usize,
    ) -> Result<()> {
        let name = format!("{}Subnet{}", config.name, az_index + 1);
        let path = format!("{}/{}", self.id, name);
        let availability_zone = stack.token(Intrinsic::select(az_index, Intrinsic::azs()));

        let mut tags = vec![
            Tag::new(SUBNET_NAME_TAG, &config.name),
            Tag::new(SUBNET_TYPE_TAG, config.subnet_type.as_str()),
        ];
        tags.extend(name_tags(stack, &path));

        let subnet = declare(
            stack,
            &format!("{}/Subnet", path),
            "AWS::EC2::Subnet",
            &CfnSubnetProps {
                cidr_block: cidr.to_string(),
                vpc_id: self.vpc_id.clone(),
                availability_zone: availability_zone.clone(),
                map_public_ip_on_launch: config.subnet_type == SubnetType::Public,
                tags,
            },
        )?;
        let subnet_id = stack.token(subnet.reference());

        let route_table = stack.add_resource(
            &format!("{}/RouteTable", path),
            "AWS::EC2::RouteTable",
            json!({ "VpcId": self.vpc_id, "Tags": name_tags(stack, &path) }),
        )?;
        let route_table_id = stack.token(route_table.reference());

        stack.add_resource(
            &format!("{}/RouteTableAssociation", path),
            "AWS::EC2::SubnetRouteTableAssociation",
            json!({ "RouteTableId": route_table_id, "SubnetId": subnet_id }),
        )?;

        match config.subnet_type {
            SubnetType::Public => {
                let (Some(igw), Some(attachment)) =
                    (&self.internet_gateway, &self.gateway_attachment)
                else {
                    return Err(AwsError::InvalidVpc("public subnet without gateway".to_string()));
                };
                let gateway_id = stack.token(igw.reference());
                let route = declare(
                    stack,
                    &format!("{}/DefaultRoute", path),
                    "AWS::EC2::Route",
                    &CfnRouteProps {
                        route_table_id,
                        destination_cidr_block: ANY_IPV4,
                        gateway_id: Some(gateway_id),
                        nat_gateway_id: None,
                    },
                )?;
                stack.add_dependency(&route, attachment)?;

                if self.nat_gateways.len() < nat_count {
                    self.declare_nat_gateway(stack, &path, &subnet_id)?;
                }
            }
            SubnetType::Private => {
                let nat = self
                    .nat_gateways
                    .get(az_index)
                    .or_else(|| self.nat_gateways.first())
                    .cloned()
                    .ok_or_else(|| {
                        AwsError::InvalidVpc(
                            "private subnets must be declared after public subnets".to_string(),
                        )
                    })?;
                let nat_gateway_id = stack.token(nat.reference());
                declare(
                    stack,
                    &format!("{}/DefaultRoute", path),
                    "AWS::EC2::Route",
                    &CfnRouteProps {
                        route_table_id,
                        destination_cidr_block: ANY_IPV4,
                        gateway_id: None,
                        nat_gateway_id: Some(nat_gateway_id),
                    },
                )?;
            }
            SubnetType::Isolated => {}
        }

        self.subnets.push(Subnet {
            name,
            subnet_type: config.subnet_type,
            cidr,
            az_index,
            subnet_id,
            availability_zone,
            route_table,
        });
        Ok(())
    }

    fn declare_nat_gateway(&mut self, stack: &mut Stack, path: &str, subnet_id: &str) -> Result<()> {
        let eip = stack.add_resource(
            &format!("{}/EIP", path),
            "AWS::EC2::EIP",
            json!({ "Domain": "vpc", "Tags": name_tags(stack, path) }),
        )?;
        let allocation_id = stack.token(eip.get_att("AllocationId"));
        let nat = stack.add_resource(
            &format!("{}/NATGateway", path),
            "AWS::EC2::NatGateway",
            json!({
                "AllocationId": allocation_id,
                "SubnetId": subnet_id,
                "Tags": name_tags(stack, path),
            }),
        )?;
        self.nat_gateways.push(nat);
        Ok(())
    }

    pub fn resource(&self) -> &ResourceRef {
        &self.resource
    }

    /// `Ref` of the VPC, as a token string
    pub fn vpc_id(&self) -> &str {
        &self.vpc_id
    }

    pub fn cidr(&self) -> CidrBlock {
        self.cidr
    }

    pub fn subnets(&self) -> &[Subnet] {
        &self.subnets
    }

    pub fn public_subnets(&self) -> Vec<&Subnet> {
        self.subnets_of(SubnetType::Public)
    }

    /// Private subnets followed by isolated ones, in declaration order
    pub fn private_subnets(&self) -> Vec<&Subnet> {
        let mut subnets = self.subnets_of(SubnetType::Private);
        subnets.extend(self.subnets_of(SubnetType::Isolated));
        subnets
    }

    pub fn subnets_of(&self, subnet_type: SubnetType) -> Vec<&Subnet> {
        self.subnets
            .iter()
            .filter(|s| s.subnet_type == subnet_type)
            .collect()
    }

    /// Subnet ids of the given subnets as template values
    pub fn subnet_ids(subnets: &[&Subnet]) -> Vec<Value> {
        subnets
            .iter()
            .map(|s| Value::String(s.subnet_id.clone()))
            .collect()
    }

    pub fn nat_gateway_count(&self) -> usize {
        self.nat_gateways.len()
    }

    pub fn internet_gateway(&self) -> Option<&ResourceRef> {
        self.internet_gateway.as_ref()
    }
}

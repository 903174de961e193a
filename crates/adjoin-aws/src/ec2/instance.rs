//! EC2 instances and their security groups

use super::machine::{InstanceType, UserData};
use super::vpc::{SubnetType, Vpc};
use super::{Tag, name_tags};
use crate::declare;
use crate::error::{AwsError, Result};
use crate::iam::{Role, ServicePrincipal};
use adjoin_cloud::{Intrinsic, ResourceRef, Stack};
use serde::Serialize;
use serde_json::{Value, json};
use tracing::debug;

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct CfnSecurityGroupProps {
    group_description: String,
    security_group_egress: Vec<Value>,
    tags: Vec<Tag>,
    vpc_id: String,
}

/// Security group that allows all outbound traffic
#[derive(Debug, Clone)]
pub struct SecurityGroup {
    resource: ResourceRef,
    group_id: String,
}

impl SecurityGroup {
    pub fn new(stack: &mut Stack, id: &str, vpc: &Vpc) -> Result<Self> {
        let props = CfnSecurityGroupProps {
            group_description: stack.node_path(id),
            security_group_egress: vec![json!({
                "CidrIp": "0.0.0.0/0",
                "Description": "Allow all outbound traffic by default",
                "IpProtocol": "-1",
            })],
            tags: name_tags(stack, id),
            vpc_id: vpc.vpc_id().to_string(),
        };
        let resource = declare(
            stack,
            &format!("{}/Resource", id),
            "AWS::EC2::SecurityGroup",
            &props,
        )?;
        let group_id = stack.token(resource.get_att("GroupId"));
        Ok(Self { resource, group_id })
    }

    pub fn resource(&self) -> &ResourceRef {
        &self.resource
    }

    /// `Fn::GetAtt GroupId`, as a token string
    pub fn group_id(&self) -> &str {
        &self.group_id
    }
}

pub struct InstanceProps<'a> {
    pub instance_type: InstanceType,
    /// Image id, usually the token returned by an image lookup
    pub image_id: String,
    pub vpc: &'a Vpc,
    /// Placement; the first subnet of this type is used
    pub subnet_type: SubnetType,
    pub user_data: Option<UserData>,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct CfnInstanceProps {
    availability_zone: String,
    iam_instance_profile: String,
    image_id: String,
    instance_type: String,
    security_group_ids: Vec<String>,
    subnet_id: String,
    tags: Vec<Tag>,
    #[serde(skip_serializing_if = "Option::is_none")]
    user_data: Option<Intrinsic>,
}

/// EC2 instance with its own security group, role and instance profile
#[derive(Debug, Clone)]
pub struct Instance {
    resource: ResourceRef,
    instance_id: String,
    role: Role,
    security_group: SecurityGroup,
}

impl Instance {
    pub fn new(stack: &mut Stack, id: &str, props: InstanceProps<'_>) -> Result<Self> {
        let subnet = props
            .vpc
            .subnets_of(props.subnet_type)
            .into_iter()
            .next()
            .ok_or_else(|| AwsError::NoSubnets(props.subnet_type.to_string()))?;

        let security_group =
            SecurityGroup::new(stack, &format!("{}/InstanceSecurityGroup", id), props.vpc)?;

        let role = Role::new(
            stack,
            &format!("{}/InstanceRole", id),
            &ServicePrincipal::new("ec2"),
        )?;
        let role_name = stack.token(role.resource().reference());

        let profile = stack.add_resource(
            &format!("{}/InstanceProfile", id),
            "AWS::IAM::InstanceProfile",
            json!({ "Roles": [role_name] }),
        )?;
        let profile_name = stack.token(profile.reference());

        let user_data = props
            .user_data
            .as_ref()
            .map(|ud| Intrinsic::base64(ud.render()));

        let instance_props = CfnInstanceProps {
            availability_zone: subnet.availability_zone().to_string(),
            iam_instance_profile: profile_name,
            image_id: props.image_id,
            instance_type: props.instance_type.to_string(),
            security_group_ids: vec![security_group.group_id().to_string()],
            subnet_id: subnet.subnet_id().to_string(),
            tags: name_tags(stack, id),
            user_data,
        };
        let resource = declare(
            stack,
            &format!("{}/Resource", id),
            "AWS::EC2::Instance",
            &instance_props,
        )?;
        stack.add_dependency(&resource, role.resource())?;
        let instance_id = stack.token(resource.reference());

        debug!(
            instance = %id,
            instance_type = %props.instance_type,
            subnet = %subnet.name(),
            "Declared instance"
        );

        Ok(Self {
            resource,
            instance_id,
            role,
            security_group,
        })
    }

    pub fn resource(&self) -> &ResourceRef {
        &self.resource
    }

    /// `Ref` of the instance, as a token string
    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    /// Execution role of the instance
    pub fn role(&self) -> &Role {
        &self.role
    }

    pub fn security_group(&self) -> &SecurityGroup {
        &self.security_group
    }
}

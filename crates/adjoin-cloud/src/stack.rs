//! Stacks and the app that owns them
//!
//! A [`Stack`] collects resource declarations under construct paths
//! (`VPC/PublicSubnet1/Subnet`), assigns each one a stable logical id and
//! turns the whole graph into a [`Template`] on [`Stack::synth`]. The
//! [`App`] is the explicit context object holding every stack of a run.

use crate::assembly::CloudAssembly;
use crate::error::{CloudError, Result};
use crate::template::{DeletionPolicy, Output, Parameter, Resource, Template};
use crate::token::{Intrinsic, TokenTable, is_present};
use indexmap::IndexMap;
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;
use tracing::{debug, info};

/// CloudFormation stack name; also used as a file name in the assembly
static STACK_NAME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z][A-Za-z0-9-]{0,127}$").expect("stack name pattern is valid")
});

pub(crate) fn check_stack_name(name: &str) -> Result<()> {
    if STACK_NAME_PATTERN.is_match(name) {
        Ok(())
    } else {
        Err(CloudError::InvalidConfig(format!(
            "stack name must start with a letter and contain only letters, digits and hyphens: {:?}",
            name
        )))
    }
}

/// Path component hidden from both the human part and the hash
const HIDDEN_ID: &str = "Default";
/// Path component hidden from the human part only
const HIDDEN_FROM_HUMAN_ID: &str = "Resource";
const PATH_SEP: &str = "/";
const HASH_LEN: usize = 8;
const MAX_HUMAN_LEN: usize = 240;
const MAX_ID_LEN: usize = 255;

fn remove_non_alphanumeric(s: &str) -> String {
    s.chars().filter(|c| c.is_ascii_alphanumeric()).collect()
}

/// Drops a component when the previous one already ends with it
fn remove_dupes<'a>(components: &[&'a str]) -> Vec<&'a str> {
    let mut result: Vec<&'a str> = Vec::with_capacity(components.len());
    for component in components {
        if result.last().is_none_or(|last| !last.ends_with(component)) {
            result.push(component);
        }
    }
    result
}

fn path_hash(components: &[&str]) -> String {
    let digest = md5::compute(components.join(PATH_SEP).as_bytes());
    format!("{:x}", digest)[..HASH_LEN].to_uppercase()
}

/// Calculates the logical id of a construct path.
///
/// Top-level constructs keep their own (alphanumeric) id; nested ones get a
/// readable prefix plus a hash of the full path so that ids never collide.
pub fn make_unique_id(components: &[&str]) -> Result<String> {
    let components: Vec<&str> = components
        .iter()
        .copied()
        .filter(|c| *c != HIDDEN_ID)
        .collect();

    if components.is_empty() {
        return Err(CloudError::InvalidLogicalId(
            "unable to calculate a unique id for an empty path".to_string(),
        ));
    }

    if components.len() == 1 {
        let candidate = remove_non_alphanumeric(components[0]);
        if candidate.is_empty() {
            return Err(CloudError::InvalidLogicalId(components[0].to_string()));
        }
        if candidate.len() <= MAX_ID_LEN {
            return Ok(candidate);
        }
    }

    let hash = path_hash(&components);
    let mut human: String = remove_dupes(&components)
        .into_iter()
        .filter(|c| *c != HIDDEN_FROM_HUMAN_ID)
        .map(remove_non_alphanumeric)
        .collect();
    human.truncate(MAX_HUMAN_LEN);

    Ok(human + &hash)
}

/// Handle to a declared resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRef {
    logical_id: String,
    path: String,
    resource_type: String,
}

impl ResourceRef {
    pub fn logical_id(&self) -> &str {
        &self.logical_id
    }

    /// Construct path below the stack
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn resource_type(&self) -> &str {
        &self.resource_type
    }

    /// `{"Ref": logical_id}`
    pub fn reference(&self) -> Intrinsic {
        Intrinsic::reference(&self.logical_id)
    }

    /// `{"Fn::GetAtt": [logical_id, attribute]}`
    pub fn get_att(&self, attribute: &str) -> Intrinsic {
        Intrinsic::get_att(&self.logical_id, attribute)
    }
}

/// A unit of declared infrastructure
#[derive(Debug, Clone)]
pub struct Stack {
    name: String,
    description: Option<String>,
    tokens: TokenTable,
    resources: IndexMap<String, Resource>,
    paths: IndexMap<String, String>,
    parameters: IndexMap<String, Parameter>,
    outputs: IndexMap<String, Output>,
}

impl Stack {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            tokens: TokenTable::new(),
            resources: IndexMap::new(),
            paths: IndexMap::new(),
            parameters: IndexMap::new(),
            outputs: IndexMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = Some(description.into());
    }

    /// Full construct path including the stack name (used for `Name` tags)
    pub fn node_path(&self, path: &str) -> String {
        format!("{}{}{}", self.name, PATH_SEP, path)
    }

    /// Embeds an intrinsic into a string
    pub fn token(&mut self, intrinsic: Intrinsic) -> String {
        self.tokens.register(intrinsic)
    }

    fn claim_logical_id(&mut self, path: &str) -> Result<String> {
        if self.paths.contains_key(path) {
            return Err(CloudError::DuplicateConstruct(self.node_path(path)));
        }

        let components: Vec<&str> = path.split(PATH_SEP).collect();
        let logical_id = make_unique_id(&components)?;
        if self.resources.contains_key(&logical_id) || self.parameters.contains_key(&logical_id) {
            return Err(CloudError::DuplicateConstruct(format!(
                "{} (logical id {})",
                self.node_path(path),
                logical_id
            )));
        }

        self.paths.insert(path.to_string(), logical_id.clone());
        Ok(logical_id)
    }

    /// Declares a resource under the given construct path
    pub fn add_resource(
        &mut self,
        path: &str,
        resource_type: &str,
        properties: Value,
    ) -> Result<ResourceRef> {
        let logical_id = self.claim_logical_id(path)?;
        debug!(
            stack = %self.name,
            path = %path,
            logical_id = %logical_id,
            resource_type = %resource_type,
            "Declared resource"
        );

        self.resources.insert(
            logical_id.clone(),
            Resource::new(resource_type, properties),
        );

        Ok(ResourceRef {
            logical_id,
            path: path.to_string(),
            resource_type: resource_type.to_string(),
        })
    }

    /// Logical id already assigned to a construct path
    pub fn logical_id_of(&self, path: &str) -> Option<&str> {
        self.paths.get(path).map(|s| s.as_str())
    }

    pub fn resource(&self, resource: &ResourceRef) -> Option<&Resource> {
        self.resources.get(&resource.logical_id)
    }

    pub fn resource_mut(&mut self, resource: &ResourceRef) -> Result<&mut Resource> {
        self.resources
            .get_mut(&resource.logical_id)
            .ok_or_else(|| CloudError::InvalidLogicalId(resource.logical_id.clone()))
    }

    /// Appends a value to a list-valued property, creating the list if needed
    pub fn append_property(
        &mut self,
        resource: &ResourceRef,
        key: &str,
        value: Value,
    ) -> Result<()> {
        let target = self.resource_mut(resource)?;
        if !target.properties.is_object() {
            target.properties = Value::Object(serde_json::Map::new());
        }
        let Some(properties) = target.properties.as_object_mut() else {
            return Err(CloudError::InvalidConfig(key.to_string()));
        };

        match properties
            .entry(key.to_string())
            .or_insert_with(|| Value::Array(Vec::new()))
        {
            Value::Array(items) => {
                items.push(value);
                Ok(())
            }
            _ => Err(CloudError::InvalidConfig(format!(
                "property {} of {} is not a list",
                key, resource.logical_id
            ))),
        }
    }

    /// Makes `from` wait for `to`
    pub fn add_dependency(&mut self, from: &ResourceRef, to: &ResourceRef) -> Result<()> {
        let target = self.resource_mut(from)?;
        if !target.depends_on.contains(&to.logical_id) {
            target.depends_on.push(to.logical_id.clone());
        }
        Ok(())
    }

    pub fn set_removal_policy(
        &mut self,
        resource: &ResourceRef,
        policy: DeletionPolicy,
    ) -> Result<()> {
        let target = self.resource_mut(resource)?;
        target.update_replace_policy = Some(policy);
        target.deletion_policy = Some(policy);
        Ok(())
    }

    /// Declares a template parameter and returns its logical id
    pub fn add_parameter(
        &mut self,
        path: &str,
        parameter_type: &str,
        default: Option<Value>,
    ) -> Result<String> {
        let logical_id = self.claim_logical_id(path)?;
        self.parameters.insert(
            logical_id.clone(),
            Parameter {
                parameter_type: parameter_type.to_string(),
                default,
            },
        );
        Ok(logical_id)
    }

    /// Declares an output if its value is present.
    ///
    /// Returns whether the output was emitted.
    pub fn add_output(
        &mut self,
        id: &str,
        value: Option<Value>,
        description: Option<String>,
    ) -> Result<bool> {
        let value = match value {
            Some(value) if is_present(Some(&value)) => value,
            _ => {
                debug!(stack = %self.name, output = %id, "Skipping output without a value");
                return Ok(false);
            }
        };

        let logical_id = make_unique_id(&[id])?;
        if self.outputs.contains_key(&logical_id) {
            return Err(CloudError::DuplicateConstruct(self.node_path(id)));
        }
        self.outputs
            .insert(logical_id, Output { value, description });
        Ok(true)
    }

    pub fn resource_count(&self) -> usize {
        self.resources.len()
    }

    pub fn output_count(&self) -> usize {
        self.outputs.len()
    }

    /// Produces the template with every token resolved
    pub fn synth(&self) -> Result<Template> {
        let mut resources = IndexMap::with_capacity(self.resources.len());
        for (logical_id, resource) in &self.resources {
            let mut resolved = resource.clone();
            resolved.properties = self.tokens.resolve_value(resource.properties.clone())?;
            resources.insert(logical_id.clone(), resolved);
        }

        let mut outputs = IndexMap::with_capacity(self.outputs.len());
        for (name, output) in &self.outputs {
            outputs.insert(
                name.clone(),
                Output {
                    value: self.tokens.resolve_value(output.value.clone())?,
                    description: output.description.clone(),
                },
            );
        }

        let mut parameters = IndexMap::with_capacity(self.parameters.len());
        for (name, parameter) in &self.parameters {
            let default = match &parameter.default {
                Some(value) => Some(self.tokens.resolve_value(value.clone())?),
                None => None,
            };
            parameters.insert(
                name.clone(),
                Parameter {
                    parameter_type: parameter.parameter_type.clone(),
                    default,
                },
            );
        }

        info!(
            stack = %self.name,
            resources = resources.len(),
            outputs = outputs.len(),
            "Synthesized stack"
        );

        Ok(Template {
            description: self.description.clone(),
            parameters,
            resources,
            outputs,
        })
    }
}

/// Root of all stacks synthesized in one run
#[derive(Debug, Default)]
pub struct App {
    stacks: IndexMap<String, Stack>,
}

impl App {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new empty stack and returns it for declaration
    pub fn new_stack(&mut self, name: &str) -> Result<&mut Stack> {
        if self.stacks.contains_key(name) {
            return Err(CloudError::DuplicateStack(name.to_string()));
        }
        check_stack_name(name)?;
        let stack = self
            .stacks
            .entry(name.to_string())
            .or_insert_with(|| Stack::new(name));
        Ok(stack)
    }

    pub fn stack(&self, name: &str) -> Result<&Stack> {
        self.stacks
            .get(name)
            .ok_or_else(|| CloudError::StackNotFound(name.to_string()))
    }

    pub fn stacks(&self) -> impl Iterator<Item = &Stack> {
        self.stacks.values()
    }

    pub fn stack_names(&self) -> Vec<&str> {
        self.stacks.keys().map(|s| s.as_str()).collect()
    }

    /// Synthesizes every stack
    pub fn synth(&self) -> Result<CloudAssembly> {
        let mut assembly = CloudAssembly::new();
        for stack in self.stacks.values() {
            assembly.add(stack.name(), stack.synth()?);
        }
        Ok(assembly)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_unique_id_top_level() {
        assert_eq!(make_unique_id(&["ad"]).unwrap(), "ad");
        assert_eq!(make_unique_id(&["dhcpOptions"]).unwrap(), "dhcpOptions");
        assert_eq!(make_unique_id(&["ad-joined-instance"]).unwrap(), "adjoinedinstance");
    }

    #[test]
    fn test_unique_id_nested_has_hash() {
        let id = make_unique_id(&["VPC", "Resource"]).unwrap();
        assert!(id.starts_with("VPC"));
        assert_eq!(id.len(), "VPC".len() + HASH_LEN);
        assert!(id[3..].chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_lowercase()));
    }

    #[test]
    fn test_unique_id_is_stable_and_path_sensitive() {
        let a = make_unique_id(&["VPC", "PublicSubnet1", "Subnet"]).unwrap();
        let b = make_unique_id(&["VPC", "PublicSubnet1", "Subnet"]).unwrap();
        let c = make_unique_id(&["VPC", "PublicSubnet2", "Subnet"]).unwrap();

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.starts_with("VPCPublicSubnet1Subnet"));
    }

    #[test]
    fn test_unique_id_default_is_hidden() {
        assert_eq!(
            make_unique_id(&["Default", "ad"]).unwrap(),
            make_unique_id(&["ad"]).unwrap()
        );
        assert!(make_unique_id(&["Default"]).is_err());
        assert!(make_unique_id(&[]).is_err());
    }

    #[test]
    fn test_remove_dupes() {
        assert_eq!(
            remove_dupes(&["Instance", "InstanceRole", "Role"]),
            vec!["Instance", "InstanceRole"]
        );
    }

    #[test]
    fn test_duplicate_path_rejected() {
        let mut stack = Stack::new("Test");
        stack.add_resource("ad", "AWS::DirectoryService::MicrosoftAD", json!({})).unwrap();
        let result = stack.add_resource("ad", "AWS::DirectoryService::MicrosoftAD", json!({}));
        assert!(matches!(result, Err(CloudError::DuplicateConstruct(_))));
    }

    #[test]
    fn test_synth_resolves_tokens() {
        let mut stack = Stack::new("Test");
        let vpc = stack
            .add_resource("VPC", "AWS::EC2::VPC", json!({ "CidrBlock": "10.0.0.0/16" }))
            .unwrap();
        let vpc_id = stack.token(vpc.reference());
        let sg = stack
            .add_resource(
                "SG",
                "AWS::EC2::SecurityGroup",
                json!({ "GroupDescription": format!("group in {}", vpc_id), "VpcId": vpc_id }),
            )
            .unwrap();
        stack.add_dependency(&sg, &vpc).unwrap();

        let template = stack.synth().unwrap();
        let resource = template.resource(sg.logical_id()).unwrap();

        assert_eq!(resource.property("VpcId"), Some(&json!({ "Ref": "VPC" })));
        assert_eq!(
            resource.property("GroupDescription"),
            Some(&json!({ "Fn::Join": ["", ["group in ", { "Ref": "VPC" }]] }))
        );
        assert_eq!(resource.depends_on, vec!["VPC".to_string()]);
    }

    #[test]
    fn test_append_property() {
        let mut stack = Stack::new("Test");
        let role = stack.add_resource("Role", "AWS::IAM::Role", json!({})).unwrap();
        stack.append_property(&role, "ManagedPolicyArns", json!("a")).unwrap();
        stack.append_property(&role, "ManagedPolicyArns", json!("b")).unwrap();

        let template = stack.synth().unwrap();
        assert_eq!(
            template.resource("Role").unwrap().property("ManagedPolicyArns"),
            Some(&json!(["a", "b"]))
        );
    }

    #[test]
    fn test_outputs_require_a_value() {
        let mut stack = Stack::new("Test");
        assert!(!stack.add_output("empty", Some(json!("")), None).unwrap());
        assert!(!stack.add_output("missing", None, None).unwrap());
        assert!(stack.add_output("vpcId", Some(json!("vpc-1")), None).unwrap());

        let template = stack.synth().unwrap();
        assert_eq!(template.outputs.len(), 1);
        assert!(template.output("vpcId").is_some());
    }

    #[test]
    fn test_app_rejects_duplicate_stacks() {
        let mut app = App::new();
        app.new_stack("AdFsxStack").unwrap();
        assert!(matches!(
            app.new_stack("AdFsxStack"),
            Err(CloudError::DuplicateStack(_))
        ));
        assert!(matches!(app.stack("Other"), Err(CloudError::StackNotFound(_))));
        assert_eq!(app.stack_names(), vec!["AdFsxStack"]);
    }

    #[test]
    fn test_app_rejects_invalid_stack_names() {
        let mut app = App::new();
        for name in ["../escaped", "1Stack", "my_stack", "a/b", "", "Stack Name"] {
            assert!(
                matches!(app.new_stack(name), Err(CloudError::InvalidConfig(_))),
                "{name:?}"
            );
        }
        app.new_stack("Ad-Fsx-2").unwrap();
        assert_eq!(app.stack_names(), vec!["Ad-Fsx-2"]);
    }

    #[test]
    fn test_app_synth_collects_templates() {
        let mut app = App::new();
        let stack = app.new_stack("One").unwrap();
        stack.add_resource("VPC", "AWS::EC2::VPC", json!({})).unwrap();
        app.new_stack("Two").unwrap();

        let assembly = app.synth().unwrap();
        assert_eq!(assembly.stack_names(), vec!["One", "Two"]);
        assert_eq!(assembly.template("One").unwrap().resources.len(), 1);
    }
}

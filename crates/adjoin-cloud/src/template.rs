//! CloudFormation template model

use crate::error::Result;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A synthesized CloudFormation template
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Template {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub parameters: IndexMap<String, Parameter>,

    #[serde(default)]
    pub resources: IndexMap<String, Resource>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub outputs: IndexMap<String, Output>,
}

/// A single resource entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Resource {
    /// Resource type (e.g., "AWS::EC2::VPC")
    #[serde(rename = "Type")]
    pub resource_type: String,

    #[serde(default = "empty_object", skip_serializing_if = "is_empty_object")]
    pub properties: Value,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_replace_policy: Option<DeletionPolicy>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deletion_policy: Option<DeletionPolicy>,
}

impl Resource {
    pub fn new(resource_type: impl Into<String>, properties: Value) -> Self {
        Self {
            resource_type: resource_type.into(),
            properties,
            depends_on: Vec::new(),
            update_replace_policy: None,
            deletion_policy: None,
        }
    }

    /// Get a property value
    pub fn property(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }
}

fn empty_object() -> Value {
    Value::Object(serde_json::Map::new())
}

fn is_empty_object(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

/// What happens to a resource when it is removed or replaced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeletionPolicy {
    Delete,
    Retain,
    Snapshot,
}

/// Template parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Parameter {
    #[serde(rename = "Type")]
    pub parameter_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

/// Template output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Output {
    pub value: Value,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Template {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resource(&self, logical_id: &str) -> Option<&Resource> {
        self.resources.get(logical_id)
    }

    pub fn output(&self, name: &str) -> Option<&Output> {
        self.outputs.get(name)
    }

    /// Resources of the given type, in declaration order
    pub fn resources_of_type(&self, resource_type: &str) -> Vec<(&String, &Resource)> {
        self.resources
            .iter()
            .filter(|(_, r)| r.resource_type == resource_type)
            .collect()
    }

    pub fn logical_ids(&self) -> impl Iterator<Item = &String> {
        self.resources.keys()
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn sample() -> Template {
        let mut template = Template::new();
        template.resources.insert(
            "VPCB9E5F0B4".to_string(),
            Resource::new("AWS::EC2::VPC", json!({ "CidrBlock": "10.0.0.0/16" })),
        );
        let mut gw = Resource::new("AWS::EC2::InternetGateway", json!({}));
        gw.depends_on.push("VPCB9E5F0B4".to_string());
        template.resources.insert("VPCIGWB7E252D3".to_string(), gw);
        template.outputs.insert(
            "vpcId".to_string(),
            Output {
                value: json!({ "Ref": "VPCB9E5F0B4" }),
                description: None,
            },
        );
        template
    }

    #[test]
    fn test_serialized_shape() {
        let value = serde_json::to_value(sample()).unwrap();
        assert_eq!(
            value,
            json!({
                "Resources": {
                    "VPCB9E5F0B4": {
                        "Type": "AWS::EC2::VPC",
                        "Properties": { "CidrBlock": "10.0.0.0/16" }
                    },
                    "VPCIGWB7E252D3": {
                        "Type": "AWS::EC2::InternetGateway",
                        "DependsOn": ["VPCB9E5F0B4"]
                    }
                },
                "Outputs": {
                    "vpcId": { "Value": { "Ref": "VPCB9E5F0B4" } }
                }
            })
        );
    }

    #[test]
    fn test_json_roundtrip_keeps_order() {
        let template = sample();
        let json = template.to_json_pretty().unwrap();
        let parsed = Template::from_json(&json).unwrap();

        assert_eq!(parsed, template);
        let ids: Vec<_> = parsed.logical_ids().cloned().collect();
        assert_eq!(ids, vec!["VPCB9E5F0B4", "VPCIGWB7E252D3"]);
    }

    #[test]
    fn test_resources_of_type() {
        let template = sample();
        assert_eq!(template.resources_of_type("AWS::EC2::VPC").len(), 1);
        assert!(template.resources_of_type("AWS::EC2::Subnet").is_empty());
    }

    #[test]
    fn test_yaml_output() {
        let yaml = sample().to_yaml().unwrap();
        assert!(yaml.contains("Type: AWS::EC2::VPC"));
        assert!(yaml.contains("Ref: VPCB9E5F0B4"));
    }
}

//! Secrets Manager secrets

use crate::declare;
use crate::error::{AwsError, Result};
use adjoin_cloud::{DeletionPolicy, ResourceRef, Stack};
use serde::Serialize;

/// How Secrets Manager generates the secret value
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SecretStringGenerator {
    /// JSON object the generated value is merged into
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_string_template: Option<String>,

    /// Key of the generated value inside the template
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generate_string_key: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub password_length: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclude_characters: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclude_punctuation: Option<bool>,
}

impl SecretStringGenerator {
    /// Generates `key` inside the JSON object `template`
    pub fn templated(template: &serde_json::Value, key: impl Into<String>) -> Result<Self> {
        Ok(Self {
            secret_string_template: Some(serde_json::to_string(template)?),
            generate_string_key: Some(key.into()),
            ..Default::default()
        })
    }

    fn validate(&self) -> Result<()> {
        match (&self.secret_string_template, &self.generate_string_key) {
            (Some(_), None) | (None, Some(_)) => Err(AwsError::InvalidSecretGenerator(
                "secret_string_template and generate_string_key must be set together".to_string(),
            )),
            (Some(template), Some(_)) => {
                let parsed: serde_json::Value = serde_json::from_str(template)?;
                if parsed.is_object() {
                    Ok(())
                } else {
                    Err(AwsError::InvalidSecretGenerator(
                        "secret_string_template must be a JSON object".to_string(),
                    ))
                }
            }
            (None, None) => Ok(()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SecretProps {
    pub description: Option<String>,
    pub generate_secret_string: SecretStringGenerator,
    pub removal_policy: DeletionPolicy,
}

impl Default for SecretProps {
    fn default() -> Self {
        Self {
            description: None,
            generate_secret_string: SecretStringGenerator::default(),
            removal_policy: DeletionPolicy::Delete,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct CfnSecretProps<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    generate_secret_string: &'a SecretStringGenerator,
}

/// `AWS::SecretsManager::Secret`
#[derive(Debug, Clone)]
pub struct Secret {
    resource: ResourceRef,
    secret_arn: String,
}

impl Secret {
    pub fn new(stack: &mut Stack, id: &str, props: &SecretProps) -> Result<Self> {
        props.generate_secret_string.validate()?;

        let resource = declare(
            stack,
            &format!("{}/Resource", id),
            "AWS::SecretsManager::Secret",
            &CfnSecretProps {
                description: props.description.as_deref(),
                generate_secret_string: &props.generate_secret_string,
            },
        )?;
        stack.set_removal_policy(&resource, props.removal_policy)?;
        let secret_arn = stack.token(resource.reference());

        Ok(Self {
            resource,
            secret_arn,
        })
    }

    pub fn resource(&self) -> &ResourceRef {
        &self.resource
    }

    /// `Ref` of the secret (its ARN), as a token string
    pub fn secret_arn(&self) -> &str {
        &self.secret_arn
    }

    /// Dynamic reference to one JSON field of the secret.
    ///
    /// CloudFormation resolves it while deploying; the value itself never
    /// appears in the template.
    pub fn secret_value_from_json(&self, key: &str) -> String {
        format!(
            "{{{{resolve:secretsmanager:{}:SecretString:{}::}}}}",
            self.secret_arn, key
        )
    }
}

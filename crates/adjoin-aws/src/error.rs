//! AWS resource declaration error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AwsError {
    #[error("Invalid CIDR block: {0}")]
    InvalidCidr(String),

    #[error("Address space exhausted: {0}")]
    AddressSpaceExhausted(String),

    #[error("No subnets of type {0} in the VPC")]
    NoSubnets(String),

    #[error("Invalid VPC configuration: {0}")]
    InvalidVpc(String),

    #[error("Invalid instance type: {0}")]
    InvalidInstanceType(String),

    #[error("Unknown Windows version: {0}")]
    UnknownWindowsVersion(String),

    #[error("Invalid secret generator: {0}")]
    InvalidSecretGenerator(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Cloud error: {0}")]
    Cloud(#[from] adjoin_cloud::CloudError),
}

pub type Result<T> = std::result::Result<T, AwsError>;

//! Instance types, machine images and user data

use crate::error::{AwsError, Result};
use adjoin_cloud::{Intrinsic, Stack};
use std::fmt;
use std::str::FromStr;

const WINDOWS_AMI_PARAMETER_PREFIX: &str = "/aws/service/ami-windows-latest/";
const IMAGE_ID_PARAMETER_TYPE: &str = "AWS::SSM::Parameter::Value<AWS::EC2::Image::Id>";

/// EC2 instance type such as `c5.large`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceType(String);

impl InstanceType {
    /// Combines a class (`c5`) and a size (`large`)
    pub fn of(class: &str, size: &str) -> Result<Self> {
        format!("{}.{}", class, size).parse()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for InstanceType {
    fn default() -> Self {
        Self("c5.large".to_string())
    }
}

impl FromStr for InstanceType {
    type Err = AwsError;

    fn from_str(s: &str) -> Result<Self> {
        let valid = s.split_once('.').is_some_and(|(class, size)| {
            !class.is_empty()
                && !size.is_empty()
                && class.starts_with(|c: char| c.is_ascii_lowercase())
                && class.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
                && size.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        });
        if !valid {
            return Err(AwsError::InvalidInstanceType(s.to_string()));
        }
        Ok(Self(s.to_string()))
    }
}

impl fmt::Display for InstanceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Windows Server images published as SSM public parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WindowsVersion {
    WindowsServer2016EnglishFullBase,
    #[default]
    WindowsServer2019EnglishFullBase,
    WindowsServer2019EnglishCoreBase,
    WindowsServer2022EnglishFullBase,
    WindowsServer2022EnglishCoreBase,
}

impl WindowsVersion {
    const ALL: [WindowsVersion; 5] = [
        WindowsVersion::WindowsServer2016EnglishFullBase,
        WindowsVersion::WindowsServer2019EnglishFullBase,
        WindowsVersion::WindowsServer2019EnglishCoreBase,
        WindowsVersion::WindowsServer2022EnglishFullBase,
        WindowsVersion::WindowsServer2022EnglishCoreBase,
    ];

    /// Name of the image in the public parameter store
    pub fn ami_name(&self) -> &'static str {
        match self {
            WindowsVersion::WindowsServer2016EnglishFullBase => {
                "Windows_Server-2016-English-Full-Base"
            }
            WindowsVersion::WindowsServer2019EnglishFullBase => {
                "Windows_Server-2019-English-Full-Base"
            }
            WindowsVersion::WindowsServer2019EnglishCoreBase => {
                "Windows_Server-2019-English-Core-Base"
            }
            WindowsVersion::WindowsServer2022EnglishFullBase => {
                "Windows_Server-2022-English-Full-Base"
            }
            WindowsVersion::WindowsServer2022EnglishCoreBase => {
                "Windows_Server-2022-English-Core-Base"
            }
        }
    }

    /// Constant-style name, e.g. `WINDOWS_SERVER_2019_ENGLISH_FULL_BASE`
    pub fn constant_name(&self) -> String {
        self.ami_name().replace('-', "_").to_uppercase()
    }
}

impl FromStr for WindowsVersion {
    type Err = AwsError;

    /// Accepts either the AMI name or the constant-style name
    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|v| v.ami_name() == s || v.constant_name() == s)
            .ok_or_else(|| AwsError::UnknownWindowsVersion(s.to_string()))
    }
}

impl fmt::Display for WindowsVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.ami_name())
    }
}

/// Latest Windows image, looked up at deploy time
#[derive(Debug, Clone, Copy, Default)]
pub struct WindowsImage {
    version: WindowsVersion,
}

impl WindowsImage {
    pub fn new(version: WindowsVersion) -> Self {
        Self { version }
    }

    pub fn version(&self) -> WindowsVersion {
        self.version
    }

    pub fn parameter_name(&self) -> String {
        format!("{}{}", WINDOWS_AMI_PARAMETER_PREFIX, self.version.ami_name())
    }

    /// Declares (once per stack) the parameter resolving the image id and
    /// returns the id as a token string
    pub fn image_id(&self, stack: &mut Stack) -> Result<String> {
        let parameter_name = self.parameter_name();
        let path = format!(
            "SsmParameterValue:{}:{}/Parameter",
            parameter_name, IMAGE_ID_PARAMETER_TYPE
        );

        let logical_id = match stack.logical_id_of(&path) {
            Some(existing) => existing.to_string(),
            None => stack.add_parameter(
                &path,
                IMAGE_ID_PARAMETER_TYPE,
                Some(serde_json::Value::String(parameter_name)),
            )?,
        };
        Ok(stack.token(Intrinsic::reference(logical_id)))
    }
}

/// PowerShell commands run on first boot
#[derive(Debug, Clone, Default)]
pub struct UserData {
    lines: Vec<String>,
}

impl UserData {
    pub fn for_windows() -> Self {
        Self::default()
    }

    pub fn add_commands<I, S>(&mut self, commands: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.lines.extend(commands.into_iter().map(Into::into));
    }

    pub fn render(&self) -> String {
        format!("<powershell>{}</powershell>", self.lines.join("\n"))
    }
}

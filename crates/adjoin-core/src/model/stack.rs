//! スタック定義

use adjoin_aws::ec2::{InstanceType, SubnetConfiguration, VpcProps, WindowsVersion};

/// デフォルトのスタック名
pub const DEFAULT_STACK_NAME: &str = "AdFsxStack";
/// デフォルトのドメイン名
pub const DEFAULT_DOMAIN: &str = "example.corp";
/// デフォルトのSSMドキュメント名
pub const DEFAULT_DOCUMENT_NAME: &str = "ad-join-domain";

/// インスタンスロールに付与するAWS管理ポリシー（デフォルト）
pub const DEFAULT_MANAGED_POLICIES: [&str; 2] =
    ["AmazonSSMManagedInstanceCore", "AmazonSSMDirectoryServiceAccess"];

/// 初回起動時に実行するコマンド（デフォルト）
pub const DEFAULT_BOOTSTRAP_COMMANDS: [&str; 1] = ["Add-WindowsFeature RSAT-Role-Tools"];

/// StackConfig - ドメイン参加スタックの設定
///
/// 1つのCloudFormationスタックとして合成される構成を記述します。
/// デフォルト値のみで合成したテンプレートが基本構成になります。
#[derive(Debug, Clone, PartialEq)]
pub struct StackConfig {
    /// スタック名
    pub name: String,
    /// Active Directory のドメイン名（検証せずそのまま埋め込む）
    pub domain: String,
    /// EC2インスタンスタイプ
    pub instance_type: InstanceType,
    /// Windows Server のイメージ
    pub windows_version: WindowsVersion,
    /// インスタンスロールに付与する管理ポリシー名
    pub managed_policies: Vec<String>,
    /// VPC設定
    pub vpc: VpcConfig,
    /// ドメイン参加用SSMドキュメント名
    pub document_name: String,
    /// ディレクトリのエディション（Standard / Enterprise）
    pub directory_edition: Option<String>,
    /// ユーザーデータとして実行するPowerShellコマンド
    pub bootstrap_commands: Vec<String>,
}

impl StackConfig {
    /// 名前だけ指定した設定を作成（他はデフォルト）
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// 認証情報シークレットのID
    pub fn secret_id(&self) -> String {
        format!("{}_credentials", self.domain)
    }
}

impl Default for StackConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_STACK_NAME.to_string(),
            domain: DEFAULT_DOMAIN.to_string(),
            instance_type: InstanceType::default(),
            windows_version: WindowsVersion::default(),
            managed_policies: DEFAULT_MANAGED_POLICIES.iter().map(|p| p.to_string()).collect(),
            vpc: VpcConfig::default(),
            document_name: DEFAULT_DOCUMENT_NAME.to_string(),
            directory_edition: None,
            bootstrap_commands: DEFAULT_BOOTSTRAP_COMMANDS
                .iter()
                .map(|c| c.to_string())
                .collect(),
        }
    }
}

/// VPC設定
#[derive(Debug, Clone, PartialEq)]
pub struct VpcConfig {
    /// VPC全体のCIDR
    pub cidr: String,
    /// 使用するアベイラビリティゾーン数
    pub max_azs: usize,
    /// NATゲートウェイ数（未指定ならAZごとに1つ）
    pub nat_gateways: Option<usize>,
    /// サブネット構成（AZごとに繰り返す）
    pub subnets: Vec<SubnetConfiguration>,
}

impl Default for VpcConfig {
    fn default() -> Self {
        let props = VpcProps::default();
        Self {
            cidr: props.cidr,
            max_azs: props.max_azs,
            nat_gateways: props.nat_gateways,
            subnets: props.subnet_configuration,
        }
    }
}

impl VpcConfig {
    /// リソース定義用のプロパティに変換
    pub fn to_props(&self) -> VpcProps {
        VpcProps {
            cidr: self.cidr.clone(),
            max_azs: self.max_azs,
            nat_gateways: self.nat_gateways,
            subnet_configuration: self.subnets.clone(),
        }
    }

}

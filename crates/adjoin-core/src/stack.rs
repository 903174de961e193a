//! ドメイン参加スタックの定義
//!
//! 1つの `StackConfig` から、マネージドADとそのドメインに参加する
//! Windowsインスタンスを含むスタックを組み立てます。

use crate::error::{CoreError, Result};
use crate::model::{Project, StackConfig};
use crate::template::DomainJoinDocument;
use adjoin_aws::directoryservice::{CfnMicrosoftAd, CfnMicrosoftAdProps, VpcSettings};
use adjoin_aws::ec2::{
    CfnDhcpOptions, CfnDhcpOptionsProps, CfnVpcDhcpOptionsAssociation, Instance, InstanceProps,
    Subnet, SubnetType, UserData, Vpc, WindowsImage,
};
use adjoin_aws::iam::ManagedPolicy;
use adjoin_aws::secretsmanager::{Secret, SecretProps, SecretStringGenerator};
use adjoin_aws::ssm::{CfnAssociation, CfnAssociationProps, CfnDocument, CfnDocumentProps};
use adjoin_cloud::{App, CloudAssembly, Intrinsic, ResourceRef};
use serde_json::{Value, json};
use tracing::{info, instrument, warn};

/// ディレクトリを配置するサブネット数
const DIRECTORY_SUBNET_COUNT: usize = 2;
/// 生成するパスワードのキー
const PASSWORD_KEY: &str = "password";
/// SSMドキュメントの種別
const DOCUMENT_TYPE: &str = "Command";

/// 定義済みスタックのハンドル
///
/// 値の多くはデプロイ時に決まるため、トークン文字列として保持します。
#[derive(Debug, Clone)]
pub struct DomainJoinStack {
    /// スタック名
    pub name: String,
    /// VPC ID
    pub vpc_id: String,
    /// ディレクトリに渡したサブネットID（最大2つ、宣言順）
    pub directory_subnet_ids: Vec<String>,
    /// ディレクトリのエイリアス
    pub directory_alias: String,
    /// ディレクトリのDNSアドレス一覧
    pub directory_dns: Intrinsic,
    /// 認証情報シークレット
    pub secret: ResourceRef,
    /// マネージドAD
    pub directory: ResourceRef,
    /// インスタンス
    pub instance: ResourceRef,
    /// インスタンスID
    pub instance_id: String,
    /// SSMドキュメント
    pub document: ResourceRef,
    /// SSMドキュメント名
    pub document_name: String,
}

impl DomainJoinStack {
    /// ディレクトリに渡せたサブネットが必要数に足りないか
    pub fn has_short_directory_subnets(&self) -> bool {
        self.directory_subnet_ids.len() < DIRECTORY_SUBNET_COUNT
    }
}

/// スタックを定義
///
/// リソースは依存関係の順に宣言されます:
/// VPC → シークレット → ディレクトリ → DHCPオプション → インスタンス →
/// SSMドキュメント → 関連付け → 出力
#[instrument(skip_all, fields(stack = %config.name))]
pub fn define_stack(app: &mut App, config: &StackConfig) -> Result<DomainJoinStack> {
    let stack = app.new_stack(&config.name)?;

    // ネットワーク
    let vpc = Vpc::new(stack, "VPC", config.vpc.to_props())?;
    let private = vpc.private_subnets();
    if private.len() < DIRECTORY_SUBNET_COUNT {
        warn!(
            available = private.len(),
            required = DIRECTORY_SUBNET_COUNT,
            "Not enough private subnets for the directory"
        );
    }
    let selected: Vec<&Subnet> = private.into_iter().take(DIRECTORY_SUBNET_COUNT).collect();
    let directory_subnet_ids: Vec<String> =
        selected.iter().map(|s| s.subnet_id().to_string()).collect();
    let subnet_values = Vpc::subnet_ids(&selected);

    // 管理者パスワード
    let secret = Secret::new(
        stack,
        &config.secret_id(),
        &SecretProps {
            generate_secret_string: SecretStringGenerator::templated(
                &json!({ "username": "admin" }),
                PASSWORD_KEY,
            )?,
            ..Default::default()
        },
    )?;

    // マネージドAD
    let directory = CfnMicrosoftAd::new(
        stack,
        "ad",
        &CfnMicrosoftAdProps {
            name: config.domain.clone(),
            password: secret.secret_value_from_json(PASSWORD_KEY),
            vpc_settings: VpcSettings {
                subnet_ids: directory_subnet_ids.clone(),
                vpc_id: vpc.vpc_id().to_string(),
            },
            edition: config.directory_edition.clone(),
            short_name: None,
            create_alias: None,
            enable_sso: None,
        },
    )?;

    // VPC内の名前解決をディレクトリに向ける
    let dhcp_options = CfnDhcpOptions::new(
        stack,
        "dhcpOptions",
        &CfnDhcpOptionsProps {
            domain_name: Some(config.domain.clone()),
            domain_name_servers: Some(directory.attr_dns_ip_addresses().into()),
            ..Default::default()
        },
    )?;
    CfnVpcDhcpOptionsAssociation::new(
        stack,
        "dhcpOptionsAssoc",
        dhcp_options.dhcp_options_id(),
        vpc.vpc_id(),
    )?;

    // RDPで接続できるようパブリックサブネットに配置
    let mut user_data = UserData::for_windows();
    user_data.add_commands(config.bootstrap_commands.iter().cloned());
    let image_id = WindowsImage::new(config.windows_version).image_id(stack)?;
    let instance = Instance::new(
        stack,
        "ad-joined-instance",
        InstanceProps {
            instance_type: config.instance_type.clone(),
            image_id,
            vpc: &vpc,
            subnet_type: SubnetType::Public,
            user_data: Some(user_data),
        },
    )?;
    for name in &config.managed_policies {
        let policy = ManagedPolicy::from_aws_managed_policy_name(name);
        instance.role().add_managed_policy(stack, &policy)?;
    }

    // SSMによるドメイン参加
    let dns_ip_addresses = [
        directory.dns_ip_address(stack, 0),
        directory.dns_ip_address(stack, 1),
    ];
    let content = DomainJoinDocument {
        directory_id: directory.attr_alias().to_string(),
        directory_name: config.domain.clone(),
        dns_ip_addresses,
    }
    .render()?;
    let document = CfnDocument::new(
        stack,
        "domainJoinDoc",
        &CfnDocumentProps {
            content: Value::String(content),
            name: Some(config.document_name.clone()),
            document_type: Some(DOCUMENT_TYPE.to_string()),
        },
    )?;
    CfnAssociation::new(
        stack,
        "ssmAssociation",
        &CfnAssociationProps {
            name: document.document_ref().to_string(),
            instance_id: Some(instance.instance_id().to_string()),
            association_name: None,
        },
    )?;

    // 値のない出力は省略される
    let outputs = [
        (
            "directoryAlias",
            Some(Value::String(directory.attr_alias().to_string())),
        ),
        (
            "directoryDns",
            Some(Intrinsic::join(",", directory.attr_dns_ip_addresses()).into()),
        ),
        ("subnetIds", adjoin_cloud::join(",", &subnet_values)),
        ("vpcId", Some(Value::String(vpc.vpc_id().to_string()))),
    ];
    for (id, value) in outputs {
        stack.add_output(id, value, None)?;
    }

    info!(
        resources = stack.resource_count(),
        outputs = stack.output_count(),
        "Defined domain join stack"
    );

    Ok(DomainJoinStack {
        name: config.name.clone(),
        vpc_id: vpc.vpc_id().to_string(),
        directory_subnet_ids,
        directory_alias: directory.attr_alias().to_string(),
        directory_dns: directory.attr_dns_ip_addresses(),
        secret: secret.resource().clone(),
        directory: directory.resource().clone(),
        instance: instance.resource().clone(),
        instance_id: instance.instance_id().to_string(),
        document: document.resource().clone(),
        document_name: config.document_name.clone(),
    })
}

/// プロジェクトのスタックを定義
///
/// `only` が指定されていればそのスタックだけを定義します。
pub fn define_project(
    project: &Project,
    only: Option<&str>,
) -> Result<(App, Vec<DomainJoinStack>)> {
    let configs: Vec<&StackConfig> = match only {
        Some(name) => vec![
            project
                .stack(name)
                .ok_or_else(|| CoreError::StackNotFound(name.to_string()))?,
        ],
        None => project.stacks.iter().collect(),
    };

    let mut app = App::new();
    let stacks = configs
        .into_iter()
        .map(|config| define_stack(&mut app, config))
        .collect::<Result<Vec<_>>>()?;
    Ok((app, stacks))
}

/// プロジェクトのスタックを合成
pub fn synth_project(project: &Project, only: Option<&str>) -> Result<CloudAssembly> {
    let (app, _) = define_project(project, only)?;
    Ok(app.synth()?)
}

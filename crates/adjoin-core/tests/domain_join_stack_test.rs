//! 合成したテンプレートの構造テスト

use adjoin_cloud::{App, Template};
use adjoin_core::{Project, StackConfig, define_stack, parse_kdl_string, synth_project};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

fn synth(config: &StackConfig) -> Template {
    let mut app = App::new();
    define_stack(&mut app, config).unwrap();
    app.stack(&config.name).unwrap().synth().unwrap()
}

fn count(template: &Template, resource_type: &str) -> usize {
    template.resources_of_type(resource_type).len()
}

fn only<'a>(template: &'a Template, resource_type: &str) -> &'a adjoin_cloud::Resource {
    let resources = template.resources_of_type(resource_type);
    assert_eq!(resources.len(), 1, "expected one {resource_type}");
    resources[0].1
}

/// Logical IDs of private subnets, in declaration order
fn private_subnet_ids(template: &Template) -> Vec<String> {
    template
        .resources_of_type("AWS::EC2::Subnet")
        .into_iter()
        .filter(|(_, r)| {
            r.property("Tags")
                .and_then(Value::as_array)
                .is_some_and(|tags| {
                    tags.iter().any(|t| {
                        t["Key"] == "aws-cdk:subnet-type" && t["Value"] == "Private"
                    })
                })
        })
        .map(|(id, _)| id.clone())
        .collect()
}

#[test]
fn test_one_of_each_resource() {
    let template = synth(&StackConfig::default());

    for resource_type in [
        "AWS::EC2::VPC",
        "AWS::SecretsManager::Secret",
        "AWS::DirectoryService::MicrosoftAD",
        "AWS::EC2::DHCPOptions",
        "AWS::EC2::VPCDHCPOptionsAssociation",
        "AWS::EC2::Instance",
        "AWS::SSM::Document",
        "AWS::SSM::Association",
    ] {
        assert_eq!(count(&template, resource_type), 1, "{resource_type}");
    }

    let outputs: Vec<&String> = template.outputs.keys().collect();
    assert_eq!(
        outputs,
        vec!["directoryAlias", "directoryDns", "subnetIds", "vpcId"]
    );
}

#[test]
fn test_directory_uses_first_two_private_subnets() {
    let template = synth(&StackConfig::default());
    let private = private_subnet_ids(&template);
    assert_eq!(private.len(), 2);

    let directory = template.resource("ad").unwrap();
    let expected: Vec<Value> = private.iter().map(|id| json!({ "Ref": id })).collect();
    assert_eq!(
        directory.properties["VpcSettings"]["SubnetIds"],
        Value::Array(expected.clone())
    );
    assert_eq!(
        template.output("subnetIds").unwrap().value,
        json!({ "Fn::Join": [",", expected] })
    );
}

#[test]
fn test_directory_subnets_truncated_to_two() {
    let kdl = r#"
        stack "Wide" {
            vpc {
                max-azs 3
            }
        }
    "#;
    let project = parse_kdl_string(kdl).unwrap();
    let template = synth(&project.stacks[0]);
    let private = private_subnet_ids(&template);
    assert_eq!(private.len(), 3);

    let subnet_ids = template.resource("ad").unwrap().properties["VpcSettings"]["SubnetIds"]
        .as_array()
        .unwrap()
        .clone();
    assert_eq!(
        subnet_ids,
        vec![json!({ "Ref": private[0] }), json!({ "Ref": private[1] })]
    );
}

#[test]
fn test_domain_join_document() {
    let template = synth(&StackConfig::default());
    let document = template.resource("domainJoinDoc").unwrap();
    assert_eq!(document.property("Name"), Some(&json!("ad-join-domain")));
    assert_eq!(document.property("DocumentType"), Some(&json!("Command")));

    // 本文は Fn::Join で組み立てられる
    let parts = document.properties["Content"]["Fn::Join"][1]
        .as_array()
        .unwrap()
        .clone();
    assert_eq!(document.properties["Content"]["Fn::Join"][0], json!(""));
    assert!(parts.contains(&json!({ "Fn::GetAtt": ["ad", "Alias"] })));
    assert!(parts.contains(&json!({
        "Fn::Select": [0, { "Fn::GetAtt": ["ad", "DnsIpAddresses"] }]
    })));
    assert!(parts.contains(&json!({
        "Fn::Select": [1, { "Fn::GetAtt": ["ad", "DnsIpAddresses"] }]
    })));

    // サンプル値を埋め込むと正しいJSONになる
    let body: String = parts
        .iter()
        .map(|part| match part {
            Value::String(s) => s.clone(),
            Value::Object(map) if map.contains_key("Fn::GetAtt") => "d-1234567890".to_string(),
            Value::Object(map) => match map["Fn::Select"][0].as_u64() {
                Some(0) => "10.0.128.10".to_string(),
                _ => "10.0.192.10".to_string(),
            },
            other => panic!("unexpected part {other}"),
        })
        .collect();
    let parsed: Value = serde_json::from_str(&body).unwrap();
    let properties = &parsed["runtimeConfig"]["aws:domainJoin"]["properties"];
    assert_eq!(properties["directoryId"], json!("d-1234567890"));
    assert_eq!(properties["directoryName"], json!("example.corp"));
    assert_eq!(
        properties["dnsIpAddresses"],
        json!(["10.0.128.10", "10.0.192.10"])
    );
}

#[test]
fn test_association_binds_document_to_instance() {
    let template = synth(&StackConfig::default());
    let (instance_id, _) = template.resources_of_type("AWS::EC2::Instance")[0];
    let association = only(&template, "AWS::SSM::Association");
    assert_eq!(
        association.properties,
        json!({
            "Name": { "Ref": "domainJoinDoc" },
            "InstanceId": { "Ref": instance_id }
        })
    );
}

#[test]
fn test_dhcp_options_point_at_directory() {
    let template = synth(&StackConfig::default());
    let dhcp = template.resource("dhcpOptions").unwrap();
    assert_eq!(
        dhcp.properties,
        json!({
            "DomainName": "example.corp",
            "DomainNameServers": { "Fn::GetAtt": ["ad", "DnsIpAddresses"] }
        })
    );

    let (vpc_id, _) = template.resources_of_type("AWS::EC2::VPC")[0];
    let association = template.resource("dhcpOptionsAssoc").unwrap();
    assert_eq!(
        association.properties,
        json!({ "DhcpOptionsId": { "Ref": "dhcpOptions" }, "VpcId": { "Ref": vpc_id } })
    );
    assert_eq!(template.output("vpcId").unwrap().value, json!({ "Ref": vpc_id }));
    assert_eq!(
        template.output("directoryDns").unwrap().value,
        json!({ "Fn::Join": [",", { "Fn::GetAtt": ["ad", "DnsIpAddresses"] }] })
    );
}

#[test]
fn test_instance_role_has_managed_policies() {
    let template = synth(&StackConfig::default());
    let role = only(&template, "AWS::IAM::Role");
    assert_eq!(
        role.property("ManagedPolicyArns"),
        Some(&json!([
            { "Fn::Join": ["", ["arn:", { "Ref": "AWS::Partition" }, ":iam::aws:policy/AmazonSSMManagedInstanceCore"]] },
            { "Fn::Join": ["", ["arn:", { "Ref": "AWS::Partition" }, ":iam::aws:policy/AmazonSSMDirectoryServiceAccess"]] }
        ]))
    );

    let instance = only(&template, "AWS::EC2::Instance");
    assert_eq!(instance.property("InstanceType"), Some(&json!("c5.large")));
    assert_eq!(
        instance.property("UserData"),
        Some(&json!({ "Fn::Base64": "<powershell>Add-WindowsFeature RSAT-Role-Tools</powershell>" }))
    );
}

#[test]
fn test_secret_template_without_plaintext_password() {
    let template = synth(&StackConfig::default());
    let secret = only(&template, "AWS::SecretsManager::Secret");
    assert_eq!(
        secret.property("GenerateSecretString"),
        Some(&json!({
            "SecretStringTemplate": "{\"username\":\"admin\"}",
            "GenerateStringKey": "password"
        }))
    );

    let password = &template.resource("ad").unwrap().properties["Password"];
    let parts = password["Fn::Join"][1].as_array().unwrap();
    assert_eq!(parts[0], json!("{{resolve:secretsmanager:"));
    assert_eq!(parts[2], json!(":SecretString:password::}}"));
}

#[test]
fn test_no_private_subnets_omits_subnet_output() {
    let kdl = r#"
        stack "PublicOnly" {
            vpc {
                subnet "Public" type="public"
            }
        }
    "#;
    let project = parse_kdl_string(kdl).unwrap();
    let template = synth(&project.stacks[0]);

    assert!(template.output("subnetIds").is_none());
    assert_eq!(template.outputs.len(), 3);
    assert_eq!(
        template.resource("ad").unwrap().properties["VpcSettings"]["SubnetIds"],
        json!([])
    );
}

#[test]
fn test_one_private_subnet_is_accepted() {
    let kdl = r#"
        stack "Narrow" {
            vpc {
                max-azs 1
            }
        }
    "#;
    let project = parse_kdl_string(kdl).unwrap();
    let template = synth(&project.stacks[0]);
    let subnet_ids = &template.resource("ad").unwrap().properties["VpcSettings"]["SubnetIds"];
    assert_eq!(subnet_ids.as_array().unwrap().len(), 1);
    assert!(template.output("subnetIds").is_some());
}

#[test]
fn test_synth_is_deterministic() {
    let project = Project::default();
    let first = synth_project(&project, None).unwrap();
    let second = synth_project(&project, None).unwrap();

    let render = |assembly: &adjoin_cloud::CloudAssembly| {
        assembly
            .template("AdFsxStack")
            .unwrap()
            .to_json_pretty()
            .unwrap()
    };
    assert_eq!(render(&first), render(&second));
}

#[test]
fn test_domain_is_embedded_verbatim() {
    let config = StackConfig {
        domain: "Corp Example!".to_string(),
        ..Default::default()
    };
    let template = synth(&config);
    assert_eq!(
        template.resource("ad").unwrap().property("Name"),
        Some(&json!("Corp Example!"))
    );
    assert_eq!(count(&template, "AWS::SecretsManager::Secret"), 1);
}

/// 固定マスクと均等割りのサブネットを混在させた設定例がそのまま合成できる
#[test]
fn test_documented_config_synthesizes() {
    let kdl = r#"
        stack "AdFsxStack" {
            domain "example.corp"
            instance-type "c5.large"
            windows-version "WINDOWS_SERVER_2019_ENGLISH_FULL_BASE"
            managed-policies "AmazonSSMManagedInstanceCore" "AmazonSSMDirectoryServiceAccess"
            document-name "ad-join-domain"
            edition "Standard"
            bootstrap "Add-WindowsFeature RSAT-Role-Tools"
            vpc {
                cidr "10.0.0.0/16"
                max-azs 2
                nat-gateways 2
                subnet "Public" type="public"
                subnet "Private" type="private" cidr-mask=18
            }
        }
    "#;
    let project = parse_kdl_string(kdl).unwrap();
    let assembly = synth_project(&project, None).unwrap();
    let template = assembly.template("AdFsxStack").unwrap();

    let mut cidrs: Vec<String> = template
        .resources_of_type("AWS::EC2::Subnet")
        .into_iter()
        .map(|(_, r)| r.property("CidrBlock").unwrap().as_str().unwrap().to_string())
        .collect();
    cidrs.sort();
    assert_eq!(
        cidrs,
        vec!["10.0.0.0/18", "10.0.128.0/18", "10.0.192.0/18", "10.0.64.0/18"]
    );
    assert_eq!(count(template, "AWS::EC2::NatGateway"), 2);

    let private = private_subnet_ids(template);
    let refs: Vec<Value> = private.iter().map(|id| json!({ "Ref": id })).collect();
    assert_eq!(
        template.resource("ad").unwrap().properties["VpcSettings"]["SubnetIds"],
        Value::Array(refs)
    );
}

//! ドキュメント本文のテンプレート展開
//!
//! Teraを使用してドメイン参加用SSMドキュメントの本文を生成します。

use crate::error::{CoreError, Result};
use serde::Serialize;
use tera::{Context, Tera};
use tracing::debug;

/// ドメイン参加ドキュメントのテンプレート
const DOMAIN_JOIN_TEMPLATE: &str = include_str!("../templates/domain_join.json.tera");

/// ドメイン参加ドキュメントに埋め込む値
///
/// 値はデプロイ時に決まるものが多く、通常はトークン文字列です。
#[derive(Debug, Clone, Serialize)]
pub struct DomainJoinDocument {
    /// ディレクトリID（ディレクトリのエイリアス）
    pub directory_id: String,
    /// ディレクトリ名（ドメイン名）
    pub directory_name: String,
    /// DNSサーバーのアドレス（先頭2つ）
    pub dns_ip_addresses: [String; 2],
}

impl DomainJoinDocument {
    /// ドキュメント本文を生成
    pub fn render(&self) -> Result<String> {
        let context = Context::from_serialize(self)
            .map_err(|e| CoreError::TemplateRender(extract_tera_error_detail(&e)))?;
        let body = Tera::one_off(DOMAIN_JOIN_TEMPLATE, &context, false)
            .map_err(|e| CoreError::TemplateRender(extract_tera_error_detail(&e)))?;
        debug!(bytes = body.len(), "Rendered domain join document");
        Ok(body)
    }
}

/// Teraエラーから詳細情報を抽出
fn extract_tera_error_detail(e: &tera::Error) -> String {
    use std::error::Error;

    let mut details = vec![e.to_string()];
    let mut source = e.source();
    while let Some(err) = source {
        details.push(err.to_string());
        source = err.source();
    }
    details.join(" | ")
}

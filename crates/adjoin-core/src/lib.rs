//! adjoin core
//!
//! マネージドADのドメインにWindowsインスタンスを参加させるスタックを
//! 定義し、KDL設定ファイルから読み込みます。
//!
//! ```text
//! adjoin.kdl ──▶ parser ──▶ model::Project
//!                              │
//!                              ▼
//!                   stack::define_stack ──▶ adjoin_cloud::App ──▶ CloudAssembly
//! ```

pub mod discovery;
pub mod error;
pub mod loader;
pub mod model;
pub mod parser;
pub mod stack;
pub mod template;

pub use discovery::{CONFIG_PATH_ENV, find_config_file};
pub use error::{CoreError, Result};
pub use loader::{LoadedConfig, load_config};
pub use model::*;
pub use parser::{parse_kdl_file, parse_kdl_string};
pub use stack::{DomainJoinStack, define_project, define_stack, synth_project};
pub use template::DomainJoinDocument;

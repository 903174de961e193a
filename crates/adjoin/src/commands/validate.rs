use crate::utils;
use colored::Colorize;
use std::path::Path;

pub fn handle(config: Option<&Path>) -> anyhow::Result<()> {
    println!("{}", "設定を検証中...".blue());

    let loaded = match utils::load(config) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!();
            eprintln!("{}", "✗ 設定エラー".red().bold());
            eprintln!("  {}", e);
            std::process::exit(1);
        }
    };
    utils::print_config_source(&loaded);

    let synthesized = adjoin_core::define_project(&loaded.project, None)
        .and_then(|(app, stacks)| Ok((app.synth()?, stacks)));

    match synthesized {
        Ok((assembly, stacks)) => {
            println!("{}", "✓ 設定ファイルは正常です！".green().bold());
            println!();
            println!("サマリー:");
            println!("  スタック: {}個", assembly.stack_names().len());
            for (name, template) in assembly.iter() {
                println!(
                    "    - {} ({}個のリソース, {}個の出力)",
                    name.cyan(),
                    template.resources.len(),
                    template.outputs.len()
                );
            }
            for stack in &stacks {
                if stack.has_short_directory_subnets() {
                    println!(
                        "  {} {}: プライベートサブネットが2つ未満になります",
                        "⚠".yellow(),
                        stack.name
                    );
                }
            }
        }
        Err(e) => {
            eprintln!();
            eprintln!("{}", "✗ 合成エラー".red().bold());
            eprintln!("  {}", e);
            std::process::exit(1);
        }
    }

    Ok(())
}

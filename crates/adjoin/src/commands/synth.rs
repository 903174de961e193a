use crate::utils;
use adjoin_cloud::AssemblyWriter;
use colored::Colorize;
use std::path::{Path, PathBuf};

pub struct SynthOptions {
    pub stack: Option<String>,
    pub output: PathBuf,
    pub domain: Option<String>,
    pub json: bool,
    pub quiet: bool,
}

pub fn handle(config: Option<&Path>, options: SynthOptions) -> anyhow::Result<()> {
    let mut loaded = utils::load(config)?;
    if !options.quiet {
        utils::print_config_source(&loaded);
    }

    // --domain は合成対象の全スタックに適用
    if let Some(domain) = &options.domain {
        for stack in &mut loaded.project.stacks {
            stack.domain = domain.clone();
        }
    }

    let assembly = adjoin_core::synth_project(&loaded.project, options.stack.as_deref())?;
    let writer = AssemblyWriter::new(&options.output);
    writer.write(&assembly)?;

    if !options.quiet {
        let mut first = true;
        for (_, template) in assembly.iter() {
            if options.json {
                println!("{}", template.to_json_pretty()?);
            } else {
                if !first {
                    println!("---");
                }
                print!("{}", template.to_yaml()?);
            }
            first = false;
        }
    }

    eprintln!(
        "{} {}個のスタックを {} に書き出しました",
        "✓".green().bold(),
        assembly.stack_names().len(),
        writer.out_dir().display().to_string().cyan()
    );
    for name in assembly.stack_names() {
        eprintln!("  • {}", name.cyan());
    }

    Ok(())
}

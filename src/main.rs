/*
Copyright 2025 Connor Nolan

Licensed under the Apache License, Version 2.0 (the "License");
you may not use this file except in compliance with the License.
You may obtain a copy of the License at

    http://www.apache.org/licenses/LICENSE-2.0

Unless required by applicable law or agreed to in writing, software
distributed under the License is distributed on an "AS IS" BASIS,
WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
See the License for the specific language governing permissions and
limitations under the License.
*/

use anyhow::{Context, Result};
use clap::Parser as clap_parser;
use clap::ValueEnum;
use minicc::{compile_to_asm, compile_to_ast_dump, compile_to_ir};
use std::fs;
use std::path::PathBuf;

#[derive(Clone, Copy, PartialEq, ValueEnum)]
enum Emit {
    /// Syntax tree as JSON
    Ast,
    /// Linear three-address IR text
    Ir,
    /// ARM32 assembly
    Asm,
}

#[derive(clap_parser)]
#[clap(version = "0.1.0", about = "MiniC compiler targeting ARM32")]
struct Opts {
    #[clap(short, long)]
    input: PathBuf,
    /// Output file; stdout when omitted
    #[clap(short, long)]
    output: Option<PathBuf>,
    /// Which artifact to emit
    #[clap(long, value_enum, default_value = "asm")]
    emit: Emit,
    /// Interleave each IR instruction as an assembly comment
    #[clap(long)]
    show_linear_ir: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let opts: Opts = Opts::parse();

    let source = fs::read_to_string(&opts.input)
        .with_context(|| format!("Failed to read input file: {}", opts.input.display()))?;

    let text = match opts.emit {
        Emit::Ast => compile_to_ast_dump(&source)?,
        Emit::Ir => compile_to_ir(&source)?,
        Emit::Asm => compile_to_asm(&source, opts.show_linear_ir)?,
    };

    match &opts.output {
        Some(path) => {
            fs::write(path, text)
                .with_context(|| format!("Failed to write output file: {}", path.display()))?;
            println!(
                "Successfully compiled {} to {}",
                opts.input.display(),
                path.display()
            );
        }
        None => print!("{}", text),
    }

    Ok(())
}

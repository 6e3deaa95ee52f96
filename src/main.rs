use anyhow::Context;
use clap::Parser;
use forthc::runtime::{compiler::Compiler, interpreter::Machine};
use std::{fs, io, process::ExitCode};

/// Compile a Forth style source file into its threaded executable image.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// The source file to compile.
    source: String,

    /// Write the compiled image in its binary encoding to this file.
    #[arg(short, long)]
    output: Option<String>,

    /// Print a human readable listing of the compiled image.
    #[arg(long)]
    listing: bool,

    /// Run the compiled image on the reference machine after compiling.
    #[arg(long)]
    run: bool,
}

fn main() -> anyhow::Result<ExitCode> {
    pretty_env_logger::init();

    let args = Args::parse();

    let image = Compiler::new()
        .compile_file(&args.source)
        .with_context(|| format!("Failed to compile {}.", args.source))?;

    if let Some(path) = &args.output {
        let bytes = image.to_bytes()?;

        fs::write(path, bytes).with_context(|| format!("Failed to write {}.", path))?;
        log::info!("wrote compiled image to {}", path);
    }

    if args.listing {
        print!("{}", image.listing());
    }

    if args.run {
        let status = Machine::new(&image).run(&mut io::stdout())?;

        return Ok(ExitCode::from(status.rem_euclid(256) as u8));
    }

    Ok(ExitCode::SUCCESS)
}

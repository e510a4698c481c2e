use day2::{run, Strategy};
use util::{init_tracing, InputArgs};

use clap::Parser;
use miette::Result;

fn main() -> Result<()> {
    init_tracing();
    let args = InputArgs::parse();

    let total = run(&args.path, Strategy::Outcome)?;

    println!("{total}");

    Ok(())
}

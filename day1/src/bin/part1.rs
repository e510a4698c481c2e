use day1::{run, Strategy};
use util::{init_tracing, InputArgs};

use clap::Parser;
use miette::Result;

fn main() -> Result<()> {
    init_tracing();
    let args = InputArgs::parse();

    let answer = run(&args.path, Strategy::Max)?;

    println!("{answer}");

    Ok(())
}

use anyhow::Result;

mod cli;
mod runtime;

fn main() -> Result<()> {
    env_logger::init();
    let command = cli::parse()?;
    runtime::execute(command)
}

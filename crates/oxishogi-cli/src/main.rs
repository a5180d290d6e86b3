mod command;
mod progress;
mod run_log;
mod schema;
mod util;

fn main() -> anyhow::Result<()> {
    command::run()
}

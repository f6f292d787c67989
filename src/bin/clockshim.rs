use anyhow::Result;

fn main() -> Result<()> {
    clockshim::cli::run()
}

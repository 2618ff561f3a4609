use std::io::Write;

use spllstream::{capture, CliArgs};

const GIT_VERSION: &str = git_version::git_version!(fallback = "unknown");

fn main() -> anyhow::Result<()> {
    let args: CliArgs = argh::from_env();

    if args.version {
        let stdout = std::io::stdout();
        let mut stdout = stdout.lock();
        writeln!(
            stdout,
            concat!(
                env!("CARGO_BIN_NAME"),
                " ",
                "{}",
            ),
            GIT_VERSION,
        )?;
        return Ok(())
    }

    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    capture::main(args)
}

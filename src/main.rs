use anyhow::{bail, Context};
use lotledger::config::Config;
use lotledger::tools::{AggregateTool, BalanceTool, PnlTool};

const USAGE: &str = "usage: lotledger <pnl|balance|aggregate> <config.json>";

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing_subscriber::filter::LevelFilter::INFO.into()),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let (Some(command), Some(config_path)) = (args.next(), args.next()) else {
        bail!("{}", USAGE);
    };

    let config = Config::from_file(&config_path)
        .with_context(|| format!("loading config {}", config_path))?;

    match command.as_str() {
        "pnl" => PnlTool::new(config).run()?,
        "balance" => BalanceTool::new(config).run()?,
        "aggregate" => AggregateTool::new(config).run()?,
        other => bail!("unknown command {}\n{}", other, USAGE),
    }

    Ok(())
}

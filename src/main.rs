use std::io::{BufRead, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use jembatan::config::{find_default_config, init_default_config, load_config, AppConfig};
use jembatan::pipeline::MessageResponder;

#[derive(Parser, Debug)]
#[command(name = "jembatan")]
#[command(about = "Indonesian <-> Traditional Chinese caregiver chat translator", long_about = None)]
struct Args {
    /// Generate a default config file, then exit
    #[arg(long)]
    init_config: bool,

    /// Directory to write the config file (default: current directory)
    #[arg(long, value_name = "DIR")]
    init_config_dir: Option<PathBuf>,

    /// Overwrite an existing config file when used with --init-config
    #[arg(long)]
    force: bool,

    /// Config file path (default: search for jembatan.toml upwards, or $JEMBATAN_CONFIG)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Sender identity used for rate limiting
    #[arg(long, default_value = "cli")]
    sender: String,

    /// Print stage-by-stage intermediate values after each reply
    #[arg(long)]
    show_trace: bool,

    /// Message to translate; omit to read one message per line from stdin
    #[arg(value_name = "MESSAGE")]
    message: Vec<String>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if args.init_config {
        let dir = args
            .init_config_dir
            .clone()
            .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));
        let cfg_path = init_default_config(&dir, args.force).context("init default config")?;
        eprintln!("Wrote config: {}", cfg_path.display());
        return Ok(());
    }

    let cfg_file = args.config.clone().or_else(find_default_config);
    let (cfg, cfg_path) = match cfg_file {
        Some(p) if p.exists() => {
            let cfg = load_config(&p)?;
            (cfg, p)
        }
        _ => (AppConfig::default(), PathBuf::from("jembatan.toml")),
    };

    let responder =
        MessageResponder::from_config(&cfg, &cfg_path).context("build message pipeline")?;

    if !args.message.is_empty() {
        let message = args.message.join(" ");
        let reply = responder.respond(&args.sender, &message);
        println!("{}", reply.text);
        if args.show_trace {
            eprintln!("{:#?}", reply.trace);
        }
        return Ok(());
    }

    // Chat loop: one message per line, reply on stdout.
    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();
    for line in stdin.lock().lines() {
        let line = line.context("read stdin")?;
        let reply = responder.respond(&args.sender, &line);
        writeln!(stdout, "{}", reply.text).context("write reply")?;
        if args.show_trace {
            eprintln!("{:#?}", reply.trace);
        }
        stdout.flush().context("flush stdout")?;
    }
    Ok(())
}

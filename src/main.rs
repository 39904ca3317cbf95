// SPDX-License-Identifier: MPL-2.0
use easel::app::{self, Flags};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const HELP: &str = "\
easel - headless image editing shell

USAGE:
  easel [OPTIONS] [SCRIPT]

Reads one command per line from SCRIPT, or from stdin when omitted.

OPTIONS:
  --lang <LOCALE>        Interface language (e.g. en-US, fa)
  --data-dir <DIR>       Local store directory [env: EASEL_DATA_DIR]
  --config-dir <DIR>     Directory holding settings.toml [env: EASEL_CONFIG_DIR]
  --host-store <DIR>     Host store directory [env: EASEL_HOST_STORE_DIR]
  -h, --help             Print this help
";

fn parse_flags() -> Result<Option<Flags>, pico_args::Error> {
    let mut args = pico_args::Arguments::from_env();
    if args.contains(["-h", "--help"]) {
        return Ok(None);
    }
    let flags = Flags {
        lang: args.opt_value_from_str("--lang")?,
        data_dir: args.opt_value_from_str("--data-dir")?,
        config_dir: args.opt_value_from_str("--config-dir")?,
        host_store: args.opt_value_from_str("--host-store")?,
        script: args
            .finish()
            .into_iter()
            .next()
            .map(PathBuf::from),
    };
    Ok(Some(flags))
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("easel=info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let flags = match parse_flags() {
        Ok(Some(flags)) => flags,
        Ok(None) => {
            print!("{HELP}");
            return ExitCode::SUCCESS;
        }
        Err(err) => {
            eprintln!("easel: {err}\n\n{HELP}");
            return ExitCode::from(2);
        }
    };

    match app::run(flags).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(%err, "session ended with an error");
            ExitCode::FAILURE
        }
    }
}

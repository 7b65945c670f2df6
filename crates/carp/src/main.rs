mod cli;
mod commands;
mod format;

use clap::Parser;

use cli::{Cli, Command};
use commands::CliError;

fn main() {
    let cli = Cli::parse();
    init_logging(&cli);

    let code = match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err}");
            err.exit_code()
        }
    };
    std::process::exit(code);
}

fn run(cli: Cli) -> Result<i32, CliError> {
    match cli.command {
        Command::Init {
            subject,
            key_algorithm,
            validity,
            data_dir,
        } => commands::init(&subject, key_algorithm, validity, &data_dir.data_dir),
        Command::Sign {
            csr_path,
            validity,
            data_dir,
        } => commands::sign(&csr_path, validity, &data_dir.data_dir),
        Command::Revoke {
            serial,
            reason,
            data_dir,
        } => commands::revoke(&serial, reason, &data_dir.data_dir),
        Command::Crl {
            next_update,
            data_dir,
        } => commands::crl(next_update, &data_dir.data_dir),
        Command::List { data_dir } => commands::list(&data_dir.data_dir),
        Command::Verify {
            cert_path,
            data_dir,
        } => commands::verify(&cert_path, &data_dir.data_dir),
        Command::Request {
            subject,
            san,
            key_algorithm,
            out_key,
            out_csr,
        } => commands::request(&subject, &san, key_algorithm, &out_key, &out_csr),
        Command::Check { data_dir } => commands::check(&data_dir.data_dir),
        Command::External(args) => {
            let name = args
                .first()
                .map(|arg| arg.to_string_lossy().into_owned())
                .unwrap_or_default();
            Err(CliError::Usage(format!("unknown command {name:?}")))
        }
    }
}

/// Route logs to stderr so stdout stays reserved for summaries.
fn init_logging(cli: &Cli) {
    let level = match cli.verbose {
        0 => cli.log_level.as_str(),
        1 => "debug",
        _ => "trace",
    };
    let env_filter = tracing_subscriber::EnvFilter::try_new(level)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}

use clap::Parser;
use evpkdf_rs::{salt_from_hex, DigestAlgorithm, KeyIvDeriver, Result, SaltedData};
use std::process::ExitCode;

/// Derives a key and IV exactly like `openssl enc -P` without `-pbkdf2`.
#[derive(Parser)]
#[command(name = "evpkdf", version)]
struct Cli {
    /// Digest used for the derivation (md5, sha224, sha256, sha384, sha512)
    #[arg(short, long, default_value = "sha256")]
    md: String,

    /// Password
    #[arg(short = 'k', long)]
    pass: String,

    /// Salt in hex; zero-padded or truncated to 8 bytes. No salt is used if omitted
    #[arg(short = 'S', long, conflicts_with = "salted")]
    salt: Option<String>,

    /// Take the salt from base64 `openssl enc` output starting with `Salted__`
    #[arg(long)]
    salted: Option<String>,

    /// Cipher whose key and IV sizes are used
    #[arg(short, long, default_value = "aes-256-cbc")]
    cipher: String,

    /// Key size in bytes, overriding the cipher's
    #[arg(long)]
    key_size: Option<usize>,

    /// IV size in bytes, overriding the cipher's
    #[arg(long)]
    iv_size: Option<usize>,

    /// Log derivation rounds to stderr; repeat for more detail
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let result = run(&cli);
    match &result {
        Ok(lines) => lines.iter().for_each(|line| println!("{line}")),
        Err(e) => eprintln!("error: {e}"),
    }
    ExitCode::from(exit_status(&result))
}

fn exit_status<T>(result: &Result<T>) -> u8 {
    match result {
        Ok(_) => 0,
        Err(_) => 1,
    }
}

/// Derives the key and IV, returning the lines `openssl enc -P` would print.
fn run(cli: &Cli) -> Result<Vec<String>> {
    let md = DigestAlgorithm::parse(&cli.md)?;

    let salt = match (&cli.salt, &cli.salted) {
        (Some(hex), _) => Some(salt_from_hex(hex)?),
        (None, Some(base64)) => Some(SaltedData::parse(base64)?.salt),
        (None, None) => None,
    };

    let deriver = match (cli.key_size, cli.iv_size) {
        (Some(key_size), Some(iv_size)) => KeyIvDeriver::new(md, key_size, iv_size)?,
        (key_size, iv_size) => {
            let sizes = evpkdf_rs::cipher_sizes(&cli.cipher)?;
            KeyIvDeriver::new(md, key_size.unwrap_or(sizes.key_size), iv_size.unwrap_or(sizes.iv_size))?
        }
    };
    tracing::debug!(md = %md, rounds = deriver.rounds(), "deriving");

    let salt_bytes: &[u8] = match &salt {
        Some(salt) => salt,
        None => &[],
    };
    let key_iv = deriver.derive_with_trace(&cli.pass, salt_bytes, |round| {
        tracing::info!(round = round.index, accumulated = round.accumulated, "round");
    });

    let mut lines = Vec::with_capacity(3);
    if let Some(salt) = salt {
        lines.push(format!("salt={}", hex::encode_upper(salt)));
    }
    lines.push(format!("key={}", key_iv.key_hex()));
    if deriver.iv_size() > 0 {
        lines.push(format!("iv ={}", key_iv.iv_hex()));
    }
    Ok(lines)
}

fn setup_logging(verbose: u8) {
    use tracing_subscriber::filter::LevelFilter;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let level = match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };

    let fmt_layer = tracing_subscriber::fmt::layer().compact().with_writer(std::io::stderr);

    let env_filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    // Only fails if a subscriber is already installed.
    let _ = tracing_subscriber::registry().with(fmt_layer).with(env_filter).try_init();
}

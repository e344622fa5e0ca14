//! Command `clef` — vaultless password and key manager.
//!
//! The binary is a thin collaborator around `clef-core`: it resolves the
//! master password, loads and windows the optional seed file, and routes
//! the derived output to stdout or a file. All cryptographic behavior
//! lives in the core crate.

use std::error::Error;
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use clef_core::{
    encode_pem, generate_encrypted_seed, get_key, get_pass, get_raw, KeyType, PasswordSpec,
    SEED_LEN,
};
use zeroize::{Zeroize, Zeroizing};

/// Bytes emitted for `-t raw`.
const RAW_OUTPUT_LEN: usize = 32;

#[derive(Parser)]
#[command(name = "clef", version, about = "Vaultless password and key manager")]
struct Cli {
    /// Master password (prompted on stdin when neither -p nor -P is given).
    #[arg(short = 'p', long = "password")]
    password: Option<String>,

    /// File containing the master password; surrounding whitespace is trimmed.
    #[arg(short = 'P', long = "password-file", conflicts_with = "password")]
    password_file: Option<PathBuf>,

    /// Output type: pass, seed, raw, ec256, ec384, ec521, rsa2048, rsa4096,
    /// x25519, ed25519.
    #[arg(short = 't', long = "type", default_value = "pass")]
    output_type: String,

    /// Master seed file (optional).
    #[arg(short = 's', long = "seed")]
    seed_path: Option<PathBuf>,

    /// Number of leading bytes to skip in the master seed file.
    #[arg(long = "skip", default_value_t = 0)]
    seed_skip: usize,

    /// Password/key realm — most probably the purpose of the password/key.
    #[arg(short = 'r', long = "realm")]
    realm: Option<String>,

    /// Output path (stdout when omitted; created with mode 0600).
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// UNSAFE: allow key and raw generation without a seed.
    #[arg(short = 'u', long = "unsafe")]
    allow_unsafe: bool,
}

fn main() -> ExitCode {
    match run(&Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("clef: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), Box<dyn Error>> {
    let password = resolve_password(cli)?;
    let mut out = open_output(cli.output.as_deref())?;

    if cli.output_type == "seed" {
        let seed = generate_encrypted_seed(&password)?;
        out.write_all(&seed)?;
        out.flush()?;
        return Ok(());
    }

    let realm = cli
        .realm
        .as_deref()
        .ok_or("no realm provided (use -r)")?;

    let seed = match &cli.seed_path {
        Some(path) => Some(load_seed(path, cli.seed_skip)?),
        None => None,
    };
    let seed = seed.as_deref();

    match cli.output_type.as_str() {
        "pass" => {
            let password_out = get_pass(&password, realm, seed, &PasswordSpec::default())?;
            out.write_all(password_out.as_bytes())?;
            out.write_all(b"\n")?;
        }
        "raw" => {
            let mut rng = get_raw(&password, realm, seed, cli.allow_unsafe)?;
            let mut buf = [0u8; RAW_OUTPUT_LEN];
            rng.read_exact(&mut buf)?;
            out.write_all(&buf)?;
        }
        name => {
            let kt = KeyType::from_name(name)
                .map_err(|_| format!("unknown output type: {name}"))?;
            let key = get_key(&password, realm, seed, kt, cli.allow_unsafe)?;
            encode_pem(&key, &mut out)?;
        }
    }

    out.flush()?;
    Ok(())
}

/// Resolve the master password from the flags, falling back to an
/// interactive no-echo prompt with confirmation (confirmation is skipped
/// when a seed file is in use — the seed already authenticates typos).
///
/// The password stays in a [`Zeroizing`] buffer for its whole lifetime.
fn resolve_password(cli: &Cli) -> Result<Zeroizing<String>, Box<dyn Error>> {
    if let Some(password) = &cli.password {
        if !password.is_empty() {
            return Ok(Zeroizing::new(password.clone()));
        }
    }

    if let Some(path) = &cli.password_file {
        let mut content = fs::read_to_string(path)?;
        let trimmed = content.trim();
        if trimmed.is_empty() {
            return Err(format!("password file {} is empty", path.display()).into());
        }
        let password = Zeroizing::new(trimmed.to_owned());
        content.zeroize();
        return Ok(password);
    }

    loop {
        let first = prompt_secret("Master password: ")?;
        if first.is_empty() {
            continue;
        }
        if cli.seed_path.is_some() {
            return Ok(first);
        }

        let second = prompt_secret("Master password again: ")?;
        if *first == *second {
            return Ok(first);
        }
        eprintln!("Passwords do not match. Try again.");
    }
}

/// Prompt on stderr and read one line from the terminal with echo disabled.
fn prompt_secret(prompt: &str) -> Result<Zeroizing<String>, Box<dyn Error>> {
    eprint!("{prompt}");
    io::stderr().flush()?;
    Ok(Zeroizing::new(rpassword::read_password()?))
}

/// Read a seed file and select the 256-byte window starting at `skip`.
fn load_seed(path: &Path, skip: usize) -> Result<Vec<u8>, Box<dyn Error>> {
    let data = fs::read(path)?;
    Ok(seed_window(&data, skip)?.to_vec())
}

/// The derivation core requires exactly 256 seed bytes; a bad window is
/// caught here rather than surfacing as a confusing unwrap failure.
fn seed_window(data: &[u8], skip: usize) -> Result<&[u8], String> {
    if skip >= data.len() {
        return Err(format!(
            "invalid skip {skip}: seed file holds only {} bytes",
            data.len()
        ));
    }
    let window = &data[skip..];
    if window.len() != SEED_LEN {
        return Err(format!(
            "seed window is {} bytes after skipping {skip} (expected {SEED_LEN})",
            window.len()
        ));
    }
    Ok(window)
}

fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>, Box<dyn Error>> {
    match path {
        None => Ok(Box::new(io::stdout())),
        Some(path) => {
            let mut options = fs::OpenOptions::new();
            options.write(true).create(true).truncate(true);
            #[cfg(unix)]
            {
                use std::os::unix::fs::OpenOptionsExt;
                options.mode(0o600);
            }
            Ok(Box::new(options.open(path)?))
        }
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

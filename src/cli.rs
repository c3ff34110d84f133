//! CLI commands and argument parsing.

use std::io::Write as _;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};

use crate::kdf::argon2;
use crate::krypton::kem;
use crate::pqa::common::{AlgorithmSpec, KeyKind, armor_key, dearmor_key};
use crate::pqa::dss::{self, Dss, Falcon512, Falcon1024, FastSphincs, MlDsa44, MlDsa65, MlDsa87, SmallSphincs};
use crate::pqa::kem::{Kem, MlKem512, MlKem768, MlKem1024};

/// A post-quantum file encryption and signing toolkit.
#[derive(Parser)]
#[command(name = "krypton-pqc")]
#[command(version = "1.0")]
#[command(about = "Encrypt and sign files with post-quantum KEMs and signature schemes.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Generate a KEM or DSS keypair, writing armored public/secret key files.
    Keygen {
        #[arg(value_enum, long)]
        kem: Option<KemAlgo>,

        #[arg(value_enum, long)]
        dss: Option<DssAlgo>,

        /// Output path stem; keys are written to `<stem>.pub` and `<stem>.sec`.
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Encrypt a file to a recipient's KEM public key.
    Encrypt {
        #[arg(value_enum, long, default_value = "ml-kem-768")]
        kem: KemAlgo,

        /// Input file path.
        #[arg(short, long)]
        input: PathBuf,

        /// Output file path (defaults to `<input>.kptn`).
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Path to the recipient's armored public key.
        #[arg(long)]
        public_key: PathBuf,
    },

    /// Decrypt a Krypton file with a KEM secret key.
    Decrypt {
        #[arg(value_enum, long, default_value = "ml-kem-768")]
        kem: KemAlgo,

        /// Input file path.
        #[arg(short, long)]
        input: PathBuf,

        /// Directory the recovered file is written into.
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,

        /// Path to the recipient's armored secret key.
        #[arg(long)]
        secret_key: PathBuf,
    },

    /// Sign a file with a DSS secret key.
    Sign {
        #[arg(value_enum, long, default_value = "ml-dsa-65")]
        dss: DssAlgo,

        /// Input file path.
        #[arg(short, long)]
        input: PathBuf,

        /// Output signature path (defaults to `<input>.sig`).
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Path to the signer's armored secret key.
        #[arg(long)]
        secret_key: PathBuf,
    },

    /// Verify a file's signature with a DSS public key.
    Verify {
        #[arg(value_enum, long, default_value = "ml-dsa-65")]
        dss: DssAlgo,

        /// Input file path.
        #[arg(short, long)]
        input: PathBuf,

        /// Signature file path.
        #[arg(long)]
        signature: PathBuf,

        /// Path to the signer's armored public key.
        #[arg(long)]
        public_key: PathBuf,
    },

    /// Hash a password for storage, enforcing the crack-resistance gate.
    HashPassword {
        /// Password to hash (prompted on stdin if not provided).
        #[arg(short, long)]
        password: Option<String>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
pub enum KemAlgo {
    #[value(name = "ml-kem-512")]
    MlKem512,
    #[value(name = "ml-kem-768")]
    MlKem768,
    #[value(name = "ml-kem-1024")]
    MlKem1024,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum DssAlgo {
    #[value(name = "ml-dsa-44")]
    MlDsa44,
    #[value(name = "ml-dsa-65")]
    MlDsa65,
    #[value(name = "ml-dsa-87")]
    MlDsa87,
    #[value(name = "falcon-512")]
    Falcon512,
    #[value(name = "falcon-1024")]
    Falcon1024,
    #[value(name = "sphincs-fast")]
    FastSphincs,
    #[value(name = "sphincs-small")]
    SmallSphincs,
}

/// Parses CLI arguments.
#[must_use]
pub fn parse() -> Cli {
    Cli::parse()
}

/// Runs a CLI command.
pub fn run_command(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Keygen { kem, dss, output } => keygen(kem, dss, &output),
        Commands::Encrypt { kem, input, output, public_key } => encrypt_file(kem, &input, output, &public_key),
        Commands::Decrypt { kem, input, output_dir, secret_key } => decrypt_file(kem, &input, &output_dir, &secret_key),
        Commands::Sign { dss, input, output, secret_key } => sign_file(dss, &input, output, &secret_key),
        Commands::Verify { dss, input, signature, public_key } => verify_file(dss, &input, &signature, &public_key),
        Commands::HashPassword { password } => hash_password(password),
    }
}

fn keygen(kem: Option<KemAlgo>, dss: Option<DssAlgo>, output: &std::path::Path) -> Result<()> {
    let (algo_name, spec, pk, sk) = match (kem, dss) {
        (Some(kem), None) => {
            let (pk, sk) = match kem {
                KemAlgo::MlKem512 => MlKem512::keypair(),
                KemAlgo::MlKem768 => MlKem768::keypair(),
                KemAlgo::MlKem1024 => MlKem1024::keypair(),
            };
            (kem_name(kem), kem_spec(kem), pk, sk)
        }
        (None, Some(dss)) => {
            let (pk, sk) = match dss {
                DssAlgo::MlDsa44 => MlDsa44::keypair(),
                DssAlgo::MlDsa65 => MlDsa65::keypair(),
                DssAlgo::MlDsa87 => MlDsa87::keypair(),
                DssAlgo::Falcon512 => Falcon512::keypair(),
                DssAlgo::Falcon1024 => Falcon1024::keypair(),
                DssAlgo::FastSphincs => FastSphincs::keypair(),
                DssAlgo::SmallSphincs => SmallSphincs::keypair(),
            };
            (dss_name(dss), dss_spec(dss), pk, sk)
        }
        (Some(_), Some(_)) => anyhow::bail!("pass exactly one of --kem or --dss, not both"),
        (None, None) => anyhow::bail!("pass exactly one of --kem or --dss"),
    };

    let pub_path = output.with_extension("pub");
    let sec_path = output.with_extension("sec");
    std::fs::write(&pub_path, armor_key(&spec, KeyKind::Public, &pk)?)?;
    std::fs::write(&sec_path, armor_key(&spec, KeyKind::Secret, &sk)?)?;

    println!("✓ Generated {algo_name} keypair: {} {}", pub_path.display(), sec_path.display());
    Ok(())
}

fn kem_name(kem: KemAlgo) -> &'static str {
    match kem {
        KemAlgo::MlKem512 => MlKem512::NAME,
        KemAlgo::MlKem768 => MlKem768::NAME,
        KemAlgo::MlKem1024 => MlKem1024::NAME,
    }
}

fn kem_spec(kem: KemAlgo) -> AlgorithmSpec {
    match kem {
        KemAlgo::MlKem512 => MlKem512::spec(),
        KemAlgo::MlKem768 => MlKem768::spec(),
        KemAlgo::MlKem1024 => MlKem1024::spec(),
    }
}

fn dss_name(dss: DssAlgo) -> &'static str {
    match dss {
        DssAlgo::MlDsa44 => MlDsa44::NAME,
        DssAlgo::MlDsa65 => MlDsa65::NAME,
        DssAlgo::MlDsa87 => MlDsa87::NAME,
        DssAlgo::Falcon512 => Falcon512::NAME,
        DssAlgo::Falcon1024 => Falcon1024::NAME,
        DssAlgo::FastSphincs => FastSphincs::NAME,
        DssAlgo::SmallSphincs => SmallSphincs::NAME,
    }
}

fn dss_spec(dss: DssAlgo) -> AlgorithmSpec {
    match dss {
        DssAlgo::MlDsa44 => MlDsa44::spec(),
        DssAlgo::MlDsa65 => MlDsa65::spec(),
        DssAlgo::MlDsa87 => MlDsa87::spec(),
        DssAlgo::Falcon512 => Falcon512::spec(),
        DssAlgo::Falcon1024 => Falcon1024::spec(),
        DssAlgo::FastSphincs => FastSphincs::spec(),
        DssAlgo::SmallSphincs => SmallSphincs::spec(),
    }
}

fn read_armored_key(path: &std::path::Path, spec: &AlgorithmSpec, kind: KeyKind) -> Result<Vec<u8>> {
    let text = std::fs::read_to_string(path).with_context(|| format!("reading key file {}", path.display()))?;
    Ok(dearmor_key(spec, kind, &text)?)
}

fn encrypt_file(kem: KemAlgo, input: &std::path::Path, output: Option<PathBuf>, public_key: &std::path::Path) -> Result<()> {
    let pk = read_armored_key(public_key, &kem_spec(kem), KeyKind::Public)?;
    let output = output.unwrap_or_else(|| kem::default_output_path(input));

    macro_rules! run {
        ($ty:ty) => {
            kem::encrypt::<$ty>(input, &output, &pk, None, None, |n| tracing::debug!(bytes = n, "encrypted"))
        };
    }
    match kem {
        KemAlgo::MlKem512 => run!(MlKem512),
        KemAlgo::MlKem768 => run!(MlKem768),
        KemAlgo::MlKem1024 => run!(MlKem1024),
    }
    .with_context(|| format!("encryption failed for {}", input.display()))?;

    println!("✓ Encrypted: {} -> {}", input.display(), output.display());
    Ok(())
}

fn decrypt_file(kem: KemAlgo, input: &std::path::Path, output_dir: &std::path::Path, secret_key: &std::path::Path) -> Result<()> {
    let sk = read_armored_key(secret_key, &kem_spec(kem), KeyKind::Secret)?;

    macro_rules! run {
        ($ty:ty) => {
            kem::decrypt::<$ty>(input, output_dir, &sk, None, |n| tracing::debug!(bytes = n, "decrypted"))
        };
    }
    let recovered = match kem {
        KemAlgo::MlKem512 => run!(MlKem512),
        KemAlgo::MlKem768 => run!(MlKem768),
        KemAlgo::MlKem1024 => run!(MlKem1024),
    }
    .with_context(|| format!("decryption failed for {}", input.display()))?;

    println!("✓ Decrypted: {} -> {}", input.display(), recovered.display());
    Ok(())
}

fn sign_file(dss: DssAlgo, input: &std::path::Path, output: Option<PathBuf>, secret_key: &std::path::Path) -> Result<()> {
    let sk = read_armored_key(secret_key, &dss_spec(dss), KeyKind::Secret)?;
    let output = output.unwrap_or_else(|| input.with_extension("sig"));

    macro_rules! run {
        ($ty:ty) => {
            dss::sign_file::<$ty>(input, &sk)
        };
    }
    let signature = match dss {
        DssAlgo::MlDsa44 => run!(MlDsa44),
        DssAlgo::MlDsa65 => run!(MlDsa65),
        DssAlgo::MlDsa87 => run!(MlDsa87),
        DssAlgo::Falcon512 => run!(Falcon512),
        DssAlgo::Falcon1024 => run!(Falcon1024),
        DssAlgo::FastSphincs => run!(FastSphincs),
        DssAlgo::SmallSphincs => run!(SmallSphincs),
    }
    .with_context(|| format!("signing failed for {}", input.display()))?;

    std::fs::write(&output, signature)?;
    println!("✓ Signed: {} -> {}", input.display(), output.display());
    Ok(())
}

fn verify_file(dss: DssAlgo, input: &std::path::Path, signature: &std::path::Path, public_key: &std::path::Path) -> Result<()> {
    let pk = read_armored_key(public_key, &dss_spec(dss), KeyKind::Public)?;
    let armored_sig = std::fs::read_to_string(signature)?;

    macro_rules! run {
        ($ty:ty) => {
            dss::verify_file::<$ty>(input, &pk, &armored_sig)
        };
    }
    let valid = match dss {
        DssAlgo::MlDsa44 => run!(MlDsa44),
        DssAlgo::MlDsa65 => run!(MlDsa65),
        DssAlgo::MlDsa87 => run!(MlDsa87),
        DssAlgo::Falcon512 => run!(Falcon512),
        DssAlgo::Falcon1024 => run!(Falcon1024),
        DssAlgo::FastSphincs => run!(FastSphincs),
        DssAlgo::SmallSphincs => run!(SmallSphincs),
    }
    .with_context(|| format!("verification failed for {}", input.display()))?;

    if valid {
        println!("✓ Signature is valid");
        Ok(())
    } else {
        anyhow::bail!("signature is invalid");
    }
}

fn hash_password(password: Option<String>) -> Result<()> {
    let password = match password {
        Some(p) => p,
        None => {
            print!("Password: ");
            std::io::stdout().flush()?;
            let mut line = String::new();
            std::io::stdin().read_line(&mut line)?;
            line.trim_end_matches(['\n', '\r']).to_owned()
        }
    };
    let result = argon2::hash(password.as_bytes(), None)?;
    println!("{}", result.public_hash);
    Ok(())
}

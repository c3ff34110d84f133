// Krypton - a post-quantum file encryption and signing toolkit
//
// Key encapsulation: ML-KEM-512/768/1024
// Signatures: ML-DSA-44/65/87, Falcon-512/1024, SPHINCS+-SHAKE-256f/256s-simple
// Key derivation: KKDF (KMAC256) and Argon2id

mod allocator;

use std::process;

use krypton_pqc::cli;

/// Entry point for the Krypton CLI.
///
/// # Exit Codes
/// * 0 - Success
/// * 1 - Error (message printed to stderr)
fn main() {
    let subscriber = tracing_subscriber::fmt().with_file(true).with_line_number(true).finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("Error: a tracing subscriber was already installed");
        process::exit(1);
    }

    if let Err(e) = cli::run_command(cli::parse().command) {
        eprintln!("Error: {e:?}");
        process::exit(1);
    }
}

//! Create entries, sign, persist and restore them
//! Run with: RUST_LOG=debug cargo run --example entry_demo

use anyhow::{Context, Result};
use hdkeyring_core::verify_signature;
use hdkeyring_entries::{
    deserialize_entry, ChainId, DerivationPath, Ed25519HdEntry, KeyringEntry, PrehashType,
    Slip10Curve, Slip10Entry,
};

fn main() -> Result<()> {
    env_logger::init();

    let chain = ChainId::new("demo-chain");

    // Fixed-curve entry: identities at m/0', m/1', ...
    let hd = Ed25519HdEntry::generate(12)?;
    let alice = hd.create_identity()?;
    hd.set_identity_label(&alice, Some("alice".into()))?;
    let bob = hd.create_identity()?;
    println!("=== {} ===", hd.kind());
    for identity in hd.identities() {
        println!(
            "{:<8} {}",
            identity.label().unwrap_or("-"),
            hex::encode(identity.public_key())
        );
    }

    let signature = hd.create_transaction_signature(&bob, b"hello", &chain)?;
    println!("signature: {}\n", hex::encode(&signature));

    // Configurable-curve entry on secp256k1
    let btc = Slip10Entry::generate_with_curve(Slip10Curve::Secp256k1, 24)?;
    btc.label()
        .subscribe(|label| println!("entry label -> {:?}", label));
    btc.set_label(Some("bitcoin".into()));

    let path: DerivationPath = "m/44'/0'/0'/0/0".parse().context("parsing derivation path")?;
    let account = btc.create_identity_with_path(&path)?;
    println!("=== {} ===", btc.kind());
    println!("{} {}", path, hex::encode(account.public_key()));

    // Persist both entries with their kind tags and bring them back
    let stored = [
        (hd.kind(), hd.serialize()?),
        (btc.kind(), btc.serialize()?),
    ];
    for (kind, json) in &stored {
        let restored = deserialize_entry(*kind, json)
            .with_context(|| format!("restoring {} entry", kind))?;
        println!("restored {} with {} identities", kind, restored.identities().len());
    }

    let restored = deserialize_entry(stored[1].0, &stored[1].1)?;
    let signature =
        restored.create_transaction_signature(&account, b"hello", PrehashType::Sha256, &chain)?;
    anyhow::ensure!(
        verify_signature(
            account.algorithm(),
            account.public_key(),
            &PrehashType::Sha256.apply(b"hello"),
            &signature,
        ),
        "restored entry produced an invalid signature"
    );
    println!("\nrestored secp256k1 signature verifies");

    Ok(())
}

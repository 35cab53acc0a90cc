//! # Invoke and Query Subcommands
//!
//! Both take a function name and positional arguments, exactly as the
//! workflow's dispatch surface expects them.
//!
//! With `--key`, the call is signed: the payload is
//! [`call_payload`] of the function and arguments, the binding a fresh
//! UUID, and the signature covers `payload ‖ binding`. The workflow refuses
//! a signed call whose payload names a different call, and a signed invoke
//! whose binding it has already seen. Without a key the caller is
//! anonymous, which only passes when access control is off.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use tradeflow_workflow::{call_payload, CallerProof, TradeWorkflow};

use crate::keys::load_key;

/// Arguments shared by `tradeflow invoke` and `tradeflow query`.
#[derive(Args, Debug)]
pub struct CallArgs {
    /// Function name, e.g. `initTrade` or `listContracts`.
    pub function: String,
    /// Positional arguments. `@path` reads the argument from a file.
    pub args: Vec<String>,
    /// Private key file to sign the call with.
    #[arg(long)]
    pub key: Option<PathBuf>,
}

/// Expand `@path` arguments into file contents.
pub fn resolve_args(raw: &[String]) -> Result<Vec<Vec<u8>>> {
    raw.iter()
        .map(|arg| match arg.strip_prefix('@') {
            Some(path) => std::fs::read(path)
                .with_context(|| format!("failed to read argument file: {path}")),
            None => Ok(arg.as_bytes().to_vec()),
        })
        .collect()
}

/// Build the caller proof for a call, signing it if a key is given.
pub fn caller_proof(
    function: &str,
    args: &[Vec<u8>],
    key: Option<&Path>,
) -> Result<CallerProof> {
    let Some(key) = key else {
        return Ok(CallerProof::anonymous());
    };
    let kp = load_key(key)?;
    let payload = call_payload(function, args).context("failed to encode signed payload")?;
    let binding = uuid::Uuid::new_v4().to_string().into_bytes();
    let mut proof = CallerProof::new(Vec::<u8>::new(), payload, binding);
    proof.signature = kp.sign(&proof.message()).to_hex().into_bytes();
    tracing::debug!(function, signer = %kp.public_key(), "signed call");
    Ok(proof)
}

pub fn run_invoke(workflow: &TradeWorkflow, args: &CallArgs) -> Result<u8> {
    let values = resolve_args(&args.args)?;
    let proof = caller_proof(&args.function, &values, args.key.as_deref())?;
    workflow
        .invoke(&args.function, &values, &proof)
        .with_context(|| format!("{} failed", args.function))?;
    println!("OK: {}", args.function);
    Ok(0)
}

pub fn run_query(workflow: &TradeWorkflow, args: &CallArgs) -> Result<u8> {
    let values = resolve_args(&args.args)?;
    let proof = caller_proof(&args.function, &values, args.key.as_deref())?;
    let reply = workflow
        .query(&args.function, &values, &proof)
        .with_context(|| format!("{} failed", args.function))?;
    if let Some(bytes) = reply {
        println!("{}", String::from_utf8_lossy(&bytes));
    }
    Ok(0)
}

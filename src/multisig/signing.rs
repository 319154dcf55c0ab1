//! Transaction signing and signature aggregation
//!
//! Every operation takes the transaction by reference and returns an
//! updated copy; a failed call leaves the caller's value untouched.

use log::{debug, info};

use super::MultisigError;
use crate::core::{Sig, Transaction, TX_MAX_SIG_SIZE};
use crate::crypto::keys::{sort_public_keys, Signer};

/// Append a single-key signature entry signed by `signer`
pub fn add_sign(tx: &Transaction, signer: &dyn Signer) -> Result<Transaction, MultisigError> {
    if tx.sigs.len() >= TX_MAX_SIG_SIZE {
        return Err(MultisigError::TooManySignatures(format!(
            "transaction already carries {} signature entries",
            tx.sigs.len()
        )));
    }

    let signature = signer.sign(&tx.signing_digest())?;
    let sig = Sig::new(1, vec![signer.public_key()], vec![signature])?;

    let mut sigs = tx.sigs.clone();
    sigs.push(sig);
    Ok(tx.with_sigs(sigs))
}

/// Contribute one signature to the `m`-of-`public_keys` group of `tx`
///
/// The group is identified by its canonically sorted key set, so signers
/// may contribute in any order. A missing group is created.
pub fn add_multi_sign(
    tx: &Transaction,
    m: usize,
    public_keys: &[Vec<u8>],
    signature: Vec<u8>,
) -> Result<Transaction, MultisigError> {
    let sorted = sort_public_keys(public_keys)?;
    let mut sigs = tx.sigs.clone();

    match sigs.iter().position(|s| s.public_keys() == sorted.as_slice()) {
        Some(index) => {
            let existing = &sigs[index];
            if existing.sig_data().len() + 1 > sorted.len() {
                return Err(MultisigError::TooManySignatures(format!(
                    "group of {} keys already holds {} signatures",
                    sorted.len(),
                    existing.sig_data().len()
                )));
            }
            if existing.m() != m {
                return Err(MultisigError::ThresholdMismatch {
                    existing: existing.m(),
                    requested: m,
                });
            }
            let updated = existing.with_signature(signature);
            debug!(
                "Appended signature to {}-of-{} group ({} collected)",
                m,
                sorted.len(),
                updated.sig_data().len()
            );
            sigs[index] = updated;
        }
        None => {
            if sigs.len() >= TX_MAX_SIG_SIZE {
                return Err(MultisigError::TooManySignatures(format!(
                    "transaction already carries {} signature entries",
                    sigs.len()
                )));
            }
            debug!("Created {}-of-{} signature group", m, sorted.len());
            sigs.push(Sig::new(m, sorted, vec![signature])?);
        }
    }

    Ok(tx.with_sigs(sigs))
}

/// Replace all signatures: each group signs with M equal to its size
pub fn sign_transaction(
    tx: &Transaction,
    groups: &[Vec<&dyn Signer>],
) -> Result<Transaction, MultisigError> {
    let ms: Vec<usize> = groups.iter().map(Vec::len).collect();
    sign_transaction_with_m(tx, groups, &ms)
}

/// Replace all signatures: group `i` becomes an `ms[i]`-of-N entry
pub fn sign_transaction_with_m(
    tx: &Transaction,
    groups: &[Vec<&dyn Signer>],
    ms: &[usize],
) -> Result<Transaction, MultisigError> {
    if groups.len() > TX_MAX_SIG_SIZE {
        return Err(MultisigError::TooManySignatures(format!(
            "{} signer groups exceed the limit of {}",
            groups.len(),
            TX_MAX_SIG_SIZE
        )));
    }
    if groups.len() != ms.len() {
        return Err(MultisigError::InvalidThreshold(format!(
            "{} thresholds given for {} signer groups",
            ms.len(),
            groups.len()
        )));
    }

    let digest = tx.signing_digest();
    let mut sigs = Vec::with_capacity(groups.len());
    for (group, &m) in groups.iter().zip(ms) {
        if m == 0 || m > group.len() {
            return Err(MultisigError::InvalidThreshold(format!(
                "M = {} for a group of {} signers",
                m,
                group.len()
            )));
        }
        let public_keys = group.iter().map(|s| s.public_key()).collect();
        let signatures = group
            .iter()
            .map(|s| s.sign(&digest))
            .collect::<Result<Vec<_>, _>>()?;
        sigs.push(Sig::new(m, public_keys, signatures)?);
    }

    info!("Signed transaction {} with {} signature entries", tx.hash(), sigs.len());
    Ok(tx.with_sigs(sigs))
}

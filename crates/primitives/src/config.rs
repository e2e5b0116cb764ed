//! Wallet configurations and their image hashes.

use alloy_primitives::{Address, B256, U256, keccak256};

use crate::topology::Topology;

/// A wallet configuration: the signer topology, the minimum aggregate
/// weight required at the root, and a monotonically increasing checkpoint
/// ordering configurations for a wallet. The optional checkpointer names an
/// external authority consulted for checkpoint freshness.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct WalletConfig {
    pub threshold: u64,
    pub checkpoint: u64,
    pub topology: Topology,
    pub checkpointer: Option<Address>,
}

impl WalletConfig {
    pub fn new(threshold: u64, checkpoint: u64, topology: Topology) -> Self {
        Self { threshold, checkpoint, topology, checkpointer: None }
    }

    /// Content-addressed identifier of this configuration.
    ///
    /// Commits to the topology root hash, threshold, checkpoint, and
    /// checkpointer in that order. A missing checkpointer hashes as the
    /// zero address, so "no checkpointer" and "zero checkpointer" are the
    /// same configuration.
    pub fn image_hash(&self) -> B256 {
        let h = hash_pair(self.topology.hash(), U256::from(self.threshold).into());
        let h = hash_pair(h, U256::from(self.checkpoint).into());
        hash_pair(h, address_word(self.checkpointer.unwrap_or(Address::ZERO)))
    }

    /// Whether the topology can reach the threshold at all, assuming every
    /// signer signs.
    pub fn is_satisfiable(&self) -> bool {
        self.topology.max_weight() >= self.threshold
    }
}

fn hash_pair(left: B256, right: B256) -> B256 {
    let mut buf = [0u8; 64];
    buf[..32].copy_from_slice(left.as_slice());
    buf[32..].copy_from_slice(right.as_slice());
    keccak256(buf)
}

fn address_word(address: Address) -> B256 {
    B256::from(U256::from_be_slice(address.as_slice()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> WalletConfig {
        WalletConfig::new(
            2,
            0,
            Topology::branch(
                Topology::signer(Address::random(), 1),
                Topology::signer(Address::random(), 1),
            ),
        )
    }

    #[test]
    fn image_hash_commits_to_every_field() {
        let base = config();
        assert_eq!(base.image_hash(), base.clone().image_hash());

        let mut threshold = base.clone();
        threshold.threshold = 3;
        assert_ne!(base.image_hash(), threshold.image_hash());

        let mut checkpoint = base.clone();
        checkpoint.checkpoint = 1;
        assert_ne!(base.image_hash(), checkpoint.image_hash());

        let mut checkpointer = base.clone();
        checkpointer.checkpointer = Some(Address::random());
        assert_ne!(base.image_hash(), checkpointer.image_hash());

        let mut topology = base.clone();
        topology.topology = Topology::signer(Address::random(), 1);
        assert_ne!(base.image_hash(), topology.image_hash());
    }

    #[test]
    fn missing_checkpointer_hashes_as_zero_address() {
        let base = config();
        let mut zeroed = base.clone();
        zeroed.checkpointer = Some(Address::ZERO);
        assert_eq!(base.image_hash(), zeroed.image_hash());
    }

    #[test]
    fn satisfiability_follows_max_weight() {
        let base = config();
        assert!(base.is_satisfiable());

        let mut heavy = base.clone();
        heavy.threshold = 3;
        assert!(!heavy.is_satisfiable());
    }
}

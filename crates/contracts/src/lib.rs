//! Contract bindings for the signer contracts Quill talks to.
//!
//! The recovery engine validates two families of contract-based signers:
//! ERC-1271 contracts, which answer "is this signature valid for this
//! digest", and sapient signers, which recover the image hash of the
//! configuration that produced a signature. Both are read-only calls.

use alloy_sol_types::sol;

pub use IERC1271::isValidSignatureCall;
pub use ISapientCompactSigner::recoverSapientSignatureCompactCall;
pub use ISapientSigner::recoverSapientSignatureCall;

sol! {
    /// ERC-1271 contract signature validation
    ///
    /// Contracts implementing this interface can act as weighted signers in
    /// a wallet topology. Validation succeeds iff the call returns the
    /// magic value.
    #[derive(Debug, PartialEq, Eq)]
    interface IERC1271 {
        /// Validate a signature over a digest
        ///
        /// @param hash The digest being authorized
        /// @param signature Opaque signature data, interpreted by the contract
        /// @return magicValue 0x1626ba7e if valid, any other value if invalid
        function isValidSignature(
            bytes32 hash,
            bytes calldata signature
        ) external view returns (bytes4 magicValue);
    }

    /// Sapient signer validation over the full payload
    ///
    /// A sapient signer is a contract whose validity depends on its own
    /// internal configuration. Instead of a boolean answer it returns the
    /// image hash it recovered from the signature, which the caller compares
    /// against the image hash committed in the wallet topology.
    #[derive(Debug, PartialEq, Eq)]
    interface ISapientSigner {
        /// Recover the configuration image hash that produced a signature
        ///
        /// @param payload The full payload being authorized
        /// @param signature Opaque signature data
        /// @return imageHash The recovered configuration image hash
        function recoverSapientSignature(
            bytes calldata payload,
            bytes calldata signature
        ) external view returns (bytes32 imageHash);
    }

    /// Sapient signer validation over the payload digest only
    #[derive(Debug, PartialEq, Eq)]
    interface ISapientCompactSigner {
        /// Recover the configuration image hash from a digest and signature
        ///
        /// @param digest The digest of the payload being authorized
        /// @param signature Opaque signature data
        /// @return imageHash The recovered configuration image hash
        function recoverSapientSignatureCompact(
            bytes32 digest,
            bytes calldata signature
        ) external view returns (bytes32 imageHash);
    }
}

/// ERC-1271 magic value for a valid signature
/// bytes4(keccak256("isValidSignature(bytes32,bytes)"))
pub const ERC1271_MAGIC_VALUE: [u8; 4] = [0x16, 0x26, 0xba, 0x7e];

//! Contract interfaces the client calls, encoded with `alloy-sol-types`.

use alloy_sol_types::{SolError, sol};

sol! {
    /// Username registry.
    interface IRegistry {
        function addressToUsername(address owner) external view returns (bytes32);
        function getDirectoryUrl(bytes32 username) external view returns (string);
        function register(bytes32 username, string directoryUrl) external;
        function modify(string directoryUrl) external;
    }

    interface IEnsRegistry {
        function resolver(bytes32 node) external view returns (address);
    }

    interface IEnsResolver {
        function name(bytes32 node) external view returns (string);
        function addr(bytes32 node) external view returns (address);
        function text(bytes32 node, string key) external view returns (string);
    }
}

/// Reason carried by an `Error(string)` revert payload.
pub fn revert_reason(data: &[u8]) -> Option<String> {
    alloy_sol_types::Revert::abi_decode(data)
        .ok()
        .map(|revert| revert.reason)
}

use crate::network::Network;
use crate::types::{ObjectId, SuiAddress};

/// Type tag of the collectible the pipeline looks for.
pub const ROOTLET_TYPE: &str =
    "0x8f74a7d632191e29956df3843404f22d27bd84d92cca1b1abde621d033098769::rootlet::Rootlet";

/// Address every unlocked Rootlet is transferred to.
pub const DESTINATION_ADDRESS: SuiAddress = SuiAddress::from_bytes([
    0x63, 0x00, 0x99, 0x73, 0xe9, 0xdb, 0x12, 0xb5, 0xbd, 0x99, 0xe0, 0x6b, 0x00, 0x11, 0x49, 0x59,
    0x4e, 0xac, 0x8b, 0xdd, 0x1e, 0x33, 0x78, 0x3f, 0xc6, 0x9c, 0x90, 0xb8, 0x52, 0x82, 0xd3, 0xcd,
]);

/// Owned-cap page size requested from the index.
pub const DEFAULT_PAGE_LIMIT: u32 = 50;

pub const EXPLORER_BASE_URL: &str = "https://explorer.sui.io";

/// How often the unlock graph is handed to the wallet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmissionPolicy {
    /// Submit after every iterated asset, matching or not. The borrow/return
    /// block is only added for the matching asset.
    #[default]
    PerIteratedAsset,
    /// Submit once after all assets have been visited.
    Once,
}

/// Settings fixed when the binary is built.
#[derive(Debug, Clone)]
pub struct DeploymentConfig {
    pub network: Network,
    pub fullnode_url: String,
    pub destination: SuiAddress,
    pub target_type: String,
    pub page_limit: u32,
    pub explorer_base_url: String,
    pub submission_policy: SubmissionPolicy,
}

impl DeploymentConfig {
    pub fn for_network(network: Network) -> Self {
        Self {
            network,
            fullnode_url: network.default_fullnode_url().to_string(),
            destination: DESTINATION_ADDRESS,
            target_type: ROOTLET_TYPE.to_string(),
            page_limit: DEFAULT_PAGE_LIMIT,
            explorer_base_url: EXPLORER_BASE_URL.to_string(),
            submission_policy: SubmissionPolicy::default(),
        }
    }

    /// Configuration selected at compile time: mainnet unless the `testnet`
    /// feature is enabled.
    pub fn for_build() -> Self {
        if cfg!(feature = "testnet") {
            Self::for_network(Network::Testnet)
        } else {
            Self::for_network(Network::Mainnet)
        }
    }

    /// Explorer page for an object, e.g. the transferred Rootlet.
    pub fn explorer_object_url(&self, id: &ObjectId) -> String {
        format!(
            "{}/objects/{}?network={}",
            self.explorer_base_url.trim_end_matches('/'),
            id,
            self.network.as_str()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn destination_constant_matches_hex() {
        assert_eq!(
            DESTINATION_ADDRESS.to_string(),
            "0x63009973e9db12b5bd99e06b001149594eac8bdd1e33783fc69c90b85282d3cd"
        );
    }

    #[test]
    fn explorer_link_carries_network_qualifier() {
        let config = DeploymentConfig::for_network(Network::Mainnet);
        assert_eq!(
            config.explorer_object_url(&ObjectId::from("0xA1")),
            "https://explorer.sui.io/objects/0xA1?network=mainnet"
        );

        let config = DeploymentConfig {
            explorer_base_url: "https://explorer.sui.io/".to_string(),
            ..DeploymentConfig::for_network(Network::Testnet)
        };
        assert_eq!(
            config.explorer_object_url(&ObjectId::from("0xA1")),
            "https://explorer.sui.io/objects/0xA1?network=testnet"
        );
    }

    #[test]
    fn build_defaults() {
        let config = DeploymentConfig::for_build();
        assert_eq!(config.page_limit, 50);
        assert_eq!(config.target_type, ROOTLET_TYPE);
        assert_eq!(config.submission_policy, SubmissionPolicy::PerIteratedAsset);
    }
}

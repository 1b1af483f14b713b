use serde::Deserialize;

use crate::error::{Error, Result};
use crate::types::ObjectId;

/// Network variants for Sui.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Mainnet,
    Testnet,
    Devnet,
    Localnet,
}

/// Transfer-policy rule packages published alongside the kiosk framework.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KioskRule {
    Royalty,
    KioskLock,
    PersonalKiosk,
    FloorPrice,
}

impl KioskRule {
    /// Name used by kiosk client libraries for the rule's package id.
    pub fn as_str(self) -> &'static str {
        match self {
            KioskRule::Royalty => "royaltyRulePackageId",
            KioskRule::KioskLock => "kioskLockRulePackageId",
            KioskRule::PersonalKiosk => "personalKioskRulePackageId",
            KioskRule::FloorPrice => "floorPriceRulePackageId",
        }
    }
}

const MAINNET_RULES_PACKAGE: &str =
    "0x434b5bd8f6a7b05fede0ff46c6e511d71ea326ed38056e3bcd681d2d7c2a7879";
const MAINNET_PERSONAL_KIOSK_PACKAGE: &str =
    "0x0cb4bcc0560340eb1a1b929cabe56b33fc6449820ec8c1980d69bb98b649b802";
const MAINNET_FLOOR_PRICE_PACKAGE: &str =
    "0x34cc6762780f4f6f153c924c0680cfe2a1fb4601e7d33cc28a92297b62de1e0e";
const TESTNET_RULES_PACKAGE: &str =
    "0xbd8fc1947cf119350184107a3087e2dc27efefa0dd82e25a1f699069fe81a585";
const TESTNET_PERSONAL_KIOSK_PACKAGE: &str =
    "0x06f6bdd3f2e2e759d8a4b9c252f379f7a05e72dfe4c0b9311cdac27b8eb791b1";

impl Network {
    pub fn is_mainnet(self) -> bool {
        matches!(self, Network::Mainnet)
    }

    pub fn default_fullnode_url(self) -> &'static str {
        match self {
            Network::Mainnet => "https://fullnode.mainnet.sui.io:443",
            Network::Testnet => "https://fullnode.testnet.sui.io:443",
            Network::Devnet => "https://fullnode.devnet.sui.io:443",
            Network::Localnet => "http://127.0.0.1:9000",
        }
    }

    /// Value of the explorer's `network` query parameter.
    pub fn as_str(self) -> &'static str {
        match self {
            Network::Mainnet => "mainnet",
            Network::Testnet => "testnet",
            Network::Devnet => "devnet",
            Network::Localnet => "local",
        }
    }

    /// Package id implementing `rule` on this network.
    pub fn rule_package_id(self, rule: KioskRule) -> Result<ObjectId> {
        let id = match (self, rule) {
            (Network::Mainnet, KioskRule::Royalty | KioskRule::KioskLock) => MAINNET_RULES_PACKAGE,
            (Network::Mainnet, KioskRule::PersonalKiosk) => MAINNET_PERSONAL_KIOSK_PACKAGE,
            (Network::Mainnet, KioskRule::FloorPrice) => MAINNET_FLOOR_PRICE_PACKAGE,
            (Network::Testnet, KioskRule::Royalty | KioskRule::KioskLock) => TESTNET_RULES_PACKAGE,
            (Network::Testnet, KioskRule::PersonalKiosk | KioskRule::FloorPrice) => {
                TESTNET_PERSONAL_KIOSK_PACKAGE
            }
            _ => {
                return Err(Error::UnknownRulePackage {
                    rule: rule.as_str(),
                    network: self.as_str(),
                });
            }
        };
        Ok(ObjectId::from(id))
    }
}

impl std::str::FromStr for Network {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mainnet" | "sui" => Ok(Network::Mainnet),
            "testnet" | "sui-testnet" => Ok(Network::Testnet),
            "devnet" | "sui-devnet" => Ok(Network::Devnet),
            "localnet" | "local" => Ok(Network::Localnet),
            _ => Err(format!("invalid network: {}", s)),
        }
    }
}

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Identity of an on-chain object as reported by the index.
///
/// Kept verbatim: identities are compared exactly as the index returns them,
/// so no normalization happens here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(String);

impl ObjectId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ObjectId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ObjectId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A 32-byte Sui account address, always rendered in the long `0x` + 64 hex form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SuiAddress([u8; 32]);

impl SuiAddress {
    pub const LENGTH: usize = 32;

    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl std::str::FromStr for SuiAddress {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);
        if digits.is_empty() || digits.len() > Self::LENGTH * 2 {
            return Err(Error::InvalidAddress(s.to_string()));
        }
        // Short forms like 0x2 are left-padded to the full width.
        let padded = format!("{digits:0>64}");
        let bytes = hex::decode(&padded).map_err(|e| Error::InvalidAddress(format!("{s}: {e}")))?;
        let bytes: [u8; 32] = bytes
            .try_into()
            .map_err(|_| Error::InvalidAddress(s.to_string()))?;
        Ok(Self(bytes))
    }
}

impl std::fmt::Display for SuiAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl Serialize for SuiAddress {
    fn serialize<S: serde::Serializer>(
        &self,
        serializer: S,
    ) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SuiAddress {
    fn deserialize<D: serde::Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A capability object granting control over exactly one kiosk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KioskOwnerCap {
    /// Id of the cap object the wallet holds (the `PersonalKioskCap` wrapper
    /// for personal kiosks).
    pub object_id: ObjectId,
    pub kiosk_id: ObjectId,
    pub is_personal: bool,
}

/// Listing metadata of a kiosk item. Passed through the pipeline unexamined.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KioskListing {
    /// Id of the listing dynamic field.
    pub listing_id: ObjectId,
    pub is_exclusive: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<u64>,
}

/// One item stored in a kiosk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KioskItem {
    pub object_id: ObjectId,
    #[serde(rename = "type")]
    pub item_type: String,
    pub kiosk_id: ObjectId,
    #[serde(default)]
    pub is_locked: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub listing: Option<KioskListing>,
    /// Object content, present when fetched with `with_objects`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

/// Full, unpaginated contents of one kiosk.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KioskContents {
    pub items: Vec<KioskItem>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchKioskOptions {
    pub with_objects: bool,
    pub with_listing_prices: bool,
}

impl FetchKioskOptions {
    /// What discovery asks for by default: item objects, no listing prices.
    pub fn scan() -> Self {
        Self {
            with_objects: true,
            with_listing_prices: false,
        }
    }

    pub fn with_listing_prices(mut self) -> Self {
        self.with_listing_prices = true;
        self
    }
}

/// A Rootlet found in a personal kiosk, with the two references needed to
/// borrow it out: the kiosk and the personal cap that controls it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchedAsset {
    pub id: ObjectId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub listing: Option<KioskListing>,
    pub kiosk_id: ObjectId,
    pub personal_kiosk_cap_id: ObjectId,
}

/// One page of a cursor-paginated index response.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub has_next_page: bool,
    pub next_cursor: Option<String>,
}

//! JSON shapes of the Sui fullnode RPC responses the backend consumes, and
//! their conversion into kiosk types.

use std::collections::{HashMap, HashSet};

use serde::Deserialize;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::types::{KioskContents, KioskItem, KioskListing, KioskOwnerCap, ObjectId};

pub(crate) const KIOSK_OWNER_CAP_TYPE: &str = "0x2::kiosk::KioskOwnerCap";

#[derive(Debug, Deserialize)]
pub(crate) struct RpcEnvelope<T> {
    pub result: Option<T>,
    pub error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RpcErrorObject {
    pub code: i64,
    pub message: String,
}

impl<T> RpcEnvelope<T> {
    pub fn into_result(self, method: &str) -> Result<T> {
        if let Some(e) = self.error {
            return Err(Error::RpcResponse {
                code: e.code,
                message: e.message,
            });
        }
        self.result.ok_or_else(|| {
            Error::Decode(format!("{method}: response has neither result nor error"))
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub next_cursor: Option<String>,
    #[serde(default)]
    pub has_next_page: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SuiObjectResponse {
    pub data: Option<SuiObjectData>,
    pub error: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SuiObjectData {
    pub object_id: String,
    #[serde(rename = "type")]
    pub object_type: Option<String>,
    pub content: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DynamicFieldInfo {
    pub name: DynamicFieldName,
    pub object_type: String,
    pub object_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct DynamicFieldName {
    #[serde(rename = "type")]
    pub name_type: String,
    pub value: Value,
}

fn content_fields(data: &SuiObjectData) -> Option<&Value> {
    data.content.as_ref().and_then(|c| c.get("fields"))
}

/// Convert an owned `KioskOwnerCap` or `PersonalKioskCap` object.
///
/// Anything that is not a plain `KioskOwnerCap` is treated as personal; its
/// kiosk id lives in the wrapped cap (`cap.fields.for`).
pub(crate) fn parse_owner_cap(obj: &SuiObjectResponse) -> Result<KioskOwnerCap> {
    let data = obj
        .data
        .as_ref()
        .ok_or_else(|| Error::Decode(format!("owned object without data: {:?}", obj.error)))?;
    let object_type = data
        .object_type
        .as_deref()
        .ok_or_else(|| Error::Decode(format!("{}: missing type", data.object_id)))?;
    let fields = content_fields(data)
        .ok_or_else(|| Error::Decode(format!("{}: missing content", data.object_id)))?;

    let is_personal = object_type != KIOSK_OWNER_CAP_TYPE;
    let kiosk_id = if is_personal {
        fields
            .get("cap")
            .and_then(|cap| cap.get("fields"))
            .and_then(|f| f.get("for"))
    } else {
        fields.get("for")
    }
    .and_then(Value::as_str)
    .ok_or_else(|| Error::Decode(format!("{}: missing kiosk id", data.object_id)))?;

    Ok(KioskOwnerCap {
        object_id: ObjectId::from(data.object_id.as_str()),
        kiosk_id: ObjectId::from(kiosk_id),
        is_personal,
    })
}

/// Fold a kiosk's dynamic fields into its item list, attaching listing and
/// lock markers to the items they refer to.
pub(crate) fn classify_kiosk_fields(
    kiosk_id: &ObjectId,
    fields: &[DynamicFieldInfo],
) -> KioskContents {
    let mut items = Vec::new();
    let mut listings: HashMap<String, KioskListing> = HashMap::new();
    let mut locks: HashSet<String> = HashSet::new();

    for field in fields {
        let Some(id) = field.name.value.get("id").and_then(Value::as_str) else {
            log::warn!(
                "kiosk {kiosk_id}: skipping dynamic field {} without an id",
                field.object_id
            );
            continue;
        };
        let key_type = field.name.name_type.as_str();
        if key_type.ends_with("::kiosk::Item") {
            items.push((id.to_string(), field.object_type.clone()));
        } else if key_type.ends_with("::kiosk::Listing") {
            let is_exclusive = field
                .name
                .value
                .get("is_exclusive")
                .and_then(Value::as_bool)
                .unwrap_or(false);
            listings.insert(
                id.to_string(),
                KioskListing {
                    listing_id: ObjectId::from(field.object_id.as_str()),
                    is_exclusive,
                    price: None,
                },
            );
        } else if key_type.ends_with("::kiosk::Lock") {
            locks.insert(id.to_string());
        }
    }

    let items = items
        .into_iter()
        .map(|(id, item_type)| KioskItem {
            is_locked: locks.contains(&id),
            listing: listings.remove(&id),
            object_id: ObjectId::from(id),
            item_type,
            kiosk_id: kiosk_id.clone(),
            data: None,
        })
        .collect();

    KioskContents { items }
}

/// Price stored in a listing's dynamic field object (`Field<Listing, u64>`).
pub(crate) fn parse_listing_price(data: &SuiObjectData) -> Option<u64> {
    match content_fields(data)?.get("value")? {
        Value::String(s) => s.parse().ok(),
        Value::Number(n) => n.as_u64(),
        _ => None,
    }
}

pub(crate) fn item_ids(contents: &KioskContents) -> Vec<String> {
    contents
        .items
        .iter()
        .map(|item| item.object_id.to_string())
        .collect()
}

/// Hand each item its fetched object. Items the fullnode did not return keep
/// `data: None`.
pub(crate) fn attach_objects(contents: &mut KioskContents, mut objects: HashMap<String, Value>) {
    for item in &mut contents.items {
        item.data = objects.remove(item.object_id.as_str());
    }
}

/// Ids of the dynamic field objects holding listing prices.
pub(crate) fn listing_field_ids(contents: &KioskContents) -> Vec<String> {
    contents
        .items
        .iter()
        .filter_map(|item| item.listing.as_ref())
        .map(|listing| listing.listing_id.to_string())
        .collect()
}

pub(crate) fn attach_listing_prices(
    contents: &mut KioskContents,
    objects: &HashMap<String, Value>,
) {
    for listing in contents.items.iter_mut().filter_map(|i| i.listing.as_mut()) {
        listing.price = objects
            .get(listing.listing_id.as_str())
            .and_then(|v| SuiObjectData::deserialize(v).ok())
            .and_then(|data| parse_listing_price(&data));
    }
}

pub(crate) mod wire;

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use crate::discovery::pager::{PageSource, Pager};
use crate::error::{Error, Result};
use crate::network::{KioskRule, Network};
use crate::types::{FetchKioskOptions, KioskContents, KioskOwnerCap, ObjectId, Page, SuiAddress};

use wire::{
    DynamicFieldInfo, KIOSK_OWNER_CAP_TYPE, PaginatedResponse, RpcEnvelope, SuiObjectResponse,
    attach_listing_prices, attach_objects, classify_kiosk_fields, item_ids, listing_field_ids,
    parse_owner_cap,
};

/// Largest page the fullnode serves for dynamic fields and multi-get.
const MAX_OBJECTS_PER_REQUEST: usize = 50;

/// Read access to the ownership index of a Sui network.
pub trait KioskBackend: Sync {
    /// One page of the kiosk owner caps (plain and personal) held by `owner`.
    fn owned_kiosk_caps(
        &self,
        owner: &SuiAddress,
        limit: u32,
        cursor: Option<&str>,
    ) -> impl Future<Output = Result<Page<KioskOwnerCap>>> + Send;

    /// Every item in a kiosk; pagination of the underlying index is handled here.
    fn kiosk_contents(
        &self,
        kiosk_id: &ObjectId,
        options: FetchKioskOptions,
    ) -> impl Future<Output = Result<KioskContents>> + Send;

    /// Package implementing `rule` on the backend's network.
    fn rule_package_id(&self, rule: KioskRule) -> Result<ObjectId>;
}

/// Fullnode JSON-RPC backend.
pub struct SuiRpcBackend {
    client: reqwest::Client,
    url: String,
    network: Network,
    request_id: AtomicU64,
}

impl SuiRpcBackend {
    pub fn new(url: &str, network: Network) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| Error::Rpc(e.to_string()))?;
        Ok(Self {
            client,
            url: url.to_string(),
            network,
            request_id: AtomicU64::new(1),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn network(&self) -> Network {
        self.network
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T> {
        let id = self.request_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });

        let response = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Rpc(format!("{method}: {e}")))?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Rpc(format!("{method}: http status {status}")));
        }

        let envelope: RpcEnvelope<T> = response
            .json()
            .await
            .map_err(|e| Error::Decode(format!("{method}: {e}")))?;
        envelope.into_result(method)
    }

    /// Fetch objects by id, `MAX_OBJECTS_PER_REQUEST` at a time, keyed by id.
    async fn multi_get_objects(&self, ids: &[String]) -> Result<HashMap<String, Value>> {
        let mut out = HashMap::new();
        for chunk in ids.chunks(MAX_OBJECTS_PER_REQUEST) {
            let responses: Vec<Value> = self
                .call(
                    "sui_multiGetObjects",
                    json!([chunk, { "showContent": true, "showType": true, "showDisplay": true }]),
                )
                .await?;
            for response in responses {
                let Some(data) = response.get("data") else {
                    log::warn!("multiGetObjects: object without data: {response}");
                    continue;
                };
                if let Some(id) = data.get("objectId").and_then(Value::as_str) {
                    out.insert(id.to_string(), data.clone());
                }
            }
        }
        Ok(out)
    }

    fn owner_cap_filter(&self) -> Value {
        let mut types = vec![json!({ "StructType": KIOSK_OWNER_CAP_TYPE })];
        match self.network.rule_package_id(KioskRule::PersonalKiosk) {
            Ok(package) => types.push(json!({
                "StructType": format!("{package}::personal_kiosk::PersonalKioskCap")
            })),
            Err(e) => log::debug!("personal kiosk caps not queried: {e}"),
        }
        json!({ "MatchAny": types })
    }
}

/// Pages through the dynamic fields of one kiosk.
struct DynamicFields<'a> {
    backend: &'a SuiRpcBackend,
    kiosk_id: &'a ObjectId,
}

impl PageSource for DynamicFields<'_> {
    type Item = DynamicFieldInfo;

    async fn fetch_page(&self, cursor: Option<&str>, limit: u32) -> Result<Page<DynamicFieldInfo>> {
        let response: PaginatedResponse<DynamicFieldInfo> = self
            .backend
            .call(
                "suix_getDynamicFields",
                json!([self.kiosk_id.as_str(), cursor, limit]),
            )
            .await?;
        Ok(Page {
            data: response.data,
            has_next_page: response.has_next_page,
            next_cursor: response.next_cursor,
        })
    }
}

impl KioskBackend for SuiRpcBackend {
    async fn owned_kiosk_caps(
        &self,
        owner: &SuiAddress,
        limit: u32,
        cursor: Option<&str>,
    ) -> Result<Page<KioskOwnerCap>> {
        let query = json!({
            "filter": self.owner_cap_filter(),
            "options": { "showContent": true, "showType": true },
        });
        let response: PaginatedResponse<SuiObjectResponse> = self
            .call(
                "suix_getOwnedObjects",
                json!([owner.to_string(), query, cursor, limit]),
            )
            .await?;

        let data = response
            .data
            .iter()
            .filter_map(|obj| match parse_owner_cap(obj) {
                Ok(cap) => Some(cap),
                Err(e) => {
                    log::warn!("skipping unreadable owner cap: {e}");
                    None
                }
            })
            .collect();

        Ok(Page {
            data,
            has_next_page: response.has_next_page,
            next_cursor: response.next_cursor,
        })
    }

    async fn kiosk_contents(
        &self,
        kiosk_id: &ObjectId,
        options: FetchKioskOptions,
    ) -> Result<KioskContents> {
        let source = DynamicFields {
            backend: self,
            kiosk_id,
        };
        let fields = Pager::new(&source, MAX_OBJECTS_PER_REQUEST as u32)
            .collect_all()
            .await?;
        let mut contents = classify_kiosk_fields(kiosk_id, &fields);

        if options.with_objects && !contents.items.is_empty() {
            let objects = self.multi_get_objects(&item_ids(&contents)).await?;
            attach_objects(&mut contents, objects);
        }

        if options.with_listing_prices {
            let listing_ids = listing_field_ids(&contents);
            if !listing_ids.is_empty() {
                let objects = self.multi_get_objects(&listing_ids).await?;
                attach_listing_prices(&mut contents, &objects);
            }
        }

        log::debug!("kiosk {kiosk_id}: {} item(s)", contents.items.len());
        Ok(contents)
    }

    fn rule_package_id(&self, rule: KioskRule) -> Result<ObjectId> {
        self.network.rule_package_id(rule)
    }
}

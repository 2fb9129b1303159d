//! WebAssembly bindings for Safelist

use std::future::Future;
use std::rc::Rc;

use js_sys::{Object, Reflect, Uint8Array};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{future_to_promise, JsFuture};

use sl_compiler::build_descriptor;
use sl_core::{
    domain::normalize,
    hash::{digest_from_slice, hash_prefix, AsyncDigestBackend, DigestError, DIGEST_LEN},
    url::extract_host,
    BuildOptions, Filter, FilterDescriptor, PrefixLength,
};

// =============================================================================
// SubtleCrypto Backend
// =============================================================================

/// SHA-256 through `crypto.subtle.digest`, available in windows and workers.
pub struct SubtleDigest {
    subtle: web_sys::SubtleCrypto,
}

impl SubtleDigest {
    /// Look up `crypto.subtle` on the current global scope.
    pub fn from_global() -> Result<Self, DigestError> {
        let global = js_sys::global();
        let crypto = if let Some(window) = global.dyn_ref::<web_sys::Window>() {
            window.crypto()
        } else if let Some(worker) = global.dyn_ref::<web_sys::WorkerGlobalScope>() {
            worker.crypto()
        } else {
            return Err(DigestError::Unavailable("no window or worker scope".to_string()));
        };

        let crypto = crypto.map_err(|e| DigestError::Unavailable(describe(&e)))?;
        Ok(Self { subtle: crypto.subtle() })
    }
}

impl AsyncDigestBackend for SubtleDigest {
    fn sha256(&self, data: &[u8]) -> impl Future<Output = Result<[u8; DIGEST_LEN], DigestError>> {
        let promise = self
            .subtle
            .digest_with_str_and_buffer_source("SHA-256", &Uint8Array::from(data));

        async move {
            let promise = promise.map_err(|e| DigestError::Failed(describe(&e)))?;
            let buffer = JsFuture::from(promise)
                .await
                .map_err(|e| DigestError::Failed(describe(&e)))?;
            digest_from_slice(&Uint8Array::new(&buffer).to_vec())
        }
    }
}

// =============================================================================
// Checker
// =============================================================================

/// Decoded filter held on the JS side. Build one per fetched descriptor.
#[wasm_bindgen]
pub struct Checker {
    filter: Rc<Filter>,
}

#[wasm_bindgen]
impl Checker {
    /// Accepts a descriptor object or its JSON text.
    #[wasm_bindgen(constructor)]
    pub fn new(descriptor: JsValue) -> Result<Checker, JsValue> {
        let descriptor = descriptor_from_js(&descriptor)?;
        let filter = Filter::from_descriptor(&descriptor)
            .map_err(|e| JsValue::from_str(&format!("Invalid descriptor: {}", e)))?;
        Ok(Checker { filter: Rc::new(filter.into_sorted()) })
    }

    #[wasm_bindgen(getter)]
    pub fn count(&self) -> usize {
        self.filter.len()
    }

    #[wasm_bindgen(getter, js_name = prefixLength)]
    pub fn prefix_length(&self) -> usize {
        self.filter.prefix_length().get()
    }

    /// Check with the bundled SHA-256 implementation.
    #[wasm_bindgen(js_name = isSafe)]
    pub fn is_safe(&self, url: &str) -> bool {
        self.filter.is_safe(url)
    }

    /// Check with `crypto.subtle.digest`. Resolves to a boolean.
    #[wasm_bindgen(js_name = isSafeAsync)]
    pub fn is_safe_async(&self, url: String) -> js_sys::Promise {
        let filter = Rc::clone(&self.filter);
        future_to_promise(async move {
            let backend = SubtleDigest::from_global().map_err(to_js_error)?;
            let safe = filter
                .is_safe_async(&backend, &url)
                .await
                .map_err(to_js_error)?;
            Ok(JsValue::from_bool(safe))
        })
    }
}

// =============================================================================
// Free Functions
// =============================================================================

/// Build a descriptor object from an array of host strings.
#[wasm_bindgen(js_name = buildDescriptor)]
pub fn build_descriptor_js(hosts: JsValue, prefix_length: Option<usize>) -> Result<JsValue, JsValue> {
    let host_array = js_sys::Array::from(&hosts);
    let mut host_list = Vec::with_capacity(host_array.length() as usize);
    for value in host_array.iter() {
        let host = value
            .as_string()
            .ok_or_else(|| JsValue::from_str("Host must be a string"))?;
        host_list.push(host);
    }

    let options = match prefix_length {
        Some(len) => BuildOptions {
            prefix_length: PrefixLength::new(len).map_err(to_js_error)?,
        },
        None => BuildOptions::default(),
    };

    let descriptor = build_descriptor(&host_list, options);
    Ok(descriptor_to_js(&descriptor).into())
}

/// One-shot synchronous check. Throws on a malformed descriptor.
#[wasm_bindgen(js_name = isSafe)]
pub fn is_safe_js(url: &str, descriptor: JsValue) -> Result<bool, JsValue> {
    let descriptor = descriptor_from_js(&descriptor)?;
    sl_core::is_safe(url, &descriptor).map_err(to_js_error)
}

/// One-shot check through `crypto.subtle.digest`. Rejects on a malformed
/// descriptor or a digest failure.
#[wasm_bindgen(js_name = isSafeAsync)]
pub async fn is_safe_async_js(url: String, descriptor: JsValue) -> Result<bool, JsValue> {
    let descriptor = descriptor_from_js(&descriptor)?;
    let backend = SubtleDigest::from_global().map_err(to_js_error)?;
    sl_core::is_safe_async(&url, &descriptor, &backend)
        .await
        .map_err(to_js_error)
}

#[wasm_bindgen(js_name = extractHost)]
pub fn extract_host_js(url: &str) -> Option<String> {
    extract_host(url)
}

#[wasm_bindgen(js_name = normalizeDomain)]
pub fn normalize_domain_js(domain: &str) -> String {
    normalize(domain)
}

/// Hex of the hash prefix of `domain` (normalized first).
#[wasm_bindgen(js_name = hashPrefixHex)]
pub fn hash_prefix_hex(domain: &str, prefix_length: usize) -> Result<String, JsValue> {
    let k = PrefixLength::new(prefix_length).map_err(to_js_error)?;
    let prefix = hash_prefix(&normalize(domain), k);
    Ok(prefix.as_bytes().iter().map(|b| format!("{:02x}", b)).collect())
}

// =============================================================================
// Conversions
// =============================================================================

fn descriptor_to_js(descriptor: &FilterDescriptor) -> Object {
    let result = Object::new();
    let _ = Reflect::set(&result, &"data".into(), &JsValue::from_str(&descriptor.data));
    let _ = Reflect::set(&result, &"prefixLength".into(), &JsValue::from(descriptor.prefix_length as u32));
    let _ = Reflect::set(&result, &"count".into(), &JsValue::from(descriptor.count as u32));
    result
}

fn descriptor_from_js(value: &JsValue) -> Result<FilterDescriptor, JsValue> {
    if let Some(text) = value.as_string() {
        return serde_json::from_str(&text)
            .map_err(|e| JsValue::from_str(&format!("Invalid descriptor JSON: {}", e)));
    }

    let data = Reflect::get(value, &"data".into())
        .ok()
        .and_then(|v| v.as_string())
        .ok_or_else(|| JsValue::from_str("Descriptor field 'data' must be a string"))?;
    let prefix_length = read_count(value, "prefixLength")?;
    let count = read_count(value, "count")?;

    Ok(FilterDescriptor { data, prefix_length, count })
}

fn read_count(value: &JsValue, field: &str) -> Result<usize, JsValue> {
    let n = Reflect::get(value, &field.into())
        .ok()
        .and_then(|v| v.as_f64())
        .ok_or_else(|| JsValue::from_str(&format!("Descriptor field '{}' must be a number", field)))?;
    if n < 0.0 || n.fract() != 0.0 || n > u32::MAX as f64 {
        return Err(JsValue::from_str(&format!("Descriptor field '{}' must be a non-negative integer", field)));
    }
    Ok(n as usize)
}

fn to_js_error<E: std::fmt::Display>(e: E) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn describe(value: &JsValue) -> String {
    value
        .as_string()
        .or_else(|| value.dyn_ref::<js_sys::Error>().map(|e| String::from(e.message())))
        .unwrap_or_else(|| format!("{:?}", value))
}

//! WebAssembly bindings for in-browser upload checks.
//!
//! Files picked by the visitor are checked before anything leaves the
//! browser. An [`UploadZone`] keeps the accepted files of one drop zone and
//! enforces its capacity across successive drops.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use docguard_core::events::EventLog;
use docguard_core::{
    check_in_memory, parse_equipment, unique_name, AcceptedFile, BatchOutcome, CandidateFile, Clock,
    EventKind, FileMeta, MemoryContent, MemorySink, UploadGuard, UploadPolicy,
};
use serde::Serialize;
use serde_json::json;
use wasm_bindgen::prelude::*;

/// Initialize panic hook for better error messages in browser console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Clock backed by the browser's `Date.now()`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsClock;

impl Clock for JsClock {
    fn now(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(js_sys::Date::now() as i64).unwrap_or_default()
    }
}

fn host_clock() -> Arc<dyn Clock> {
    #[cfg(target_arch = "wasm32")]
    {
        Arc::new(JsClock)
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        Arc::new(docguard_core::SystemClock)
    }
}

fn candidate(name: String, declared_type: String, bytes: Vec<u8>, last_modified_ms: f64) -> CandidateFile {
    let meta = FileMeta {
        name,
        declared_type,
        size: bytes.len() as u64,
        last_modified: DateTime::from_timestamp_millis(last_modified_ms as i64).unwrap_or_default(),
    };
    CandidateFile::new(meta, Arc::new(MemoryContent::new(bytes)))
}

/// Accepted file as exposed to JavaScript.
#[derive(Serialize)]
struct AcceptedView<'a> {
    name: &'a str,
    original_name: &'a str,
    #[serde(rename = "type")]
    declared_type: &'a str,
    size: u64,
}

impl<'a> From<&'a AcceptedFile> for AcceptedView<'a> {
    fn from(file: &'a AcceptedFile) -> Self {
        Self {
            name: &file.name,
            original_name: &file.original_name,
            declared_type: &file.declared_type,
            size: file.size,
        }
    }
}

fn outcome_json(outcome: &BatchOutcome) -> String {
    let accepted: Vec<AcceptedView<'_>> = outcome.accepted.iter().map(Into::into).collect();
    serde_json::to_string(&json!({ "accepted": accepted, "errors": outcome.errors }))
        .unwrap_or_else(|e| format!(r#"{{"accepted":[],"errors":[],"error":"Serialization error: {}"}}"#, e))
}

/// State of one drop zone.
///
/// Files of a batch in flight are reserved against the capacity so that a
/// second drop cannot slip past the limit while the first is still running.
struct ZoneState {
    guard: UploadGuard,
    events: Arc<MemorySink>,
    accepted: Vec<AcceptedFile>,
    reserved: usize,
}

impl ZoneState {
    fn new(policy: UploadPolicy, clock: Arc<dyn Clock>) -> Self {
        let events = Arc::new(MemorySink::default());
        Self {
            guard: UploadGuard::with_parts(policy, clock, events.clone()),
            events,
            accepted: Vec::new(),
            reserved: 0,
        }
    }
}

async fn process_in_zone(state: Rc<RefCell<ZoneState>>, candidates: Vec<CandidateFile>) -> BatchOutcome {
    let submitted = candidates.len();
    let (guard, existing) = {
        let mut zone = state.borrow_mut();
        let existing = zone.accepted.len() + zone.reserved;
        zone.reserved += submitted;
        (zone.guard.clone(), existing)
    };

    let mut outcome = guard.process(candidates, existing).await;

    let mut zone = state.borrow_mut();
    zone.reserved -= submitted;
    for file in &mut outcome.accepted {
        file.name = unique_name(&file.name, |name| zone.accepted.iter().any(|f| f.name == name));
        zone.accepted.push(file.clone());
    }
    outcome
}

/// A drop zone with its own policy and list of accepted files.
#[wasm_bindgen]
pub struct UploadZone {
    state: Rc<RefCell<ZoneState>>,
}

#[wasm_bindgen]
impl UploadZone {
    /// Create a zone. `accepted_patterns` narrows the allowed types
    /// (`image/*`, `application/pdf`); an empty list allows them all.
    #[wasm_bindgen(constructor)]
    pub fn new(
        max_files: usize,
        max_size_mib: u32,
        accepted_patterns: Vec<String>,
        custom_name: Option<String>,
    ) -> Self {
        let mut policy = UploadPolicy::default()
            .with_max_files(max_files)
            .with_max_size_mib(u64::from(max_size_mib))
            .with_accepted_patterns(accepted_patterns);
        if let Some(name) = custom_name {
            policy = policy.with_custom_base_name(name);
        }

        Self {
            state: Rc::new(RefCell::new(ZoneState::new(policy, host_clock()))),
        }
    }

    /// Check a drop of files. The four arrays are parallel; `contents` holds
    /// one `Uint8Array` per file.
    ///
    /// Resolves to a JSON string `{accepted: [...], errors: [...]}`.
    pub fn process(
        &self,
        names: Vec<String>,
        types: Vec<String>,
        contents: js_sys::Array,
        last_modified_ms: Vec<f64>,
    ) -> Result<js_sys::Promise, JsValue> {
        let count = names.len();
        if types.len() != count || contents.length() as usize != count || last_modified_ms.len() != count {
            return Err(JsValue::from_str(
                "names, types, contents and last_modified_ms must have the same length",
            ));
        }

        let candidates: Vec<CandidateFile> = names
            .into_iter()
            .zip(types)
            .zip(contents.iter())
            .zip(last_modified_ms)
            .map(|(((name, declared_type), bytes), modified)| {
                let bytes = js_sys::Uint8Array::new(&bytes).to_vec();
                candidate(name, declared_type, bytes, modified)
            })
            .collect();

        let state = self.state.clone();
        Ok(wasm_bindgen_futures::future_to_promise(async move {
            let outcome = process_in_zone(state, candidates).await;
            Ok(JsValue::from_str(&outcome_json(&outcome)))
        }))
    }

    /// Remove an accepted file by canonical name. Returns whether it existed.
    pub fn remove(&self, name: &str) -> bool {
        let mut zone = self.state.borrow_mut();
        let before = zone.accepted.len();
        zone.accepted.retain(|file| file.name != name);
        zone.accepted.len() != before
    }

    pub fn accepted_count(&self) -> usize {
        self.state.borrow().accepted.len()
    }

    /// Accepted files as a JSON array.
    pub fn files(&self) -> String {
        let zone = self.state.borrow();
        let views: Vec<AcceptedView<'_>> = zone.accepted.iter().map(Into::into).collect();
        serde_json::to_string(&views).unwrap_or_else(|_| "[]".to_string())
    }

    /// Recent pipeline events, newest first, as a JSON array.
    pub fn events(&self) -> String {
        serde_json::to_string(&self.state.borrow().events.snapshot())
            .unwrap_or_else(|_| "[]".to_string())
    }

    pub fn clear_events(&self) {
        self.state.borrow().events.clear();
    }
}

/// Result of a single-file check.
#[derive(Debug, Serialize)]
struct ValidationReport {
    valid: bool,
    code: Option<&'static str>,
    error: Option<String>,
    warnings: Vec<String>,
}

fn validate_file(bytes: &[u8], name: &str, declared_type: &str, policy: &UploadPolicy) -> ValidationReport {
    let sink = Arc::new(MemorySink::default());
    let log = EventLog::new(sink.clone(), host_clock());
    let size = bytes.len() as u64;

    let meta = FileMeta {
        name: name.to_string(),
        declared_type: declared_type.to_string(),
        size,
        last_modified: DateTime::default(),
    };

    let result = check_in_memory(&meta, bytes, policy, &log);

    let mut warnings: Vec<String> = sink
        .snapshot()
        .into_iter()
        .filter(|event| event.kind == EventKind::Warning)
        .map(|event| event.message)
        .collect();
    warnings.reverse();

    match result {
        Ok(()) => ValidationReport {
            valid: true,
            code: None,
            error: None,
            warnings,
        },
        Err(reason) => ValidationReport {
            valid: false,
            code: Some(reason.code()),
            error: Some(reason.to_string()),
            warnings,
        },
    }
}

/// Check one file without renaming it or touching any zone.
///
/// # Returns
/// A JSON string `{valid, code, error, warnings}`
#[wasm_bindgen]
pub fn validate_file_wasm(file_bytes: &[u8], name: &str, declared_type: &str, max_size_mib: u32) -> String {
    let policy = UploadPolicy::default().with_max_size_mib(u64::from(max_size_mib));
    let report = validate_file(file_bytes, name, declared_type, &policy);
    serde_json::to_string(&report)
        .unwrap_or_else(|e| format!(r#"{{"valid":false,"error":"Serialization error: {}"}}"#, e))
}

/// Translate a German equipment list.
///
/// # Returns
/// A JSON string `{categories: {...}, unmatched: [...]}`
#[wasm_bindgen]
pub fn parse_equipment_wasm(text: &str) -> String {
    serde_json::to_string(&parse_equipment(text))
        .unwrap_or_else(|e| format!(r#"{{"error":"Serialization error: {}"}}"#, e))
}

/// Get the library version.
#[wasm_bindgen]
pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

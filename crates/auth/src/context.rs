//! Per-request context: tenant, cancellation and audit annotations.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use maxperm_core::{AccessError, AccessResult, TenantId};

/// Receives key/value annotations for the audit record of a request.
///
/// Fire-and-forget: implementations must not fail the request.
pub trait AuditSink: Send + Sync {
    fn add_annotations(&self, annotations: &[(&str, &str)]);
}

impl<S> AuditSink for Arc<S>
where
    S: AuditSink + ?Sized,
{
    fn add_annotations(&self, annotations: &[(&str, &str)]) {
        (**self).add_annotations(annotations)
    }
}

/// One recorded annotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditAnnotation {
    pub key: String,
    pub value: String,
    pub recorded_at: DateTime<Utc>,
}

/// In-memory audit record for a single request.
///
/// Annotations are kept in insertion order, duplicates included.
#[derive(Debug, Default)]
pub struct AuditEvent {
    annotations: Mutex<Vec<AuditAnnotation>>,
}

impl AuditEvent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn annotations(&self) -> Vec<AuditAnnotation> {
        match self.annotations.lock() {
            Ok(guard) => guard.clone(),
            Err(_) => Vec::new(),
        }
    }

    /// Values recorded under `key`, in order.
    pub fn values(&self, key: &str) -> Vec<String> {
        self.annotations()
            .into_iter()
            .filter(|a| a.key == key)
            .map(|a| a.value)
            .collect()
    }
}

impl AuditSink for AuditEvent {
    fn add_annotations(&self, annotations: &[(&str, &str)]) {
        let recorded_at = Utc::now();
        if let Ok(mut guard) = self.annotations.lock() {
            guard.extend(annotations.iter().map(|(key, value)| AuditAnnotation {
                key: (*key).to_string(),
                value: (*value).to_string(),
                recorded_at,
            }));
        }
    }
}

/// Handle that marks a [`RequestContext`] as done.
#[derive(Debug, Clone)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

/// Context a request is authorized in.
///
/// Cheap to clone; clones share cancellation state and the audit sink.
#[derive(Clone)]
pub struct RequestContext {
    request_id: Uuid,
    tenant: Option<TenantId>,
    done: Arc<AtomicBool>,
    audit: Option<Arc<dyn AuditSink>>,
}

impl RequestContext {
    pub fn new() -> Self {
        Self {
            request_id: Uuid::now_v7(),
            tenant: None,
            done: Arc::new(AtomicBool::new(false)),
            audit: None,
        }
    }

    pub fn with_tenant(mut self, tenant: TenantId) -> Self {
        self.tenant = Some(tenant);
        self
    }

    pub fn with_audit(mut self, sink: Arc<dyn AuditSink>) -> Self {
        self.audit = Some(sink);
        self
    }

    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    /// The tenant the request was made in.
    pub fn tenant(&self) -> AccessResult<&TenantId> {
        self.tenant
            .as_ref()
            .ok_or_else(|| AccessError::tenant_unresolved("no tenant in request context"))
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle(Arc::clone(&self.done))
    }

    pub fn is_done(&self) -> bool {
        self.done.load(Ordering::SeqCst)
    }

    /// `Err(ContextDone)` once the request has been cancelled.
    pub fn err(&self) -> AccessResult<()> {
        if self.is_done() {
            Err(AccessError::ContextDone)
        } else {
            Ok(())
        }
    }

    /// Forward annotations to the audit sink, if one is attached.
    pub fn add_audit_annotations(&self, annotations: &[(&str, &str)]) {
        if let Some(sink) = &self.audit {
            sink.add_annotations(annotations);
        }
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RequestContext")
            .field("request_id", &self.request_id)
            .field("tenant", &self.tenant)
            .field("done", &self.is_done())
            .field("audit", &self.audit.is_some())
            .finish()
    }
}

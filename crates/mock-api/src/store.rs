//! In-memory campaign store.
//!
//! Rows sit behind a single `RwLock`: reads share the lock, create/pause/resume/reset
//! serialise on it. Listing order is insertion order.
//!
//! Audit entries carry a monotonically increasing sequence number; only the most
//! recent `audit_capacity` entries are retained.

use crate::models::{AuditAction, AuditLogEntry};
use chrono::Utc;
use dashmap::DashMap;
use parking_lot::RwLock;
use pilot_core::types::{Campaign, CampaignStatus};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::info;
use uuid::Uuid;

const DEFAULT_AUDIT_CAPACITY: u64 = 10_000;

#[derive(Default)]
struct CampaignTable {
    rows: Vec<Campaign>,
    /// campaign_id -> position in `rows`
    index: HashMap<String, usize>,
}

/// Thread-safe store for campaigns and the audit log.
pub struct CampaignStore {
    table: RwLock<CampaignTable>,
    audit_log: DashMap<u64, AuditLogEntry>,
    audit_seq: AtomicU64,
    audit_capacity: u64,
}

impl CampaignStore {
    pub fn new() -> Self {
        Self::with_audit_capacity(DEFAULT_AUDIT_CAPACITY)
    }

    pub fn with_audit_capacity(audit_capacity: u64) -> Self {
        info!(audit_capacity, "Campaign store initialized (in-memory)");
        Self {
            table: RwLock::new(CampaignTable::default()),
            audit_log: DashMap::new(),
            audit_seq: AtomicU64::new(0),
            audit_capacity: audit_capacity.max(1),
        }
    }

    // ─── Campaigns ─────────────────────────────────────────────────────────

    /// Insert a new campaign. Returns `false` and leaves the store untouched
    /// if the id is already taken.
    pub fn insert(&self, campaign: Campaign, actor: &str) -> bool {
        let id = campaign.campaign_id.clone();
        {
            let mut table = self.table.write();
            if table.index.contains_key(&id) {
                return false;
            }
            let position = table.rows.len();
            table.index.insert(id.clone(), position);
            table.rows.push(campaign.clone());
        }
        self.log_audit(
            actor,
            AuditAction::Create,
            "campaign",
            &id,
            serde_json::json!({
                "product_id": campaign.product_id,
                "name": campaign.campaign_name,
                "budget": campaign.budget,
            }),
        );
        true
    }

    pub fn get(&self, id: &str) -> Option<Campaign> {
        let table = self.table.read();
        table.index.get(id).map(|&i| table.rows[i].clone())
    }

    pub fn list(&self) -> Vec<Campaign> {
        self.table.read().rows.clone()
    }

    pub fn len(&self) -> usize {
        self.table.read().rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Set the status of a campaign. Setting the status it already has is
    /// not an error.
    pub fn set_status(&self, id: &str, status: CampaignStatus, actor: &str) -> Option<Campaign> {
        let updated = {
            let mut table = self.table.write();
            let position = *table.index.get(id)?;
            let row = &mut table.rows[position];
            row.status = status;
            row.clone()
        };
        let action = match status {
            CampaignStatus::Paused => AuditAction::Pause,
            CampaignStatus::Active => AuditAction::Resume,
        };
        self.log_audit(actor, action, "campaign", id, serde_json::json!({ "status": status }));
        Some(updated)
    }

    /// Drop every campaign. Returns how many were removed.
    pub fn clear(&self, actor: &str) -> usize {
        let removed = {
            let mut table = self.table.write();
            let removed = table.rows.len();
            table.rows.clear();
            table.index.clear();
            removed
        };
        self.log_audit(actor, AuditAction::Reset, "campaign", "*", serde_json::json!({ "removed": removed }));
        removed
    }

    // ─── Audit Log ─────────────────────────────────────────────────────────

    pub fn audit_log(&self) -> Vec<AuditLogEntry> {
        let mut entries: Vec<AuditLogEntry> = self.audit_log.iter().map(|r| r.value().clone()).collect();
        entries.sort_by(|a, b| b.seq.cmp(&a.seq));
        entries
    }

    fn log_audit(&self, actor: &str, action: AuditAction, resource_type: &str, resource_id: &str, details: serde_json::Value) {
        let seq = self.audit_seq.fetch_add(1, Ordering::Relaxed);
        let entry = AuditLogEntry {
            id: Uuid::new_v4(),
            seq,
            actor: actor.to_string(),
            action,
            resource_type: resource_type.to_string(),
            resource_id: resource_id.to_string(),
            details,
            timestamp: Utc::now(),
        };
        self.audit_log.insert(seq, entry);
        if seq >= self.audit_capacity {
            self.audit_log.remove(&(seq - self.audit_capacity));
        }
    }
}

impl Default for CampaignStore {
    fn default() -> Self {
        Self::new()
    }
}

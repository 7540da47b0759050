//! # Audit Events
//!
//! Committed orders are reported to an injected [`AuditSink`]. Sinks are
//! fire-and-forget: they run after the commit and cannot fail the order.


use serde::Serialize;
use tracing::info;

use bazaar_core::{Money, OrderStatus};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum AuditEvent {
    OrderCreated {
        order_id: String,
        user_id: String,
        total: Money,
        coupon_code: Option<String>,
    },
    PosOrderCreated {
        order_id: String,
        user_id: String,
        total: Money,
        total_paid: Money,
        status: OrderStatus,
    },
}

impl AuditEvent {
    pub fn order_id(&self) -> &str {
        match self {
            AuditEvent::OrderCreated { order_id, .. } | AuditEvent::PosOrderCreated { order_id, .. } => {
                order_id
            }
        }
    }
}

pub trait AuditSink: Send + Sync {
    fn record(&self, event: AuditEvent);
}

/// Writes audit events to the `bazaar::audit` tracing target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn record(&self, event: AuditEvent) {
        match &event {
            AuditEvent::OrderCreated {
                order_id,
                user_id,
                total,
                coupon_code,
            } => info!(
                target: "bazaar::audit",
                order_id = %order_id,
                user_id = %user_id,
                total = %total,
                coupon = coupon_code.as_deref().unwrap_or("-"),
                "order_created"
            ),
            AuditEvent::PosOrderCreated {
                order_id,
                user_id,
                total,
                total_paid,
                status,
            } => info!(
                target: "bazaar::audit",
                order_id = %order_id,
                user_id = %user_id,
                total = %total,
                total_paid = %total_paid,
                status = %status,
                "pos_order_created"
            ),
        }
    }
}

/// Keeps events in memory.
#[cfg(any(test, feature = "test-util"))]
#[derive(Debug, Default)]
pub struct MemoryAuditSink {
    events: std::sync::Mutex<Vec<AuditEvent>>,
}

#[cfg(any(test, feature = "test-util"))]
impl MemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[cfg(any(test, feature = "test-util"))]
impl AuditSink for MemoryAuditSink {
    fn record(&self, event: AuditEvent) {
        self.events.lock().unwrap_or_else(|e| e.into_inner()).push(event);
    }
}

use chrono::{DateTime, Utc};
use metrics::counter;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Domain events emitted after a successful commit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    ComparisonSaved {
        comparison_id: i32,
        upc: String,
        supplier_id: i32,
    },
    PurchaseOrderCreated {
        po_id: i32,
        po_number: String,
        supplier_id: i32,
    },
    PurchaseOrderSent {
        po_id: i32,
        sent_at: DateTime<Utc>,
    },
    PurchaseOrderClosed(i32),
    PurchaseOrderDeleted(i32),
    CartConverted {
        po_ids: Vec<i32>,
        total_cost: Decimal,
    },
    ReceivingStarted {
        session_id: i32,
        po_id: Option<i32>,
    },
    ReceivingCompleted {
        session_id: i32,
        po_id: Option<i32>,
        items_short: i32,
        items_over: i32,
        items_damaged: i32,
    },
    PricesImported {
        supplier_id: i32,
        created: usize,
        failed: usize,
    },
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Event::ComparisonSaved { .. } => "comparison_saved",
            Event::PurchaseOrderCreated { .. } => "purchase_order_created",
            Event::PurchaseOrderSent { .. } => "purchase_order_sent",
            Event::PurchaseOrderClosed(_) => "purchase_order_closed",
            Event::PurchaseOrderDeleted(_) => "purchase_order_deleted",
            Event::CartConverted { .. } => "cart_converted",
            Event::ReceivingStarted { .. } => "receiving_started",
            Event::ReceivingCompleted { .. } => "receiving_completed",
            Event::PricesImported { .. } => "prices_imported",
        }
    }
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    /// Creates a new EventSender
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }

    /// Queues an event without waiting; a full or closed channel is logged, never surfaced.
    pub fn send_or_log(&self, event: Event) {
        let name = event.name();
        if let Err(e) = self.sender.try_send(event) {
            counter!("best_buy.events.dropped", 1);
            warn!(event = name, "Dropping event: {}", e);
        }
    }
}

/// Drains the event channel, logging every event until all senders are gone.
pub async fn process_events(mut rx: mpsc::Receiver<Event>) {
    info!("Starting event processing loop");

    while let Some(event) = rx.recv().await {
        counter!("best_buy.events.processed", 1);
        match &event {
            Event::ReceivingCompleted {
                session_id,
                items_short,
                items_over,
                items_damaged,
                ..
            } if items_short + items_over + items_damaged > 0 => {
                warn!(
                    session_id,
                    items_short, items_over, items_damaged, "Receiving completed with discrepancies"
                );
            }
            Event::PricesImported {
                supplier_id,
                failed,
                ..
            } if *failed > 0 => {
                warn!(supplier_id, failed, "Price import had rejected rows");
            }
            _ => {
                info!(event = event.name(), "Received event: {:?}", event);
            }
        }
    }

    warn!("Event processing loop has ended");
}

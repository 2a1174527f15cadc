use async_trait::async_trait;
use chrono::{Duration, NaiveDate, TimeZone, Utc};
use landlord_hub::config::NotificationConfig;
use landlord_hub::workflows::invoices::{
    InMemoryInvoiceStore, Invoice, InvoiceCategory, InvoiceId, InvoiceItem, InvoiceQueryService,
    InvoiceStatus,
};
use landlord_hub::workflows::requests::{
    Contract, ContractId, ContractStatus, InMemoryRequestStore, MemberId, Notification,
    NotificationError, Notifier, RequestWorkflowService,
};
use landlord_hub::workflows::RepositoryError;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Keeps every notification in memory and logs it; stands in for a push gateway.
#[derive(Default, Clone)]
pub(crate) struct OutboxNotifier {
    sent: Arc<Mutex<Vec<Notification>>>,
}

#[async_trait]
impl Notifier for OutboxNotifier {
    async fn send_notification(&self, notification: Notification) -> Result<(), NotificationError> {
        info!(
            recipient = %notification.recipient_id,
            title = %notification.title,
            link = %notification.link,
            "notification queued"
        );
        let mut guard = self
            .sent
            .lock()
            .map_err(|_| NotificationError::Transport("outbox mutex poisoned".to_string()))?;
        guard.push(notification);
        Ok(())
    }
}

impl OutboxNotifier {
    pub(crate) fn sent(&self) -> Vec<Notification> {
        self.sent
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

pub(crate) type RequestService = RequestWorkflowService<InMemoryRequestStore, OutboxNotifier>;
pub(crate) type InvoiceService = InvoiceQueryService<InMemoryInvoiceStore>;

/// In-process adapters shared by the server and the CLI demo.
pub(crate) struct Workflows {
    pub(crate) requests: Arc<RequestService>,
    pub(crate) invoices: Arc<InvoiceService>,
    pub(crate) outbox: OutboxNotifier,
}

impl Workflows {
    pub(crate) fn in_memory(
        config: &NotificationConfig,
        seed: bool,
    ) -> Result<Self, RepositoryError> {
        let request_store = Arc::new(InMemoryRequestStore::new());
        let invoice_store = Arc::new(InMemoryInvoiceStore::default());
        if seed {
            seed_demo_data(&request_store, &invoice_store)?;
        }

        let outbox = OutboxNotifier::default();
        let requests = Arc::new(RequestWorkflowService::new(
            request_store,
            Arc::new(outbox.clone()),
            config,
        ));
        let invoices = Arc::new(InvoiceQueryService::new(invoice_store));

        Ok(Self {
            requests,
            invoices,
            outbox,
        })
    }
}

pub(crate) const DEMO_LANDLORD: &str = "landlord-1";
pub(crate) const DEMO_TENANTS: [&str; 2] = ["tenant-1", "tenant-2"];
pub(crate) const DEMO_CONTRACT: &str = "contract-1001";

fn seed_demo_data(
    requests: &InMemoryRequestStore,
    invoices: &InMemoryInvoiceStore,
) -> Result<(), RepositoryError> {
    requests.seed_contract(Contract {
        id: ContractId::from(DEMO_CONTRACT),
        landlord_id: MemberId::from(DEMO_LANDLORD),
        tenant_id: MemberId::from(DEMO_TENANTS[0]),
        unit_id: "unit-3b".to_string(),
        status: ContractStatus::Active,
        start_date: NaiveDate::from_ymd_opt(2024, 9, 1).unwrap_or_default(),
        termination_date: None,
    })?;

    let issued = Utc
        .with_ymd_and_hms(2025, 1, 1, 9, 0, 0)
        .single()
        .unwrap_or_default();
    let months = [
        (1, InvoiceStatus::Paid, 1),
        (2, InvoiceStatus::Paid, 2),
        (3, InvoiceStatus::Overdue, 3),
        (4, InvoiceStatus::Unpaid, 4),
    ];
    for (id, status, month) in months {
        invoices.insert(Invoice {
            id: InvoiceId(id),
            category: InvoiceCategory::Rent,
            status,
            due_date: NaiveDate::from_ymd_opt(2025, month, 5).unwrap_or_default(),
            created_at: issued + Duration::days(31 * i64::from(month - 1)),
            owner_id: MemberId::from(DEMO_LANDLORD),
            property_id: "maple-court".to_string(),
            unit_id: "unit-3b".to_string(),
            unit_name: "Maple Court 3B".to_string(),
            member_id: MemberId::from(DEMO_TENANTS[0]),
            member_name: "Jordan Reyes".to_string(),
            items: vec![
                InvoiceItem {
                    description: "Monthly rent".to_string(),
                    unit_price_cents: 145_000,
                    quantity: 1,
                },
                InvoiceItem {
                    description: "Water and sewer".to_string(),
                    unit_price_cents: 3_800,
                    quantity: 1,
                },
            ],
        })?;
    }

    Ok(())
}

pub(crate) fn format_cents(cents: u64) -> String {
    format!("${}.{:02}", cents / 100, cents % 100)
}

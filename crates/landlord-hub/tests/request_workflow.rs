//! End-to-end scenarios for shared requests driven through the public service facade and the
//! HTTP routers, covering acceptance cascades, rejection and invoice listings.

mod common {
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use async_trait::async_trait;
    use chrono::{NaiveDate, TimeZone, Utc};

    use landlord_hub::config::NotificationConfig;
    use landlord_hub::workflows::invoices::{
        InMemoryInvoiceStore, Invoice, InvoiceCategory, InvoiceId, InvoiceItem, InvoiceStatus,
    };
    use landlord_hub::workflows::requests::{
        Contract, ContractId, ContractStatus, InMemoryRequestStore, MemberId, Notification,
        NotificationError, Notifier, RequestWorkflowService,
    };

    pub(super) fn landlord() -> MemberId {
        MemberId::from("landlord-7")
    }

    pub(super) fn tenants() -> Vec<MemberId> {
        vec![MemberId::from("tenant-x"), MemberId::from("tenant-y")]
    }

    pub(super) fn contract_id() -> ContractId {
        ContractId::from("lease-42")
    }

    #[derive(Default)]
    pub(super) struct Inbox {
        sent: Mutex<Vec<Notification>>,
    }

    impl Inbox {
        pub(super) fn for_member(&self, member_id: &MemberId) -> Vec<Notification> {
            self.sent
                .lock()
                .expect("inbox mutex poisoned")
                .iter()
                .filter(|notification| &notification.recipient_id == member_id)
                .cloned()
                .collect()
        }
    }

    #[async_trait]
    impl Notifier for Inbox {
        async fn send_notification(
            &self,
            notification: Notification,
        ) -> Result<(), NotificationError> {
            self.sent
                .lock()
                .expect("inbox mutex poisoned")
                .push(notification);
            Ok(())
        }
    }

    pub(super) fn build_service() -> (
        Arc<RequestWorkflowService<InMemoryRequestStore, Inbox>>,
        Arc<InMemoryRequestStore>,
        Arc<Inbox>,
    ) {
        let store = Arc::new(InMemoryRequestStore::new());
        store
            .seed_contract(Contract {
                id: contract_id(),
                landlord_id: landlord(),
                tenant_id: MemberId::from("tenant-x"),
                unit_id: "B-12".to_string(),
                status: ContractStatus::Active,
                start_date: NaiveDate::from_ymd_opt(2024, 9, 1).expect("valid date"),
                termination_date: None,
            })
            .expect("seed contract");
        let inbox = Arc::new(Inbox::default());
        let service = Arc::new(RequestWorkflowService::new(
            store.clone(),
            inbox.clone(),
            &NotificationConfig {
                timeout: Duration::from_millis(250),
            },
        ));
        (service, store, inbox)
    }

    pub(super) fn invoice_store() -> InMemoryInvoiceStore {
        let store = InMemoryInvoiceStore::default();
        let created = Utc
            .with_ymd_and_hms(2025, 4, 1, 12, 0, 0)
            .single()
            .expect("valid timestamp");
        for (id, status, unit) in [
            (11, InvoiceStatus::Unpaid, "B-12"),
            (12, InvoiceStatus::Paid, "B-12"),
            (13, InvoiceStatus::Overdue, "B-14"),
        ] {
            store
                .insert(Invoice {
                    id: InvoiceId(id),
                    category: InvoiceCategory::Rent,
                    status,
                    due_date: NaiveDate::from_ymd_opt(2025, 5, 1).expect("valid date"),
                    created_at: created + chrono::Duration::hours(id as i64),
                    owner_id: landlord(),
                    property_id: "harbor-view".to_string(),
                    unit_id: unit.to_string(),
                    unit_name: format!("Harbor View {unit}"),
                    member_id: MemberId::from("tenant-x"),
                    member_name: "Tenant X".to_string(),
                    items: vec![InvoiceItem {
                        description: "April rent".to_string(),
                        unit_price_cents: 120_000,
                        quantity: 1,
                    }],
                })
                .expect("insert invoice");
        }
        store
    }
}

mod service {
    use super::common::*;

    use landlord_hub::workflows::requests::{
        ContactType, ContractStatus, RequestCategory, RequestDraft, RequestServiceError,
        RequestStatus, ResponseStatus, UpdateRequest,
    };

    #[tokio::test]
    async fn termination_request_cascades_after_every_tenant_accepts() {
        let (service, _, inbox) = build_service();

        let view = service
            .send(
                &landlord(),
                RequestDraft {
                    category: RequestCategory::TerminateContract,
                    title: "Terminate lease-42 at end of month".to_string(),
                    recipients: tenants(),
                    contract_id: Some(contract_id()),
                },
            )
            .await
            .expect("request sent");
        let request_id = view.request.id.clone();

        for tenant in tenants() {
            assert_eq!(inbox.for_member(&tenant).len(), 1);
            service
                .respond(
                    &tenant,
                    UpdateRequest {
                        id: request_id.clone(),
                        status: ResponseStatus::Accepted,
                    },
                )
                .await
                .expect("response recorded");
        }

        let view = service.get(&request_id).expect("request readable");
        assert_eq!(view.request.status, RequestStatus::Accepted);
        assert!(view
            .responses
            .iter()
            .all(|row| row.status == RequestStatus::Accepted && row.responded_at.is_some()));

        let contract = service.contract(&contract_id()).expect("contract readable");
        assert_eq!(contract.status, ContractStatus::Expired);
        assert!(contract.termination_date.is_some());

        let contacts = service.contacts_for(&landlord()).expect("contacts readable");
        assert_eq!(contacts.len(), 1);
        assert_eq!(contacts[0].contact_type, ContactType::Tenant);
        assert_eq!(contacts[0].contact_id, tenants()[1]);

        for tenant in tenants() {
            let received = inbox.for_member(&tenant);
            assert_eq!(received.len(), 2);
            assert_eq!(received[1].title, "Contract status updated");
        }
    }

    #[tokio::test]
    async fn one_rejection_closes_request_and_keeps_late_answers() {
        let (service, _, inbox) = build_service();
        let view = service
            .send(
                &landlord(),
                RequestDraft {
                    category: RequestCategory::Maintenance,
                    title: "Annual boiler inspection".to_string(),
                    recipients: tenants(),
                    contract_id: None,
                },
            )
            .await
            .expect("request sent");
        let request_id = view.request.id.clone();

        service
            .respond(
                &tenants()[0],
                UpdateRequest {
                    id: request_id.clone(),
                    status: ResponseStatus::Rejected,
                },
            )
            .await
            .expect("rejection recorded");

        let late = service
            .respond(
                &tenants()[1],
                UpdateRequest {
                    id: request_id.clone(),
                    status: ResponseStatus::Accepted,
                },
            )
            .await
            .expect("late answer recorded");
        assert_eq!(late, request_id);

        let view = service.get(&request_id).expect("request readable");
        assert_eq!(view.request.status, RequestStatus::Rejected);
        assert_eq!(view.responses[1].status, RequestStatus::Accepted);
        assert_eq!(inbox.for_member(&tenants()[1]).len(), 2);

        let flipped = service
            .respond(
                &tenants()[0],
                UpdateRequest {
                    id: request_id.clone(),
                    status: ResponseStatus::Accepted,
                },
            )
            .await;
        assert!(matches!(
            flipped,
            Err(RequestServiceError::AlreadyResolved {
                status: RequestStatus::Rejected,
                ..
            })
        ));

        let contract = service.contract(&contract_id()).expect("contract readable");
        assert_eq!(contract.status, ContractStatus::Active);
        assert!(service
            .contacts_for(&landlord())
            .expect("contacts readable")
            .is_empty());
    }
}

mod routing {
    use super::common::*;
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use landlord_hub::workflows::identity::MEMBER_HEADER;
    use landlord_hub::workflows::invoices::{invoice_router, InvoiceQueryService};
    use landlord_hub::workflows::requests::request_router;

    async fn json_body(response: axum::response::Response) -> Value {
        let body = to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("body");
        serde_json::from_slice(&body).expect("json")
    }

    #[tokio::test]
    async fn send_then_respond_over_http() {
        let (service, _, _) = build_service();
        let router = request_router(service);

        let created = router
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/requests")
                    .header("content-type", "application/json")
                    .header(MEMBER_HEADER, "landlord-7")
                    .body(Body::from(
                        serde_json::to_vec(&json!({
                            "category": "RENTAL_INVITATION",
                            "title": "Join unit B-12",
                            "recipients": ["tenant-x"],
                        }))
                        .expect("serialize draft"),
                    ))
                    .expect("request"),
            )
            .await
            .expect("router dispatch");
        assert_eq!(created.status(), StatusCode::CREATED);
        let request_id = json_body(created)
            .await
            .get("id")
            .and_then(Value::as_str)
            .map(str::to_string)
            .expect("request id");

        let responded = router
            .clone()
            .oneshot(
                Request::builder()
                    .method("PATCH")
                    .uri("/api/v1/requests")
                    .header("content-type", "application/json")
                    .header(MEMBER_HEADER, "tenant-x")
                    .body(Body::from(
                        serde_json::to_vec(&json!({ "id": request_id, "status": "ACCEPTED" }))
                            .expect("serialize update"),
                    ))
                    .expect("request"),
            )
            .await
            .expect("router dispatch");
        assert_eq!(responded.status(), StatusCode::OK);
        assert_eq!(json_body(responded).await, json!({ "id": request_id }));

        let fetched = router
            .oneshot(
                Request::builder()
                    .uri(format!("/api/v1/requests/{request_id}"))
                    .header(MEMBER_HEADER, "tenant-x")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("router dispatch");
        assert_eq!(fetched.status(), StatusCode::OK);
        assert_eq!(json_body(fetched).await.get("status"), Some(&json!("ACCEPTED")));
    }

    #[tokio::test]
    async fn invoice_listing_filters_and_paginates() {
        let service = Arc::new(InvoiceQueryService::new(Arc::new(invoice_store())));
        let router = invoice_router(service);

        let response = router
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/api/v1/invoices?unit_id=B-12&take=1")
                    .header(MEMBER_HEADER, "landlord-7")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("router dispatch");
        assert_eq!(response.status(), StatusCode::OK);
        let page = json_body(response).await;
        assert_eq!(page.get("total"), Some(&json!(2)));
        assert_eq!(page["data"][0]["id"], json!(12));
        assert_eq!(page["data"].as_array().map(Vec::len), Some(1));

        let foreign = router
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/api/v1/invoices")
                    .header(MEMBER_HEADER, "landlord-other")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("router dispatch");
        assert_eq!(json_body(foreign).await.get("total"), Some(&json!(0)));

        let anonymous = router
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/api/v1/invoices/11")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("router dispatch");
        assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);

        let missing = router
            .oneshot(
                Request::builder()
                    .uri("/api/v1/invoices/999")
                    .header(MEMBER_HEADER, "landlord-7")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("router dispatch");
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    }
}

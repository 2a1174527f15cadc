use crate::infra::{format_cents, Workflows, DEMO_CONTRACT, DEMO_LANDLORD, DEMO_TENANTS};
use clap::Args;
use landlord_hub::config::NotificationConfig;
use landlord_hub::error::AppError;
use landlord_hub::workflows::invoices::InvoiceQuery;
use landlord_hub::workflows::requests::{
    ContractId, MemberId, RequestCategory, RequestDraft, RequestView, ResponseStatus,
    UpdateRequest,
};

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Have the second tenant reject the termination instead of accepting it.
    #[arg(long)]
    pub(crate) reject: bool,
    /// Number of invoices to show in the listing (capped at 100).
    #[arg(long, default_value_t = 5)]
    pub(crate) invoices: usize,
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs { reject, invoices } = args;
    let workflows = Workflows::in_memory(&NotificationConfig::default(), true)?;
    let landlord = MemberId::from(DEMO_LANDLORD);
    let contract_id = ContractId::from(DEMO_CONTRACT);

    println!("Landlord hub demo");
    let view = workflows
        .requests
        .send(
            &landlord,
            RequestDraft {
                category: RequestCategory::TerminateContract,
                title: "Terminate lease for Maple Court 3B".to_string(),
                recipients: DEMO_TENANTS.iter().map(|id| MemberId::from(*id)).collect(),
                contract_id: Some(contract_id.clone()),
            },
        )
        .await?;
    render_request("Request sent", &view);

    for (position, tenant) in DEMO_TENANTS.iter().enumerate() {
        let status = if reject && position == DEMO_TENANTS.len() - 1 {
            ResponseStatus::Rejected
        } else {
            ResponseStatus::Accepted
        };
        workflows
            .requests
            .respond(
                &MemberId::from(*tenant),
                UpdateRequest {
                    id: view.request.id.clone(),
                    status,
                },
            )
            .await?;
        println!("- {tenant} responded {status:?}");
    }

    let resolved = workflows.requests.get(&view.request.id)?;
    render_request("\nRequest after responses", &resolved);

    let contract = workflows.requests.contract(&contract_id)?;
    println!(
        "\nContract {} is {:?}{}",
        contract.id,
        contract.status,
        contract
            .termination_date
            .map(|date| format!(" (terminated {})", date.format("%Y-%m-%d %H:%M UTC")))
            .unwrap_or_default()
    );

    let contacts = workflows.requests.contacts_for(&landlord)?;
    println!("Contacts for {landlord}: {}", contacts.len());
    for contact in &contacts {
        println!(
            "  - {:?} {} linked to {}",
            contact.contact_type, contact.contact_id, contact.contact_with_id
        );
    }

    let outbox = workflows.outbox.sent();
    println!("Notifications queued: {}", outbox.len());
    for notification in &outbox {
        println!(
            "  - {} -> {}: {}",
            notification.recipient_id, notification.title, notification.content
        );
    }

    let query = InvoiceQuery {
        take: Some(invoices),
        ..InvoiceQuery::default()
    };
    let page = workflows.invoices.list(&landlord, &query)?;
    println!(
        "\nInvoices for {landlord} ({} of {})",
        page.data.len(),
        page.total
    );
    for row in &page.data {
        println!(
            "  - #{} {:?} {:?} due {} | {} | {}",
            row.id.0,
            row.category,
            row.status,
            row.due_date,
            row.unit_name,
            format_cents(row.total_cents)
        );
    }

    Ok(())
}

fn render_request(heading: &str, view: &RequestView) {
    println!(
        "{heading}: {} [{}] {}",
        view.request.id,
        view.request.category.label(),
        view.request.status
    );
    for response in &view.responses {
        println!("  - {} {}", response.member_id, response.status);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn demo_runs_for_both_outcomes() {
        run_demo(DemoArgs {
            reject: false,
            invoices: 2,
        })
        .await
        .expect("acceptance demo runs");

        run_demo(DemoArgs {
            reject: true,
            invoices: 2,
        })
        .await
        .expect("rejection demo runs");
    }
}

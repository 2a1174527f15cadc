use super::domain::RequestStatus;

/// Fold individual responses into the request's overall status.
///
/// Returns `Accepted` when every response is accepted, `Rejected` as soon as any response is
/// rejected, and `None` while the outcome is still open. An empty set stays open.
pub fn aggregate_status<I>(statuses: I) -> Option<RequestStatus>
where
    I: IntoIterator<Item = RequestStatus>,
{
    let mut seen = false;
    let mut all_accepted = true;

    for status in statuses {
        seen = true;
        match status {
            RequestStatus::Rejected => return Some(RequestStatus::Rejected),
            RequestStatus::Pending => all_accepted = false,
            RequestStatus::Accepted => {}
        }
    }

    (seen && all_accepted).then_some(RequestStatus::Accepted)
}

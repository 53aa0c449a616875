//! Collaborator stand-ins for dry runs and tests.

use std::collections::BTreeSet;

use growth_traits::{PlateStatus, SchedulerError, WorkflowRequest, WorkflowScheduler, WorkflowTicket};

/// Scheduler that submits nothing: it logs each request and hands back a
/// synthetic ticket.
#[derive(Debug, Default, Clone)]
pub struct DryRunScheduler {
    /// Barcodes reported as unavailable.
    pub unavailable: BTreeSet<String>,
    /// Ticket flag returned for every submission.
    pub requires_approval: bool,
    /// Requests accepted so far.
    pub submitted: Vec<WorkflowRequest>,
}

impl DryRunScheduler {
    pub fn new() -> Self {
        Self::default()
    }
}

impl WorkflowScheduler for DryRunScheduler {
    fn check_plate(&mut self, barcode: &str) -> Result<PlateStatus, SchedulerError> {
        if self.unavailable.contains(barcode) {
            Ok(PlateStatus::unavailable("marked unavailable for dry run"))
        } else {
            Ok(PlateStatus::available())
        }
    }

    fn submit_workflow(&mut self, request: &WorkflowRequest) -> Result<WorkflowTicket, SchedulerError> {
        tracing::info!(
            definition_id = request.definition_id,
            start_after_minutes = request.start_after_minutes,
            reason = %request.reason,
            "dry run: workflow not submitted"
        );
        self.submitted.push(request.clone());
        Ok(WorkflowTicket {
            id: format!("dry-run-{}", self.submitted.len()),
            status: "dry_run".into(),
            requires_approval: self.requires_approval,
        })
    }
}

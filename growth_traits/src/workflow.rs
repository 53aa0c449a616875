use std::collections::BTreeMap;
use std::fmt;

/// Error type crossing the scheduler boundary.
pub type SchedulerError = Box<dyn std::error::Error + Send + Sync>;

/// Availability of a culture plate on the workcell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlateStatus {
    pub available: bool,
    /// Human-readable reason when the plate is not available.
    pub reason: Option<String>,
}

impl PlateStatus {
    pub fn available() -> Self {
        Self {
            available: true,
            reason: None,
        }
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            available: false,
            reason: Some(reason.into()),
        }
    }
}

/// A request to instantiate a workflow definition on the lab automation backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowRequest {
    pub definition_id: u32,
    /// Free-form inputs, e.g. `plate_barcode`.
    pub inputs: BTreeMap<String, String>,
    pub start_after_minutes: u32,
    pub reason: String,
}

/// Backend acknowledgement for a submitted workflow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowTicket {
    pub id: String,
    pub status: String,
    /// When true an operator must approve the workflow before it runs.
    pub requires_approval: bool,
}

impl fmt::Display for WorkflowTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.id, self.status)
    }
}

/// Narrow capability interface over the lab workflow backend.
///
/// The analysis side never depends on a concrete protocol; anything that can
/// check a plate and accept a workflow request can sit behind this trait.
pub trait WorkflowScheduler {
    fn check_plate(&mut self, barcode: &str) -> Result<PlateStatus, SchedulerError>;

    fn submit_workflow(&mut self, request: &WorkflowRequest)
    -> Result<WorkflowTicket, SchedulerError>;
}

impl<T: WorkflowScheduler + ?Sized> WorkflowScheduler for Box<T> {
    fn check_plate(&mut self, barcode: &str) -> Result<PlateStatus, SchedulerError> {
        (**self).check_plate(barcode)
    }

    fn submit_workflow(
        &mut self,
        request: &WorkflowRequest,
    ) -> Result<WorkflowTicket, SchedulerError> {
        (**self).submit_workflow(request)
    }
}

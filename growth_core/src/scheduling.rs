//! Scheduling plate-reader workflows through a [`WorkflowScheduler`].

use std::collections::BTreeMap;

use growth_traits::{SchedulerError, WorkflowRequest, WorkflowScheduler, WorkflowTicket};

use crate::error::AnalysisError;

/// Workflow definition that reads OD600 every 5 minutes.
pub const ABSORBANCE_MONITORING_DEFINITION: u32 = 19;
/// Workflow definition for continuous 96-well DOE growth monitoring.
pub const DOE_MONITORING_DEFINITION: u32 = 11;

/// What to schedule for one plate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitoringPlan {
    pub plate_barcode: String,
    pub definition_id: u32,
    pub start_after_minutes: u32,
    pub reason: String,
}

impl MonitoringPlan {
    /// Periodic absorbance reads for `barcode`, starting right after approval.
    pub fn absorbance(barcode: impl Into<String>) -> Self {
        let plate_barcode = barcode.into();
        Self {
            reason: format!("OD600 monitoring every 5 minutes for plate {plate_barcode}"),
            plate_barcode,
            definition_id: ABSORBANCE_MONITORING_DEFINITION,
            start_after_minutes: 0,
        }
    }

    pub fn with_definition(mut self, definition_id: u32) -> Self {
        self.definition_id = definition_id;
        self
    }

    pub fn starting_after(mut self, minutes: u32) -> Self {
        self.start_after_minutes = minutes;
        self
    }

    pub fn request(&self) -> WorkflowRequest {
        WorkflowRequest {
            definition_id: self.definition_id,
            inputs: BTreeMap::from([("plate_barcode".to_string(), self.plate_barcode.clone())]),
            start_after_minutes: self.start_after_minutes,
            reason: self.reason.clone(),
        }
    }
}

pub fn map_scheduler_error(e: SchedulerError) -> AnalysisError {
    AnalysisError::Scheduler(e.to_string())
}

/// Check the plate, then submit the monitoring workflow.
pub fn schedule_monitoring<S: WorkflowScheduler + ?Sized>(
    scheduler: &mut S,
    plan: &MonitoringPlan,
) -> Result<WorkflowTicket, AnalysisError> {
    let barcode = plan.plate_barcode.trim();
    if barcode.is_empty() {
        return Err(AnalysisError::Config("plate barcode must not be empty".into()));
    }

    let status = scheduler.check_plate(barcode).map_err(map_scheduler_error)?;
    if !status.available {
        return Err(AnalysisError::PlateUnavailable {
            barcode: barcode.to_string(),
            reason: status.reason.unwrap_or_else(|| "unknown".into()),
        });
    }
    tracing::debug!(plate = barcode, "plate available");

    let ticket = scheduler
        .submit_workflow(&plan.request())
        .map_err(map_scheduler_error)?;
    tracing::info!(
        plate = barcode,
        definition_id = plan.definition_id,
        ticket = %ticket,
        "workflow submitted"
    );
    if ticket.requires_approval {
        tracing::warn!(ticket = %ticket.id, "workflow requires operator approval before it runs");
    }
    Ok(ticket)
}

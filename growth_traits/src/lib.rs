pub mod workflow;

pub use workflow::{
    PlateStatus, SchedulerError, WorkflowRequest, WorkflowScheduler, WorkflowTicket,
};

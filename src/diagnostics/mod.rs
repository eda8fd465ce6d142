//! Diagnostics data model exposed by the detector.
//!
//! `DetectionReport` is the main entry point returned by the detector,
//! bundling both the compact result (`ScanResult`) and a `PipelineTrace`
//! describing every strategy the scan executed, with per-stage timings.

pub mod report;
pub mod timing;

pub use report::{
    CandidateDescriptor, DetectionReport, InputDescriptor, PipelineTrace, StrategyTrace,
};
pub use timing::{StageTiming, TimingBreakdown};

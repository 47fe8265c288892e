//! Typed per-asset results and the lookup contract.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PipeStatus {
    Open,
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ValveStatus {
    Active,
    Open,
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ValveWarning {
    CannotDeliverFlow,
    CannotDeliverPressure,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PumpStatus {
    On,
    Off,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PumpWarning {
    CannotDeliverHead,
    CannotDeliverFlow,
}

/// Asset kind as recorded by the solver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResultsAssetKind {
    Junction,
    /// Tanks and reservoirs.
    Tank,
    Pipe,
    Valve,
    Pump,
}

impl ResultsAssetKind {
    /// Map a solver link type code: 0 check-valve pipe, 1 pipe, 2 pump, 3.. valves.
    pub fn from_link_code(code: i32) -> Self {
        match code {
            0 | 1 => ResultsAssetKind::Pipe,
            2 => ResultsAssetKind::Pump,
            _ => ResultsAssetKind::Valve,
        }
    }
}

impl PipeStatus {
    pub fn from_code(code: f32) -> Self {
        if code < 3.0 {
            PipeStatus::Closed
        } else {
            PipeStatus::Open
        }
    }
}

impl ValveStatus {
    pub fn from_code(code: f32) -> Self {
        if code < 3.0 {
            ValveStatus::Closed
        } else if code == 4.0 {
            ValveStatus::Active
        } else {
            ValveStatus::Open
        }
    }
}

impl ValveWarning {
    pub fn from_code(code: f32) -> Option<Self> {
        if code == 6.0 {
            Some(ValveWarning::CannotDeliverFlow)
        } else if code == 7.0 {
            Some(ValveWarning::CannotDeliverPressure)
        } else {
            None
        }
    }
}

impl PumpStatus {
    pub fn from_code(code: f32) -> Self {
        if code >= 3.0 {
            PumpStatus::On
        } else {
            PumpStatus::Off
        }
    }
}

impl PumpWarning {
    pub fn from_code(code: f32) -> Option<Self> {
        if code == 0.0 {
            Some(PumpWarning::CannotDeliverHead)
        } else if code == 5.0 {
            Some(PumpWarning::CannotDeliverFlow)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct JunctionResults {
    pub pressure: f32,
    pub head: f32,
    pub demand: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TankResults {
    pub pressure: f32,
    pub head: f32,
    pub level: f32,
    pub volume: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PipeResults {
    pub flow: f32,
    pub velocity: f32,
    /// Total headloss over the pipe's length.
    pub headloss: f32,
    /// Headloss per 1000 length units, as reported by the solver.
    pub unit_headloss: f32,
    pub status: PipeStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ValveResults {
    pub flow: f32,
    pub velocity: f32,
    pub headloss: f32,
    pub status: ValveStatus,
    pub warning: Option<ValveWarning>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PumpResults {
    pub flow: f32,
    pub headloss: f32,
    pub status: PumpStatus,
    pub warning: Option<PumpWarning>,
}

/// Per-asset results of one reporting period, looked up by solver label.
pub trait ResultsSource {
    fn junction(&self, label: &str) -> Option<JunctionResults>;
    fn tank(&self, label: &str) -> Option<TankResults>;
    fn pipe(&self, label: &str) -> Option<PipeResults>;
    fn valve(&self, label: &str) -> Option<ValveResults>;
    fn pump(&self, label: &str) -> Option<PumpResults>;
}

// Copyright (c) 2026 Costwise
// SPDX-License-Identifier: AGPL-3.0

//! Stock Costwise pipeline agents.
//!
//! Three units cover the standard cost-analysis pipeline: the architecture
//! reader normalizes raw resource inventories into a structured architecture
//! document, the efficiency analyzer flags inefficiencies in it, and the cost
//! simulator projects the financial impact of acting on them. All three are
//! plain [`costwise_core::Agent`] implementations; the orchestration core has
//! no knowledge of them.

pub mod architecture_reader;
pub mod cost;
pub mod cost_simulator;
pub mod efficiency_analyzer;

pub use architecture_reader::ArchitectureReaderAgent;
pub use cost_simulator::CostSimulatorAgent;
pub use efficiency_analyzer::EfficiencyAnalyzerAgent;

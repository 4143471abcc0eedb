// Copyright (c) 2026 Costwise
// SPDX-License-Identifier: AGPL-3.0

pub mod agents;
pub mod run;
pub mod validate;

pub use agents::AgentsArgs;
pub use run::RunArgs;
pub use validate::ValidateArgs;

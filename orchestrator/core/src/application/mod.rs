// Copyright (c) 2026 Costwise
// SPDX-License-Identifier: AGPL-3.0

pub mod orchestrator;
pub mod router;
pub mod scheduler;
pub mod validation;

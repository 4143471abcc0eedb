// Copyright (c) 2026 Costwise
// SPDX-License-Identifier: AGPL-3.0

pub mod agent;
pub mod events;
pub mod workflow;

// Copyright (c) 2026 Costwise
// SPDX-License-Identifier: AGPL-3.0

pub mod clock;
pub mod event_bus;
pub mod manifest;

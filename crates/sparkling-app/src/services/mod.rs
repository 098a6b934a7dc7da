// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Service layer — wires the backend crates together for the console
// front-end and any embedding shell.

pub mod container_services;
pub mod data_dir;

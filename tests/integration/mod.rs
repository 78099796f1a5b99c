// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

pub mod enrichment_test;
pub mod repository_test;
pub mod run_service_test;

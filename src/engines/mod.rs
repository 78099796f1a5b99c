// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

pub mod chromium_driver;
pub mod place_lookup;
pub mod profiles;
pub mod traits;

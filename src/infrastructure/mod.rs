// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 基础设施层模块
///
/// 包含的子模块：
/// - 数据库（database）：数据库连接和实体映射
/// - 仓库实现（repositories）：领域仓库接口的具体实现
/// - 存储（storage）：批次产物、导出文件和诊断快照的存储
///
/// 基础设施层依赖于领域层的抽象接口，领域层不感知具体技术实现。
pub mod database;
pub mod repositories;
pub mod storage;

// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域层模块
///
/// 该模块包含系统的核心业务逻辑，包括：
/// - 领域模型（models）：供应商记录、运行批次和运行日志
/// - 仓库接口（repositories）：数据持久化抽象接口
/// - 服务（services）：采集、提取、规整、去重、补全和运行编排
///
/// 领域层只依赖抽象接口，不依赖具体的数据库或浏览器实现。
pub mod models;
pub mod repositories;
pub mod services;

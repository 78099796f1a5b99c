// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域模型模块
///
/// 该模块定义了系统的核心业务实体，包括：
/// - 供应商记录（vendor）：单条结构化的供应商信息及其占位值
/// - 运行批次（run_batch）：一次采集运行产出的有序记录集合及其落盘产物
/// - 运行日志（run_log）：只追加的运行结果记录
pub mod run_batch;
pub mod run_log;
pub mod vendor;

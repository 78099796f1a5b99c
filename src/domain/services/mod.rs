// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域服务模块
///
/// 包含的服务：
/// - 文本规整（normalizer）：地址与电话分离、样板文本清理
/// - 运行去重（deduplicator）：单次运行内的 `(name, location)` 去重
/// - 提取服务（extraction_service）：按定位链把原始条目转成供应商记录
/// - 采集服务（acquisition_service）：滚动结果容器并收集原始条目
/// - 节奏控制（pacing）：可注入的随机等待策略
/// - 补全服务（enrichment_service）：二次查询并合并缺失字段
/// - 运行服务（run_service）：串联一次完整运行、入库和导出
pub mod acquisition_service;
pub mod deduplicator;
pub mod enrichment_service;
pub mod extraction_service;
pub mod normalizer;
pub mod pacing;
pub mod run_service;

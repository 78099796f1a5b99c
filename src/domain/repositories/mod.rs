// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 仓库接口模块
///
/// 领域层只依赖这些抽象契约，具体实现由基础设施层提供：
/// - 供应商仓库（vendor_repository）：供应商记录的去重写入、统计和补全更新
/// - 运行日志仓库（run_log_repository）：只追加的运行结果日志
/// - 存储仓库（storage_repository）：批次产物、导出文件和诊断快照
pub mod run_log_repository;
pub mod storage_repository;
pub mod vendor_repository;

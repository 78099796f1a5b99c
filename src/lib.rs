// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 配置模块
///
/// 处理应用程序的配置设置和环境变量
pub mod config;

/// 领域模块
///
/// 包含核心业务实体、服务和仓库接口
pub mod domain;

/// 引擎模块
///
/// 浏览器驱动接口、Chromium 实现和各来源的页面画像
pub mod engines;

/// 基础设施模块
///
/// 提供数据库和产物存储的具体实现
pub mod infrastructure;

/// 工具模块
///
/// 错误类型和日志初始化
pub mod utils;

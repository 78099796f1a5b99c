// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::vendor::{RunContext, VendorRecord};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 列表来源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    /// 商户目录站点的搜索结果页
    Directory,
    /// 地图搜索结果流
    Maps,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Source::Directory => write!(f, "directory"),
            Source::Maps => write!(f, "maps"),
        }
    }
}

impl FromStr for Source {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "directory" => Ok(Source::Directory),
            "maps" => Ok(Source::Maps),
            other => Err(format!("unknown source: {}", other)),
        }
    }
}

/// 运行批次
///
/// 每次采集运行创建一个批次；运行完成后不再增删记录，
/// 只有补全流程会原地改写成员记录的 `phone`/`address`。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunBatch {
    pub category: String,
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<Source>,
    #[serde(default)]
    pub vendors: Vec<VendorRecord>,
}

impl RunBatch {
    pub fn new(ctx: &RunContext, source: Source) -> Self {
        Self {
            category: ctx.category.clone(),
            location: ctx.location.clone(),
            source: Some(source),
            vendors: Vec::new(),
        }
    }

    /// 从批次产物解析，并把批次级的类目和地点回填到每条记录
    pub fn from_json(data: &[u8]) -> Result<Self, serde_json::Error> {
        let mut batch: RunBatch = serde_json::from_slice(data)?;
        for vendor in &mut batch.vendors {
            vendor.category = batch.category.clone();
            vendor.location = batch.location.clone();
        }
        Ok(batch)
    }

    pub fn to_json(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec_pretty(self)
    }

    /// 批次产物的存储键
    pub fn artifact_key(&self) -> String {
        artifact_key(&self.category, &self.location)
    }
}

/// 产物文件名主干：`vendors_{category}_{location}`
///
/// 类目中的空格替换为下划线；地点中的空格替换为下划线，逗号和斜杠被去除
pub fn artifact_stem(category: &str, location: &str) -> String {
    let category = category.replace(' ', "_");
    let location = location.replace(' ', "_").replace([',', '/'], "");
    format!("vendors_{}_{}", category, location)
}

/// 批次产物（JSON）的存储键
pub fn artifact_key(category: &str, location: &str) -> String {
    format!("{}.json", artifact_stem(category, location))
}

/// 导出产物（CSV）的存储键
pub fn export_key(category: &str, location: &str) -> String {
    format!("{}.csv", artifact_stem(category, location))
}

// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 运行状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunStatus {
    Success,
    Failed,
    Warning,
    Exception,
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RunStatus::Success => write!(f, "Success"),
            RunStatus::Failed => write!(f, "Failed"),
            RunStatus::Warning => write!(f, "Warning"),
            RunStatus::Exception => write!(f, "Exception"),
        }
    }
}

impl FromStr for RunStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Success" => Ok(RunStatus::Success),
            "Failed" => Ok(RunStatus::Failed),
            "Warning" => Ok(RunStatus::Warning),
            "Exception" => Ok(RunStatus::Exception),
            other => Err(format!("unknown run status: {}", other)),
        }
    }
}

/// 运行日志
///
/// 由运行编排方创建，只追加，不修改也不删除
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScraperRunLog {
    pub timestamp: NaiveDateTime,
    pub category: String,
    pub location: String,
    pub status: RunStatus,
    pub message: String,
}

impl ScraperRunLog {
    pub fn now(
        category: impl Into<String>,
        location: impl Into<String>,
        status: RunStatus,
        message: impl Into<String>,
    ) -> Self {
        Self {
            timestamp: chrono::Utc::now().naive_utc(),
            category: category.into(),
            location: location.into(),
            status,
            message: message.into(),
        }
    }
}

// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Deserializer, Serialize};

/// 名称完全无法解析时使用的占位值
pub const UNKNOWN_VENDOR: &str = "Unknown Vendor";
/// 电话无法解析时使用的占位值
pub const PHONE_NOT_AVAILABLE: &str = "Not Available";
/// 评分无法解析时使用的占位值
pub const RATING_NOT_AVAILABLE: &str = "N/A";

/// 运行上下文
///
/// 由调用方提供的类目和地点，不从页面中推导
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunContext {
    pub category: String,
    pub location: String,
}

impl RunContext {
    pub fn new(category: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            location: location.into(),
        }
    }

    /// 地点的首段（逗号前的城市名）
    pub fn location_fragment(&self) -> &str {
        self.location.split(',').next().unwrap_or("").trim()
    }
}

/// 供应商记录
///
/// 持久化身份键为 `(name, phone, category, location)`。
/// `category` 与 `location` 属于批次级字段，不写入批次产物中的单条记录。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VendorRecord {
    pub name: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub phone: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub address: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub rating: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub snippet: String,
    #[serde(skip)]
    pub category: String,
    #[serde(skip)]
    pub location: String,
}

impl VendorRecord {
    /// 电话是否仍为空或占位值
    pub fn needs_phone(&self) -> bool {
        is_missing_phone(&self.phone)
    }
}

/// 判断电话字段是否为空或占位值
pub fn is_missing_phone(phone: &str) -> bool {
    let phone = phone.trim();
    phone.is_empty() || phone == PHONE_NOT_AVAILABLE || phone == RATING_NOT_AVAILABLE
}

fn nullable_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

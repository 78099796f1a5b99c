// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! 文本规整
//!
//! 纯函数：从地址文本中分离电话、去掉营业时间样板、修剪首尾分隔符，
//! 以及手机号/座机号的识别和校验

use once_cell::sync::Lazy;
use regex::Regex;

/// 手机号：可选 `+91` 前缀，首位 6-9，其后 9 位数字，可在第 5 位后用空格分组
static MOBILE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:\+91[\-\s]?|\b)[6-9]\d{4}\s?\d{5}\b").expect("Failed to compile mobile regex")
});

/// 座机号：2-5 位区号，可选分隔符，6-8 位号码
static LANDLINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b\d{2,5}[\-\s]?\d{6,8}\b").expect("Failed to compile landline regex")
});

static MOBILE_EXACT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:\+91[\-\s]?)?[6-9]\d{4}\s?\d{5}$").expect("Failed to compile mobile regex")
});

static LANDLINE_EXACT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{2,5}[\-\s]?\d{6,8}$").expect("Failed to compile landline regex")
});

/// 地址中夹带的电话：3-6 位数字、空白、5-8 位数字
static EMBEDDED_PHONE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b\d{3,6}\s\d{5,8}\b").expect("Failed to compile embedded phone regex")
});

/// 营业时间样板，例如 `Open · Closes 5 pm · `
///
/// 上下午标记必须独立成词，且其后必须跟间隔点或句点
static HOURS_BOILERPLATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"Open\b.{0,40}?Closes\b.{0,20}?[^A-Za-z][AaPp]\.?[Mm]\b.{0,10}?(?:\x{00b7}|\.)\s*")
        .expect("Failed to compile hours regex")
});

static EDGE_SEPARATORS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[\s\x{00b7},\-]+|[\s\x{00b7},\-]+$").expect("Failed to compile separator regex")
});

/// 规整地址文本
///
/// 返回 `(清理后的地址, 识别出的电话)`。电话子串从地址中原样移除；
/// 营业时间样板无论是否找到电话都会被去掉；最后修剪首尾的逗号、横线、间隔点和空白。
pub fn normalize(raw: &str) -> (String, Option<String>) {
    let phone = EMBEDDED_PHONE
        .find(raw)
        .map(|m| m.as_str().to_string());

    let address = match phone {
        Some(ref phone) => raw.replacen(phone.as_str(), "", 1),
        None => raw.to_string(),
    };

    (strip_hours(&address), phone)
}

/// 只去掉营业时间样板并修剪首尾分隔符，保留其中的数字
pub fn strip_hours(raw: &str) -> String {
    let address = HOURS_BOILERPLATE.replace_all(raw, "");
    let address = EDGE_SEPARATORS.replace_all(address.trim(), "");
    address.trim().to_string()
}

/// 文本是否带有营业时间样板
pub fn has_hours_boilerplate(text: &str) -> bool {
    HOURS_BOILERPLATE.is_match(text)
}

/// 在任意文本中查找电话，手机号优先于座机号
pub fn find_phone(text: &str) -> Option<String> {
    MOBILE
        .find(text)
        .or_else(|| LANDLINE.find(text))
        .map(|m| m.as_str().trim().to_string())
}

/// 整个字符串是否是合法的手机号或座机号
pub fn is_valid_phone(phone: &str) -> bool {
    let phone = phone.trim();
    MOBILE_EXACT.is_match(phone) || LANDLINE_EXACT.is_match(phone)
}

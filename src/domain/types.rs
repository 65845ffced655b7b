// ==========================================
// 植物养护记录系统 - 领域类型定义
// ==========================================
// 职责: 十六进制 ID、测量类型、校正模式等基础类型
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

// ==========================================
// HexId - 后端资源 ID
// ==========================================
// 后端使用 32 位十六进制（BINARY(16) 的 hex 形式）作为主键
// 接受带连字符的 UUID 文本，统一规范为小写 simple 形式
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HexId(String);

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HexIdError {
    #[error("ID 为空")]
    Empty,

    #[error("ID 格式无效（应为 32 位十六进制）: {0}")]
    Invalid(String),
}

impl HexId {
    /// 解析并规范化 ID
    pub fn parse(raw: &str) -> Result<Self, HexIdError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(HexIdError::Empty);
        }

        let parsed =
            Uuid::try_parse(trimmed).map_err(|_| HexIdError::Invalid(trimmed.to_string()))?;
        Ok(Self(parsed.simple().to_string()))
    }

    /// 生成新的随机 ID（仅用于测试数据与本地草稿）
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for HexId {
    type Error = HexIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        HexId::parse(&value)
    }
}

impl From<HexId> for String {
    fn from(id: HexId) -> Self {
        id.0
    }
}

impl AsRef<str> for HexId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// ==========================================
// 测量类型 (Measurement Kind)
// ==========================================
// 对应 /measurements/{weight|watering|repotting}
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeasurementKind {
    Weight,    // 称重
    Watering,  // 浇水
    Repotting, // 换盆
}

impl MeasurementKind {
    /// URL 路径段
    pub fn path_segment(&self) -> &'static str {
        match self {
            MeasurementKind::Weight => "weight",
            MeasurementKind::Watering => "watering",
            MeasurementKind::Repotting => "repotting",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "weight" | "measurement" => Some(MeasurementKind::Weight),
            "watering" | "water" => Some(MeasurementKind::Watering),
            "repotting" | "repot" => Some(MeasurementKind::Repotting),
            _ => None,
        }
    }
}

impl fmt::Display for MeasurementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path_segment())
    }
}

// ==========================================
// 校正上限模式 (Correction Cap Mode)
// ==========================================
// capacity: 以 min_dry + max_water 为上限
// retained_ratio: 以推荐保水比例为上限
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrectionCapMode {
    #[default]
    Capacity,
    RetainedRatio,
}

impl CorrectionCapMode {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "capacity" => Some(CorrectionCapMode::Capacity),
            "retained_ratio" | "retained-ratio" => Some(CorrectionCapMode::RetainedRatio),
            _ => None,
        }
    }
}

impl fmt::Display for CorrectionCapMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CorrectionCapMode::Capacity => write!(f, "capacity"),
            CorrectionCapMode::RetainedRatio => write!(f, "retained_ratio"),
        }
    }
}

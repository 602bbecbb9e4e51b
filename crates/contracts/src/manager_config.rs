//! SinkConfig - Config Loader output
//!
//! 每个 manager 的不可变配置包，以及可枚举的 locale / units 取值。

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::ContractError;

/// 单个 manager 的完整配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SinkConfig {
    /// Manager 名称 (registry 内大小写不敏感唯一)
    pub name: String,

    /// Google API key
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,

    /// 过滤规则文件
    pub filters: PathBuf,

    /// 告警配置文件
    pub alarms: PathBuf,

    /// 地理围栏文件 (可选)
    #[serde(default)]
    pub geofences: Option<PathBuf>,

    /// 位置 (地址或坐标)
    #[serde(default)]
    pub location: Option<String>,

    /// 名称本地化
    #[serde(default)]
    pub locale: Locale,

    /// 距离单位
    #[serde(default)]
    pub units: Units,

    /// 最小剩余时间 (秒)
    #[serde(default)]
    pub time_limit: u64,

    /// 通知使用的时区 (e.g. "America/Los_Angeles")
    #[serde(default)]
    pub timezone: Option<String>,
}

impl SinkConfig {
    /// 使用默认参数创建配置
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            api_key: None,
            filters: PathBuf::from(DEFAULT_FILTERS_FILE),
            alarms: PathBuf::from(DEFAULT_ALARMS_FILE),
            geofences: None,
            location: None,
            locale: Locale::default(),
            units: Units::default(),
            time_limit: 0,
            timezone: None,
        }
    }

    /// Registry 使用的规范化名称
    pub fn registry_key(&self) -> String {
        registry_key(&self.name)
    }
}

/// 默认过滤规则文件
pub const DEFAULT_FILTERS_FILE: &str = "filters.json";

/// 默认告警配置文件
pub const DEFAULT_ALARMS_FILE: &str = "alarms.json";

/// 名称规范化：大小写不敏感比较
pub fn registry_key(name: &str) -> String {
    name.to_lowercase()
}

/// 支持的 locale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Locale {
    De,
    #[default]
    En,
    Fr,
    It,
    PtBr,
    Ru,
    ZhCn,
    ZhHk,
    ZhTw,
}

impl Locale {
    /// 所有取值
    pub const ALL: [Locale; 9] = [
        Locale::De,
        Locale::En,
        Locale::Fr,
        Locale::It,
        Locale::PtBr,
        Locale::Ru,
        Locale::ZhCn,
        Locale::ZhHk,
        Locale::ZhTw,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Locale::De => "de",
            Locale::En => "en",
            Locale::Fr => "fr",
            Locale::It => "it",
            Locale::PtBr => "pt_br",
            Locale::Ru => "ru",
            Locale::ZhCn => "zh_cn",
            Locale::ZhHk => "zh_hk",
            Locale::ZhTw => "zh_tw",
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Locale {
    type Err = ContractError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Locale::ALL
            .iter()
            .copied()
            .find(|locale| locale.as_str() == wanted)
            .ok_or_else(|| {
                let choices: Vec<_> = Locale::ALL.iter().map(|l| l.as_str()).collect();
                ContractError::config_validation(
                    "locale",
                    format!("unsupported locale '{s}', expected one of {choices:?}"),
                )
            })
    }
}

/// 距离单位
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Units {
    Metric,
    #[default]
    Imperial,
}

impl Units {
    pub fn as_str(&self) -> &'static str {
        match self {
            Units::Metric => "metric",
            Units::Imperial => "imperial",
        }
    }
}

impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Units {
    type Err = ContractError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "metric" => Ok(Units::Metric),
            "imperial" => Ok(Units::Imperial),
            _ => Err(ContractError::config_validation(
                "units",
                format!("unsupported units '{s}', expected 'metric' or 'imperial'"),
            )),
        }
    }
}

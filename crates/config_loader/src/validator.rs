//! 配置校验模块
//!
//! 校验规则：
//! - mgr_count >= 1
//! - host 非空
//! - manager 名称非空
//! - manager 名称唯一 (大小写不敏感)

use std::collections::HashSet;

use contracts::{registry_key, ContractError, SinkConfig};

use crate::source::SettingsSource;

/// 校验来源中的标量配置
pub fn validate_source(source: &SettingsSource) -> Result<(), ContractError> {
    if source.mgr_count == Some(0) {
        return Err(ContractError::config_validation(
            "mgr_count",
            "at least one manager is required",
        ));
    }

    if let Some(host) = &source.host {
        if host.trim().is_empty() {
            return Err(ContractError::config_validation(
                "host",
                "host cannot be empty",
            ));
        }
    }

    Ok(())
}

/// 校验解析后的 manager 配置
///
/// 返回第一个遇到的错误，或 Ok(())。
pub fn validate_manager_configs(configs: &[SinkConfig]) -> Result<(), ContractError> {
    let mut seen = HashSet::new();
    for (idx, config) in configs.iter().enumerate() {
        if config.name.trim().is_empty() {
            return Err(ContractError::config_validation(
                format!("managers[{idx}]"),
                "manager name cannot be empty",
            ));
        }
        if !seen.insert(registry_key(&config.name)) {
            return Err(ContractError::duplicate_sink_name(&config.name));
        }
    }
    Ok(())
}

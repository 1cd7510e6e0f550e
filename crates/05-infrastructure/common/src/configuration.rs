//! 容器构建策略配置
//!
//! 策略在创建构建器时传入。宿主应用可以从自己的配置文本中绑定这些选项，
//! 引擎本身不读取文件或环境变量。

use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};

/// 构造函数选择策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstructorSelection {
    /// 每个可构造类型必须恰好有一个构造函数
    #[default]
    Strict,
    /// 选择参数最多且全部可满足的构造函数
    MostSatisfiableParameters,
}

/// 瞬时可释放服务的处理策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransientDisposables {
    /// 拒绝注册实现了释放契约的瞬时服务
    #[default]
    Reject,
    /// 允许注册，并在作用域释放时一并释放
    TrackAndDispose,
}

/// 同一构建器内重复注册的处理策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SecondRegistration {
    /// 返回注册错误
    #[default]
    Throw,
    /// 保留第一次注册
    Ignore,
    /// 用新的注册覆盖旧的注册（保持原有位置）
    Rewrite,
}

/// 构建器选项
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BuilderOptions {
    /// 构造函数选择策略
    pub constructor_selection: ConstructorSelection,
    /// 瞬时可释放服务策略
    pub transient_disposables: TransientDisposables,
    /// 重复注册策略
    pub second_registration: SecondRegistration,
}

impl BuilderOptions {
    /// 创建默认选项
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置构造函数选择策略
    pub fn with_constructor_selection(mut self, selection: ConstructorSelection) -> Self {
        self.constructor_selection = selection;
        self
    }

    /// 设置瞬时可释放服务策略
    pub fn with_transient_disposables(mut self, policy: TransientDisposables) -> Self {
        self.transient_disposables = policy;
        self
    }

    /// 设置重复注册策略
    pub fn with_second_registration(mut self, policy: SecondRegistration) -> Self {
        self.second_registration = policy;
        self
    }

    /// 是否跟踪并释放瞬时服务
    pub fn tracks_transient_disposables(&self) -> bool {
        self.transient_disposables == TransientDisposables::TrackAndDispose
    }

    /// 从 TOML 文本绑定选项
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|e| ConfigError::ParseError {
            format: "toml",
            message: e.to_string(),
        })
    }

    /// 从 JSON 文本绑定选项
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(text).map_err(|e| ConfigError::ParseError {
            format: "json",
            message: e.to_string(),
        })
    }
}

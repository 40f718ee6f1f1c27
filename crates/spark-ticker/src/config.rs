//! # config 模块说明
//!
//! ## 角色定位（Why）
//! - 节律周期通常来自静态配置而非运行期计算，本模块提供 TOML 形态的配置入口，
//!   并把“周期必须为正”的校验前移到解析阶段；
//! - 同时暴露底层计时器的两项策略：错过节拍时的补偿方式与首个节拍的时机。
//!
//! ## 配置格式（What）
//! ```toml
//! interval_ms = 250        # 必填，必须大于零
//! missed_tick = "skip"     # 可选：burst / delay / skip，默认 skip
//! first_tick = "delayed"   # 可选：delayed / immediate，默认 delayed
//! ```
//!
//! ## 实现策略（How）
//! - 使用 `serde` 派生反序列化，`deny_unknown_fields` 拒绝拼写错误的键；
//! - `interval_ms` 通过自定义反序列化函数直接构造 [`Period`]，零值在解析时即报错。

use serde::{Deserialize, Deserializer};
use tokio::time::MissedTickBehavior;

use crate::error::Result;
use crate::period::Period;

/// 底层计时器错过节拍后的补偿策略。
///
/// # 教案式注释
/// - **意图 (Why)**：控制循环被调度延迟时，底层计时器可能累计多个到期节拍，需要明确补偿方式；
/// - **契约 (What)**：与 Tokio [`MissedTickBehavior`] 一一对应，默认 `Skip`，
///   即跳到下一个对齐时间点，避免在输出通道本已满载时再突发补发；
/// - **注意 (Trade-offs)**：无论选择哪种策略，输出通道容量恒为 1，多余节拍仍会被丢弃。
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissedTickPolicy {
    /// 立即补发所有错过的节拍。
    Burst,
    /// 从实际触发时刻重新计算下一个周期。
    Delay,
    /// 跳过错过的节拍，对齐到下一个周期边界。
    #[default]
    Skip,
}

impl MissedTickPolicy {
    pub(crate) fn to_tokio(self) -> MissedTickBehavior {
        match self {
            MissedTickPolicy::Burst => MissedTickBehavior::Burst,
            MissedTickPolicy::Delay => MissedTickBehavior::Delay,
            MissedTickPolicy::Skip => MissedTickBehavior::Skip,
        }
    }
}

/// 计时器启动（或重建）后首个节拍的时机。
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FirstTick {
    /// 启动后等待一个完整周期再触发。
    #[default]
    Delayed,
    /// 启动时立即触发一次，其后按周期触发。
    Immediate,
}

/// 节律器配置。
///
/// # 教案式注释
/// - **意图 (Why)**：集中描述构造节律器所需的全部参数，既可从 TOML 加载，也可在代码中链式构造；
/// - **契约 (What)**：
///   - `interval`：初始周期，恒大于零；
///   - `missed_tick`：见 [`MissedTickPolicy`]；
///   - `first_tick`：见 [`FirstTick`]；
/// - **注意 (Trade-offs)**：TOML 中周期以整数毫秒表示，亚毫秒周期需通过 [`TickerConfig::new`] 构造。
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TickerConfig {
    #[serde(rename = "interval_ms", deserialize_with = "period_from_millis")]
    interval: Period,
    #[serde(default)]
    missed_tick: MissedTickPolicy,
    #[serde(default)]
    first_tick: FirstTick,
}

impl TickerConfig {
    /// 以默认策略构造配置。
    pub fn new(interval: Period) -> Self {
        Self {
            interval,
            missed_tick: MissedTickPolicy::default(),
            first_tick: FirstTick::default(),
        }
    }

    /// 从 TOML 文本解析配置。
    ///
    /// ### 教案式说明
    /// - **契约 (What)**：缺少 `interval_ms`、出现未知键、策略取值非法或周期为零时返回
    ///   [`TickerError::Config`](crate::TickerError::Config)，错误信息保留行列位置；
    /// - **实现 (How)**：直接委托 `toml::from_str`，校验逻辑全部位于反序列化过程内部。
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// 替换错过节拍的补偿策略。
    pub fn with_missed_tick(mut self, policy: MissedTickPolicy) -> Self {
        self.missed_tick = policy;
        self
    }

    /// 替换首个节拍的时机。
    pub fn with_first_tick(mut self, first_tick: FirstTick) -> Self {
        self.first_tick = first_tick;
        self
    }

    pub fn interval(&self) -> Period {
        self.interval
    }

    pub fn missed_tick(&self) -> MissedTickPolicy {
        self.missed_tick
    }

    pub fn first_tick(&self) -> FirstTick {
        self.first_tick
    }
}

fn period_from_millis<'de, D>(deserializer: D) -> core::result::Result<Period, D::Error>
where
    D: Deserializer<'de>,
{
    let millis = u64::deserialize(deserializer)?;
    Period::from_millis(millis).map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::error::TickerError;

    #[test]
    fn parses_full_document() {
        let config = TickerConfig::from_toml_str(
            r#"
            interval_ms = 250
            missed_tick = "delay"
            first_tick = "immediate"
            "#,
        )
        .expect("完整配置应当解析成功");

        assert_eq!(config.interval().as_duration(), Duration::from_millis(250));
        assert_eq!(config.missed_tick(), MissedTickPolicy::Delay);
        assert_eq!(config.first_tick(), FirstTick::Immediate);
    }

    #[test]
    fn policies_fall_back_to_defaults() {
        let config = TickerConfig::from_toml_str("interval_ms = 5").expect("仅含周期的配置合法");
        assert_eq!(config.missed_tick(), MissedTickPolicy::Skip);
        assert_eq!(config.first_tick(), FirstTick::Delayed);
        assert_eq!(
            config,
            TickerConfig::new(Period::from_millis(5).expect("5ms"))
        );
    }

    #[test]
    fn zero_interval_is_rejected_while_parsing() {
        let err = TickerConfig::from_toml_str("interval_ms = 0").expect_err("零周期必须被拒绝");
        assert!(matches!(err, TickerError::Config(_)));
        assert!(
            err.to_string().contains("non-positive interval provided"),
            "错误信息应指明周期非法: {err}"
        );
    }

    #[test]
    fn unknown_keys_and_bad_policies_are_rejected() {
        assert!(matches!(
            TickerConfig::from_toml_str("interval_ms = 5\nintervall = 3"),
            Err(TickerError::Config(_))
        ));
        assert!(matches!(
            TickerConfig::from_toml_str("interval_ms = 5\nmissed_tick = \"catch_up\""),
            Err(TickerError::Config(_))
        ));
        assert!(matches!(
            TickerConfig::from_toml_str("missed_tick = \"skip\""),
            Err(TickerError::Config(_))
        ));
    }

    #[test]
    fn builder_overrides_policies() {
        let config = TickerConfig::new(Period::from_millis(1).expect("1ms"))
            .with_missed_tick(MissedTickPolicy::Burst)
            .with_first_tick(FirstTick::Immediate);
        assert_eq!(config.missed_tick().to_tokio(), MissedTickBehavior::Burst);
        assert_eq!(config.first_tick(), FirstTick::Immediate);
    }
}

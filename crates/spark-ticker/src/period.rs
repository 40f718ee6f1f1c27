use core::fmt;
use std::time::Duration;

use crate::error::{Result, TickerError};

/// 严格为正的节律周期。
///
/// # 教案式注释
/// - **意图 (Why)**：控制循环只接受经过校验的周期，把“周期必须大于零”的不变量编码进类型，
///   让循环内部无需再做防御性判断；
/// - **契约 (What)**：`Period::new` 在输入为零时返回 [`TickerError::InvalidDuration`]；
///   成功构造的值在整个生命周期内恒大于零；
/// - **注意 (Trade-offs)**：`Duration` 本身不存在负值，因此原始语义中的“非正”在此仅对应零。
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Period(Duration);

impl Period {
    /// 校验并包装周期。
    pub fn new(duration: Duration) -> Result<Self> {
        if duration.is_zero() {
            return Err(TickerError::InvalidDuration);
        }
        Ok(Self(duration))
    }

    /// 以毫秒构造周期，常用于配置文件中的整数字段。
    pub fn from_millis(millis: u64) -> Result<Self> {
        Self::new(Duration::from_millis(millis))
    }

    /// 返回内部的 `Duration`。
    pub const fn as_duration(self) -> Duration {
        self.0
    }
}

impl TryFrom<Duration> for Period {
    type Error = TickerError;

    fn try_from(value: Duration) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Period> for Duration {
    fn from(value: Period) -> Self {
        value.0
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.0)
    }
}

//! 统一 API 错误码定义

use serde_repr::{Deserialize_repr, Serialize_repr};

use crate::errors::LinktrailError;

/// API 错误码枚举
///
/// 按千位分域：
/// - 0: 成功
/// - 1000-1099: 通用错误
/// - 3000-3099: 链接错误
/// - 4000-4099: 转化错误
/// - 6000-6099: 分析错误
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize_repr, Deserialize_repr)]
#[repr(i32)]
pub enum ErrorCode {
    // 成功
    Success = 0,

    // 通用错误 1000-1099
    BadRequest = 1000,
    NotFound = 1004,
    InternalServerError = 1005,
    InvalidDateFormat = 1012,
    ServiceUnavailable = 1030,

    // 链接错误 3000-3099
    LinkNotFound = 3000,
    AliasTaken = 3001,
    LinkInvalidUrl = 3002,
    LinkInvalidAlias = 3003,
    LinkInvalidVideoId = 3004,
    CodeSpaceExhausted = 3005,

    // 转化错误 4000-4099
    ConversionInvalid = 4000,
    UnknownTrackingId = 4001,
    WindowExpired = 4002,

    // 分析错误 6000-6099
    AnalyticsQueryFailed = 6000,
    AnalyticsInvalidDateRange = 6002,
    AnalyticsUnknownMetric = 6003,
}

impl From<LinktrailError> for ErrorCode {
    fn from(err: LinktrailError) -> Self {
        match err {
            LinktrailError::Validation(_) => ErrorCode::BadRequest,
            LinktrailError::NotFound(_) => ErrorCode::NotFound,
            LinktrailError::Conflict(_) => ErrorCode::AliasTaken,
            LinktrailError::WindowExpired(_) => ErrorCode::WindowExpired,
            LinktrailError::ExhaustedAttempts(_) => ErrorCode::CodeSpaceExhausted,
            LinktrailError::DateParse(_) => ErrorCode::InvalidDateFormat,
            LinktrailError::DatabaseConnection(_) => ErrorCode::ServiceUnavailable,
            LinktrailError::DatabaseOperation(_)
            | LinktrailError::Serialization(_)
            | LinktrailError::Config(_) => ErrorCode::InternalServerError,
        }
    }
}

use std::fmt;

use actix_web::http::StatusCode;

#[derive(Debug, Clone)]
pub enum LinktrailError {
    Validation(String),
    NotFound(String),
    Conflict(String),
    WindowExpired(String),
    ExhaustedAttempts(String),
    DatabaseConnection(String),
    DatabaseOperation(String),
    Serialization(String),
    DateParse(String),
    Config(String),
}

impl LinktrailError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            LinktrailError::Validation(_) => "E001",
            LinktrailError::NotFound(_) => "E002",
            LinktrailError::Conflict(_) => "E003",
            LinktrailError::WindowExpired(_) => "E004",
            LinktrailError::ExhaustedAttempts(_) => "E005",
            LinktrailError::DatabaseConnection(_) => "E006",
            LinktrailError::DatabaseOperation(_) => "E007",
            LinktrailError::Serialization(_) => "E008",
            LinktrailError::DateParse(_) => "E009",
            LinktrailError::Config(_) => "E010",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            LinktrailError::Validation(_) => "Validation Error",
            LinktrailError::NotFound(_) => "Resource Not Found",
            LinktrailError::Conflict(_) => "Uniqueness Conflict",
            LinktrailError::WindowExpired(_) => "Attribution Window Expired",
            LinktrailError::ExhaustedAttempts(_) => "Code Generation Exhausted",
            LinktrailError::DatabaseConnection(_) => "Database Connection Error",
            LinktrailError::DatabaseOperation(_) => "Database Operation Error",
            LinktrailError::Serialization(_) => "Serialization Error",
            LinktrailError::DateParse(_) => "Date Parse Error",
            LinktrailError::Config(_) => "Configuration Error",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> &str {
        match self {
            LinktrailError::Validation(msg) => msg,
            LinktrailError::NotFound(msg) => msg,
            LinktrailError::Conflict(msg) => msg,
            LinktrailError::WindowExpired(msg) => msg,
            LinktrailError::ExhaustedAttempts(msg) => msg,
            LinktrailError::DatabaseConnection(msg) => msg,
            LinktrailError::DatabaseOperation(msg) => msg,
            LinktrailError::Serialization(msg) => msg,
            LinktrailError::DateParse(msg) => msg,
            LinktrailError::Config(msg) => msg,
        }
    }

    /// HTTP 状态码映射
    ///
    /// Validation/WindowExpired 属于调用方错误；ExhaustedAttempts 属于
    /// 运行期容量问题，频繁出现时应当告警。
    pub fn http_status(&self) -> StatusCode {
        match self {
            LinktrailError::Validation(_) => StatusCode::BAD_REQUEST,
            LinktrailError::NotFound(_) => StatusCode::NOT_FOUND,
            LinktrailError::Conflict(_) => StatusCode::CONFLICT,
            LinktrailError::WindowExpired(_) => StatusCode::BAD_REQUEST,
            LinktrailError::ExhaustedAttempts(_) => StatusCode::SERVICE_UNAVAILABLE,
            LinktrailError::DateParse(_) => StatusCode::BAD_REQUEST,
            LinktrailError::DatabaseConnection(_)
            | LinktrailError::DatabaseOperation(_)
            | LinktrailError::Serialization(_)
            | LinktrailError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 格式化为简洁输出
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for LinktrailError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for LinktrailError {}

// 便捷的构造函数
impl LinktrailError {
    pub fn validation<T: Into<String>>(msg: T) -> Self {
        LinktrailError::Validation(msg.into())
    }

    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        LinktrailError::NotFound(msg.into())
    }

    pub fn conflict<T: Into<String>>(msg: T) -> Self {
        LinktrailError::Conflict(msg.into())
    }

    pub fn window_expired<T: Into<String>>(msg: T) -> Self {
        LinktrailError::WindowExpired(msg.into())
    }

    pub fn exhausted_attempts<T: Into<String>>(msg: T) -> Self {
        LinktrailError::ExhaustedAttempts(msg.into())
    }

    pub fn database_connection<T: Into<String>>(msg: T) -> Self {
        LinktrailError::DatabaseConnection(msg.into())
    }

    pub fn database_operation<T: Into<String>>(msg: T) -> Self {
        LinktrailError::DatabaseOperation(msg.into())
    }

    pub fn serialization<T: Into<String>>(msg: T) -> Self {
        LinktrailError::Serialization(msg.into())
    }

    pub fn date_parse<T: Into<String>>(msg: T) -> Self {
        LinktrailError::DateParse(msg.into())
    }

    pub fn config<T: Into<String>>(msg: T) -> Self {
        LinktrailError::Config(msg.into())
    }
}

// 为常见的错误类型实现 From trait
impl From<sea_orm::DbErr> for LinktrailError {
    fn from(err: sea_orm::DbErr) -> Self {
        LinktrailError::DatabaseOperation(err.to_string())
    }
}

impl From<serde_json::Error> for LinktrailError {
    fn from(err: serde_json::Error) -> Self {
        LinktrailError::Serialization(err.to_string())
    }
}

impl From<chrono::ParseError> for LinktrailError {
    fn from(err: chrono::ParseError) -> Self {
        LinktrailError::DateParse(err.to_string())
    }
}

impl From<url::ParseError> for LinktrailError {
    fn from(err: url::ParseError) -> Self {
        LinktrailError::Validation(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, LinktrailError>;

use std::fmt;

/// 应用程序错误类型
#[derive(Debug)]
pub enum AppError {
    /// 文档转换错误
    Convert(ConvertError),
    /// 解析错误
    Parse(ParseError),
    /// 记录上传错误
    Upload(UploadError),
    /// 文件操作错误
    File(FileError),
    /// 配置错误
    Config(ConfigError),
    /// 其他错误（用于包装第三方库错误）
    Other(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Convert(e) => write!(f, "转换错误: {}", e),
            AppError::Parse(e) => write!(f, "解析错误: {}", e),
            AppError::Upload(e) => write!(f, "上传错误: {}", e),
            AppError::File(e) => write!(f, "文件错误: {}", e),
            AppError::Config(e) => write!(f, "配置错误: {}", e),
            AppError::Other(msg) => write!(f, "错误: {}", msg),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Convert(e) => Some(e),
            AppError::Parse(e) => Some(e),
            AppError::Upload(e) => Some(e),
            AppError::File(e) => Some(e),
            AppError::Config(e) => Some(e),
            AppError::Other(_) => None,
        }
    }
}

/// 文档转换错误
#[derive(Debug)]
pub enum ConvertError {
    /// 无法启动转换程序
    LaunchFailed {
        program: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 转换程序以失败状态退出
    ConversionFailed {
        path: String,
        stderr: String,
    },
    /// 读取转换输出失败
    OutputReadFailed {
        path: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl fmt::Display for ConvertError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConvertError::LaunchFailed { program, source } => {
                write!(f, "无法启动 {}: {}", program, source)
            }
            ConvertError::ConversionFailed { path, stderr } => {
                write!(f, "文档转换失败 ({}): {}", path, stderr)
            }
            ConvertError::OutputReadFailed { path, source } => {
                write!(f, "读取转换输出失败 ({}): {}", path, source)
            }
        }
    }
}

impl std::error::Error for ConvertError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConvertError::LaunchFailed { source, .. }
            | ConvertError::OutputReadFailed { source, .. } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
            ConvertError::ConversionFailed { .. } => None,
        }
    }
}

/// 解析错误
#[derive(Debug)]
pub enum ParseError {
    /// 文档包无法打开
    PackageOpenFailed {
        path: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 正则构建失败
    PatternBuildFailed {
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::PackageOpenFailed { path, source } => {
                write!(f, "无法打开文档包 ({}): {}", path, source)
            }
            ParseError::PatternBuildFailed { source } => {
                write!(f, "正则构建失败: {}", source)
            }
        }
    }
}

impl std::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ParseError::PackageOpenFailed { source, .. }
            | ParseError::PatternBuildFailed { source } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
        }
    }
}

/// 记录上传错误
#[derive(Debug)]
pub enum UploadError {
    /// 网络请求失败
    RequestFailed {
        endpoint: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 存储端返回错误状态
    BadStatus {
        endpoint: String,
        status: u16,
        body: String,
    },
    /// 返回内容无法解析
    ResponseParseFailed {
        endpoint: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 重试耗尽
    RetriesExhausted {
        attempts: usize,
    },
}

impl fmt::Display for UploadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UploadError::RequestFailed { endpoint, source } => {
                write!(f, "上传请求失败 ({}): {}", endpoint, source)
            }
            UploadError::BadStatus {
                endpoint,
                status,
                body,
            } => {
                write!(f, "存储端返回错误状态 ({}): {} {}", endpoint, status, body)
            }
            UploadError::ResponseParseFailed { endpoint, source } => {
                write!(f, "存储端返回内容无法解析 ({}): {}", endpoint, source)
            }
            UploadError::RetriesExhausted { attempts } => {
                write!(f, "记录上传失败，已尝试 {} 次", attempts)
            }
        }
    }
}

impl std::error::Error for UploadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            UploadError::RequestFailed { source, .. }
            | UploadError::ResponseParseFailed { source, .. } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
            _ => None,
        }
    }
}

/// 文件操作错误
#[derive(Debug)]
pub enum FileError {
    /// 文件不存在
    NotFound {
        path: String,
    },
    /// 读取文件失败
    ReadFailed {
        path: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 写入文件失败
    WriteFailed {
        path: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// TOML 解析失败
    TomlParseFailed {
        path: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl fmt::Display for FileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileError::NotFound { path } => write!(f, "文件不存在: {}", path),
            FileError::ReadFailed { path, source } => {
                write!(f, "读取文件失败 ({}): {}", path, source)
            }
            FileError::WriteFailed { path, source } => {
                write!(f, "写入文件失败 ({}): {}", path, source)
            }
            FileError::TomlParseFailed { path, source } => {
                write!(f, "TOML解析失败 ({}): {}", path, source)
            }
        }
    }
}

impl std::error::Error for FileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FileError::ReadFailed { source, .. }
            | FileError::WriteFailed { source, .. }
            | FileError::TomlParseFailed { source, .. } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
            _ => None,
        }
    }
}

/// 配置错误
#[derive(Debug)]
pub enum ConfigError {
    /// 环境变量解析失败
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
    /// 缺少必需的配置项
    MissingValue {
        field: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::EnvVarParseFailed {
                var_name,
                value,
                expected_type,
            } => {
                write!(
                    f,
                    "环境变量 {} 解析失败: 值 '{}' 无法转换为 {}",
                    var_name, value, expected_type
                )
            }
            ConfigError::MissingValue { field } => {
                write!(f, "缺少必需的配置项: {}", field)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

// ========== 从常见错误类型转换 ==========
// 注意：不需要手动实现 From<AppError> for anyhow::Error，
// anyhow 已经为所有实现了 std::error::Error 的类型提供了自动实现

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::File(FileError::ReadFailed {
            path: String::new(),
            source: Box::new(err),
        })
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Other(format!("JSON处理失败: {}", err))
    }
}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        AppError::File(FileError::TomlParseFailed {
            path: String::new(), // TOML错误通常不包含路径信息
            source: Box::new(err),
        })
    }
}

impl From<regex::Error> for AppError {
    fn from(err: regex::Error) -> Self {
        AppError::Parse(ParseError::PatternBuildFailed {
            source: Box::new(err),
        })
    }
}

impl From<zip::result::ZipError> for AppError {
    fn from(err: zip::result::ZipError) -> Self {
        AppError::Parse(ParseError::PackageOpenFailed {
            path: String::new(),
            source: Box::new(err),
        })
    }
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建转换程序启动失败错误
    pub fn convert_launch_failed(
        program: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Convert(ConvertError::LaunchFailed {
            program: program.into(),
            source: Box::new(source),
        })
    }

    /// 创建文档转换失败错误
    pub fn conversion_failed(path: impl Into<String>, stderr: impl Into<String>) -> Self {
        AppError::Convert(ConvertError::ConversionFailed {
            path: path.into(),
            stderr: stderr.into(),
        })
    }

    /// 创建转换输出读取失败错误
    pub fn output_read_failed(
        path: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Convert(ConvertError::OutputReadFailed {
            path: path.into(),
            source: Box::new(source),
        })
    }

    /// 创建上传请求失败错误
    pub fn upload_request_failed(
        endpoint: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Upload(UploadError::RequestFailed {
            endpoint: endpoint.into(),
            source: Box::new(source),
        })
    }

    /// 创建存储端错误状态错误
    pub fn upload_bad_status(
        endpoint: impl Into<String>,
        status: u16,
        body: impl Into<String>,
    ) -> Self {
        AppError::Upload(UploadError::BadStatus {
            endpoint: endpoint.into(),
            status,
            body: body.into(),
        })
    }

    /// 创建返回内容解析失败错误
    pub fn upload_response_parse_failed(
        endpoint: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Upload(UploadError::ResponseParseFailed {
            endpoint: endpoint.into(),
            source: Box::new(source),
        })
    }

    /// 创建重试耗尽错误
    pub fn upload_retries_exhausted(attempts: usize) -> Self {
        AppError::Upload(UploadError::RetriesExhausted { attempts })
    }

    /// 创建文件不存在错误
    pub fn file_not_found(path: impl Into<String>) -> Self {
        AppError::File(FileError::NotFound { path: path.into() })
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;

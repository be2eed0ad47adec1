//! License Port - 许可证服务

/// License Service Port
pub trait LicenseService: Send + Sync {
    /// 当前许可证是否包含该功能
    fn is_feature_enabled(&self, feature: &str) -> bool;
}

//! Static License
//!
//! 启动时确定的许可证特性集合

use std::collections::HashSet;

use crate::application::LicenseService;

#[derive(Debug, Clone, Default)]
pub struct StaticLicense {
    features: HashSet<String>,
}

impl StaticLicense {
    pub fn new<I, S>(features: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            features: features.into_iter().map(Into::into).collect(),
        }
    }
}

impl LicenseService for StaticLicense {
    fn is_feature_enabled(&self, feature: &str) -> bool {
        self.features.contains(feature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_listed_features_are_enabled() {
        let license = StaticLicense::new(["feat:widgets"]);
        assert!(license.is_feature_enabled("feat:widgets"));
        assert!(!license.is_feature_enabled("feat:gadgets"));
        assert!(!StaticLicense::default().is_feature_enabled("feat:widgets"));
    }
}

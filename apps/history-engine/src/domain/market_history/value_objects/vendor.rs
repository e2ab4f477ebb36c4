//! Data vendor identity.

use std::fmt;

use serde::{Deserialize, Serialize};

/// External vendor able to serve historical bars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataVendor {
    /// JoinQuant JQData.
    #[default]
    JqData,
    /// Tushare Pro.
    Tushare,
}

impl DataVendor {
    /// Parse a vendor selection key. Unknown keys select the default vendor.
    #[must_use]
    pub fn from_str_case_insensitive(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "tushare" | "tu" => Self::Tushare,
            _ => Self::JqData,
        }
    }

    /// Configuration key of the vendor.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::JqData => "jqdata",
            Self::Tushare => "tushare",
        }
    }

    /// Short source tag stamped on produced bars.
    #[must_use]
    pub const fn tag(&self) -> &'static str {
        match self {
            Self::JqData => "JQ",
            Self::Tushare => "TU",
        }
    }
}

impl fmt::Display for DataVendor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vendor_parsing() {
        assert_eq!(DataVendor::from_str_case_insensitive("jqdata"), DataVendor::JqData);
        assert_eq!(DataVendor::from_str_case_insensitive("TUSHARE"), DataVendor::Tushare);
        assert_eq!(DataVendor::from_str_case_insensitive("tu"), DataVendor::Tushare);
        assert_eq!(DataVendor::from_str_case_insensitive("rq"), DataVendor::JqData);
    }

    #[test]
    fn tags() {
        assert_eq!(DataVendor::JqData.tag(), "JQ");
        assert_eq!(DataVendor::Tushare.tag(), "TU");
    }
}

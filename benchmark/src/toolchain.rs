//! @ai:module:intent Detect whether PMD can be used for benchmark execution
//! @ai:module:layer infrastructure
//! @ai:module:public_api ToolchainValidator, ToolchainStatus
//! @ai:module:stateless true

use crate::config::PmdSettings;
use apex_rules::PmdRunner;
use std::time::Duration;

/// @ai:intent Status of toolchain validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolchainStatus {
    pub pmd_binary: String,
    pub pmd_available: bool,
}

/// @ai:intent Validates that PMD is installed
pub struct ToolchainValidator;

impl ToolchainValidator {
    /// @ai:intent Get install hint for a tool
    /// @ai:effects pure
    fn get_install_hint(tool: &str) -> &'static str {
        match tool {
            "pmd" => "Install PMD: https://pmd.github.io/ (the `pmd` launcher must be on PATH)",
            _ => "Check tool documentation for installation instructions",
        }
    }

    /// @ai:intent Check the configured PMD binary
    /// @ai:effects io
    pub fn validate(settings: &PmdSettings) -> ToolchainStatus {
        let runner = PmdRunner::new(settings.binary.clone(), Duration::from_secs(settings.timeout_secs));
        ToolchainStatus {
            pmd_binary: settings.binary.clone(),
            pmd_available: runner.is_available(),
        }
    }

    /// @ai:intent Warning shown when rules will be simulated
    /// @ai:effects pure
    fn warning(status: &ToolchainStatus) -> Option<String> {
        (!status.pmd_available).then(|| {
            format!(
                "Tool '{}' not found - violations will be simulated. {}",
                status.pmd_binary,
                Self::get_install_hint("pmd")
            )
        })
    }

    /// @ai:intent Log a warning when rules will be simulated
    /// @ai:effects io
    pub fn log_warnings(status: &ToolchainStatus) {
        if let Some(warning) = Self::warning(status) {
            tracing::warn!("{}", warning);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_install_hint_known_tools() {
        assert!(ToolchainValidator::get_install_hint("pmd").contains("pmd.github.io"));
        assert!(ToolchainValidator::get_install_hint("other").contains("documentation"));
    }

    #[test]
    fn test_warning_uses_pmd_hint_for_configured_path() {
        let status = ToolchainStatus {
            pmd_binary: "/opt/pmd/bin/pmd".to_string(),
            pmd_available: false,
        };
        let warning = ToolchainValidator::warning(&status).unwrap();
        assert!(warning.contains("/opt/pmd/bin/pmd"));
        assert!(warning.contains("pmd.github.io"));

        let available = ToolchainStatus {
            pmd_available: true,
            ..status
        };
        assert_eq!(ToolchainValidator::warning(&available), None);
    }

    #[test]
    fn test_nonexistent_binary_is_unavailable() {
        let status = ToolchainValidator::validate(&PmdSettings {
            binary: "nonexistent_tool_xyz".to_string(),
            timeout_secs: 1,
        });
        assert!(!status.pmd_available);
    }
}

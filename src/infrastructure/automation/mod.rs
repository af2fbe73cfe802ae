//! # Desktop Automation Drivers
//!
//! Concrete `AutomationTarget`s. The bridge picks one from `bridge.driver`.

#[cfg(windows)]
pub mod win32;
pub mod xdotool;

use std::sync::Arc;
use std::time::Duration;

use crate::domain::automation::TargetError;
use crate::domain::config::{BridgeConfig, DriverKind};
use crate::domain::traits::AutomationTarget;

pub fn target_from_config(config: &BridgeConfig) -> Result<Arc<dyn AutomationTarget>, TargetError> {
    let timeout = Duration::from_millis(config.driver_timeout_ms);
    match config.driver {
        DriverKind::Xdotool => Ok(Arc::new(xdotool::XdotoolTarget::new(&config.xdotool_command, timeout)?)),
        DriverKind::Win32 => win32_target(),
        DriverKind::Auto if cfg!(windows) => win32_target(),
        DriverKind::Auto => Ok(Arc::new(xdotool::XdotoolTarget::new(&config.xdotool_command, timeout)?)),
    }
}

#[cfg(windows)]
fn win32_target() -> Result<Arc<dyn AutomationTarget>, TargetError> {
    Ok(Arc::new(win32::Win32Target::new()))
}

#[cfg(not(windows))]
fn win32_target() -> Result<Arc<dyn AutomationTarget>, TargetError> {
    Err(TargetError::Unavailable("the win32 driver only exists on Windows".into()))
}

/// Driver name reported by the bridge's health endpoint.
pub fn driver_name(config: &BridgeConfig) -> &'static str {
    match config.driver {
        DriverKind::Xdotool => "xdotool",
        DriverKind::Win32 => "win32",
        DriverKind::Auto if cfg!(windows) => "win32",
        DriverKind::Auto => "xdotool",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(not(windows))]
    #[test]
    fn test_driver_selection() {
        let config = BridgeConfig::default();
        assert_eq!(driver_name(&config), "xdotool");
        assert!(target_from_config(&config).is_ok());

        let config = BridgeConfig {
            driver: DriverKind::Win32,
            ..Default::default()
        };
        assert!(matches!(
            target_from_config(&config),
            Err(TargetError::Unavailable(_))
        ));
    }
}

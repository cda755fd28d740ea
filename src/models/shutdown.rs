//! Shutdown records for the zone DR workflow.

use super::inventory::VirtualMachine;
use std::fmt;

/// How a VM is taken down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownAction {
    /// Ephemeral OS disk: stop first, deallocate later if requested.
    Stop,
    /// Managed OS disk: deallocate directly.
    Deallocate,
}

impl ShutdownAction {
    /// Pick the action from the OS disk's ephemeral placement option.
    pub fn for_ephemeral_option(option: Option<&str>) -> Self {
        match option {
            Some(o) if o.eq_ignore_ascii_case("Local") => ShutdownAction::Stop,
            _ => ShutdownAction::Deallocate,
        }
    }
}

impl fmt::Display for ShutdownAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShutdownAction::Stop => write!(f, "stop"),
            ShutdownAction::Deallocate => write!(f, "deallocate"),
        }
    }
}

/// A shutdown request issued for one VM.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShutdownRecord {
    pub vm: VirtualMachine,
    pub action: ShutdownAction,
}

/// Result of waiting for a stopped VM.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopWait {
    /// Reached `stopped`.
    Stopped,
    /// Already `deallocated`; nothing left to do.
    Deallocated,
    /// Still not stopped when the wait ceiling passed.
    TimedOut { last_state: String },
    /// Power state could not be read.
    Failed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_for_ephemeral_option() {
        assert_eq!(
            ShutdownAction::for_ephemeral_option(Some("Local")),
            ShutdownAction::Stop
        );
        assert_eq!(
            ShutdownAction::for_ephemeral_option(Some("local")),
            ShutdownAction::Stop
        );
        assert_eq!(
            ShutdownAction::for_ephemeral_option(Some("")),
            ShutdownAction::Deallocate
        );
        assert_eq!(
            ShutdownAction::for_ephemeral_option(None),
            ShutdownAction::Deallocate
        );
    }
}

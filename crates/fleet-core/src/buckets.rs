//! Device-status bucket names as reported in deployment statistics.

pub const SUCCESS: &str = "success";
pub const FAILURE: &str = "failure";
pub const ABORTED: &str = "aborted";
pub const PENDING: &str = "pending";
pub const DOWNLOADING: &str = "downloading";
pub const INSTALLING: &str = "installing";
pub const REBOOTING: &str = "rebooting";
pub const ALREADY_INSTALLED: &str = "already-installed";
pub const NOARTIFACT: &str = "noartifact";
pub const DECOMMISSIONED: &str = "decommissioned";

pub const PAUSE_BEFORE_INSTALLING: &str = "pause_before_installing";
pub const PAUSE_BEFORE_REBOOTING: &str = "pause_before_rebooting";
pub const PAUSE_BEFORE_COMMITTING: &str = "pause_before_committing";

/// Devices counted here skipped the installation sequence entirely.
pub const SHORT_CIRCUIT: &[&str] = &[ALREADY_INSTALLED, NOARTIFACT];

/// Pause buckets in installation order.
pub const PAUSES: &[&str] = &[
    PAUSE_BEFORE_INSTALLING,
    PAUSE_BEFORE_REBOOTING,
    PAUSE_BEFORE_COMMITTING,
];

pub const IN_PROGRESS: &[&str] = &[DOWNLOADING, INSTALLING, REBOOTING];

pub const WAITING: &[&str] = &[PENDING];

pub const SUCCESSES: &[&str] = &[SUCCESS, ALREADY_INSTALLED, NOARTIFACT];

pub const FAILURES: &[&str] = &[FAILURE, ABORTED, DECOMMISSIONED];

/// Terminal buckets that never reached the device when skipped devices are
/// reported separately.
pub const SKIPPED: &[&str] = &[ABORTED, NOARTIFACT, ALREADY_INSTALLED, DECOMMISSIONED];

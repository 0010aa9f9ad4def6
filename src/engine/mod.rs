//! The Valohub engine decides which observed store items turn into push
//! notifications, per region.

pub mod change_detector;
pub mod cooldown;
pub mod dispatcher;
pub mod region_state;
pub mod schedule;
pub mod ticker;

pub use change_detector::{ChangeDetection, ChangeDetector, Fingerprint, FingerprintMode};
pub use cooldown::{CooldownEntry, CooldownLedger, CooldownPolicy};
pub use dispatcher::{DEFAULT_SEND_TIMEOUT, DispatchEngine, DispatchError, RegionStatus};
pub use region_state::{RegionRegistry, RegionSlot, RegionState};
pub use schedule::RegionSchedule;
pub use ticker::RegionTicker;

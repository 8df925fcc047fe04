//! Session statistics printing.

use log::{debug, info};
use strum::IntoEnumIterator;

use crate::error_handling::{ErrorType, InfoType, SessionStats, WarningType};

/// Logs the session's error, warning, and info counters.
///
/// Nonzero counters are logged at info level; a clean session logs a single
/// debug line. Called once when the session ends.
pub fn log_session_statistics(stats: &SessionStats) {
    let mut reported = false;

    for error_type in ErrorType::iter() {
        let count = stats.get_error_count(error_type);
        if count > 0 {
            info!("{}: {}", error_type.as_str(), count);
            reported = true;
        }
    }
    for warning_type in WarningType::iter() {
        let count = stats.get_warning_count(warning_type);
        if count > 0 {
            info!("{}: {}", warning_type.as_str(), count);
            reported = true;
        }
    }
    for info_type in InfoType::iter() {
        let count = stats.get_info_count(info_type);
        if count > 0 {
            debug!("{}: {}", info_type.as_str(), count);
        }
    }

    if !reported {
        debug!("Session finished without errors or warnings");
    }
}

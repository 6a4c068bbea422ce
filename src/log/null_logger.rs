//! Without the `logging` feature there is no logger to install; only the `log` max level is kept
//! in sync so that disabled macros stay cheap.

use crate::log::LogConfiguration;

impl LogConfiguration {
    pub(in crate::log) fn set_config(&mut self) {
        log::set_max_level(self.global_log_level);
    }
}

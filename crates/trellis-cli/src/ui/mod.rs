//! Terminal output: status lines and build summaries, always on stderr.

mod format;
mod messages;

use std::sync::atomic::{AtomicBool, Ordering};

pub use format::{format_duration, format_size, print_build_summary};
pub use messages::{info, success, warning};

static COLORS: AtomicBool = AtomicBool::new(true);

/// Decide once whether status lines are colored.
pub fn init_colors(no_color: bool) {
    COLORS.store(!no_color && should_use_color(), Ordering::Relaxed);
}

pub(crate) fn colors_enabled() -> bool {
    COLORS.load(Ordering::Relaxed)
}

/// Whether a CI service is running us; used to keep summaries narrow.
pub fn is_ci() -> bool {
    ["CI", "GITHUB_ACTIONS", "GITLAB_CI"]
        .iter()
        .any(|var| std::env::var_os(var).is_some())
}

/// `NO_COLOR` wins over `FORCE_COLOR`, which wins over terminal detection.
/// Shared by status lines and the log formatter.
pub fn should_use_color() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    if std::env::var_os("FORCE_COLOR").is_some() {
        return true;
    }
    console::user_attended_stderr()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn no_color_flag_disables_colors() {
        unsafe {
            std::env::remove_var("NO_COLOR");
            std::env::set_var("FORCE_COLOR", "1");
        }
        init_colors(true);
        assert!(!colors_enabled());
        init_colors(false);
        assert!(colors_enabled());
        unsafe {
            std::env::remove_var("FORCE_COLOR");
        }
    }

    #[test]
    #[serial]
    fn no_color_beats_force_color() {
        unsafe {
            std::env::set_var("NO_COLOR", "1");
            std::env::set_var("FORCE_COLOR", "1");
        }
        assert!(!should_use_color());
        unsafe {
            std::env::remove_var("NO_COLOR");
        }
        assert!(should_use_color());
        unsafe {
            std::env::remove_var("FORCE_COLOR");
        }
    }

    #[test]
    #[serial]
    fn ci_detection() {
        let saved: Vec<_> = ["CI", "GITHUB_ACTIONS", "GITLAB_CI"]
            .into_iter()
            .map(|var| (var, std::env::var_os(var)))
            .collect();
        unsafe {
            for (var, _) in &saved {
                std::env::remove_var(var);
            }
        }
        assert!(!is_ci());

        unsafe {
            std::env::set_var("GITLAB_CI", "true");
        }
        assert!(is_ci());

        unsafe {
            std::env::remove_var("GITLAB_CI");
            for (var, value) in saved {
                if let Some(value) = value {
                    std::env::set_var(var, value);
                }
            }
        }
    }
}

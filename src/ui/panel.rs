//! Status overlay panel

use imgui::{Condition, WindowFlags};

/// What the overlay shows for the current frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatusInfo<'a> {
    pub label: &'a str,
    pub model_pending: bool,
    pub model_failed: bool,
}

impl StatusInfo<'_> {
    fn model_line(&self) -> &'static str {
        if self.model_failed {
            "Model: failed to load"
        } else if self.model_pending {
            "Model: loading..."
        } else {
            "Model: loaded"
        }
    }
}

/// Small fixed window in the top-left corner with the mode label and key help
pub fn status_panel(ui: &imgui::Ui, status: StatusInfo<'_>) {
    let display_size = ui.io().display_size;
    if display_size[0] <= 0.0 || display_size[1] <= 0.0 {
        return;
    }

    ui.window("Status")
        .position([10.0, 10.0], Condition::Always)
        .always_auto_resize(true)
        .flags(WindowFlags::NO_DECORATION | WindowFlags::NO_MOVE | WindowFlags::NO_SAVED_SETTINGS)
        .bg_alpha(0.6)
        .build(|| {
            ui.text(status.label);
            ui.separator();
            ui.text_disabled("D: day   N: night");
            ui.text_disabled("Click a shape to recolor it");
            ui.text_disabled(status.model_line());
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_wins_over_pending() {
        let status = StatusInfo {
            label: "Day Mode",
            model_pending: true,
            model_failed: true,
        };
        assert_eq!(status.model_line(), "Model: failed to load");
    }

    #[test]
    fn test_loaded_model_line() {
        let status = StatusInfo {
            label: "Night Mode",
            model_pending: false,
            model_failed: false,
        };
        assert_eq!(status.model_line(), "Model: loaded");
    }
}

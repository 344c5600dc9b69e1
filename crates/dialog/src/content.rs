//! Dialog and toast content: what is shown, not how.

use serde::{Deserialize, Serialize};

/// Visual tone of a dialog or toast.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Success => "success",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Severity::Info => "information-circle",
            Severity::Success => "check-circle",
            Severity::Warning => "exclamation-triangle",
            Severity::Error => "x-circle",
        }
    }

    pub fn button_class(&self) -> &'static str {
        match self {
            Severity::Info => "btn-info",
            Severity::Success => "btn-success",
            Severity::Warning => "btn-warning",
            Severity::Error => "btn-error",
        }
    }

    pub fn alert_class(&self) -> &'static str {
        match self {
            Severity::Info => "alert-info",
            Severity::Success => "alert-success",
            Severity::Warning => "alert-warning",
            Severity::Error => "alert-error",
        }
    }

    /// Title used by alerts that do not set one.
    pub fn default_alert_title(&self) -> &'static str {
        match self {
            Severity::Info => "Notice",
            Severity::Success => "Success",
            Severity::Warning => "Warning",
            Severity::Error => "Something went wrong",
        }
    }
}

impl core::fmt::Display for Severity {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Action that ends a modal.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserAction {
    Confirm,
    Cancel,
    Acknowledge,
    /// Backdrop click, close key, or the surface closing the modal itself.
    Dismiss,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionButton {
    pub action: UserAction,
    pub label: String,
    pub class: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModalContent {
    pub title: String,
    pub message: String,
    pub severity: Severity,
    pub icon: String,
    pub buttons: Vec<ActionButton>,
}

impl ModalContent {
    pub fn button(&self, action: UserAction) -> Option<&ActionButton> {
        self.buttons.iter().find(|b| b.action == action)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToastContent {
    pub message: String,
    pub severity: Severity,
    pub icon: String,
    pub class: String,
}

impl ToastContent {
    pub fn new(message: impl Into<String>, severity: Severity) -> Self {
        Self {
            message: message.into(),
            severity,
            icon: severity.icon().to_string(),
            class: severity.alert_class().to_string(),
        }
    }
}

/// Anything that can be attached to a surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Element {
    Modal(ModalContent),
    Toast(ToastContent),
}

impl Element {
    pub fn is_modal(&self) -> bool {
        matches!(self, Element::Modal(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfirmOptions {
    pub title: String,
    pub message: String,
    pub confirm_text: String,
    pub cancel_text: String,
    pub severity: Severity,
}

impl Default for ConfirmOptions {
    fn default() -> Self {
        Self {
            title: "Confirm action".to_string(),
            message: "Are you sure?".to_string(),
            confirm_text: "Confirm".to_string(),
            cancel_text: "Cancel".to_string(),
            severity: Severity::Warning,
        }
    }
}

impl ConfirmOptions {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            ..Self::default()
        }
    }

    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    pub fn labels(mut self, confirm: impl Into<String>, cancel: impl Into<String>) -> Self {
        self.confirm_text = confirm.into();
        self.cancel_text = cancel.into();
        self
    }

    /// Cancel first, then the severity-styled confirm button.
    pub fn into_content(self) -> ModalContent {
        ModalContent {
            icon: self.severity.icon().to_string(),
            buttons: vec![
                ActionButton {
                    action: UserAction::Cancel,
                    label: self.cancel_text,
                    class: "btn-ghost".to_string(),
                },
                ActionButton {
                    action: UserAction::Confirm,
                    label: self.confirm_text,
                    class: self.severity.button_class().to_string(),
                },
            ],
            title: self.title,
            message: self.message,
            severity: self.severity,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertOptions {
    pub title: Option<String>,
    pub severity: Severity,
    pub button_text: String,
}

impl Default for AlertOptions {
    fn default() -> Self {
        Self {
            title: None,
            severity: Severity::Info,
            button_text: "OK".to_string(),
        }
    }
}

impl AlertOptions {
    pub fn severity(severity: Severity) -> Self {
        Self {
            severity,
            ..Self::default()
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn into_content(self, message: impl Into<String>) -> ModalContent {
        ModalContent {
            title: self
                .title
                .unwrap_or_else(|| self.severity.default_alert_title().to_string()),
            message: message.into(),
            severity: self.severity,
            icon: self.severity.icon().to_string(),
            buttons: vec![ActionButton {
                action: UserAction::Acknowledge,
                label: self.button_text,
                class: self.severity.button_class().to_string(),
            }],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confirm_defaults_to_warning_styling() {
        let content = ConfirmOptions::default().into_content();
        assert_eq!(content.severity, Severity::Warning);
        assert_eq!(content.button(UserAction::Confirm).unwrap().class, "btn-warning");
        assert_eq!(content.button(UserAction::Cancel).unwrap().label, "Cancel");
        assert!(content.button(UserAction::Acknowledge).is_none());
    }

    #[test]
    fn alert_without_title_uses_severity_title() {
        let content = AlertOptions::severity(Severity::Error).into_content("Upload failed");
        assert_eq!(content.title, "Something went wrong");
        assert_eq!(content.buttons.len(), 1);

        let titled = AlertOptions::default().title("Heads up").into_content("msg");
        assert_eq!(titled.title, "Heads up");
        assert_eq!(titled.severity, Severity::Info);
    }

    #[test]
    fn toast_carries_alert_class() {
        let toast = ToastContent::new("Saved", Severity::Success);
        assert_eq!(toast.class, "alert-success");
        assert_eq!(toast.icon, "check-circle");
    }
}

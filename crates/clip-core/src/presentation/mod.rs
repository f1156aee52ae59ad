//! Presentation binding: configuration + event kind → visual description.

mod messages;
mod target;

pub use messages::Messages;
pub use target::{ImageRef, Visibility, VisualState, VisualTarget};

use std::path::Path;
use std::sync::Arc;

use url::Url;

use crate::config::{Configuration, Theme};
use crate::types::ClipboardKind;

/// Renders a configuration onto any [`VisualTarget`].
///
/// Holds only the immutable string table, so one binder serves the live
/// notification and the settings preview at the same time.
#[derive(Debug, Clone, Default)]
pub struct PresentationBinder {
    messages: Arc<Messages>,
}

impl PresentationBinder {
    pub fn new(messages: Arc<Messages>) -> Self {
        Self { messages }
    }

    pub fn messages(&self) -> &Messages {
        &self.messages
    }

    /// Configure `target` for `kind`. Returns whether anything should be
    /// shown; `false` means the custom theme has no image for `kind`.
    pub fn render<T>(&self, target: &mut T, config: &Configuration, kind: ClipboardKind) -> bool
    where
        T: VisualTarget + ?Sized,
    {
        target.apply_theme(config.theme);
        target.apply_corner(config.corner);

        if config.theme == Theme::Custom {
            target.set_icon(None);
            target.set_message(None);
            return match config.custom_images.get(kind) {
                Some(path) => {
                    target.set_image(Some(&resolve_image(path)));
                    true
                }
                None => {
                    target.set_image(None);
                    false
                }
            };
        }

        let (key, fallback) = kind.message_key();
        target.set_image(None);
        target.set_icon(Some(kind));
        target.set_message(Some(self.messages.t(key, fallback)));
        true
    }
}

/// Resolve a configured path to a displayable resource reference.
pub fn resolve_image(path: &str) -> ImageRef {
    let uri = if Path::new(path).is_absolute() {
        Url::from_file_path(path)
            .map(String::from)
            .unwrap_or_else(|()| path.to_string())
    } else {
        path.to_string()
    };
    ImageRef {
        path: path.to_string(),
        uri,
    }
}

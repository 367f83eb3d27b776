//! Options section: shows the persisted options in the form and saves it back

use crate::error::{BehaviorError, StorageError};
use crate::persistence::KeyValueStore;
use crate::section::InitContext;
use crate::settings::{Options, Theme};

/// Values read back from the option form; `None` where a control is missing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormInput {
    pub notifications: Option<bool>,
    pub queue_notifications: Option<bool>,
    pub theme: Option<String>,
}

impl FormInput {
    /// Options for this form; missing controls mean notifications on,
    /// queue notifications off, and the default theme
    pub fn to_options(&self) -> Options {
        Options {
            notifications: self.notifications.unwrap_or(true),
            queue_notifications: self.queue_notifications.unwrap_or(false),
            theme: self
                .theme
                .as_deref()
                .and_then(Theme::from_str)
                .unwrap_or_default(),
        }
    }
}

/// Persist the submitted form and return what was stored
pub fn save_form(store: &dyn KeyValueStore, form: &FormInput) -> Result<Options, StorageError> {
    let options = form.to_options();
    options.save(store)?;
    Ok(options)
}

/// Initializer rendering the stored options into the form
pub fn initializer<R>(
    render: R,
) -> impl Fn(&mut InitContext<'_>) -> Result<(), BehaviorError> + 'static
where
    R: Fn(&Options) -> Result<(), String> + 'static,
{
    move |cx: &mut InitContext<'_>| {
        let options = Options::load(cx.store.as_ref());
        log::debug!("Options restored: {:?}", options);
        render(&options).map_err(|reason| cx.fail(reason))
    }
}

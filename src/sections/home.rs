//! Home section: login status

use std::rc::Rc;

use crate::catalog::Session;
use crate::error::BehaviorError;
use crate::escape_html;
use crate::events::HostEvent;
use crate::section::InitContext;

/// What the home section shows for the current session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginStatus {
    /// Status line markup
    pub message: String,
    pub show_login: bool,
    pub show_logout: bool,
}

impl LoginStatus {
    pub fn for_session(session: &Session) -> Self {
        match session.user() {
            Some(name) => Self {
                message: format!(
                    "現在、<strong>{}</strong> としてログイン中。",
                    escape_html(name)
                ),
                show_login: false,
                show_logout: true,
            },
            None => Self {
                message: "ログインしていません。レート戦機能を利用するにはログインが必要です。"
                    .to_string(),
                show_login: true,
                show_logout: false,
            },
        }
    }
}

/// Initializer rendering the login status now and on every login change
pub fn initializer<R>(
    render: R,
) -> impl Fn(&mut InitContext<'_>) -> Result<(), BehaviorError> + 'static
where
    R: Fn(&LoginStatus) -> Result<(), String> + 'static,
{
    let render = Rc::new(render);
    move |cx: &mut InitContext<'_>| {
        let status = LoginStatus::for_session(&cx.app.borrow().session);
        render(&status).map_err(|reason| cx.fail(reason))?;

        let app = cx.app.clone();
        let render = render.clone();
        cx.subscribe(move |event| {
            if *event == HostEvent::LoginStateChanged {
                let status = LoginStatus::for_session(&app.borrow().session);
                if let Err(reason) = render(&status) {
                    log::warn!("Home section re-render failed: {}", reason);
                }
            }
        });
        Ok(())
    }
}

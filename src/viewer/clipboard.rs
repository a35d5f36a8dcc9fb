//! System clipboard access for `SheetGrid`.
//!
//! Both directions go through the async Clipboard API. A read resolves
//! later and is then applied like any other edit; failures (permission
//! denied, no focus) leave the grid unchanged.

use std::rc::Rc;

use log::warn;
use wasm_bindgen_futures::{spawn_local, JsFuture};

use crate::error::SheetError;

use super::widget::{schedule_paint, SharedRef};

pub(crate) fn write_text(shared: &SharedRef, text: String) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let promise = window.navigator().clipboard().write_text(&text);
    let weak = Rc::downgrade(shared);
    spawn_local(async move {
        if let Err(e) = JsFuture::from(promise).await {
            match weak.upgrade() {
                Some(shared) => shared
                    .borrow()
                    .state
                    .clipboard_failed(&SheetError::Clipboard(format!("write: {e:?}"))),
                None => warn!("clipboard write failed: {e:?}"),
            }
        }
    });
}

pub(crate) fn read_text(shared: &SharedRef) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let promise = window.navigator().clipboard().read_text();
    let weak = Rc::downgrade(shared);
    spawn_local(async move {
        let result = JsFuture::from(promise).await;
        let Some(shared) = weak.upgrade() else {
            return;
        };
        let text = match result {
            Ok(value) => value.as_string().unwrap_or_default(),
            Err(e) => {
                shared
                    .borrow()
                    .state
                    .clipboard_failed(&SheetError::Clipboard(format!("read: {e:?}")));
                return;
            }
        };
        let changed = {
            let mut guard = shared.borrow_mut();
            let s = &mut *guard;
            s.state.paste_text(&text, &mut s.editor_surface)
        };
        if changed {
            schedule_paint(&shared);
        }
    });
}

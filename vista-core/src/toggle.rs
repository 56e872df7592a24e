use std::sync::Arc;

use crate::surface::{FormSurface, FormValues, Panel};

/// A hideable section bound to the form it contains.
///
/// Opening with new values silently replaces whatever was pre-filled before;
/// nothing survives a reload.
#[derive(Clone)]
pub struct EditPanel {
    panel: Arc<dyn Panel>,
    form: Arc<dyn FormSurface>,
}

impl EditPanel {
    pub fn new(panel: Arc<dyn Panel>, form: Arc<dyn FormSurface>) -> Self {
        Self { panel, form }
    }

    pub fn open(&self, values: FormValues) {
        self.form.fill(values);
        self.panel.show();
    }

    pub fn close(&self) {
        self.panel.hide();
    }

    pub fn is_open(&self) -> bool {
        self.panel.is_visible()
    }
}

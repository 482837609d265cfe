//! In-memory model of the console page: regions, busy indicators, dialogs,
//! forms and the handful of element classes the navigation touches.

pub mod form;
pub mod markup;
pub mod region;

use std::collections::{BTreeSet, HashMap, HashSet};

use client_core::{request::FilePart, CsrfToken, MultipartForm};
use serde_json::Value;
use thiserror::Error;
use url::Url;

use self::{
    form::{check_validity, serialize_files, serialize_json, serialize_pairs, Control, ControlKind},
    form::{FormState, InvalidControl},
    markup::{scan, PageMeta},
    region::{Region, RegionId, RegionRegistry},
};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PageError {
    #[error("region {region} is not registered")]
    UnknownRegion { region: String },
    #[error("region {region} has no base action")]
    MissingBaseAction { region: String },
    #[error("form {form} is not on the page")]
    UnknownForm { form: String },
    #[error("control {control} is not on the page")]
    UnknownControl { control: String },
}

/// Busy indicators.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Spinner {
    /// The page-wide overlay spinner.
    Page,
    /// Every inline spinner of the page. Hiding it hides all spinners.
    Inline,
    /// The spinner inside one form.
    Form(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Modal {
    DeleteKonnektor,
    DeleteKeystore,
    ChangePassword,
    LoginError,
}

/// Page elements whose classes follow the scroll position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Element {
    Body,
    Navbar,
    NavButtons,
    Logo,
}

/// One recorded mutation of a region, in the order it happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegionOp {
    Show,
    Hide,
    Clear,
    Append(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionPatch {
    pub region: RegionId,
    pub op: RegionOp,
}

#[derive(Debug, Clone)]
pub struct Page {
    base_url: Url,
    regions: RegionRegistry,
    spinners: HashSet<Spinner>,
    modals: HashSet<Modal>,
    forms: HashMap<String, FormState>,
    controls: Vec<Control>,
    sections: HashMap<String, bool>,
    classes: HashMap<Element, BTreeSet<String>>,
    anchors: HashMap<String, f64>,
    meta: PageMeta,
    scroll_y: f64,
    viewport_width: f64,
    journal: bool,
    patches: Vec<RegionPatch>,
}

impl Page {
    pub fn new(base_url: Url, regions: RegionRegistry) -> Self {
        Self {
            base_url,
            regions,
            spinners: HashSet::new(),
            modals: HashSet::new(),
            forms: HashMap::new(),
            controls: Vec::new(),
            sections: HashMap::new(),
            classes: HashMap::new(),
            anchors: HashMap::new(),
            meta: PageMeta::default(),
            scroll_y: 0.0,
            viewport_width: 0.0,
            journal: false,
            patches: Vec::new(),
        }
    }

    /// Page whose containers all act on `base_url`.
    pub fn with_base(base_url: Url) -> Self {
        let regions = RegionRegistry::new(&base_url, &HashMap::new());
        Self::new(base_url, regions)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn regions(&self) -> &RegionRegistry {
        &self.regions
    }

    pub fn region(&self, id: &RegionId) -> Result<&Region, PageError> {
        self.regions.get(id)
    }

    pub fn base_action(&self, id: &RegionId) -> Result<&Url, PageError> {
        self.regions.base_action(id)
    }

    /// Replaces the page-level state with a freshly served document: its
    /// meta tags, top-level forms and controls and collapsible sections.
    /// Containers that declare an `action` take it as their base action.
    /// Region contents are kept.
    pub fn load_document(&mut self, html: &str) {
        let scanned = scan(html);
        self.register_actions(&scanned.actions);
        self.meta = scanned.meta;
        self.forms.retain(|_, state| state.region.is_some());
        self.controls.retain(|control| control.region.is_some());
        for form in scanned.forms {
            self.forms.insert(form, FormState::default());
        }
        self.controls.extend(scanned.controls);
        self.sections.extend(scanned.sections);
    }

    pub fn meta(&self) -> &PageMeta {
        &self.meta
    }

    pub fn set_meta(&mut self, name: impl Into<String>, content: impl Into<String>) {
        self.meta.insert(name, content);
    }

    pub fn csrf_token(&self) -> Option<CsrfToken> {
        self.meta.csrf_token()
    }

    pub fn show_region(&mut self, id: &RegionId) -> Result<(), PageError> {
        self.regions.get_mut(id)?.set_visible(true);
        self.record(id, RegionOp::Show);
        Ok(())
    }

    pub fn hide_region(&mut self, id: &RegionId) -> Result<(), PageError> {
        self.regions.get_mut(id)?.set_visible(false);
        self.record(id, RegionOp::Hide);
        Ok(())
    }

    /// Empties a region and forgets the forms and controls mounted from it.
    pub fn clear_region(&mut self, id: &RegionId) -> Result<(), PageError> {
        self.regions.get_mut(id)?.clear();
        self.forms.retain(|_, state| state.region.as_ref() != Some(id));
        self.controls
            .retain(|control| control.region.as_ref() != Some(id));
        self.record(id, RegionOp::Clear);
        Ok(())
    }

    /// Appends markup to a region and mounts the forms and controls it brings.
    pub fn append_fragment(&mut self, id: &RegionId, markup: &str) -> Result<(), PageError> {
        self.regions.get_mut(id)?.append(markup);
        self.record(id, RegionOp::Append(markup.to_string()));

        let scanned = scan(markup);
        self.register_actions(&scanned.actions);
        for form in scanned.forms {
            self.forms.insert(
                form,
                FormState {
                    region: Some(id.clone()),
                    validated: false,
                },
            );
        }
        for mut control in scanned.controls {
            control.region = Some(id.clone());
            self.controls.push(control);
        }
        self.sections.extend(scanned.sections);
        Ok(())
    }

    fn register_actions(&mut self, actions: &[(String, String)]) {
        for (dom_id, action) in actions {
            let Some(region) = RegionId::from_dom_id(dom_id)
                .filter(|region| RegionId::CONTAINERS.contains(region))
            else {
                continue;
            };
            match self.base_url.join(action) {
                Ok(base) => {
                    tracing::debug!(region = %dom_id, %base, "container base action");
                    self.regions.register(region, Some(base));
                }
                Err(err) => {
                    tracing::warn!(region = %dom_id, action = %action, %err, "ignoring container action");
                }
            }
        }
    }

    /// Reveals an error surface and leaves exactly `message` in it.
    pub fn show_error(&mut self, id: &RegionId, message: &str) -> Result<(), PageError> {
        self.regions.ensure(id);
        self.show_region(id)?;
        self.clear_region(id)?;
        self.append_fragment(id, message)
    }

    /// Registers a surface created on the fly, such as the result and error
    /// slots of a webservice operation form.
    pub fn ensure_region(&mut self, id: &RegionId) {
        self.regions.ensure(id);
    }

    /// Turns the region patch journal on or off. It starts off; turning it
    /// off drops what was recorded.
    pub fn record_patches(&mut self, enabled: bool) {
        self.journal = enabled;
        if !enabled {
            self.patches.clear();
        }
    }

    fn record(&mut self, region: &RegionId, op: RegionOp) {
        if !self.journal {
            return;
        }
        self.patches.push(RegionPatch {
            region: region.clone(),
            op,
        });
    }

    pub fn patches(&self) -> &[RegionPatch] {
        &self.patches
    }

    pub fn drain_patches(&mut self) -> Vec<RegionPatch> {
        std::mem::take(&mut self.patches)
    }

    pub fn show_spinner(&mut self, spinner: Spinner) {
        self.spinners.insert(spinner);
    }

    pub fn hide_spinner(&mut self, spinner: &Spinner) {
        if *spinner == Spinner::Inline {
            self.spinners.clear();
        } else {
            self.spinners.remove(spinner);
        }
    }

    pub fn spinner_visible(&self, spinner: &Spinner) -> bool {
        self.spinners.contains(spinner)
    }

    pub fn any_spinner_visible(&self) -> bool {
        !self.spinners.is_empty()
    }

    pub fn open_modal(&mut self, modal: Modal) {
        self.modals.insert(modal);
    }

    pub fn close_modal(&mut self, modal: Modal) {
        self.modals.remove(&modal);
    }

    pub fn is_modal_open(&self, modal: Modal) -> bool {
        self.modals.contains(&modal)
    }

    pub fn has_form(&self, form: &str) -> bool {
        self.forms.contains_key(form)
    }

    pub fn form(&self, form: &str) -> Result<&FormState, PageError> {
        self.forms.get(form).ok_or_else(|| PageError::UnknownForm {
            form: form.to_string(),
        })
    }

    /// Registers a form that is not backed by scanned markup.
    pub fn insert_form(&mut self, form: impl Into<String>, region: Option<RegionId>) {
        self.forms.insert(
            form.into(),
            FormState {
                region,
                validated: false,
            },
        );
    }

    fn form_controls<'a>(&'a self, form: &'a str) -> impl Iterator<Item = &'a Control> + Clone + 'a {
        self.controls
            .iter()
            .filter(move |control| control.form.as_deref() == Some(form))
    }

    /// Runs constraint validation and marks the form as validated, whatever
    /// the result.
    pub fn validate_form(&mut self, form: &str) -> Result<Vec<InvalidControl>, PageError> {
        self.form(form)?;
        let invalid = check_validity(self.form_controls(form));
        if let Some(state) = self.forms.get_mut(form) {
            state.validated = true;
        }
        Ok(invalid)
    }

    pub fn serialize_pairs(&self, form: &str) -> Result<Vec<(String, String)>, PageError> {
        self.form(form)?;
        Ok(serialize_pairs(self.form_controls(form)))
    }

    pub fn serialize_json(&self, form: &str) -> Result<Value, PageError> {
        self.form(form)?;
        Ok(serialize_json(self.form_controls(form)))
    }

    pub fn serialize_files(&self, form: &str) -> Result<MultipartForm, PageError> {
        self.form(form)?;
        Ok(serialize_files(self.form_controls(form)))
    }

    /// Adds a control not backed by scanned markup.
    pub fn insert_control(&mut self, control: Control) {
        self.controls.push(control);
    }

    pub fn controls(&self) -> &[Control] {
        &self.controls
    }

    pub fn control(&self, id: &str) -> Option<&Control> {
        self.controls
            .iter()
            .find(|control| control.id.as_deref() == Some(id))
    }

    fn control_mut(&mut self, id: &str) -> Result<&mut Control, PageError> {
        self.controls
            .iter_mut()
            .find(|control| control.id.as_deref() == Some(id))
            .ok_or_else(|| PageError::UnknownControl {
                control: id.to_string(),
            })
    }

    pub fn control_value(&self, id: &str) -> Option<&str> {
        self.control(id).map(|control| control.value.as_str())
    }

    pub fn is_checked(&self, id: &str) -> bool {
        self.control(id).is_some_and(|control| control.checked)
    }

    pub fn is_disabled(&self, id: &str) -> bool {
        self.control(id).is_some_and(|control| control.disabled)
    }

    pub fn set_value(&mut self, id: &str, value: impl Into<String>) -> Result<(), PageError> {
        self.control_mut(id)?.value = value.into();
        Ok(())
    }

    pub fn set_checked(&mut self, id: &str, checked: bool) -> Result<(), PageError> {
        self.control_mut(id)?.checked = checked;
        Ok(())
    }

    pub fn set_disabled(&mut self, id: &str, disabled: bool) -> Result<(), PageError> {
        self.control_mut(id)?.disabled = disabled;
        Ok(())
    }

    pub fn attach_file(&mut self, id: &str, file: FilePart) -> Result<(), PageError> {
        self.control_mut(id)?.files.push(file);
        Ok(())
    }

    /// Flips a password input between masked and plain text.
    pub fn toggle_password_visibility(&mut self, id: &str) -> Result<ControlKind, PageError> {
        let control = self.control_mut(id)?;
        control.kind = match control.kind {
            ControlKind::Password => ControlKind::Text,
            _ => ControlKind::Password,
        };
        Ok(control.kind)
    }

    pub fn section_shown(&self, id: &str) -> Option<bool> {
        self.sections.get(id).copied()
    }

    /// Flips a collapsible section. Elements without a `data-show` state are
    /// left alone and yield `None`.
    pub fn toggle_section(&mut self, id: &str) -> Option<bool> {
        let shown = self.sections.get_mut(id)?;
        *shown = !*shown;
        Some(*shown)
    }

    pub fn add_class(&mut self, element: Element, class: &str) {
        self.classes
            .entry(element)
            .or_default()
            .insert(class.to_string());
    }

    pub fn remove_class(&mut self, element: Element, class: &str) {
        if let Some(classes) = self.classes.get_mut(&element) {
            classes.remove(class);
        }
    }

    pub fn has_class(&self, element: Element, class: &str) -> bool {
        self.classes
            .get(&element)
            .is_some_and(|classes| classes.contains(class))
    }

    pub fn classes(&self, element: Element) -> impl Iterator<Item = &str> {
        self.classes
            .get(&element)
            .into_iter()
            .flat_map(|classes| classes.iter().map(String::as_str))
    }

    /// Records the document offset of an in-page anchor target.
    pub fn set_anchor_offset(&mut self, id: impl Into<String>, offset_top: f64) {
        self.anchors.insert(id.into(), offset_top);
    }

    pub fn anchor_offset(&self, id: &str) -> Option<f64> {
        self.anchors.get(id).copied()
    }

    pub fn scroll_y(&self) -> f64 {
        self.scroll_y
    }

    pub fn viewport_width(&self) -> f64 {
        self.viewport_width
    }

    pub fn set_viewport(&mut self, viewport_width: f64, scroll_y: f64) {
        self.viewport_width = viewport_width;
        self.scroll_y = scroll_y;
    }

    pub fn set_scroll_y(&mut self, scroll_y: f64) {
        self.scroll_y = scroll_y;
    }
}

#[cfg(test)]
#[path = "tests/mod_tests.rs"]
mod tests;

//! Lightweight scanning of server-rendered markup: the forms, controls and
//! meta tags a fragment brings along. Not a full HTML parser; fragments come
//! from the console's own templates.

use std::{collections::HashMap, sync::LazyLock};

use client_core::csrf::{CsrfToken, CSRF_HEADER_META, CSRF_TOKEN_META};
use regex::Regex;

use super::form::{Control, ControlKind};

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<(/?)(form|input|button|select|option|textarea|meta)\b((?:[^>\x22']|\x22[^\x22]*\x22|'[^']*')*)>")
        .expect("tag pattern")
});

static SECTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<[a-z][a-z0-9]*\b((?:[^>\x22']|\x22[^\x22]*\x22|'[^']*')*\bdata-show\s*=(?:[^>\x22']|\x22[^\x22]*\x22|'[^']*')*)>")
        .expect("section pattern")
});

static ACTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<[a-z][a-z0-9]*\b((?:[^>\x22']|\x22[^\x22]*\x22|'[^']*')*\baction\s*=(?:[^>\x22']|\x22[^\x22]*\x22|'[^']*')*)>")
        .expect("action pattern")
});

static ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)([A-Za-z_:][-A-Za-z0-9_:.]*)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+)))?"#)
        .expect("attribute pattern")
});

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes(HashMap<String, String>);

impl Attributes {
    pub fn parse(raw: &str) -> Self {
        let mut attrs = HashMap::new();
        for caps in ATTR_RE.captures_iter(raw) {
            let name = caps[1].to_ascii_lowercase();
            let value = caps
                .get(2)
                .or_else(|| caps.get(3))
                .or_else(|| caps.get(4))
                .map(|m| decode_entities(m.as_str()))
                .unwrap_or_default();
            attrs.entry(name).or_insert(value);
        }
        Self(attrs)
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn has(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }
}

fn decode_entities(raw: &str) -> String {
    if !raw.contains('&') {
        return raw.to_string();
    }
    raw.replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

/// Forms and controls found in a piece of markup.
#[derive(Debug, Clone, Default)]
pub struct ScannedMarkup {
    pub forms: Vec<String>,
    pub controls: Vec<Control>,
    /// Collapsible sections keyed by element id, with their `data-show` state.
    pub sections: Vec<(String, bool)>,
    /// Elements carrying an `action` attribute, keyed by element id.
    pub actions: Vec<(String, String)>,
    pub meta: PageMeta,
}

struct OpenSelect {
    index: usize,
    explicit: bool,
}

pub fn scan(markup: &str) -> ScannedMarkup {
    let mut scanned = ScannedMarkup::default();
    let mut current_form: Option<String> = None;
    let mut open_select: Option<OpenSelect> = None;
    let mut open_textarea: Option<(usize, usize)> = None;

    for caps in TAG_RE.captures_iter(markup) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        let closing = !caps[1].is_empty();
        let tag = caps[2].to_ascii_lowercase();
        let attrs = Attributes::parse(&caps[3]);

        match (tag.as_str(), closing) {
            ("form", false) => {
                let id = attrs.get("id").unwrap_or_default().to_string();
                if !id.is_empty() {
                    scanned.forms.push(id.clone());
                }
                current_form = Some(id).filter(|id| !id.is_empty());
            }
            ("form", true) => current_form = None,
            ("input", false) => {
                let kind = ControlKind::from_input_type(attrs.get("type").unwrap_or("text"));
                scanned
                    .controls
                    .push(Control::from_attributes(kind, &attrs, current_form.clone()));
            }
            ("button", false) => {
                scanned.controls.push(Control::from_attributes(
                    ControlKind::Button,
                    &attrs,
                    current_form.clone(),
                ));
            }
            ("select", false) => {
                scanned.controls.push(Control::from_attributes(
                    ControlKind::Select,
                    &attrs,
                    current_form.clone(),
                ));
                open_select = Some(OpenSelect {
                    index: scanned.controls.len() - 1,
                    explicit: false,
                });
            }
            ("select", true) => open_select = None,
            ("option", false) => {
                if let Some(select) = open_select.as_mut() {
                    let value = attrs.get("value").unwrap_or_default().to_string();
                    let control = &mut scanned.controls[select.index];
                    control.options.push(value.clone());
                    if attrs.has("selected") && !select.explicit {
                        control.value = value;
                        select.explicit = true;
                    } else if control.options.len() == 1 && !select.explicit {
                        control.value = value;
                    }
                }
            }
            ("textarea", false) => {
                scanned.controls.push(Control::from_attributes(
                    ControlKind::TextArea,
                    &attrs,
                    current_form.clone(),
                ));
                open_textarea = Some((scanned.controls.len() - 1, whole.end()));
            }
            ("textarea", true) => {
                if let Some((index, start)) = open_textarea.take() {
                    scanned.controls[index].value = decode_entities(&markup[start..whole.start()]);
                }
            }
            ("meta", false) => {
                if let (Some(name), Some(content)) = (attrs.get("name"), attrs.get("content")) {
                    scanned.meta.insert(name, content);
                }
            }
            _ => {}
        }
    }

    for caps in SECTION_RE.captures_iter(markup) {
        let attrs = Attributes::parse(&caps[1]);
        let shown = match attrs.get("data-show") {
            Some("true") => true,
            Some("false") => false,
            _ => continue,
        };
        if let Some(id) = attrs.get("id").filter(|id| !id.is_empty()) {
            scanned.sections.push((id.to_string(), shown));
        }
    }

    for caps in ACTION_RE.captures_iter(markup) {
        let attrs = Attributes::parse(&caps[1]);
        if let (Some(id), Some(action)) = (attrs.get("id"), attrs.get("action")) {
            if !id.is_empty() {
                scanned.actions.push((id.to_string(), action.to_string()));
            }
        }
    }

    scanned
}

/// Page-level `<meta name=... content=...>` values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageMeta {
    entries: HashMap<String, String>,
}

impl PageMeta {
    pub fn insert(&mut self, name: impl Into<String>, content: impl Into<String>) {
        self.entries.insert(name.into(), content.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(String::as_str)
    }

    pub fn csrf_token(&self) -> Option<CsrfToken> {
        CsrfToken::from_meta(self.get(CSRF_HEADER_META), self.get(CSRF_TOKEN_META))
    }
}

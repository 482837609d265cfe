//! Typed registry of the container regions a page exposes.

use std::collections::HashMap;

use url::Url;

use super::PageError;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RegionId {
    Dashboard,
    Config,
    ConfigServerStatus,
    MinimalConfig,
    Log,
    VzdOverview,
    DnsOverview,
    WebserviceOverview,
    NtpOverview,
    PipelineTest,
    PipelineTestOperation,
    ChangePasswordForm,
    ConfigError,
    KeystoreFormError,
    MinimalConfigFormError,
    ConfigFormError,
    KonnektorTableError,
    KonnektorFormError,
    ChangePasswordFormError,
    OperationResult,
    OperationError,
    /// Result surface of one webservice operation form.
    WebserviceResult(String),
    /// Error surface of one webservice operation form.
    WebserviceError(String),
}

impl RegionId {
    /// Regions that carry a base action and receive fragments.
    pub const CONTAINERS: [RegionId; 12] = [
        RegionId::Dashboard,
        RegionId::Config,
        RegionId::ConfigServerStatus,
        RegionId::MinimalConfig,
        RegionId::Log,
        RegionId::VzdOverview,
        RegionId::DnsOverview,
        RegionId::WebserviceOverview,
        RegionId::NtpOverview,
        RegionId::PipelineTest,
        RegionId::PipelineTestOperation,
        RegionId::ChangePasswordForm,
    ];

    pub const SURFACES: [RegionId; 9] = [
        RegionId::ConfigError,
        RegionId::KeystoreFormError,
        RegionId::MinimalConfigFormError,
        RegionId::ConfigFormError,
        RegionId::KonnektorTableError,
        RegionId::KonnektorFormError,
        RegionId::ChangePasswordFormError,
        RegionId::OperationResult,
        RegionId::OperationError,
    ];

    /// Element id of the region in the server-rendered page.
    pub fn dom_id(&self) -> String {
        let id = match self {
            Self::Dashboard => "dashboardContainer",
            Self::Config => "konfigContainer",
            Self::ConfigServerStatus => "konfigServerStatusContainer",
            Self::MinimalConfig => "minimalKonfigContainer",
            Self::Log => "logContainer",
            Self::VzdOverview => "vzdEintragUebersicht",
            Self::DnsOverview => "dnsEintragUebersicht",
            Self::WebserviceOverview => "konnWebserviceUebersicht",
            Self::NtpOverview => "ntpUebersicht",
            Self::PipelineTest => "pipelineoperationtestContainer",
            Self::PipelineTestOperation => "pipelineoperationtestOpContainer",
            Self::ChangePasswordForm => "changePwdFormContainer",
            Self::ConfigError => "konfigError",
            Self::KeystoreFormError => "openkimkeystoreFormError",
            Self::MinimalConfigFormError => "minimalkonfigFormError",
            Self::ConfigFormError => "konfigFormError",
            Self::KonnektorTableError => "konnektorTableError",
            Self::KonnektorFormError => "konnektorFormError",
            Self::ChangePasswordFormError => "changePwdFormError",
            Self::OperationResult => "opFormResult",
            Self::OperationError => "opFormError",
            Self::WebserviceResult(form) => return format!("{form}Result"),
            Self::WebserviceError(form) => return format!("{form}Error"),
        };
        id.to_string()
    }

    pub fn from_dom_id(dom_id: &str) -> Option<Self> {
        Self::CONTAINERS
            .iter()
            .chain(Self::SURFACES.iter())
            .find(|region| region.dom_id() == dom_id)
            .cloned()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Region {
    base_action: Option<Url>,
    visible: bool,
    content: String,
}

impl Region {
    pub fn base_action(&self) -> Option<&Url> {
        self.base_action.as_ref()
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub(crate) fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub(crate) fn clear(&mut self) {
        self.content.clear();
    }

    pub(crate) fn append(&mut self, markup: &str) {
        self.content.push_str(markup);
    }
}

#[derive(Debug, Clone, Default)]
pub struct RegionRegistry {
    regions: HashMap<RegionId, Region>,
}

impl RegionRegistry {
    /// Every container gets `base_action` unless `overrides` names another
    /// one for its element id. Surfaces start hidden, containers visible.
    pub fn new(base_action: &Url, overrides: &HashMap<String, Url>) -> Self {
        let mut regions = HashMap::new();
        for region in RegionId::CONTAINERS {
            let base = overrides
                .get(&region.dom_id())
                .unwrap_or(base_action)
                .clone();
            regions.insert(
                region,
                Region {
                    base_action: Some(base),
                    visible: true,
                    content: String::new(),
                },
            );
        }
        for region in RegionId::SURFACES {
            regions.insert(region, Region::default());
        }
        Self { regions }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn register(&mut self, id: RegionId, base_action: Option<Url>) {
        let region = self.regions.entry(id).or_default();
        if base_action.is_some() {
            region.base_action = base_action;
        }
    }

    /// Registers a surface if it is not known yet.
    pub fn ensure(&mut self, id: &RegionId) {
        if !self.regions.contains_key(id) {
            self.regions.insert(id.clone(), Region::default());
        }
    }

    /// Startup check: every required region exists and every required
    /// container carries a base action.
    pub fn validate(&self, required: &[RegionId]) -> Result<(), PageError> {
        for id in required {
            let region = self.regions.get(id).ok_or_else(|| PageError::UnknownRegion {
                region: id.dom_id(),
            })?;
            if RegionId::CONTAINERS.contains(id) && region.base_action.is_none() {
                return Err(PageError::MissingBaseAction {
                    region: id.dom_id(),
                });
            }
        }
        Ok(())
    }

    pub fn get(&self, id: &RegionId) -> Result<&Region, PageError> {
        self.regions.get(id).ok_or_else(|| PageError::UnknownRegion {
            region: id.dom_id(),
        })
    }

    pub(crate) fn get_mut(&mut self, id: &RegionId) -> Result<&mut Region, PageError> {
        self.regions
            .get_mut(id)
            .ok_or_else(|| PageError::UnknownRegion {
                region: id.dom_id(),
            })
    }

    pub fn base_action(&self, id: &RegionId) -> Result<&Url, PageError> {
        self.get(id)?
            .base_action()
            .ok_or_else(|| PageError::MissingBaseAction {
                region: id.dom_id(),
            })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&RegionId, &Region)> {
        self.regions.iter()
    }
}

//! The fragment-swap actions. Every action shows a busy indicator, sends one
//! request built from a container's base action, then either fills the
//! target region or surfaces the error. Follow-up refreshes are awaited
//! directly after a successful mutation.

use std::{sync::Arc, time::Duration};

use client_core::{ConsoleTransport, Endpoint, Payload, RequestDescriptor, TransportError};
use shared::{
    domain::{DnsRecordType, KonnektorId, LogId, LogKind, OperationId, WebserviceId},
    protocol::{form_fields, VerifyPinRequest},
};
use tracing::{debug, info, warn};
use url::Url;

use crate::{
    error::ConsoleError,
    navigation::{
        apply_navbar, intercept_anchor, login, navbar_state, NavbarState, ScrollAnimation,
        DEFAULT_BREAKPOINT, HEADER_OFFSET, SCROLL_DURATION,
    },
    page::{region::RegionId, Modal, Page, Spinner},
};

use super::{
    context::{ActionContext, DnsQuery, VzdQuery},
    events::{ActionOutcome, UiError, UiErrorCategory, UiErrorContext},
    toggles::{apply_konnektor_rules, KONNEKTOR_ACTIVATED},
};

pub const CONFIG_FORM: &str = "konfigForm";
pub const MINIMAL_CONFIG_FORM: &str = "minimalkonfigForm";
pub const KEYSTORE_FORM: &str = "openkimkeystoreForm";
pub const KONNEKTOR_FORM: &str = "konnektorForm";
pub const OPERATION_FORM: &str = "opForm";
pub const CHANGE_PASSWORD_FORM: &str = "changePwdForm";

/// Checkboxes of the configuration form sent as explicit `true`/`false`.
pub const CONFIG_FLAGS: [&str; 4] = [
    "logPersonalInformations",
    "logKonnektorExecute",
    "writeSmtpCmdLogFile",
    "writePop3CmdLogFile",
];

const LOG_SEARCH: &str = "search";
const VZD_SEARCH: &str = "search";
const VZD_WITH_CERTS: &str = "searchWithCerts";
const DNS_DOMAIN: &str = "domain";
const DNS_RECORD_TYPE: &str = "recordType";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NavigationSettings {
    pub breakpoint: f64,
    pub header_offset: f64,
    pub scroll_duration: Duration,
}

impl Default for NavigationSettings {
    fn default() -> Self {
        Self {
            breakpoint: DEFAULT_BREAKPOINT,
            header_offset: HEADER_OFFSET,
            scroll_duration: SCROLL_DURATION,
        }
    }
}

/// A request whose answer replaces the content of `target`. Errors are
/// written into the target as well.
struct Swap {
    target: RegionId,
    endpoint: Endpoint,
    payload: Payload,
    spinner: Spinner,
    context: UiErrorContext,
    keep_body: bool,
}

impl Swap {
    fn fill(target: RegionId, endpoint: Endpoint, context: UiErrorContext) -> Self {
        Self {
            target,
            endpoint,
            payload: Payload::Empty,
            spinner: Spinner::Page,
            context,
            keep_body: true,
        }
    }

    fn payload(mut self, payload: Payload) -> Self {
        self.payload = payload;
        self
    }

    fn spinner(mut self, spinner: Spinner) -> Self {
        self.spinner = spinner;
        self
    }

    /// The answer only signals success; the region stays empty.
    fn discard_body(mut self) -> Self {
        self.keep_body = false;
        self
    }
}

/// A request sent for its side effect. Errors go to a dedicated surface.
struct Submit {
    base: RegionId,
    endpoint: Endpoint,
    payload: Payload,
    spinner: Spinner,
    error_region: RegionId,
    result_region: Option<RegionId>,
    context: UiErrorContext,
}

pub struct FragmentSwapController {
    transport: Arc<dyn ConsoleTransport>,
    page: Page,
    context: ActionContext,
    navigation: NavigationSettings,
}

impl FragmentSwapController {
    /// Fails when the page lacks a region one of the actions writes to.
    pub fn new(transport: Arc<dyn ConsoleTransport>, page: Page) -> Result<Self, ConsoleError> {
        let required: Vec<RegionId> = RegionId::CONTAINERS
            .into_iter()
            .chain(RegionId::SURFACES)
            .collect();
        page.regions().validate(&required)?;
        Ok(Self {
            transport,
            page,
            context: ActionContext::default(),
            navigation: NavigationSettings::default(),
        })
    }

    pub fn with_navigation(mut self, navigation: NavigationSettings) -> Self {
        self.navigation = navigation;
        self
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn page_mut(&mut self) -> &mut Page {
        &mut self.page
    }

    pub fn context(&self) -> &ActionContext {
        &self.context
    }

    /// Called before the page is touched.
    fn request(
        &self,
        base: &Url,
        endpoint: Endpoint,
        payload: Payload,
    ) -> Result<RequestDescriptor, ConsoleError> {
        let csrf = self.page.csrf_token();
        Ok(RequestDescriptor::build(base, endpoint, payload, csrf.as_ref())?)
    }

    async fn send(&self, request: RequestDescriptor) -> Result<String, TransportError> {
        debug!(endpoint = request.endpoint.name(), url = %request.url, "sending console request");
        self.transport.send(request).await
    }

    fn base_of(&self, region: &RegionId) -> Result<Url, ConsoleError> {
        Ok(self.page.base_action(region)?.clone())
    }

    async fn swap(&mut self, swap: Swap) -> Result<ActionOutcome, ConsoleError> {
        let Swap {
            target,
            endpoint,
            payload,
            spinner,
            context,
            keep_body,
        } = swap;
        let base = self.base_of(&target)?;
        let name = endpoint.name();
        let request = self.request(&base, endpoint, payload)?;

        self.page.show_spinner(spinner.clone());
        self.page.show_region(&target)?;
        self.page.clear_region(&target)?;

        let result = self.send(request).await;
        self.page.hide_spinner(&spinner);
        match result {
            Ok(body) => {
                if keep_body {
                    self.page.append_fragment(&target, &body)?;
                }
                Ok(ActionOutcome::Completed)
            }
            Err(err) => {
                warn!(endpoint = name, region = %target.dom_id(), status = ?err.status(), "fragment request failed");
                self.page.append_fragment(&target, &err.display_message())?;
                Ok(ActionOutcome::Failed(UiError::from_transport(context, &err)))
            }
        }
    }

    async fn submit(&mut self, submit: Submit) -> Result<ActionOutcome, ConsoleError> {
        let Submit {
            base,
            endpoint,
            payload,
            spinner,
            error_region,
            result_region,
            context,
        } = submit;
        let base = self.base_of(&base)?;
        let name = endpoint.name();
        let request = self.request(&base, endpoint, payload)?;

        self.page.show_spinner(spinner.clone());
        let result = self.send(request).await;
        self.page.hide_spinner(&spinner);
        match result {
            Ok(body) => {
                if let Some(region) = result_region {
                    self.page.show_region(&region)?;
                    self.page.clear_region(&region)?;
                    self.page.append_fragment(&region, &body)?;
                }
                info!(endpoint = name, "console action succeeded");
                Ok(ActionOutcome::Completed)
            }
            Err(err) => {
                warn!(endpoint = name, region = %error_region.dom_id(), status = ?err.status(), "console action failed");
                self.page.show_error(&error_region, &err.display_message())?;
                Ok(ActionOutcome::Failed(UiError::from_transport(context, &err)))
            }
        }
    }

    /// Runs constraint validation; `Some` carries the blocking outcome.
    fn check_form(&mut self, form: &str) -> Result<Option<ActionOutcome>, ConsoleError> {
        let controls = self.page.validate_form(form)?;
        if controls.is_empty() {
            return Ok(None);
        }
        debug!(form, invalid = controls.len(), "form validation blocked request");
        Ok(Some(ActionOutcome::Invalid {
            form: form.to_string(),
            controls,
        }))
    }

    /// Shows validation feedback on a freshly loaded form, if it came along.
    fn mark_validated(&mut self, form: &str) -> Result<(), ConsoleError> {
        if self.page.has_form(form) {
            self.page.validate_form(form)?;
        }
        Ok(())
    }

    fn restore_value(&mut self, control: &str, value: &str) -> Result<(), ConsoleError> {
        if self.page.control(control).is_some() {
            self.page.set_value(control, value)?;
        }
        Ok(())
    }

    fn restore_checked(&mut self, control: &str, checked: bool) -> Result<(), ConsoleError> {
        if self.page.control(control).is_some() {
            self.page.set_checked(control, checked)?;
        }
        Ok(())
    }

    fn close_overlay(&mut self, region: &RegionId) -> Result<(), ConsoleError> {
        self.page.hide_region(region)?;
        self.page.clear_region(region)?;
        Ok(())
    }

    pub async fn dashboard_overview(&mut self) -> Result<ActionOutcome, ConsoleError> {
        self.swap(Swap::fill(
            RegionId::Dashboard,
            Endpoint::DashboardOverview,
            UiErrorContext::Dashboard,
        ))
        .await
    }

    /// Asks the server to refresh its dashboard data, then reloads the
    /// overview.
    pub async fn dashboard_refresh(&mut self) -> Result<ActionOutcome, ConsoleError> {
        let outcome = self
            .swap(
                Swap::fill(
                    RegionId::Dashboard,
                    Endpoint::DashboardRefresh,
                    UiErrorContext::Dashboard,
                )
                .discard_body(),
            )
            .await?;
        if !outcome.is_completed() {
            return Ok(outcome);
        }
        self.dashboard_overview().await
    }

    pub async fn config_overview(&mut self) -> Result<ActionOutcome, ConsoleError> {
        let outcome = self
            .swap(Swap::fill(
                RegionId::Config,
                Endpoint::ConfigOverview,
                UiErrorContext::Config,
            ))
            .await?;
        if !outcome.is_completed() {
            return Ok(outcome);
        }
        self.config_server_status().await
    }

    pub async fn config_server_status(&mut self) -> Result<ActionOutcome, ConsoleError> {
        self.swap(Swap::fill(
            RegionId::ConfigServerStatus,
            Endpoint::ConfigServerStatus,
            UiErrorContext::Config,
        ))
        .await
    }

    pub async fn config_load(&mut self) -> Result<ActionOutcome, ConsoleError> {
        self.page.hide_region(&RegionId::ConfigServerStatus)?;
        let outcome = self
            .swap(Swap::fill(
                RegionId::Config,
                Endpoint::ConfigLoad,
                UiErrorContext::Config,
            ))
            .await?;
        if outcome.is_completed() {
            self.mark_validated(CONFIG_FORM)?;
        }
        Ok(outcome)
    }

    pub async fn config_save(&mut self) -> Result<ActionOutcome, ConsoleError> {
        if let Some(blocked) = self.check_form(CONFIG_FORM)? {
            return Ok(blocked);
        }
        let mut files = self.page.serialize_files(CONFIG_FORM)?;
        for flag in CONFIG_FLAGS {
            files.set_text(flag, self.page.is_checked(flag).to_string());
        }
        let outcome = self
            .submit(Submit {
                base: RegionId::Config,
                endpoint: Endpoint::ConfigSave,
                payload: Payload::Multipart(files),
                spinner: Spinner::Inline,
                error_region: RegionId::ConfigFormError,
                result_region: None,
                context: UiErrorContext::Config,
            })
            .await?;
        if !outcome.is_completed() {
            return Ok(outcome);
        }
        self.config_overview().await
    }

    pub async fn minimal_config_load(&mut self) -> Result<ActionOutcome, ConsoleError> {
        let outcome = self
            .swap(Swap::fill(
                RegionId::MinimalConfig,
                Endpoint::MinimalConfigLoad,
                UiErrorContext::MinimalConfig,
            ))
            .await?;
        if outcome.is_completed() {
            self.mark_validated(MINIMAL_CONFIG_FORM)?;
        }
        Ok(outcome)
    }

    pub async fn minimal_config_save(&mut self) -> Result<ActionOutcome, ConsoleError> {
        if let Some(blocked) = self.check_form(MINIMAL_CONFIG_FORM)? {
            return Ok(blocked);
        }
        let files = self.page.serialize_files(MINIMAL_CONFIG_FORM)?;
        let outcome = self
            .submit(Submit {
                base: RegionId::MinimalConfig,
                endpoint: Endpoint::MinimalConfigSave,
                payload: Payload::Multipart(files),
                spinner: Spinner::Inline,
                error_region: RegionId::MinimalConfigFormError,
                result_region: None,
                context: UiErrorContext::MinimalConfig,
            })
            .await?;
        if !outcome.is_completed() {
            return Ok(outcome);
        }
        self.minimal_config_load().await
    }

    pub async fn keystore_delete(&mut self) -> Result<ActionOutcome, ConsoleError> {
        let outcome = self
            .submit(Submit {
                base: RegionId::Config,
                endpoint: Endpoint::KeystoreDelete,
                payload: Payload::Empty,
                spinner: Spinner::Page,
                error_region: RegionId::ConfigError,
                result_region: None,
                context: UiErrorContext::Keystore,
            })
            .await?;
        self.page.close_modal(Modal::DeleteKeystore);
        if !outcome.is_completed() {
            return Ok(outcome);
        }
        self.config_overview().await
    }

    pub async fn keystore_create_selfsigned(&mut self) -> Result<ActionOutcome, ConsoleError> {
        let outcome = self
            .submit(Submit {
                base: RegionId::Config,
                endpoint: Endpoint::KeystoreCreateSelfsigned,
                payload: Payload::Empty,
                spinner: Spinner::Page,
                error_region: RegionId::ConfigError,
                result_region: None,
                context: UiErrorContext::Keystore,
            })
            .await?;
        if !outcome.is_completed() {
            return Ok(outcome);
        }
        self.config_overview().await
    }

    pub async fn keystore_notselfsigned_form(&mut self) -> Result<ActionOutcome, ConsoleError> {
        self.page.hide_region(&RegionId::ConfigServerStatus)?;
        let outcome = self
            .swap(Swap::fill(
                RegionId::Config,
                Endpoint::KeystoreNotSelfsignedForm,
                UiErrorContext::Keystore,
            ))
            .await?;
        if outcome.is_completed() {
            self.mark_validated(KEYSTORE_FORM)?;
        }
        Ok(outcome)
    }

    pub async fn keystore_notselfsigned_save(&mut self) -> Result<ActionOutcome, ConsoleError> {
        if let Some(blocked) = self.check_form(KEYSTORE_FORM)? {
            return Ok(blocked);
        }
        let body = self.page.serialize_json(KEYSTORE_FORM)?;
        let outcome = self
            .submit(Submit {
                base: RegionId::Config,
                endpoint: Endpoint::KeystoreNotSelfsignedSave,
                payload: Payload::Json(body),
                spinner: Spinner::Page,
                error_region: RegionId::KeystoreFormError,
                result_region: None,
                context: UiErrorContext::Keystore,
            })
            .await?;
        if !outcome.is_completed() {
            return Ok(outcome);
        }
        self.config_overview().await
    }

    /// Loads the konnektor form. Use [`KonnektorId::new_entry`] for an empty
    /// form.
    pub async fn konnektor_load(
        &mut self,
        konnektor: KonnektorId,
        refresh: bool,
    ) -> Result<ActionOutcome, ConsoleError> {
        for overlay in [
            RegionId::ConfigServerStatus,
            RegionId::VzdOverview,
            RegionId::WebserviceOverview,
            RegionId::NtpOverview,
        ] {
            self.page.clear_region(&overlay)?;
            self.page.hide_region(&overlay)?;
        }
        let outcome = self
            .swap(Swap::fill(
                RegionId::Config,
                Endpoint::KonnektorLoad { konnektor, refresh },
                UiErrorContext::Konnektor,
            ))
            .await?;
        if outcome.is_completed() {
            self.mark_validated(KONNEKTOR_FORM)?;
            apply_konnektor_rules(&mut self.page);
        }
        Ok(outcome)
    }

    /// Records the delete target and opens the confirmation dialog.
    pub fn select_konnektor_for_delete(&mut self, konnektor: KonnektorId) {
        self.context.pending_delete = Some(konnektor);
        self.page.open_modal(Modal::DeleteKonnektor);
    }

    pub async fn konnektor_delete(&mut self) -> Result<ActionOutcome, ConsoleError> {
        let konnektor = self
            .context
            .pending_delete
            .clone()
            .ok_or(ConsoleError::NoDeleteTarget)?;
        self.page.hide_region(&RegionId::KonnektorTableError)?;
        let outcome = self
            .submit(Submit {
                base: RegionId::Config,
                endpoint: Endpoint::KonnektorDelete { konnektor },
                payload: Payload::Empty,
                spinner: Spinner::Page,
                error_region: RegionId::KonnektorTableError,
                result_region: None,
                context: UiErrorContext::Konnektor,
            })
            .await?;
        self.page.close_modal(Modal::DeleteKonnektor);
        if !outcome.is_completed() {
            return Ok(outcome);
        }
        self.config_overview().await
    }

    pub async fn konnektor_save(&mut self) -> Result<ActionOutcome, ConsoleError> {
        if let Some(blocked) = self.check_form(KONNEKTOR_FORM)? {
            return Ok(blocked);
        }
        let mut files = self.page.serialize_files(KONNEKTOR_FORM)?;
        files.set_text(
            KONNEKTOR_ACTIVATED,
            self.page.is_checked(KONNEKTOR_ACTIVATED).to_string(),
        );
        let outcome = self
            .submit(Submit {
                base: RegionId::Config,
                endpoint: Endpoint::KonnektorSave,
                payload: Payload::Multipart(files),
                spinner: Spinner::Inline,
                error_region: RegionId::KonnektorFormError,
                result_region: None,
                context: UiErrorContext::Konnektor,
            })
            .await?;
        if !outcome.is_completed() {
            return Ok(outcome);
        }
        self.config_overview().await
    }

    /// Re-evaluates the konnektor form toggles after a control changed.
    pub fn konnektor_rules(&mut self) {
        apply_konnektor_rules(&mut self.page);
    }

    pub async fn log_overview(
        &mut self,
        kind: LogKind,
        log: Option<LogId>,
    ) -> Result<ActionOutcome, ConsoleError> {
        self.context.search_value = log
            .as_ref()
            .map(|log| log.as_str().to_string())
            .unwrap_or_default();
        let outcome = self
            .swap(Swap::fill(
                RegionId::Log,
                Endpoint::LogOverview { kind, log },
                UiErrorContext::Log,
            ))
            .await?;
        if outcome.is_completed() {
            let search = self.context.search_value.clone();
            self.restore_value(LOG_SEARCH, &search)?;
        }
        Ok(outcome)
    }

    /// Directory search with the current search field and certificate flag.
    /// Both survive the swap of the result region.
    pub async fn vzd_search(&mut self, konnektor: KonnektorId) -> Result<ActionOutcome, ConsoleError> {
        self.page.hide_region(&RegionId::Config)?;
        let query = VzdQuery {
            konnektor: konnektor.clone(),
            search_value: self.page.control_value(VZD_SEARCH).unwrap_or_default().to_string(),
            with_certificates: self.page.is_checked(VZD_WITH_CERTS),
        };
        self.context.last_vzd_search = Some(query.clone());

        let outcome = self
            .swap(
                Swap::fill(
                    RegionId::VzdOverview,
                    Endpoint::VzdSearch {
                        konnektor,
                        with_certificates: query.with_certificates,
                    },
                    UiErrorContext::Directory,
                )
                .payload(Payload::Form(vec![(
                    form_fields::VZD_SEARCH_VALUE.to_string(),
                    query.search_value.clone(),
                )])),
            )
            .await?;
        if outcome.is_completed() {
            self.restore_value(VZD_SEARCH, &query.search_value)?;
            self.restore_checked(VZD_WITH_CERTS, query.with_certificates)?;
        }
        Ok(outcome)
    }

    pub fn vzd_close(&mut self) -> Result<(), ConsoleError> {
        self.page.show_region(&RegionId::Config)?;
        self.page.clear_region(&RegionId::VzdOverview)?;
        Ok(())
    }

    pub async fn dns_test(&mut self, konnektor: KonnektorId) -> Result<ActionOutcome, ConsoleError> {
        self.page.hide_region(&RegionId::Config)?;
        let query = DnsQuery {
            konnektor: konnektor.clone(),
            domain: self.page.control_value(DNS_DOMAIN).unwrap_or_default().to_string(),
            record_type: self
                .page
                .control_value(DNS_RECORD_TYPE)
                .map(DnsRecordType::parse)
                .unwrap_or_default(),
        };
        self.context.last_dns_query = Some(query.clone());

        let outcome = self
            .swap(
                Swap::fill(
                    RegionId::DnsOverview,
                    Endpoint::DnsTest {
                        konnektor,
                        record_type: query.record_type.clone(),
                    },
                    UiErrorContext::Dns,
                )
                .payload(Payload::Form(vec![(
                    form_fields::DNS_DOMAIN.to_string(),
                    query.domain.clone(),
                )])),
            )
            .await?;
        if outcome.is_completed() {
            self.restore_value(DNS_DOMAIN, &query.domain)?;
            self.restore_value(DNS_RECORD_TYPE, query.record_type.as_str())?;
        }
        Ok(outcome)
    }

    pub fn dns_close(&mut self) -> Result<(), ConsoleError> {
        self.page.show_region(&RegionId::Config)?;
        self.page.clear_region(&RegionId::DnsOverview)?;
        Ok(())
    }

    pub async fn konn_webservice_overview(
        &mut self,
        konnektor: KonnektorId,
        webservice: WebserviceId,
    ) -> Result<ActionOutcome, ConsoleError> {
        self.page.hide_region(&RegionId::Config)?;
        self.swap(Swap::fill(
            RegionId::WebserviceOverview,
            Endpoint::WebserviceOverview {
                konnektor,
                webservice,
            },
            UiErrorContext::Webservice,
        ))
        .await
    }

    pub async fn verify_pin_overview(
        &mut self,
        request: VerifyPinRequest,
    ) -> Result<ActionOutcome, ConsoleError> {
        self.page.hide_region(&RegionId::Config)?;
        let body = serde_json::to_value(&request)?;
        self.swap(
            Swap::fill(
                RegionId::WebserviceOverview,
                Endpoint::VerifyPinOverview,
                UiErrorContext::Webservice,
            )
            .payload(Payload::Json(body)),
        )
        .await
    }

    /// Executes one operation form of the webservice overview. Results and
    /// errors land in the `{form}Result` and `{form}Error` slots.
    pub async fn konn_webservice_execute(&mut self, form: &str) -> Result<ActionOutcome, ConsoleError> {
        let result_region = RegionId::WebserviceResult(form.to_string());
        let error_region = RegionId::WebserviceError(form.to_string());
        for region in [&result_region, &error_region] {
            self.page.ensure_region(region);
            self.close_overlay(region)?;
        }
        if let Some(blocked) = self.check_form(form)? {
            return Ok(blocked);
        }
        let body = self.page.serialize_json(form)?;
        self.submit(Submit {
            base: RegionId::WebserviceOverview,
            endpoint: Endpoint::WebserviceExecute,
            payload: Payload::Json(body),
            spinner: Spinner::Form(form.to_string()),
            error_region,
            result_region: Some(result_region),
            context: UiErrorContext::Webservice,
        })
        .await
    }

    pub async fn ntp_test(&mut self, konnektor: KonnektorId) -> Result<ActionOutcome, ConsoleError> {
        self.page.hide_region(&RegionId::Config)?;
        self.swap(Swap::fill(
            RegionId::NtpOverview,
            Endpoint::NtpTest { konnektor },
            UiErrorContext::Ntp,
        ))
        .await
    }

    pub fn ntp_close(&mut self) -> Result<(), ConsoleError> {
        self.page.show_region(&RegionId::Config)?;
        self.page.clear_region(&RegionId::NtpOverview)?;
        Ok(())
    }

    pub async fn pipeline_test_overview(&mut self) -> Result<ActionOutcome, ConsoleError> {
        self.swap(
            Swap::fill(
                RegionId::PipelineTest,
                Endpoint::PipelineTestOverview,
                UiErrorContext::PipelineTest,
            )
            .spinner(Spinner::Inline),
        )
        .await
    }

    /// Loads the form of one pipeline operation. The placeholder key only
    /// empties the operation container.
    pub async fn pipeline_test_operation_load(
        &mut self,
        operation: OperationId,
    ) -> Result<ActionOutcome, ConsoleError> {
        if operation.is_unknown() {
            self.page.clear_region(&RegionId::PipelineTestOperation)?;
            return Ok(ActionOutcome::Completed);
        }
        self.swap(
            Swap::fill(
                RegionId::PipelineTestOperation,
                Endpoint::PipelineTestOperation { operation },
                UiErrorContext::PipelineTest,
            )
            .spinner(Spinner::Inline),
        )
        .await
    }

    pub async fn pipeline_test_operation_execute(&mut self) -> Result<ActionOutcome, ConsoleError> {
        self.page.form(OPERATION_FORM)?;
        if let Some(blocked) = self.check_form(OPERATION_FORM)? {
            return Ok(blocked);
        }
        let files = self.page.serialize_files(OPERATION_FORM)?;
        self.close_overlay(&RegionId::OperationResult)?;
        self.close_overlay(&RegionId::OperationError)?;
        self.submit(Submit {
            base: RegionId::PipelineTestOperation,
            endpoint: Endpoint::PipelineTestExecute,
            payload: Payload::Multipart(files),
            spinner: Spinner::Inline,
            error_region: RegionId::OperationError,
            result_region: Some(RegionId::OperationResult),
            context: UiErrorContext::PipelineTest,
        })
        .await
    }

    /// Changes the password of the signed-in user and signs out on success.
    pub async fn change_password(&mut self) -> Result<ActionOutcome, ConsoleError> {
        if let Some(blocked) = self.check_form(CHANGE_PASSWORD_FORM)? {
            self.page.close_modal(Modal::ChangePassword);
            return Ok(blocked);
        }
        let body = self.page.serialize_json(CHANGE_PASSWORD_FORM)?;
        let outcome = self
            .submit(Submit {
                base: RegionId::ChangePasswordForm,
                endpoint: Endpoint::ChangePassword,
                payload: Payload::Json(body),
                spinner: Spinner::Page,
                error_region: RegionId::ChangePasswordFormError,
                result_region: None,
                context: UiErrorContext::ChangePassword,
            })
            .await?;
        self.page.close_modal(Modal::ChangePassword);
        if !outcome.is_completed() {
            return Ok(outcome);
        }
        self.logout().await
    }

    /// Fetches a server-rendered page and takes over its meta tags and
    /// top-level controls.
    pub async fn bootstrap(&mut self, path: &str) -> Result<ActionOutcome, ConsoleError> {
        let base = self.page.base_url().clone();
        let endpoint = Endpoint::Document {
            path: path.to_string(),
        };
        let request = self.request(&base, endpoint, Payload::Empty)?;
        match self.send(request).await {
            Ok(html) => {
                self.page.load_document(&html);
                info!(path, csrf = self.page.csrf_token().is_some(), "page loaded");
                Ok(ActionOutcome::Completed)
            }
            Err(err) => {
                warn!(path, %err, "page load failed");
                Ok(ActionOutcome::Failed(UiError::from_transport(
                    UiErrorContext::Bootstrap,
                    &err,
                )))
            }
        }
    }

    /// Posts the login form of a loaded login page. The server answers a
    /// rejected login with the login page again.
    pub async fn login(&mut self) -> Result<ActionOutcome, ConsoleError> {
        let pairs = self.page.serialize_pairs(login::LOGIN_FORM)?;
        let base = self.page.base_url().clone();
        let request = self.request(&base, Endpoint::Login, Payload::Form(pairs))?;
        let invalid = login::on_submit(&mut self.page)?;
        if !invalid.is_empty() {
            return Ok(ActionOutcome::Invalid {
                form: login::LOGIN_FORM.to_string(),
                controls: invalid,
            });
        }
        let result = self.send(request).await;
        self.page
            .hide_spinner(&Spinner::Form(login::LOGIN_FORM.to_string()));
        match result {
            Ok(html) => {
                self.page.load_document(&html);
                if self.page.has_form(login::LOGIN_FORM) {
                    login::on_rejected(&mut self.page)?;
                    return Ok(ActionOutcome::Failed(UiError::new(
                        UiErrorCategory::Auth,
                        UiErrorContext::Login,
                        "invalid credentials",
                    )));
                }
                info!("signed in");
                Ok(ActionOutcome::Completed)
            }
            Err(err) => {
                login::on_rejected(&mut self.page)?;
                Ok(ActionOutcome::Failed(UiError::from_transport(
                    UiErrorContext::Login,
                    &err,
                )))
            }
        }
    }

    pub async fn logout(&mut self) -> Result<ActionOutcome, ConsoleError> {
        let base = self.page.base_url().clone();
        let request = self.request(&base, Endpoint::Logout, Payload::Empty)?;
        self.page.show_spinner(Spinner::Page);
        let result = self.send(request).await;
        self.page.hide_spinner(&Spinner::Page);
        match result {
            Ok(html) => {
                self.page.load_document(&html);
                info!("signed out");
                Ok(ActionOutcome::Completed)
            }
            Err(err) => {
                warn!(%err, "logout failed");
                Ok(ActionOutcome::Failed(UiError::from_transport(
                    UiErrorContext::Login,
                    &err,
                )))
            }
        }
    }

    /// Restyles the navbar for the new scroll position.
    pub fn on_scroll(&mut self, viewport_width: f64, scroll_y: f64) -> NavbarState {
        self.page.set_viewport(viewport_width, scroll_y);
        let state = navbar_state(viewport_width, scroll_y, self.navigation.breakpoint);
        apply_navbar(&mut self.page, state);
        state
    }

    pub fn on_anchor_click(&self, href: &str) -> Option<ScrollAnimation> {
        intercept_anchor(
            &self.page,
            href,
            self.navigation.header_offset,
            self.navigation.scroll_duration,
        )
    }

    /// Runs the login page's load behavior for `location`.
    pub fn on_login_page(&mut self, location: &Url) {
        login::on_load(&mut self.page, location, self.navigation.breakpoint);
    }
}

#[cfg(test)]
#[path = "tests/actions_tests.rs"]
mod tests;

use shared::domain::{DnsRecordType, KonnektorId};

/// Transient state shared by the actions of one page. Owned by the
/// controller; values are only ever overwritten, never reset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionContext {
    /// Konnektor picked in the delete confirmation dialog.
    pub pending_delete: Option<KonnektorId>,
    /// Search text of the last log overview.
    pub search_value: String,
    pub last_vzd_search: Option<VzdQuery>,
    pub last_dns_query: Option<DnsQuery>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VzdQuery {
    pub konnektor: KonnektorId,
    pub search_value: String,
    pub with_certificates: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnsQuery {
    pub konnektor: KonnektorId,
    pub domain: String,
    pub record_type: DnsRecordType,
}

use serde::{Deserialize, Serialize};

use crate::domain::{CardHandle, KonnektorId, OperationId, PinType, WebserviceId};

/// JSON body of the PIN verification overview request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyPinRequest {
    pub konn_id: KonnektorId,
    pub ws_id: WebserviceId,
    pub op_id: OperationId,
    pub pin_typ: PinType,
    pub card_handle: CardHandle,
    pub test_mode: bool,
}

impl VerifyPinRequest {
    pub fn new(
        konn_id: KonnektorId,
        ws_id: WebserviceId,
        op_id: OperationId,
        pin_typ: PinType,
        card_handle: CardHandle,
    ) -> Self {
        Self {
            konn_id,
            ws_id,
            op_id,
            pin_typ,
            card_handle,
            test_mode: false,
        }
    }
}

/// Field names of the legacy URL-encoded search bodies.
pub mod form_fields {
    pub const VZD_SEARCH_VALUE: &str = "searchValue";
    pub const DNS_DOMAIN: &str = "domain";
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorEnvelope;

    #[test]
    fn verify_pin_request_uses_camel_case_wire_names() {
        let request = VerifyPinRequest::new(
            KonnektorId::new("k-1"),
            WebserviceId::new("CardService"),
            OperationId::new("VerifyPin"),
            PinType::new(PinType::CH),
            CardHandle::new("card-7"),
        );
        let value = serde_json::to_value(&request).expect("serialize");
        assert_eq!(value["konnId"], "k-1");
        assert_eq!(value["wsId"], "CardService");
        assert_eq!(value["pinTyp"], "PIN.CH");
        assert_eq!(value["cardHandle"], "card-7");
        assert_eq!(value["testMode"], false);
    }

    #[test]
    fn verify_pin_request_keeps_unlisted_pin_types() {
        let body = r#"{"konnId":"k-1","wsId":"CardService","opId":"VerifyPin","pinTyp":"PIN.HP","cardHandle":"card-7","testMode":true}"#;
        let request: VerifyPinRequest = serde_json::from_str(body).expect("decode");
        assert_eq!(request.pin_typ.as_str(), "PIN.HP");
        assert!(request.test_mode);
    }

    #[test]
    fn error_envelope_accepts_spring_error_view() {
        let body = r#"{"timestamp":"2023-01-01T00:00:00","status":500,"error":"Internal Server Error","message":"Die Konnektor-Konfiguration konnte nicht geladen werden","path":"/konnektor/lade/x/false"}"#;
        let envelope: ErrorEnvelope = serde_json::from_str(body).expect("decode");
        assert_eq!(
            envelope.message,
            "Die Konnektor-Konfiguration konnte nicht geladen werden"
        );
        assert_eq!(envelope.code, None);
    }

    #[test]
    fn error_envelope_keeps_internal_failure_code() {
        let envelope: ErrorEnvelope =
            serde_json::from_str(r#"{"code":-101,"message":"not readable"}"#).expect("decode");
        assert_eq!(envelope.code, Some(-101));
        assert_eq!(envelope.message, "not readable");
    }
}

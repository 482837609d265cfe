use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

id_newtype!(KonnektorId);
id_newtype!(WebserviceId);
id_newtype!(OperationId);
id_newtype!(LogId);
id_newtype!(CardHandle);
id_newtype!(PinType);

impl KonnektorId {
    /// Sentinel the server reads as "create a new konnektor".
    pub const NEW_ENTRY: &'static str = "-1";

    pub fn new_entry() -> Self {
        Self(Self::NEW_ENTRY.to_string())
    }
}

impl PinType {
    /// Cardholder PIN of an eGK.
    pub const CH: &'static str = "PIN.CH";
    pub const SMC: &'static str = "PIN.SMC";
}

impl OperationId {
    /// Placeholder key of the operation picker; selecting it clears the
    /// operation container without a request.
    pub const UNKNOWN: &'static str = "unknown";

    pub fn is_unknown(&self) -> bool {
        self.0 == Self::UNKNOWN
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogKind {
    Smtp,
    Pop3,
}

impl LogKind {
    pub fn as_path_segment(self) -> &'static str {
        match self {
            Self::Smtp => "SMTP",
            Self::Pop3 => "POP3",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DnsRecordType {
    #[default]
    A,
    Aaaa,
    Mx,
    Txt,
    Srv,
    Other(String),
}

impl DnsRecordType {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "" | "A" => Self::A,
            "AAAA" => Self::Aaaa,
            "MX" => Self::Mx,
            "TXT" => Self::Txt,
            "SRV" => Self::Srv,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::A => "A",
            Self::Aaaa => "AAAA",
            Self::Mx => "MX",
            Self::Txt => "TXT",
            Self::Srv => "SRV",
            Self::Other(value) => value,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AuthMethod {
    None,
    Cert,
    Basicauth,
}

impl AuthMethod {
    pub fn as_form_value(self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::Cert => "CERT",
            Self::Basicauth => "BASICAUTH",
        }
    }
}

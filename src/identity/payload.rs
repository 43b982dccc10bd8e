//! Identity payload record.
//!
//! The payload is a single `;`-delimited line sent as a CTCP ACTION:
//!
//! ```text
//! unixTimeMillis;hostAppName;hostAppVersion;protocolLibName;protocolLibVersion;
//! moduleName;moduleVersion;externalIpHash;machineHash;userIdHash;username
//! ```
//!
//! Every field has embedded `;` replaced with `_`, so a consumer splitting on
//! `;` always sees exactly [`PAYLOAD_FIELD_COUNT`] fields.

use chrono::Utc;

/// Number of fields in an identity payload.
pub const PAYLOAD_FIELD_COUNT: usize = 11;

const FIELD_SEPARATOR: char = ';';

/// Static descriptors embedded in every payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayloadInfo {
    pub host_app_name: String,
    pub host_app_version: String,
    pub protocol_lib_name: String,
    pub protocol_lib_version: String,
    pub module_name: String,
    pub module_version: String,
}

impl PayloadInfo {
    /// Descriptors for this crate running inside the given host application.
    pub fn for_host(host_app_name: &str, host_app_version: &str) -> Self {
        Self {
            host_app_name: host_app_name.to_string(),
            host_app_version: host_app_version.to_string(),
            protocol_lib_name: crate::wire::PROTOCOL_LIB_NAME.to_string(),
            protocol_lib_version: crate::wire::PROTOCOL_LIB_VERSION.to_string(),
            module_name: env!("CARGO_PKG_NAME").to_string(),
            module_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Builds identity payload records.
#[derive(Debug, Clone)]
pub struct PayloadBuilder {
    info: PayloadInfo,
}

impl PayloadBuilder {
    pub fn new(info: PayloadInfo) -> Self {
        Self { info }
    }

    pub fn info(&self) -> &PayloadInfo {
        &self.info
    }

    /// Build a payload stamped with the current time.
    pub fn build(
        &self,
        external_ip_hash: &str,
        machine_hash: &str,
        user_id_hash: &str,
        username: &str,
    ) -> String {
        self.build_at(
            Utc::now().timestamp_millis(),
            external_ip_hash,
            machine_hash,
            user_id_hash,
            username,
        )
    }

    /// Build a payload with an explicit timestamp.
    pub fn build_at(
        &self,
        unix_time_millis: i64,
        external_ip_hash: &str,
        machine_hash: &str,
        user_id_hash: &str,
        username: &str,
    ) -> String {
        let timestamp = unix_time_millis.to_string();
        let fields: [&str; PAYLOAD_FIELD_COUNT] = [
            &timestamp,
            &self.info.host_app_name,
            &self.info.host_app_version,
            &self.info.protocol_lib_name,
            &self.info.protocol_lib_version,
            &self.info.module_name,
            &self.info.module_version,
            external_ip_hash,
            machine_hash,
            user_id_hash,
            username,
        ];
        fields
            .iter()
            .map(|f| escape_field(f))
            .collect::<Vec<_>>()
            .join(";")
    }
}

fn escape_field(field: &str) -> String {
    field.replace(FIELD_SEPARATOR, "_")
}

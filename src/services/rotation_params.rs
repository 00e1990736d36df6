//! Per-service rotation parameters.
//!
//! Providers receive an open parameter map. What goes into it depends on the
//! service and on the record being rotated (its name, its locations'
//! metadata), so the derivation lives here as a lookup table instead of inside
//! each provider. Adding a service means adding a row.

use crate::domain::models::{param_keys, CredentialRecord, RotationParams};

/// Prefix for labels and notes attached to credentials issued by tokn.
pub const LABEL_PREFIX: &str = "tokn-";

/// Location kind that carries Akamai EdgeGrid credentials.
const EDGERC_KIND: &str = "edgerc";

type ParamRule = fn(&CredentialRecord, &mut RotationParams);

const SERVICE_PARAM_RULES: &[(&str, ParamRule)] = &[
    ("github", github_params),
    ("cloudflare", cloudflare_params),
    ("linode-cli", linode_params),
    ("linode-doppler", linode_params),
    ("akamai", akamai_params),
];

/// Derive the parameters passed to `rotate` for this record's service.
///
/// Services without a row get an empty map.
pub fn derive_rotation_params(record: &CredentialRecord) -> RotationParams {
    let mut params = RotationParams::new();
    for (service, rule) in SERVICE_PARAM_RULES {
        if *service == record.service {
            rule(record, &mut params);
        }
    }
    params
}

fn issued_label(record: &CredentialRecord) -> String {
    format!("{LABEL_PREFIX}{}", record.name)
}

/// First value for `key` declared on any location, in location order.
fn harvest_location_metadata(record: &CredentialRecord, key: &str) -> Option<String> {
    record
        .locations
        .iter()
        .find_map(|location| location.metadata.get(key).cloned())
}

fn github_params(record: &CredentialRecord, params: &mut RotationParams) {
    params.insert(param_keys::SCOPES.to_string(), "repo".to_string());
    params.insert(param_keys::NOTE.to_string(), issued_label(record));
}

fn cloudflare_params(record: &CredentialRecord, params: &mut RotationParams) {
    params.insert(param_keys::NAME.to_string(), issued_label(record));
    if let Some(account_id) = harvest_location_metadata(record, param_keys::ACCOUNT_ID) {
        params.insert(param_keys::ACCOUNT_ID.to_string(), account_id);
    }
}

fn linode_params(record: &CredentialRecord, params: &mut RotationParams) {
    params.insert(param_keys::LABEL.to_string(), issued_label(record));
}

fn akamai_params(record: &CredentialRecord, params: &mut RotationParams) {
    if let Some(edgerc) = record.locations.iter().find(|l| l.kind == EDGERC_KIND) {
        params.insert(param_keys::EDGERC_PATH.to_string(), edgerc.path.clone());
        if let Some(section) = edgerc.metadata.get(param_keys::SECTION) {
            params.insert(param_keys::SECTION.to_string(), section.clone());
        }
    }
}

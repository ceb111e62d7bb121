//! Settings resolution.
//!
//! Layers are applied in increasing precedence with
//! [`PartialSettings::merge_from`], then validated into [`GatewayCredentials`].

use paybridge_types::{ConfigError, GatewayCredentials, PartialSettings};

/// Merge `overrides` on top of `base` and validate the result.
pub fn resolve(
    base: &PartialSettings,
    overrides: &PartialSettings,
) -> Result<GatewayCredentials, ConfigError> {
    resolve_layers(&[base, overrides])
}

/// Merge any number of layers, later layers winning, and validate the result.
pub fn resolve_layers(layers: &[&PartialSettings]) -> Result<GatewayCredentials, ConfigError> {
    let merged = merge_layers(layers);
    GatewayCredentials::from_settings(&merged)
}

pub fn merge_layers(layers: &[&PartialSettings]) -> PartialSettings {
    layers
        .iter()
        .fold(PartialSettings::default(), |merged, layer| merged.merged(layer))
}

//! Lifecycle settings of each reported policy, taken from the policy definitions.

use std::collections::BTreeMap;

use serde::{Serialize, Serializer};

use crate::{
    model::{PolicyDefinition, PolicyDefinitions},
    report::aggregate::{PolicyGroup, PolicyGroups},
};

pub const POLICY_NOT_FOUND: &str = "Policy not found";
pub const NO_ROLLOVER_PHASES: &str = "No phases with rollover settings";
pub const NO_ROLLOVER: &str = "no rollover defined";
pub const LIFETIME_NOT_SPECIFIED: &str = "Not specified";

/// Settings section of one policy.
///
/// A note means the definition was found but no phase rolls over. An error
/// means there was no definition to look at.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PolicySettings {
    Phases(BTreeMap<String, PhaseSetting>),
    Note { note: String },
    Error { error: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhaseSetting {
    pub lifetime: String,
    pub rollover: Rollover,
    pub num_indices: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Rollover {
    Defined(serde_json::Value),
    NotDefined,
}

impl Rollover {
    /// Flat text form used in tables.
    pub fn to_cell(&self) -> String {
        match self {
            Rollover::Defined(action) => action.to_string(),
            Rollover::NotDefined => NO_ROLLOVER.to_owned(),
        }
    }
}

impl Serialize for Rollover {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Rollover::Defined(action) => action.serialize(serializer),
            Rollover::NotDefined => serializer.serialize_str(NO_ROLLOVER),
        }
    }
}

pub fn attach_policy_definitions(groups: &mut PolicyGroups, definitions: &PolicyDefinitions) {
    for (policy, group) in groups.iter_mut() {
        let settings = match definitions.get(policy) {
            Some(definition) => policy_settings(policy, definition, group),
            None => {
                tracing::warn!(policy, "Policy not found in cluster");
                PolicySettings::Error {
                    error: POLICY_NOT_FOUND.to_owned(),
                }
            }
        };
        group.settings = Some(settings);
    }
}

/// Mark every group when the definitions could not be fetched at all.
pub fn attach_definitions_error(groups: &mut PolicyGroups, cause: &str) {
    for group in groups.values_mut() {
        group.settings = Some(PolicySettings::Error {
            error: cause.to_owned(),
        });
    }
}

fn policy_settings(
    policy: &str,
    definition: &PolicyDefinition,
    group: &PolicyGroup,
) -> PolicySettings {
    if definition.phases.values().all(|phase| phase.rollover.is_none()) {
        tracing::warn!(policy, "No rollover settings found for any phase");
        return PolicySettings::Note {
            note: NO_ROLLOVER_PHASES.to_owned(),
        };
    }

    let phases = definition
        .phases
        .iter()
        .map(|(phase, def)| {
            let setting = PhaseSetting {
                lifetime: def
                    .min_age
                    .clone()
                    .unwrap_or_else(|| LIFETIME_NOT_SPECIFIED.to_owned()),
                rollover: def
                    .rollover
                    .clone()
                    .map_or(Rollover::NotDefined, Rollover::Defined),
                num_indices: group
                    .phases
                    .get(phase)
                    .map_or(0, |p| p.totals.num_indices),
            };
            (phase.clone(), setting)
        })
        .collect();

    PolicySettings::Phases(phases)
}

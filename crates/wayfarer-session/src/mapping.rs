//! Queries over the stage → actors mapping.
//!
//! The mapping is small (a handful of stages, a few actors each), so every
//! query is a linear scan. Stage order is the mapping's key order, which
//! makes every answer deterministic.

use std::collections::BTreeMap;

use wayfarer_protocol::Mapping;

use crate::SessionError;

/// Every stage that lists `actor`, in key order.
pub fn stages_of<'a>(actor: &str, mapping: &'a Mapping) -> Vec<&'a str> {
    mapping
        .iter()
        .filter(|(_, actors)| actors.iter().any(|a| a == actor))
        .map(|(stage, _)| stage.as_str())
        .collect()
}

/// The stage `actor` stands on, or `None` if it is not placed.
///
/// # Errors
/// [`SessionError::ActorInMultipleStages`] if more than one stage lists it.
pub fn actor_location<'a>(actor: &str, mapping: &'a Mapping) -> Result<Option<&'a str>, SessionError> {
    let stages = stages_of(actor, mapping);
    match stages.as_slice() {
        [] => Ok(None),
        [stage] => Ok(Some(*stage)),
        _ => Err(SessionError::ActorInMultipleStages {
            actor: actor.to_string(),
            stages: stages.iter().map(|s| s.to_string()).collect(),
        }),
    }
}

/// All actors sharing a stage with `actor`, `actor` included, in the
/// stage's own order. Empty if `actor` is not placed anywhere.
///
/// # Errors
/// [`SessionError::ActorInMultipleStages`] if more than one stage lists it.
pub fn retrieve_actors_for_stage(actor: &str, mapping: &Mapping) -> Result<Vec<String>, SessionError> {
    let stage = actor_location(actor, mapping)?;
    Ok(stage
        .and_then(|stage| mapping.get(stage))
        .cloned()
        .unwrap_or_default())
}

/// Checks that no actor is listed on two different stages.
///
/// An actor repeated within one stage's list is not a violation.
///
/// # Errors
/// [`SessionError::ActorInMultipleStages`] naming the first offending
/// actor in name order.
pub fn validate_mapping(mapping: &Mapping) -> Result<(), SessionError> {
    let mut owners: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for (stage, actors) in mapping {
        for actor in actors {
            let stages = owners.entry(actor.as_str()).or_default();
            if stages.last() != Some(&stage.as_str()) {
                stages.push(stage.as_str());
            }
        }
    }

    match owners.into_iter().find(|(_, stages)| stages.len() > 1) {
        Some((actor, stages)) => Err(SessionError::ActorInMultipleStages {
            actor: actor.to_string(),
            stages: stages.into_iter().map(str::to_string).collect(),
        }),
        None => Ok(()),
    }
}

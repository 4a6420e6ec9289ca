//! Directive validation
//!
//! Cross-checks a class's ignore / ignore-errors / map / transform directives
//! against the names of the properties it actually declares. Rules run in a
//! fixed order and the first violation is returned.

use crate::class::DirectiveSet;
use crate::error::{ReflectionError, Result};

/// Validate resolved directives against declared property names
///
/// A mapped key conflicts when any other surviving property ends up with the
/// same external name, whether through its own mapping or its unmapped name.
/// Ignored properties never reach the wire and claim nothing.
pub fn validate(class: &str, property_names: &[&str], directives: &DirectiveSet) -> Result<()> {
    let exists = |name: &str| property_names.iter().any(|declared| *declared == name);
    let error_for = |make: fn(String, String) -> ReflectionError, name: &str| {
        Err(make(name.to_string(), class.to_string()))
    };

    if let Some(name) = directives.ignored.iter().find(|n| !exists(n)) {
        return error_for(
            |property, class| ReflectionError::CannotIgnoreNonExistantProperty { property, class },
            name,
        );
    }

    if let Some(name) = directives.ignore_errors.iter().find(|n| !exists(n)) {
        return error_for(
            |property, class| ReflectionError::CannotIgnoreErrorsForNonExistantProperty {
                property,
                class,
            },
            name,
        );
    }

    if let Some((name, _)) = directives.mapped.iter().find(|(n, _)| !exists(n)) {
        return error_for(
            |property, class| ReflectionError::CannotMapNonExistantProperty { property, class },
            name,
        );
    }

    if let Some((name, _)) = directives.transformed.iter().find(|(n, _)| !exists(n)) {
        return error_for(
            |property, class| ReflectionError::CannotTransformNonExistantProperty { property, class },
            name,
        );
    }

    if let Some((name, _)) = directives.mapped.iter().find(|(n, _)| directives.is_ignored(n)) {
        return error_for(
            |property, class| ReflectionError::CannotMapAndIgnoreProperty { property, class },
            name,
        );
    }

    if let Some((name, _)) = directives.transformed.iter().find(|(n, _)| directives.is_ignored(n)) {
        return error_for(
            |property, class| ReflectionError::CannotTransformAndIgnoreProperty { property, class },
            name,
        );
    }

    if let Some((properties, conflict_key)) = first_key_conflict(property_names, directives) {
        return Err(ReflectionError::MappedPropertyConflict {
            properties,
            conflict_key,
            class: class.to_string(),
        });
    }

    Ok(())
}

/// First mapped key claimed by more than one property, with every claimant
/// in declaration order
fn first_key_conflict(
    property_names: &[&str],
    directives: &DirectiveSet,
) -> Option<(Vec<String>, String)> {
    let wire: Vec<(&str, &str)> = property_names
        .iter()
        .filter(|name| !directives.is_ignored(name))
        .map(|name| (*name, directives.external_name(name).unwrap_or(*name)))
        .collect();

    directives.mapped.iter().find_map(|(_, key)| {
        let mut claimants: Vec<String> = Vec::new();
        for (name, external) in &wire {
            if *external == key.as_str() && !claimants.iter().any(|c| c.as_str() == *name) {
                claimants.push(name.to_string());
            }
        }
        (claimants.len() > 1).then(|| (claimants, key.clone()))
    })
}

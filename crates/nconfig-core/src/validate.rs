//! Cross-environment validation
//!
//! Checks every environment referenced by the definitions against the
//! default environment for key-set parity and reports discrepancies.
//! A single unloadable document becomes an error entry for that
//! environment instead of aborting the whole report.

use crate::Result;
use nconfig_fs::{DocumentStore, EnvironmentDefinitions, EnvironmentDocument, NormalizedPath};
use std::collections::BTreeMap;

/// Discrepancy messages per environment name. Empty means all
/// environments are in sync with the default.
pub type ValidationReport = BTreeMap<String, Vec<String>>;

/// Validate every environment in `definitions` against the default.
///
/// Environments matching the default exactly are omitted. The only
/// fatal case is a default document that cannot be loaded, since there
/// is no baseline to diff against.
pub fn validate_all(
    root: &NormalizedPath,
    definitions: &EnvironmentDefinitions,
) -> Result<ValidationReport> {
    let store = DocumentStore::new();
    let default_name = definitions.default_environment();
    let default_doc = store.load_environment(root, default_name)?;

    let mut report = ValidationReport::new();

    for name in definitions.environment_names() {
        if name == default_name {
            continue;
        }

        let doc = match store.load_environment(root, name) {
            Ok(doc) => doc,
            Err(e) => {
                report.insert(name.to_string(), vec![format!("could not load document: {e}")]);
                continue;
            }
        };

        let messages = diff_against_default(name, &doc, default_name, &default_doc);
        if !messages.is_empty() {
            report.insert(name.to_string(), messages);
        }
    }

    Ok(report)
}

fn diff_against_default(
    name: &str,
    doc: &EnvironmentDocument,
    default_name: &str,
    default_doc: &EnvironmentDocument,
) -> Vec<String> {
    let mut messages = Vec::new();

    let keys = doc.setting_keys();
    let default_keys = default_doc.setting_keys();
    for missing in default_keys.difference(&keys) {
        messages.push(format!(
            "setting \"{missing}\" is present in {default_name} but missing from {name}"
        ));
    }
    for extra in keys.difference(&default_keys) {
        messages.push(format!(
            "setting \"{extra}\" is present in {name} but not in {default_name}"
        ));
    }

    let names = doc.connection_names();
    let default_names = default_doc.connection_names();
    for missing in default_names.difference(&names) {
        messages.push(format!(
            "connection string \"{missing}\" is present in {default_name} but missing from {name}"
        ));
    }
    for extra in names.difference(&default_names) {
        messages.push(format!(
            "connection string \"{extra}\" is present in {name} but not in {default_name}"
        ));
    }

    messages
}

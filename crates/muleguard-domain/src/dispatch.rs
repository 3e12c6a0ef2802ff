//! Check type -> matcher family.
//!
//! The registry is closed: every accepted type string, legacy aliases included, is listed in
//! [`family_of`]. Aliases may carry default parameters that apply only when the rule leaves
//! that key unset.

use crate::checks::Outcome;
use crate::checks::json_validation::JsonValidation;
use crate::checks::pom_validation::PomValidation;
use crate::checks::property_file::PropertyFileCheck;
use crate::checks::token_search::TokenSearch;
use crate::checks::xml_validation::XmlValidation;
use crate::context::{Project, RuleContext};
use muleguard_types::Check;
use muleguard_types::ids::*;
use serde_json::{Map, Value, json};

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum DispatchError {
    #[error("Unknown check type: {0}")]
    UnknownType(String),
    #[error("Configuration error: '{key}' {reason}")]
    InvalidParams { key: String, reason: String },
}

impl DispatchError {
    pub fn invalid(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidParams {
            key: key.into(),
            reason: reason.into(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Family {
    TokenSearch,
    Xml,
    Pom,
    PropertyFile,
    Json,
}

/// A check with validated, typed parameters, ready to run against any project.
#[derive(Clone, Debug)]
pub enum Matcher {
    TokenSearch(TokenSearch),
    Xml(XmlValidation),
    Pom(PomValidation),
    PropertyFile(PropertyFileCheck),
    Json(JsonValidation),
}

impl Matcher {
    pub fn run(&self, project: &Project, ctx: &RuleContext<'_>) -> Outcome {
        match self {
            Matcher::TokenSearch(m) => m.run(project),
            Matcher::Xml(m) => m.run(project),
            Matcher::Pom(m) => m.run(project),
            Matcher::PropertyFile(m) => m.run(project, ctx),
            Matcher::Json(m) => m.run(project),
        }
    }
}

/// Family and alias defaults for a type string, or `None` when the type is unknown.
pub fn family_of(check_type: &str) -> Option<(Family, Vec<(&'static str, Value)>)> {
    let token = |key, value: &str| vec![(key, json!(value))];
    let validation = |value: &str| vec![("validationType", json!(value))];

    let entry = match check_type {
        TYPE_GENERIC_TOKEN_SEARCH
        | TYPE_GENERIC_CODE_TOKEN_CHECK
        | TYPE_GENERIC_CONFIG_TOKEN_CHECK
        | TYPE_SUBSTRING_TOKEN_CHECK
        | TYPE_DLP_REFERENCE_CHECK => (Family::TokenSearch, Vec::new()),
        TYPE_GENERIC_TOKEN_SEARCH_REQUIRED => {
            (Family::TokenSearch, token("searchMode", "REQUIRED"))
        }
        TYPE_GENERIC_TOKEN_SEARCH_FORBIDDEN => {
            (Family::TokenSearch, token("searchMode", "FORBIDDEN"))
        }
        TYPE_FORBIDDEN_TOKEN_IN_ELEMENT => {
            (Family::TokenSearch, token("matchMode", "ELEMENT_ATTRIBUTE"))
        }
        TYPE_UNSUPPORTED_ERROR_EXPRESSIONS => (
            Family::TokenSearch,
            vec![(
                "filePatterns",
                json!(["src/main/mule/**/*.xml", "src/main/resources/**/*.dwl"]),
            )],
        ),

        TYPE_GENERIC_XML_VALIDATION => (Family::Xml, Vec::new()),
        TYPE_XML_XPATH_EXISTS => (Family::Xml, validation("EXISTS")),
        TYPE_XML_XPATH_NOT_EXISTS => (Family::Xml, validation("NOT_EXISTS")),
        TYPE_IBM_MQ_CIPHER_CHECK => (Family::Xml, validation("ATTRIBUTE_VALUE")),
        TYPE_CRYPTO_JCE_CONFIG_TYPE_CHECK | TYPE_XML_ATTRIBUTE_EXISTS => {
            (Family::Xml, validation("ATTRIBUTE_EXISTS"))
        }
        TYPE_CRYPTO_JCE_ENCRYPT_PBE_CHECK | TYPE_XML_ELEMENT_CONTENT_FORBIDDEN => {
            (Family::Xml, validation("FORBIDDEN_VALUE"))
        }
        TYPE_UNSUPPORTED_XML_ATTRIBUTE | TYPE_XML_ATTRIBUTE_NOT_EXISTS => {
            (Family::Xml, validation("FORBIDDEN_ATTRIBUTE"))
        }

        TYPE_GENERIC_POM_VALIDATION => (Family::Pom, Vec::new()),
        TYPE_POM_DEPENDENCY_ADDED => (Family::Pom, validation("DEPENDENCY_EXISTS")),
        TYPE_POM_DEPENDENCY_REMOVED => (Family::Pom, validation("DEPENDENCY_NOT_EXISTS")),
        TYPE_POM_PLUGIN_REMOVED => (Family::Pom, validation("PLUGIN_NOT_EXISTS")),
        TYPE_POM_PARENT => (Family::Pom, validation("PARENT")),
        TYPE_POM_PROPERTY => (Family::Pom, validation("PROPERTY_EXISTS")),

        TYPE_GENERIC_PROPERTY_FILE
        | TYPE_CONFIG_PROPERTY_EXISTS
        | TYPE_MANDATORY_PROPERTY_VALUE_CHECK => (
            Family::PropertyFile,
            token("parseMode", "PROPERTIES_FORMAT"),
        ),
        TYPE_CONFIG_POLICY_EXISTS | TYPE_MANDATORY_SUBSTRING_CHECK => (
            Family::PropertyFile,
            token("parseMode", "SUBSTRING_SEARCH"),
        ),

        TYPE_GENERIC_JSON_VALIDATION
        | TYPE_JSON_VALIDATION_REQUIRED
        | TYPE_JSON_VALIDATION_FORBIDDEN => (Family::Json, Vec::new()),
        TYPE_MULE_ARTIFACT_JSON_FULL => (Family::Json, token("filePattern", "mule-artifact.json")),

        _ => return None,
    };
    Some(entry)
}

/// Validates a check's parameters and builds its matcher.
pub fn dispatch(check: &Check) -> Result<Matcher, DispatchError> {
    let type_name = check.check_type.trim();
    let (family, defaults) =
        family_of(type_name).ok_or_else(|| DispatchError::UnknownType(type_name.to_string()))?;
    let params = with_defaults(&check.params, defaults);

    Ok(match family {
        Family::TokenSearch => Matcher::TokenSearch(TokenSearch::from_params(&params)?),
        Family::Xml => Matcher::Xml(XmlValidation::from_params(&params)?),
        Family::Pom => Matcher::Pom(PomValidation::from_params(&params)?),
        Family::PropertyFile => Matcher::PropertyFile(PropertyFileCheck::from_params(&params)?),
        Family::Json => Matcher::Json(JsonValidation::from_params(&params)?),
    })
}

fn with_defaults(
    params: &Map<String, Value>,
    defaults: Vec<(&'static str, Value)>,
) -> Map<String, Value> {
    let mut merged = params.clone();
    for (key, value) in defaults {
        merged.entry(key).or_insert(value);
    }
    merged
}

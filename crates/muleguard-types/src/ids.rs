//! Stable identifiers for check types.
//!
//! A check `type` selects the matcher family. Legacy names route to the consolidated family of the
//! same concern so older rule sets keep working.

// Token search
pub const TYPE_GENERIC_TOKEN_SEARCH: &str = "GENERIC_TOKEN_SEARCH";
pub const TYPE_GENERIC_TOKEN_SEARCH_REQUIRED: &str = "GENERIC_TOKEN_SEARCH_REQUIRED";
pub const TYPE_GENERIC_TOKEN_SEARCH_FORBIDDEN: &str = "GENERIC_TOKEN_SEARCH_FORBIDDEN";
pub const TYPE_GENERIC_CODE_TOKEN_CHECK: &str = "GENERIC_CODE_TOKEN_CHECK";
pub const TYPE_GENERIC_CONFIG_TOKEN_CHECK: &str = "GENERIC_CONFIG_TOKEN_CHECK";
pub const TYPE_SUBSTRING_TOKEN_CHECK: &str = "SUBSTRING_TOKEN_CHECK";
pub const TYPE_DLP_REFERENCE_CHECK: &str = "DLP_REFERENCE_CHECK";
pub const TYPE_FORBIDDEN_TOKEN_IN_ELEMENT: &str = "FORBIDDEN_TOKEN_IN_ELEMENT";
pub const TYPE_UNSUPPORTED_ERROR_EXPRESSIONS: &str = "UNSUPPORTED_ERROR_EXPRESSIONS";

// Structured markup (XML)
pub const TYPE_GENERIC_XML_VALIDATION: &str = "GENERIC_XML_VALIDATION";
pub const TYPE_XML_XPATH_EXISTS: &str = "XML_XPATH_EXISTS";
pub const TYPE_XML_XPATH_NOT_EXISTS: &str = "XML_XPATH_NOT_EXISTS";
pub const TYPE_XML_ATTRIBUTE_EXISTS: &str = "XML_ATTRIBUTE_EXISTS";
pub const TYPE_XML_ATTRIBUTE_NOT_EXISTS: &str = "XML_ATTRIBUTE_NOT_EXISTS";
pub const TYPE_XML_ELEMENT_CONTENT_FORBIDDEN: &str = "XML_ELEMENT_CONTENT_FORBIDDEN";
pub const TYPE_IBM_MQ_CIPHER_CHECK: &str = "IBM_MQ_CIPHER_CHECK";
pub const TYPE_UNSUPPORTED_XML_ATTRIBUTE: &str = "UNSUPPORTED_XML_ATTRIBUTE";
pub const TYPE_CRYPTO_JCE_ENCRYPT_PBE_CHECK: &str = "CRYPTO_JCE_ENCRYPT_PBE_CHECK";
pub const TYPE_CRYPTO_JCE_CONFIG_TYPE_CHECK: &str = "CRYPTO_JCE_CONFIG_TYPE_CHECK";

// Build descriptor (POM)
pub const TYPE_GENERIC_POM_VALIDATION: &str = "GENERIC_POM_VALIDATION";
pub const TYPE_POM_DEPENDENCY_ADDED: &str = "POM_DEPENDENCY_ADDED";
pub const TYPE_POM_DEPENDENCY_REMOVED: &str = "POM_DEPENDENCY_REMOVED";
pub const TYPE_POM_PLUGIN_REMOVED: &str = "POM_PLUGIN_REMOVED";
pub const TYPE_POM_PARENT: &str = "POM_PARENT";
pub const TYPE_POM_PROPERTY: &str = "POM_PROPERTY";

// Property files
pub const TYPE_GENERIC_PROPERTY_FILE: &str = "GENERIC_PROPERTY_FILE";
pub const TYPE_CONFIG_PROPERTY_EXISTS: &str = "CONFIG_PROPERTY_EXISTS";
pub const TYPE_CONFIG_POLICY_EXISTS: &str = "CONFIG_POLICY_EXISTS";
pub const TYPE_MANDATORY_SUBSTRING_CHECK: &str = "MANDATORY_SUBSTRING_CHECK";
pub const TYPE_MANDATORY_PROPERTY_VALUE_CHECK: &str = "MANDATORY_PROPERTY_VALUE_CHECK";

// Structured documents (JSON)
pub const TYPE_GENERIC_JSON_VALIDATION: &str = "GENERIC_JSON_VALIDATION";
pub const TYPE_JSON_VALIDATION_REQUIRED: &str = "JSON_VALIDATION_REQUIRED";
pub const TYPE_JSON_VALIDATION_FORBIDDEN: &str = "JSON_VALIDATION_FORBIDDEN";
pub const TYPE_MULE_ARTIFACT_JSON_FULL: &str = "MULE_ARTIFACT_JSON_FULL";

/// Every type identifier the dispatcher accepts, canonical names first.
pub const ALL_CHECK_TYPES: &[&str] = &[
    TYPE_GENERIC_TOKEN_SEARCH,
    TYPE_GENERIC_XML_VALIDATION,
    TYPE_GENERIC_POM_VALIDATION,
    TYPE_GENERIC_PROPERTY_FILE,
    TYPE_GENERIC_JSON_VALIDATION,
    TYPE_GENERIC_TOKEN_SEARCH_REQUIRED,
    TYPE_GENERIC_TOKEN_SEARCH_FORBIDDEN,
    TYPE_GENERIC_CODE_TOKEN_CHECK,
    TYPE_GENERIC_CONFIG_TOKEN_CHECK,
    TYPE_SUBSTRING_TOKEN_CHECK,
    TYPE_DLP_REFERENCE_CHECK,
    TYPE_FORBIDDEN_TOKEN_IN_ELEMENT,
    TYPE_UNSUPPORTED_ERROR_EXPRESSIONS,
    TYPE_XML_XPATH_EXISTS,
    TYPE_XML_XPATH_NOT_EXISTS,
    TYPE_XML_ATTRIBUTE_EXISTS,
    TYPE_XML_ATTRIBUTE_NOT_EXISTS,
    TYPE_XML_ELEMENT_CONTENT_FORBIDDEN,
    TYPE_IBM_MQ_CIPHER_CHECK,
    TYPE_UNSUPPORTED_XML_ATTRIBUTE,
    TYPE_CRYPTO_JCE_ENCRYPT_PBE_CHECK,
    TYPE_CRYPTO_JCE_CONFIG_TYPE_CHECK,
    TYPE_POM_DEPENDENCY_ADDED,
    TYPE_POM_DEPENDENCY_REMOVED,
    TYPE_POM_PLUGIN_REMOVED,
    TYPE_POM_PARENT,
    TYPE_POM_PROPERTY,
    TYPE_CONFIG_PROPERTY_EXISTS,
    TYPE_CONFIG_POLICY_EXISTS,
    TYPE_MANDATORY_SUBSTRING_CHECK,
    TYPE_MANDATORY_PROPERTY_VALUE_CHECK,
    TYPE_JSON_VALIDATION_REQUIRED,
    TYPE_JSON_VALIDATION_FORBIDDEN,
    TYPE_MULE_ARTIFACT_JSON_FULL,
];
